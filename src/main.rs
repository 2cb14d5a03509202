//! vault-export - command-line entry point
//!
//! Logs in with AppRole, then exports the configured subtree. With
//! `EXPORT_DECODE_ONLY=true` it only re-decodes bundles already on disk.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vault_export::{
    config::{Config, DecodeConfig},
    unpack::unpack_dir,
    vault::{AppRoleAuth, AuthSession, VaultClient},
    Exporter,
};

fn main() -> anyhow::Result<()> {
    // Every remote call is awaited in sequence, one thread is enough.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vault_export=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(decode) = DecodeConfig::from_env() {
        let dir = &decode.output_dir;
        let unpacked = unpack_dir(dir)
            .await
            .with_context(|| format!("decoding bundles in {} failed", dir.display()))?;
        info!(
            "Done: {} bundles decoded in {}",
            unpacked.len(),
            dir.display()
        );
        return Ok(());
    }

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration: {}", config.summary());
    let root = config.secret_path()?;

    let auth = AppRoleAuth::new(&config.vault, &config.role_id, &config.secret_id)?;
    let token = auth
        .authenticate()
        .await
        .with_context(|| format!("AppRole login to {} failed", config.vault.address))?;

    let client = VaultClient::new(&config.vault, token)?;
    if !client.is_authenticated().await? {
        anyhow::bail!("Vault rejected the issued token for {}", config.vault.address);
    }
    info!("Connection established");

    let summary = Exporter::new(client, &config.output_dir)
        .run(&root)
        .await
        .with_context(|| format!("export of '{}' failed", root))?;

    info!(
        "Done: {} secrets written to {}",
        summary.bundles.len(),
        config.output_dir.display()
    );
    Ok(())
}
