//! Base64 content classification.
//!
//! Detection is a pattern heuristic: any value made only of complete,
//! correctly padded base64 quads is treated as encoded. Plain text that
//! happens to fit the alphabet (hex strings, short alphanumeric words of
//! length 4n) is classified as base64 too.

use std::sync::LazyLock;

use base64::{
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use regex::Regex;

static BASE64_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9+/]{4})*([A-Za-z0-9+/]{3}=|[A-Za-z0-9+/]{2}==)?$").unwrap()
});

/// Standard alphabet that tolerates non-zero bits in the final symbol, so
/// every value matching the pattern decodes.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// How a field value is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Base64,
    Plain,
}

/// Field content ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldContent {
    Bytes(Vec<u8>),
    Text(String),
}

impl FieldContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FieldContent::Bytes(bytes) => bytes,
            FieldContent::Text(text) => text.as_bytes(),
        }
    }
}

/// Pure pattern check, no logging.
pub fn is_base64(value: &str) -> bool {
    BASE64_PATTERN.is_match(value)
}

/// Classify the value of `field` and log the result.
pub fn classify(field: &str, value: &str) -> Encoding {
    if is_base64(value) {
        tracing::info!("{} Encoded base64", field);
        Encoding::Base64
    } else {
        tracing::info!("{} Non encoded base64", field);
        Encoding::Plain
    }
}

/// Classify and, for base64 values, decode.
pub fn decode_field(field: &str, value: &str) -> Result<FieldContent, base64::DecodeError> {
    match classify(field, value) {
        Encoding::Base64 => BASE64.decode(value).map(FieldContent::Bytes),
        Encoding::Plain => Ok(FieldContent::Text(value.to_string())),
    }
}
