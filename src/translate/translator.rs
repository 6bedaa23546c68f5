//! v3 → v2 envelope translation.

use serde_json::Value;
use thiserror::Error;

use crate::translate::schema::{V2Envelope, V2Program, V3Publication};

/// Key holding the program list inside a v3 service object.
pub const PUBLICATION_KEY: &str = "publication";

/// Why a v3 envelope does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    #[error("top-level value is not an object")]
    NotAnObject,

    #[error("expected exactly one top-level key, found {0}")]
    KeyCount(usize),

    #[error("top-level key {found:?} does not match service {expected:?}")]
    KeyMismatch {
        expected: Option<String>,
        found: String,
    },

    #[error("service {0:?} has no `publication` list")]
    NoPublicationList(String),
}

/// Errors that can occur while translating an upstream body.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Body labelled as JSON could not be parsed.
    #[error("invalid JSON body: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatch),

    #[error("publication #{index} is missing string field `{field}`")]
    FieldMissing { index: usize, field: &'static str },

    /// Translated envelope could not be serialized.
    #[error("failed to encode v2 body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl TranslateError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TranslateError::Parse(_) => "parse_error",
            TranslateError::SchemaMismatch(_) => "schema_mismatch",
            TranslateError::FieldMissing { .. } => "field_missing",
            TranslateError::Encode(_) => "encode_error",
        }
    }
}

/// Translate a parsed v3 envelope into the v2 layout.
///
/// `service` is the request's `service` query parameter. The envelope must
/// have exactly one top-level key and it must equal `service`; an absent
/// `service` never matches.
pub fn translate(envelope: &Value, service: Option<&str>) -> Result<V2Envelope, TranslateError> {
    let object = envelope.as_object().ok_or(SchemaMismatch::NotAnObject)?;
    if object.len() != 1 {
        return Err(SchemaMismatch::KeyCount(object.len()).into());
    }

    let (key, channel) = match object.iter().next() {
        Some(entry) => entry,
        None => return Err(SchemaMismatch::KeyCount(0).into()),
    };
    if service != Some(key.as_str()) {
        return Err(SchemaMismatch::KeyMismatch {
            expected: service.map(str::to_owned),
            found: key.clone(),
        }
        .into());
    }

    let publications = channel
        .get(PUBLICATION_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| SchemaMismatch::NoPublicationList(key.clone()))?;

    let programs = publications
        .iter()
        .enumerate()
        .map(|(index, entry)| V3Publication::from_value(index, entry).map(V2Program::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(V2Envelope {
        service: key.clone(),
        programs,
    })
}

/// Parse a raw body and translate it.
///
/// Returns the parsed v3 value alongside the result so callers can dump it.
pub fn translate_bytes(
    body: &[u8],
    service: Option<&str>,
) -> Result<(Value, V2Envelope), TranslateError> {
    let value: Value = serde_json::from_slice(body).map_err(TranslateError::Parse)?;
    let envelope = translate(&value, service)?;
    Ok((value, envelope))
}
