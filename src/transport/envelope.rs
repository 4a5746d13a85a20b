//! Response envelope decoding
//!
//! The backend wraps every response as `{"code": 0, "msg": "...", "data": ...}`.
//! A paginated `data` carries `items` plus page metadata such as
//! `next_page`; an unpaginated one is the item array itself.

use super::types::PageResponse;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Where to find things in a response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Field holding the application status code (empty = no code check)
    pub code_field: String,
    /// Codes that mean success
    pub success_codes: Vec<i64>,
    /// Field holding the human-readable message
    pub message_field: String,
    /// Dot path to the payload (empty = the whole body)
    pub data_field: String,
    /// Dot path, relative to the payload, to the item array
    pub items_field: String,
    /// Dot path, relative to the payload, to the continuation marker
    pub has_next_field: Option<String>,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            code_field: "code".to_string(),
            success_codes: vec![0],
            message_field: "msg".to_string(),
            data_field: "data".to_string(),
            items_field: "items".to_string(),
            has_next_field: Some("next_page".to_string()),
        }
    }
}

impl EnvelopeConfig {
    /// An envelope-less layout: the body is the payload
    pub fn bare() -> Self {
        Self {
            code_field: String::new(),
            success_codes: Vec::new(),
            message_field: String::new(),
            data_field: String::new(),
            items_field: "items".to_string(),
            has_next_field: None,
        }
    }

    /// Check that the layout is usable
    pub fn validate(&self) -> Result<()> {
        if !self.code_field.is_empty() && self.success_codes.is_empty() {
            return Err(Error::invalid_value(
                "envelope.success_codes",
                "at least one success code is required when code_field is set",
            ));
        }
        if self.items_field.is_empty() {
            return Err(Error::invalid_value(
                "envelope.items_field",
                "cannot be empty",
            ));
        }
        Ok(())
    }
}

/// Normalizes response bodies into [`PageResponse`]s
#[derive(Debug, Clone, Default)]
pub struct EnvelopeDecoder {
    config: EnvelopeConfig,
}

impl EnvelopeDecoder {
    /// Create a decoder for the given layout
    pub fn new(config: EnvelopeConfig) -> Self {
        Self { config }
    }

    /// The layout this decoder reads
    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// Decode a response body
    pub fn decode(&self, body: &str) -> Result<PageResponse> {
        let raw: JsonValue = serde_json::from_str(body)
            .map_err(|e| Error::decode(format!("Failed to parse JSON: {e}")))?;
        self.decode_value(raw)
    }

    /// Decode an already-parsed response body
    pub fn decode_value(&self, raw: JsonValue) -> Result<PageResponse> {
        self.check_code(&raw)?;

        let payload = if self.config.data_field.is_empty() {
            &raw
        } else {
            // Some endpoints answer without an envelope at all
            lookup(&raw, &self.config.data_field).unwrap_or(&raw)
        };

        let (items, has_next) = match payload {
            JsonValue::Array(items) => (items.clone(), None),
            JsonValue::Object(_) => {
                let items = match lookup(payload, &self.config.items_field) {
                    Some(JsonValue::Array(items)) => items.clone(),
                    Some(other) => {
                        return Err(Error::decode(format!(
                            "'{}' is {}, expected an array",
                            self.config.items_field,
                            type_name(other)
                        )))
                    }
                    None => {
                        return Err(Error::decode(format!(
                            "Response has no '{}' array",
                            self.config.items_field
                        )))
                    }
                };
                let has_next = self
                    .config
                    .has_next_field
                    .as_deref()
                    .and_then(|path| lookup(payload, path))
                    .map(|marker| !marker.is_null() && marker != &JsonValue::Bool(false));
                (items, has_next)
            }
            other => {
                return Err(Error::decode(format!(
                    "Response payload is {}, expected an object or array",
                    type_name(other)
                )))
            }
        };

        Ok(PageResponse {
            items,
            has_next,
            raw,
        })
    }

    fn check_code(&self, raw: &JsonValue) -> Result<()> {
        if self.config.code_field.is_empty() {
            return Ok(());
        }
        let Some(code) = raw.get(&self.config.code_field) else {
            return Ok(());
        };
        let code = match code {
            JsonValue::Number(n) => n.as_i64(),
            JsonValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| Error::decode(format!("Unreadable status code: {code}")))?;

        if self.config.success_codes.contains(&code) {
            return Ok(());
        }

        let message = raw
            .get(&self.config.message_field)
            .map(|m| match m {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        Err(Error::api(code, message))
    }
}

/// Follow a dot-separated path through nested objects
fn lookup<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    path.split('.')
        .filter(|part| !part.is_empty())
        .try_fold(value, |current, part| current.as_object()?.get(part))
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
