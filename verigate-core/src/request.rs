//! Inbound request view used by verification methods.

use std::collections::HashMap;

/// The decoded form-encoded fields of an inbound request.
///
/// Host applications build this from whatever their web framework extracted;
/// verification methods only ever look at field names and values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormRequest {
    fields: HashMap<String, String>,
}

impl FormRequest {
    /// Create an empty request (no form fields).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a request from already-decoded form fields.
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    /// Builder-style helper to add a single field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Whether the field is present, regardless of its value.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Value of a field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl From<HashMap<String, String>> for FormRequest {
    fn from(fields: HashMap<String, String>) -> Self {
        Self::from_fields(fields)
    }
}
