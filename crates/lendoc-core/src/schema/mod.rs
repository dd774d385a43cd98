//! Declarative extraction schemas.
//!
//! A [`DocumentSchema`] lists the fields the model must return for one
//! document type. The same description drives both the prompt sent to the
//! model and the shape of the normalized output, so the two cannot drift.

pub mod catalog;
mod prompt;

pub use catalog::BUILTIN_SCHEMAS;
pub use prompt::render_prompt;

use serde_json::{Map, Value};

/// Semantic kind of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text. Defaults to `""`.
    Text,
    /// Identifier or code string (account numbers, IFSC, KYC ids). Defaults to `""`.
    Code,
    /// Presence flag such as a signature check. Defaults to `false`.
    Flag,
    /// Named section of nested fields. Defaults to an object of nested defaults.
    Group(&'static [FieldSpec]),
}

/// One field the model is asked to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// JSON key, exactly as the model must emit it.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Extraction hint rendered into the prompt.
    pub hint: &'static str,
}

impl FieldSpec {
    pub const fn text(name: &'static str, hint: &'static str) -> Self {
        Self { name, kind: FieldKind::Text, hint }
    }

    pub const fn code(name: &'static str, hint: &'static str) -> Self {
        Self { name, kind: FieldKind::Code, hint }
    }

    pub const fn flag(name: &'static str, hint: &'static str) -> Self {
        Self { name, kind: FieldKind::Flag, hint }
    }

    pub const fn group(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, kind: FieldKind::Group(fields), hint: "" }
    }

    /// Value used when the model did not return this field.
    pub fn default_value(&self) -> Value {
        match self.kind {
            FieldKind::Text | FieldKind::Code => Value::String(String::new()),
            FieldKind::Flag => Value::Bool(false),
            FieldKind::Group(fields) => Value::Object(defaults(fields)),
        }
    }

    /// Read this field from a structured model reply, substituting defaults.
    ///
    /// Scalar values pass through untouched, whatever their JSON type.
    pub fn resolve(&self, source: Option<&Map<String, Value>>) -> Value {
        let found = source.and_then(|s| s.get(self.name));
        match (self.kind, found) {
            (FieldKind::Group(fields), Some(Value::Object(inner))) => {
                Value::Object(resolve_all(fields, Some(inner)))
            }
            (FieldKind::Group(_), _) => self.default_value(),
            (_, Some(value)) => value.clone(),
            (_, None) => self.default_value(),
        }
    }
}

/// Every field of `fields` at its default, in order.
pub fn defaults(fields: &[FieldSpec]) -> Map<String, Value> {
    resolve_all(fields, None)
}

/// Every field of `fields` read from `source`, in order.
pub fn resolve_all(fields: &[FieldSpec], source: Option<&Map<String, Value>>) -> Map<String, Value> {
    fields
        .iter()
        .map(|field| (field.name.to_string(), field.resolve(source)))
        .collect()
}

/// Extraction schema for one document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentSchema {
    /// Canonical registry key (lower-case, underscores).
    pub key: &'static str,
    /// Human-readable name used in the prompt.
    pub label: &'static str,
    /// Fields in output order.
    pub fields: &'static [FieldSpec],
    /// Type-specific instructions appended to the prompt.
    pub guidance: &'static [&'static str],
}

impl DocumentSchema {
    /// Top-level field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
        self.fields.iter().map(|f| f.name)
    }
}
