use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::dynamodb::Item;

/// Structured validation failure: which attribute was rejected and why.
///
/// Carried as the cause of
/// [`DynamoError::SchemaMismatch`](crate::DynamoError::SchemaMismatch).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("attribute `{attribute}`: {reason}")]
pub struct SchemaViolation {
    pub attribute: String,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}

/// Pluggable item-shape validator.
///
/// Table operations never inspect attribute values themselves; they hand the
/// candidate item to the caller-supplied validator and propagate its verdict.
/// `validate` checks the complete item shape (used by `create`, `get`, and
/// query results); `validate_partial` checks only the attributes that are
/// present (used for update patches and key mappings).
pub trait SchemaValidator {
    /// Validates a complete item, returning the validated item.
    fn validate(&self, item: &Item) -> Result<Item, SchemaViolation>;

    /// Validates a subset of an item's attributes, ignoring absent ones.
    fn validate_partial(&self, item: &Item) -> Result<Item, SchemaViolation>;
}

/// The type of a declared schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A UTF-8 string attribute.
    String,
    /// A numeric attribute (transported as a string by the store).
    Number,
    /// A boolean attribute.
    Boolean,
    /// A list attribute.
    List,
    /// A nested map attribute.
    Map,
}

impl FieldType {
    fn matches(self, value: &AttributeValue) -> bool {
        match self {
            FieldType::String => value.is_s(),
            FieldType::Number => value.is_n(),
            FieldType::Boolean => value.is_bool(),
            FieldType::List => value.is_l(),
            FieldType::Map => value.is_m(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Field {
    ty: FieldType,
    required: bool,
}

/// Field-name to field-type schema.
///
/// DynamoDB itself is schemaless; this validator enforces the shape an
/// application expects: required fields must be present, every present
/// attribute must be declared and type-match, and undeclared attributes are
/// rejected.
///
/// # Example
///
/// ```
/// use dynamo_helpers::dynamodb::{FieldType, Schema};
///
/// let schema = Schema::new()
///     .field("user_id", FieldType::String)
///     .field("age", FieldType::Number)
///     .optional("nickname", FieldType::String);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: BTreeMap<String, Field>,
}

impl Schema {
    /// Creates a new empty `Schema`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a required field.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.insert(name.into(), Field { ty, required: true });
        self
    }

    /// Declares an optional field.
    pub fn optional(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.insert(
            name.into(),
            Field {
                ty,
                required: false,
            },
        );
        self
    }

    fn check_present(&self, item: &Item) -> Result<(), SchemaViolation> {
        for (name, value) in item.iter() {
            let Some(field) = self.fields.get(name) else {
                return Err(SchemaViolation::new(name, "attribute is not declared"));
            };
            if !field.ty.matches(value) {
                return Err(SchemaViolation::new(
                    name,
                    format!("expected {:?} value", field.ty),
                ));
            }
        }
        Ok(())
    }
}

impl SchemaValidator for Schema {
    fn validate(&self, item: &Item) -> Result<Item, SchemaViolation> {
        for (name, field) in &self.fields {
            if field.required && !item.contains(name) {
                return Err(SchemaViolation::new(name, "required attribute is missing"));
            }
        }
        self.check_present(item)?;
        Ok(item.clone())
    }

    fn validate_partial(&self, item: &Item) -> Result<Item, SchemaViolation> {
        self.check_present(item)?;
        Ok(item.clone())
    }
}
