//! Generators for DynamoDB key-condition, filter, and update expressions.
//!
//! Every attribute referenced in a generated expression goes through a
//! `#name` / `:value` placeholder pair keyed by the literal attribute name,
//! so generated expressions never collide with DynamoDB reserved words.
//! Builders are pure: they inspect the supplied attributes and return the
//! expression strings plus their placeholder maps, with no I/O.

use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::{BTreeMap, HashMap};

use crate::dynamodb::table::PrimaryKey;
use crate::dynamodb::{Attributes, Item};
use crate::error::DynamoError;

/// A generated query expression: placeholder maps, the key condition, and
/// an optional post-key filter. Recomputed per call, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExpression {
    pub names: HashMap<String, String>,
    pub values: Attributes,
    pub key_condition: String,
    pub filter: Option<String>,
}

/// A generated update expression (`SET ... REMOVE ...`) with its
/// placeholder maps. `values` is empty for a remove-only expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: Attributes,
}

/// Attribute changes for an update: `set` entries become a `SET` clause,
/// `unset` entries a `REMOVE` clause. Entries are kept in attribute-name
/// order so generated expressions are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    entries: BTreeMap<String, Option<AttributeValue>>,
}

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a new value to an attribute.
    pub fn set(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.entries.insert(key.into(), Some(value));
        self
    }

    /// Assigns a string value to an attribute.
    pub fn set_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, AttributeValue::S(value.into()))
    }

    /// Assigns a number value to an attribute.
    pub fn set_number(self, key: impl Into<String>, value: impl Into<f64>) -> Self {
        self.set(key, AttributeValue::N(value.into().to_string()))
    }

    /// Marks an attribute for removal.
    pub fn unset(mut self, key: impl Into<String>) -> Self {
        self.entries.insert(key.into(), None);
        self
    }

    /// Returns the entry for an attribute: `Some(Some(_))` for a pending
    /// assignment, `Some(None)` for a pending removal.
    pub fn get(&self, key: &str) -> Option<&Option<AttributeValue>> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in attribute-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Option<AttributeValue>)> {
        self.entries.iter()
    }
}

fn name_placeholder(attribute: &str) -> String {
    format!("#{attribute}")
}

fn value_placeholder(attribute: &str) -> String {
    format!(":{attribute}")
}

/// Builds the key-condition and filter expressions for a query.
///
/// The partition attribute is mandatory (`MissingKey` otherwise) and always
/// yields `#pk = :pk`. A declared sort attribute is appended as an equality
/// clause only when a value for it is supplied; a declared-but-unsupplied
/// sort attribute leaves the key condition partition-only. Every remaining
/// attribute becomes an `AND`-joined clause in the filter expression, which
/// the store evaluates as a post-filter after the key condition has
/// narrowed the partition.
pub fn build_query_expression(
    keys: &PrimaryKey,
    attributes: &Item,
) -> Result<QueryExpression, DynamoError> {
    let partition = keys.partition();
    let Some(partition_value) = attributes.get(partition) else {
        return Err(DynamoError::missing_key(partition, "query"));
    };

    let mut names = HashMap::new();
    let mut values = Attributes::new();
    names.insert(name_placeholder(partition), partition.to_string());
    values.insert(value_placeholder(partition), partition_value.clone());

    let mut key_condition = format!("#{partition} = :{partition}");
    if let Some(sort) = keys.sort() {
        if let Some(sort_value) = attributes.get(sort) {
            names.insert(name_placeholder(sort), sort.to_string());
            values.insert(value_placeholder(sort), sort_value.clone());
            key_condition.push_str(&format!(" AND #{sort} = :{sort}"));
        }
    }

    let mut remaining: Vec<_> = attributes
        .iter()
        .filter(|(attr, _)| attr.as_str() != partition && Some(attr.as_str()) != keys.sort())
        .collect();
    remaining.sort_by(|a, b| a.0.cmp(b.0));

    let mut clauses = Vec::with_capacity(remaining.len());
    for (attr, value) in remaining {
        names.insert(name_placeholder(attr), attr.clone());
        values.insert(value_placeholder(attr), value.clone());
        clauses.push(format!("#{attr} = :{attr}"));
    }
    let filter = if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" AND "))
    };

    Ok(QueryExpression {
        names,
        values,
        key_condition,
        filter,
    })
}

/// Prefix variant of [`build_query_expression`].
///
/// Requires the index to declare a sort attribute and the caller to supply
/// a value for it (the prefix); the sort condition becomes
/// `begins_with(#sk, :sk)` instead of equality.
pub fn build_prefix_query_expression(
    keys: &PrimaryKey,
    attributes: &Item,
) -> Result<QueryExpression, DynamoError> {
    let Some(sort) = keys.sort() else {
        return Err(DynamoError::PrefixRequiresSortKey);
    };
    if !attributes.contains(sort) {
        return Err(DynamoError::missing_key(sort, "prefix query"));
    }

    let partition = keys.partition();
    let mut expression = build_query_expression(keys, attributes)?;
    expression.key_condition =
        format!("#{partition} = :{partition} AND begins_with(#{sort}, :{sort})");
    Ok(expression)
}

/// Builds a `SET ... REMOVE ...` update expression from a patch.
///
/// Assignments land in the `SET` clause, removals in the `REMOVE` clause;
/// either half is omitted when empty. Fails with `NoAttributes` on an
/// empty patch.
pub fn build_update_expression(patch: &Patch) -> Result<UpdateExpression, DynamoError> {
    if patch.is_empty() {
        return Err(DynamoError::NoAttributes);
    }

    let mut set_clause = String::new();
    let mut remove_clause = String::new();
    let mut names = HashMap::new();
    let mut values = Attributes::new();

    for (attr, entry) in patch.iter() {
        names.insert(name_placeholder(attr), attr.clone());
        match entry {
            Some(value) => {
                let lead = if set_clause.is_empty() { "SET" } else { "," };
                set_clause.push_str(&format!("{lead} #{attr} = :{attr}"));
                values.insert(value_placeholder(attr), value.clone());
            }
            None => {
                let lead = if remove_clause.is_empty() { "REMOVE" } else { "," };
                remove_clause.push_str(&format!("{lead} #{attr}"));
            }
        }
    }

    let expression = format!("{set_clause} {remove_clause}").trim().to_string();
    Ok(UpdateExpression {
        expression,
        names,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_only_key_yields_single_clause() {
        let keys = PrimaryKey::new("category");
        let attributes = Item::new().set_string("category", "Electronics");

        let expression = build_query_expression(&keys, &attributes).unwrap();
        assert_eq!(expression.key_condition, "#category = :category");
        assert_eq!(expression.filter, None);
        assert_eq!(expression.names.len(), 1);
        assert_eq!(
            expression.names.get("#category"),
            Some(&"category".to_string())
        );
        assert_eq!(
            expression.values.get(":category"),
            Some(&AttributeValue::S("Electronics".to_string()))
        );
    }

    #[test]
    fn missing_partition_value_fails() {
        let keys = PrimaryKey::new("category");
        let attributes = Item::new().set_string("product_name", "Smartphone");

        let err = build_query_expression(&keys, &attributes).unwrap_err();
        assert!(matches!(err, DynamoError::MissingKey { attribute, .. } if attribute == "category"));
    }

    #[test]
    fn sort_value_joins_key_condition() {
        let keys = PrimaryKey::new("category").with_sort("product_name");
        let attributes = Item::new()
            .set_string("category", "Electronics")
            .set_string("product_name", "Smartphone");

        let expression = build_query_expression(&keys, &attributes).unwrap();
        assert_eq!(
            expression.key_condition,
            "#category = :category AND #product_name = :product_name"
        );
        assert_eq!(expression.filter, None);
    }

    #[test]
    fn declared_but_unsupplied_sort_stays_partition_only() {
        let keys = PrimaryKey::new("category").with_sort("product_name");
        let attributes = Item::new().set_string("category", "Electronics");

        let expression = build_query_expression(&keys, &attributes).unwrap();
        assert_eq!(expression.key_condition, "#category = :category");
    }

    #[test]
    fn extra_attributes_become_filter() {
        let keys = PrimaryKey::new("category").with_sort("product_name");
        let attributes = Item::new()
            .set_string("category", "Electronics")
            .set_string("product_name", "Smartphone")
            .set_number("price", 599.99)
            .set_bool("in_stock", true);

        let expression = build_query_expression(&keys, &attributes).unwrap();
        assert_eq!(
            expression.filter.as_deref(),
            Some("#in_stock = :in_stock AND #price = :price")
        );
        assert_eq!(expression.names.len(), 4);
        assert_eq!(expression.values.len(), 4);
    }

    #[test]
    fn prefix_requires_declared_sort_key() {
        let keys = PrimaryKey::new("category");
        let attributes = Item::new().set_string("category", "Electronics");

        let err = build_prefix_query_expression(&keys, &attributes).unwrap_err();
        assert!(matches!(err, DynamoError::PrefixRequiresSortKey));
    }

    #[test]
    fn prefix_requires_sort_value() {
        let keys = PrimaryKey::new("category").with_sort("product_name");
        let attributes = Item::new().set_string("category", "Electronics");

        let err = build_prefix_query_expression(&keys, &attributes).unwrap_err();
        assert!(matches!(
            err,
            DynamoError::MissingKey { attribute, .. } if attribute == "product_name"
        ));
    }

    #[test]
    fn prefix_condition_uses_begins_with() {
        let keys = PrimaryKey::new("category").with_sort("product_name");
        let attributes = Item::new()
            .set_string("category", "Electronics")
            .set_string("product_name", "Smart");

        let expression = build_prefix_query_expression(&keys, &attributes).unwrap();
        assert_eq!(
            expression.key_condition,
            "#category = :category AND begins_with(#product_name, :product_name)"
        );
        assert_eq!(
            expression.values.get(":product_name"),
            Some(&AttributeValue::S("Smart".to_string()))
        );
    }

    #[test]
    fn update_routes_set_and_remove() {
        let patch = Patch::new().set_number("price", 649.99).unset("discount");

        let update = build_update_expression(&patch).unwrap();
        assert_eq!(update.expression, "SET #price = :price REMOVE #discount");
        assert_eq!(update.names.len(), 2);
        assert_eq!(
            update.values.get(":price"),
            Some(&AttributeValue::N("649.99".to_string()))
        );
        assert!(!update.values.contains_key(":discount"));
    }

    #[test]
    fn update_set_only() {
        let patch = Patch::new()
            .set_string("name", "Widget")
            .set_number("price", 10.0);

        let update = build_update_expression(&patch).unwrap();
        assert_eq!(update.expression, "SET #name = :name, #price = :price");
    }

    #[test]
    fn update_remove_only_has_no_values() {
        let patch = Patch::new().unset("a").unset("b");

        let update = build_update_expression(&patch).unwrap();
        assert_eq!(update.expression, "REMOVE #a, #b");
        assert!(update.values.is_empty());
    }

    #[test]
    fn empty_patch_fails() {
        let err = build_update_expression(&Patch::new()).unwrap_err();
        assert!(matches!(err, DynamoError::NoAttributes));
    }
}
