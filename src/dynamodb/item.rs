use aws_sdk_dynamodb::types::AttributeValue;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;

/// Raw attribute mapping as the store sees it.
pub type Attributes = HashMap<String, AttributeValue>;

/// A DynamoDB item: an unordered mapping from attribute name to value.
///
/// No fixed shape is enforced here; shape enforcement is delegated to a
/// [`SchemaValidator`](crate::dynamodb::SchemaValidator) per call. The
/// builder setters cover the common scalar types, and [`Item::from_typed`] /
/// [`Item::to_typed`] convert to and from `serde` structs via `serde_dynamo`.
///
/// # Example
///
/// ```
/// use dynamo_helpers::dynamodb::Item;
///
/// let item = Item::new()
///     .set_string("user_id", "12345")
///     .set_string("username", "johndoe")
///     .set_number("age", 30.0);
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Item {
    attributes: Attributes,
}

impl Item {
    /// Creates a new empty `Item`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute to an arbitrary [`AttributeValue`].
    pub fn set(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Sets a string attribute.
    pub fn set_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, AttributeValue::S(value.into()))
    }

    /// Sets a number attribute.
    ///
    /// DynamoDB transports numbers as strings with high precision.
    pub fn set_number(self, key: impl Into<String>, value: impl Into<f64>) -> Self {
        self.set(key, AttributeValue::N(value.into().to_string()))
    }

    /// Sets a boolean attribute.
    pub fn set_bool(self, key: impl Into<String>, value: bool) -> Self {
        self.set(key, AttributeValue::Bool(value))
    }

    /// Returns the raw value of an attribute, if present.
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Gets the value of an attribute as a string.
    ///
    /// Returns `None` if the attribute doesn't exist or is not a string.
    pub fn get_string(&self, key: &str) -> Option<&String> {
        self.attributes.get(key).and_then(|av| av.as_s().ok())
    }

    /// Gets the value of an attribute as a number (f64).
    ///
    /// Returns `None` if the attribute doesn't exist, is not a number, or
    /// can't be parsed as f64.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.attributes
            .get(key)
            .and_then(|av| av.as_n().ok())
            .and_then(|n| n.parse().ok())
    }

    /// Returns `true` if the attribute is present.
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Returns `true` if the item has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of attributes on the item.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Iterates over the attributes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.attributes.iter()
    }

    /// Borrows the underlying attribute mapping.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Consumes the item, returning the underlying attribute mapping.
    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }

    /// Builds an item from any serializable value.
    pub fn from_typed<T: Serialize>(value: &T) -> Result<Self, serde_dynamo::Error> {
        let attributes = serde_dynamo::aws_sdk_dynamodb_1::to_item(value)?;
        Ok(Self { attributes })
    }

    /// Deserializes the item into a typed value.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, serde_dynamo::Error> {
        serde_dynamo::aws_sdk_dynamodb_1::from_item(self.attributes.clone())
    }
}

impl From<Attributes> for Item {
    fn from(attributes: Attributes) -> Self {
        Self { attributes }
    }
}

impl From<Item> for Attributes {
    fn from(item: Item) -> Self {
        item.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn scalar_accessors() {
        let item = Item::new()
            .set_string("key1", "value1")
            .set_number("key2", 42.0)
            .set_bool("key3", true);

        assert_eq!(item.get_string("key1"), Some(&"value1".to_string()));
        assert_eq!(item.get_number("key2"), Some(42.0));
        assert_eq!(item.get("key3"), Some(&AttributeValue::Bool(true)));
        assert_eq!(item.get_string("non_existent"), None);
        assert_eq!(item.get_number("non_existent"), None);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Product {
        category: String,
        product_name: String,
        price: f64,
    }

    #[test]
    fn typed_conversion() {
        let product = Product {
            category: "Electronics".to_string(),
            product_name: "Smartphone".to_string(),
            price: 599.99,
        };

        let item = Item::from_typed(&product).unwrap();
        assert_eq!(item.get_string("category"), Some(&"Electronics".to_string()));
        assert_eq!(item.get_number("price"), Some(599.99));

        let back: Product = item.to_typed().unwrap();
        assert_eq!(back, product);
    }
}
