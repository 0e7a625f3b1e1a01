//! Table descriptors and the bound table facade.
//!
//! A [`TableDescriptor`] is the static definition of a table: its name, its
//! primary key, and any named secondary indexes. It is constructed once at
//! startup and shared read-only by every operation. [`Table`] binds a
//! descriptor to a [`StoreClient`] and exposes the CRUD, query, and batch
//! operations with client and table arguments curried away.

use std::collections::BTreeMap;
use tracing::debug;

use crate::dynamodb::batch::{self, BatchItem};
use crate::dynamodb::client::{QueryRequest, StoreClient, UpdateRequest};
use crate::dynamodb::expression::{
    build_prefix_query_expression, build_query_expression, build_update_expression, Patch,
    QueryExpression,
};
use crate::dynamodb::schema::SchemaValidator;
use crate::dynamodb::{Attributes, Item};
use crate::error::DynamoError;

/// Opaque pagination token: the last evaluated key of a previous page,
/// echoed back verbatim to continue a query.
pub type Cursor = Attributes;

/// A partition attribute plus an optional sort attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKey {
    partition: String,
    sort: Option<String>,
}

impl PrimaryKey {
    /// Creates a partition-only primary key.
    pub fn new(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: None,
        }
    }

    /// Adds a sort attribute.
    ///
    /// # Panics
    ///
    /// Panics if the sort attribute equals the partition attribute.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        let sort = sort.into();
        assert_ne!(
            sort, self.partition,
            "sort attribute must differ from partition attribute"
        );
        self.sort = Some(sort);
        self
    }

    /// The partition attribute name.
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// The sort attribute name, if declared.
    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    /// Partition attribute followed by the sort attribute, if declared.
    pub(crate) fn attributes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.partition()).chain(self.sort())
    }
}

/// Static definition of a table: name, primary key, and named secondary
/// indexes. Immutable once constructed.
///
/// # Example
///
/// ```
/// use dynamo_helpers::dynamodb::{PrimaryKey, TableDescriptor};
///
/// let descriptor = TableDescriptor::new(
///     "products",
///     PrimaryKey::new("category").with_sort("product_name"),
/// )
/// .with_index("by-brand", PrimaryKey::new("brand").with_sort("price"));
/// ```
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    name: String,
    primary_key: PrimaryKey,
    secondary_indexes: BTreeMap<String, PrimaryKey>,
}

impl TableDescriptor {
    /// Creates a descriptor with no secondary indexes.
    pub fn new(name: impl Into<String>, primary_key: PrimaryKey) -> Self {
        Self {
            name: name.into(),
            primary_key,
            secondary_indexes: BTreeMap::new(),
        }
    }

    /// Declares a named secondary index.
    pub fn with_index(mut self, name: impl Into<String>, keys: PrimaryKey) -> Self {
        self.secondary_indexes.insert(name.into(), keys);
        self
    }

    /// The table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The table's primary key.
    pub fn primary_key(&self) -> &PrimaryKey {
        &self.primary_key
    }

    /// The declared secondary indexes.
    pub fn secondary_indexes(&self) -> &BTreeMap<String, PrimaryKey> {
        &self.secondary_indexes
    }

    /// Returns the effective key pair for a request: the primary key when
    /// `index_name` is `None`, otherwise the named secondary index.
    pub fn resolve_keys(&self, index_name: Option<&str>) -> Result<&PrimaryKey, DynamoError> {
        match index_name {
            None => Ok(&self.primary_key),
            Some(name) => self
                .secondary_indexes
                .get(name)
                .ok_or_else(|| DynamoError::IndexNotFound(name.to_string())),
        }
    }
}

/// Query scan direction, mapped to the store's scan-index-forward flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Optional query parameters.
///
/// The expression overrides replace the generated clause entirely (no
/// merging); supply `expression_attribute_names` / `values` alongside a
/// custom condition when it references placeholders the generic builder
/// would not emit.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Query a named secondary index instead of the primary key.
    pub index_name: Option<String>,
    /// Replaces the generated key condition.
    pub key_condition_expression: Option<String>,
    /// Replaces the generated filter expression.
    pub filter_expression: Option<String>,
    /// Replaces the generated name placeholder map.
    pub expression_attribute_names: Option<std::collections::HashMap<String, String>>,
    /// Replaces the generated value placeholder map.
    pub expression_attribute_values: Option<Attributes>,
    pub order: Option<Order>,
    pub limit: Option<i32>,
    /// Continuation token from a previous page, passed through unmodified.
    pub cursor: Option<Cursor>,
}

/// Optional update parameters.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Replaces the generated `SET`/`REMOVE` expression.
    pub update_expression: Option<String>,
}

/// One page of validated query results.
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub items: Vec<Item>,
    /// Present when the store reports more pages; feed back through
    /// [`QueryOptions::cursor`] to continue.
    pub cursor: Option<Cursor>,
}

/// A table descriptor bound to a store client.
#[derive(Debug)]
pub struct Table<C> {
    client: C,
    descriptor: TableDescriptor,
}

impl<C: StoreClient> Table<C> {
    pub fn new(client: C, descriptor: TableDescriptor) -> Self {
        Self { client, descriptor }
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    fn require_primary_key(&self, key: &Item, operation: &str) -> Result<(), DynamoError> {
        for attribute in self.descriptor.primary_key().attributes() {
            if !key.contains(attribute) {
                return Err(DynamoError::missing_key(attribute, operation));
            }
        }
        Ok(())
    }

    /// Fetches a single item by primary key.
    ///
    /// Fails with `MissingKey` before any network call if the partition or
    /// declared sort attribute is absent from `key`. Returns `None` when the
    /// store reports no item; otherwise the response is validated against
    /// `schema`.
    pub async fn get<S: SchemaValidator>(
        &self,
        schema: &S,
        key: Item,
    ) -> Result<Option<Item>, DynamoError> {
        self.require_primary_key(&key, "get")?;
        let response = self
            .client
            .get_item(self.descriptor.name(), key.into_attributes())
            .await?;
        let Some(attributes) = response else {
            return Ok(None);
        };
        let validated = schema
            .validate(&Item::from(attributes))
            .map_err(|source| DynamoError::schema_mismatch("get result", source))?;
        Ok(Some(validated))
    }

    /// Queries the table (or a named secondary index) by attribute
    /// equality.
    ///
    /// The key condition is generated from the partition (and, when
    /// supplied, sort) attribute; every other supplied attribute becomes a
    /// post-key filter clause. Response items are validated individually.
    pub async fn query<S: SchemaValidator>(
        &self,
        schema: &S,
        attributes: Item,
        options: QueryOptions,
    ) -> Result<QueryOutput, DynamoError> {
        let keys = self.descriptor.resolve_keys(options.index_name.as_deref())?;
        let expression = build_query_expression(keys, &attributes)?;
        self.dispatch_query(schema, expression, options).await
    }

    /// Like [`Table::query`], but matches sort-key values by prefix
    /// (`begins_with`) instead of equality.
    pub async fn query_by_prefix<S: SchemaValidator>(
        &self,
        schema: &S,
        attributes: Item,
        options: QueryOptions,
    ) -> Result<QueryOutput, DynamoError> {
        let keys = self.descriptor.resolve_keys(options.index_name.as_deref())?;
        let expression = build_prefix_query_expression(keys, &attributes)?;
        self.dispatch_query(schema, expression, options).await
    }

    async fn dispatch_query<S: SchemaValidator>(
        &self,
        schema: &S,
        expression: QueryExpression,
        options: QueryOptions,
    ) -> Result<QueryOutput, DynamoError> {
        let request = QueryRequest {
            table_name: self.descriptor.name().to_string(),
            index_name: options.index_name,
            names: options
                .expression_attribute_names
                .unwrap_or(expression.names),
            values: options
                .expression_attribute_values
                .unwrap_or(expression.values),
            key_condition_expression: options
                .key_condition_expression
                .unwrap_or(expression.key_condition),
            filter_expression: options.filter_expression.or(expression.filter),
            scan_forward: options.order.map(|order| order == Order::Ascending),
            limit: options.limit,
            exclusive_start_key: options.cursor,
        };

        let response = self.client.query(request).await?;
        debug!(
            "Query on '{}' returned {} items",
            self.descriptor.name(),
            response.items.len()
        );

        let items = response
            .items
            .into_iter()
            .map(|attributes| {
                schema
                    .validate(&Item::from(attributes))
                    .map_err(|source| DynamoError::schema_mismatch("query result", source))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryOutput {
            items,
            cursor: response.last_evaluated_key,
        })
    }

    /// Validates `item` against `schema` and writes it unconditionally,
    /// returning the validated item.
    pub async fn create<S: SchemaValidator>(
        &self,
        schema: &S,
        item: Item,
    ) -> Result<Item, DynamoError> {
        let validated = schema
            .validate(&item)
            .map_err(|source| DynamoError::schema_mismatch("item", source))?;
        self.client
            .put_item(self.descriptor.name(), validated.clone().into_attributes())
            .await?;
        Ok(validated)
    }

    /// Applies a patch to a single item.
    ///
    /// The patch must carry the partition (and declared sort) attribute as
    /// assignments; they identify the item and never enter the update
    /// expression. Key attributes and the remaining assignments are
    /// validated separately as partial shapes. Returns the validated
    /// non-key assignments.
    pub async fn update<S: SchemaValidator>(
        &self,
        schema: &S,
        patch: Patch,
        options: UpdateOptions,
    ) -> Result<Item, DynamoError> {
        let keys = self.descriptor.primary_key();

        let mut key_item = Item::new();
        for attribute in keys.attributes() {
            match patch.get(attribute) {
                Some(Some(value)) => {
                    key_item = key_item.set(attribute, value.clone());
                }
                _ => return Err(DynamoError::missing_key(attribute, "update")),
            }
        }
        let key = schema
            .validate_partial(&key_item)
            .map_err(|source| DynamoError::schema_mismatch("key", source))?;

        let mut assignments = Item::new();
        let mut changes = Patch::new();
        for (attribute, entry) in patch.iter() {
            if keys.attributes().any(|key_attribute| key_attribute == attribute.as_str()) {
                continue;
            }
            match entry {
                Some(value) => {
                    assignments = assignments.set(attribute.clone(), value.clone());
                    changes = changes.set(attribute.clone(), value.clone());
                }
                None => changes = changes.unset(attribute.clone()),
            }
        }
        let validated = schema
            .validate_partial(&assignments)
            .map_err(|source| DynamoError::schema_mismatch("update attributes", source))?;

        let expression = build_update_expression(&changes)?;
        let request = UpdateRequest {
            table_name: self.descriptor.name().to_string(),
            key: key.into_attributes(),
            update_expression: options
                .update_expression
                .unwrap_or(expression.expression),
            names: expression.names,
            values: expression.values,
        };
        self.client.update_item(request).await?;
        Ok(validated)
    }

    /// Deletes a single item by primary key, enforcing the same
    /// key-presence rule as [`Table::get`].
    pub async fn remove(&self, key: Item) -> Result<(), DynamoError> {
        self.require_primary_key(&key, "remove")?;
        self.client
            .delete_item(self.descriptor.name(), key.into_attributes())
            .await
    }

    /// Validates and dispatches a heterogeneous list of put/delete
    /// requests in chunks of at most 25. See the `batch` module docs for
    /// the chunking and partial-failure semantics.
    pub async fn batch_write<S: SchemaValidator>(
        &self,
        schema: &S,
        requests: Vec<BatchItem>,
    ) -> Result<(), DynamoError> {
        batch::batch_write(&self.client, &self.descriptor, schema, requests).await
    }
}
