use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, DeleteRequest, GlobalSecondaryIndex, KeySchemaElement,
    KeyType, Projection, ProjectionType, PutRequest, ScalarAttributeType,
    WriteRequest as SdkWriteRequest,
};
use aws_sdk_dynamodb::Client;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, error, info, warn};

use crate::dynamodb::table::{PrimaryKey, TableDescriptor};
use crate::dynamodb::Attributes;
use crate::error::DynamoError;

/// Assembled wire fields for a query call.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub table_name: String,
    pub index_name: Option<String>,
    pub names: HashMap<String, String>,
    pub values: Attributes,
    pub key_condition_expression: String,
    pub filter_expression: Option<String>,
    /// Scan direction: `Some(true)` ascending, `Some(false)` descending,
    /// `None` for the store default.
    pub scan_forward: Option<bool>,
    pub limit: Option<i32>,
    pub exclusive_start_key: Option<Attributes>,
}

/// One page of query results plus the continuation token, if any.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    pub items: Vec<Attributes>,
    pub last_evaluated_key: Option<Attributes>,
}

/// Assembled wire fields for an update call.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub table_name: String,
    pub key: Attributes,
    pub update_expression: String,
    pub names: HashMap<String, String>,
    pub values: Attributes,
}

/// A single write inside a batch call, already validated and reduced to
/// wire shape.
#[derive(Debug, Clone)]
pub enum WriteRequest {
    Put { item: Attributes },
    Delete { key: Attributes },
}

/// The seam between table operations and the underlying store.
///
/// All validation and expression building happens before these methods are
/// reached; implementations only move assembled requests over the wire.
/// Errors surface as [`DynamoError::Transport`] wrapping the underlying
/// cause. The mock client used by the facade tests implements this trait
/// in-memory.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn get_item(&self, table_name: &str, key: Attributes)
        -> Result<Option<Attributes>, DynamoError>;

    async fn put_item(&self, table_name: &str, item: Attributes) -> Result<(), DynamoError>;

    async fn update_item(&self, request: UpdateRequest) -> Result<(), DynamoError>;

    async fn delete_item(&self, table_name: &str, key: Attributes) -> Result<(), DynamoError>;

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, DynamoError>;

    /// Dispatches one batch-write chunk. Callers are responsible for the
    /// 25-item chunk limit.
    async fn batch_write(
        &self,
        table_name: &str,
        writes: Vec<WriteRequest>,
    ) -> Result<(), DynamoError>;
}

#[async_trait]
impl<T: StoreClient + ?Sized> StoreClient for std::sync::Arc<T> {
    async fn get_item(
        &self,
        table_name: &str,
        key: Attributes,
    ) -> Result<Option<Attributes>, DynamoError> {
        (**self).get_item(table_name, key).await
    }

    async fn put_item(&self, table_name: &str, item: Attributes) -> Result<(), DynamoError> {
        (**self).put_item(table_name, item).await
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<(), DynamoError> {
        (**self).update_item(request).await
    }

    async fn delete_item(&self, table_name: &str, key: Attributes) -> Result<(), DynamoError> {
        (**self).delete_item(table_name, key).await
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, DynamoError> {
        (**self).query(request).await
    }

    async fn batch_write(
        &self,
        table_name: &str,
        writes: Vec<WriteRequest>,
    ) -> Result<(), DynamoError> {
        (**self).batch_write(table_name, writes).await
    }
}

/// DynamoDB-backed [`StoreClient`] plus table-administration helpers.
#[derive(Debug, Clone)]
pub struct DynamoDb {
    client: Client,
}

impl DynamoDb {
    /// Creates a new `DynamoDb` from a loaded SDK config.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Wraps an already-constructed SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Verifies authentication by attempting to list tables.
    pub async fn check_auth(&self) -> Result<(), DynamoError> {
        self.client.list_tables().send().await.map_err(|e| {
            error!("Authentication failed: {}", e);
            DynamoError::transport("list tables", e)
        })?;
        info!("Authentication successful");
        Ok(())
    }

    /// Checks if a table exists.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool, DynamoError> {
        let tables = self
            .client
            .list_tables()
            .send()
            .await
            .map_err(|e| DynamoError::transport("list tables", e))?;
        Ok(tables.table_names().contains(&table_name.to_string()))
    }

    /// Creates the table described by `descriptor` (string-typed keys,
    /// on-demand billing, one GSI per declared secondary index) unless it
    /// already exists. Returns `false` if the table was already there.
    pub async fn create_table_if_not_exists(
        &self,
        descriptor: &TableDescriptor,
    ) -> Result<bool, DynamoError> {
        if self.table_exists(descriptor.name()).await? {
            info!("Table '{}' exists", descriptor.name());
            return Ok(false);
        }

        // Every key attribute across primary key and indexes needs a
        // definition, each exactly once.
        let mut key_attributes = BTreeSet::new();
        key_attributes.insert(descriptor.primary_key().partition());
        key_attributes.extend(descriptor.primary_key().sort());
        for (_, keys) in descriptor.secondary_indexes() {
            key_attributes.insert(keys.partition());
            key_attributes.extend(keys.sort());
        }

        let mut attribute_definitions = Vec::with_capacity(key_attributes.len());
        for attribute in key_attributes {
            attribute_definitions.push(
                AttributeDefinition::builder()
                    .attribute_name(attribute)
                    .attribute_type(ScalarAttributeType::S)
                    .build()
                    .map_err(|e| DynamoError::transport("create table", e))?,
            );
        }

        let mut secondary_indexes = Vec::new();
        for (index_name, keys) in descriptor.secondary_indexes() {
            secondary_indexes.push(
                GlobalSecondaryIndex::builder()
                    .index_name(index_name.clone())
                    .set_key_schema(Some(
                        key_schema(keys).map_err(|e| DynamoError::transport("create table", e))?,
                    ))
                    .projection(
                        Projection::builder()
                            .projection_type(ProjectionType::All)
                            .build(),
                    )
                    .build()
                    .map_err(|e| DynamoError::transport("create table", e))?,
            );
        }

        self.client
            .create_table()
            .table_name(descriptor.name())
            .billing_mode(BillingMode::PayPerRequest)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(
                key_schema(descriptor.primary_key())
                    .map_err(|e| DynamoError::transport("create table", e))?,
            ))
            .set_global_secondary_indexes(if secondary_indexes.is_empty() {
                None
            } else {
                Some(secondary_indexes)
            })
            .send()
            .await
            .map_err(|e| DynamoError::transport("create table", e))?;

        info!("Table '{}' created", descriptor.name());
        Ok(true)
    }

    /// Deletes a table.
    pub async fn delete_table(&self, table_name: &str) -> Result<(), DynamoError> {
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| DynamoError::transport("delete table", e))?;
        info!("Table '{table_name}' deleted");
        Ok(())
    }
}

fn key_schema(
    keys: &PrimaryKey,
) -> Result<Vec<KeySchemaElement>, aws_sdk_dynamodb::error::BuildError> {
    let mut schema = vec![KeySchemaElement::builder()
        .attribute_name(keys.partition())
        .key_type(KeyType::Hash)
        .build()?];
    if let Some(sort) = keys.sort() {
        schema.push(
            KeySchemaElement::builder()
                .attribute_name(sort)
                .key_type(KeyType::Range)
                .build()?,
        );
    }
    Ok(schema)
}

fn non_empty<K, V>(map: HashMap<K, V>) -> Option<HashMap<K, V>> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

#[async_trait]
impl StoreClient for DynamoDb {
    async fn get_item(
        &self,
        table_name: &str,
        key: Attributes,
    ) -> Result<Option<Attributes>, DynamoError> {
        let response = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| DynamoError::transport("get", e))?;
        Ok(response.item)
    }

    async fn put_item(&self, table_name: &str, item: Attributes) -> Result<(), DynamoError> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| DynamoError::transport("put", e))?;
        debug!("Item added to '{table_name}'");
        Ok(())
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<(), DynamoError> {
        let table_name = request.table_name;
        self.client
            .update_item()
            .table_name(&table_name)
            .set_key(Some(request.key))
            .update_expression(request.update_expression)
            .set_expression_attribute_names(non_empty(request.names))
            .set_expression_attribute_values(non_empty(request.values))
            .send()
            .await
            .map_err(|e| DynamoError::transport("update", e))?;
        debug!("Item updated in '{table_name}'");
        Ok(())
    }

    async fn delete_item(&self, table_name: &str, key: Attributes) -> Result<(), DynamoError> {
        self.client
            .delete_item()
            .table_name(table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| DynamoError::transport("delete", e))?;
        debug!("Item deleted from '{table_name}'");
        Ok(())
    }

    async fn query(&self, request: QueryRequest) -> Result<QueryResponse, DynamoError> {
        let response = self
            .client
            .query()
            .table_name(request.table_name)
            .set_index_name(request.index_name)
            .set_expression_attribute_names(Some(request.names))
            .set_expression_attribute_values(Some(request.values))
            .key_condition_expression(request.key_condition_expression)
            .set_filter_expression(request.filter_expression)
            .set_scan_index_forward(request.scan_forward)
            .set_limit(request.limit)
            .set_exclusive_start_key(request.exclusive_start_key)
            .send()
            .await
            .map_err(|e| DynamoError::transport("query", e))?;

        Ok(QueryResponse {
            items: response.items.unwrap_or_default(),
            last_evaluated_key: response.last_evaluated_key,
        })
    }

    async fn batch_write(
        &self,
        table_name: &str,
        writes: Vec<WriteRequest>,
    ) -> Result<(), DynamoError> {
        let mut requests = Vec::with_capacity(writes.len());
        for write in writes {
            let request = match write {
                WriteRequest::Put { item } => SdkWriteRequest::builder()
                    .put_request(
                        PutRequest::builder()
                            .set_item(Some(item))
                            .build()
                            .map_err(|e| DynamoError::transport("batch write", e))?,
                    )
                    .build(),
                WriteRequest::Delete { key } => SdkWriteRequest::builder()
                    .delete_request(
                        DeleteRequest::builder()
                            .set_key(Some(key))
                            .build()
                            .map_err(|e| DynamoError::transport("batch write", e))?,
                    )
                    .build(),
            };
            requests.push(request);
        }

        let response = self
            .client
            .batch_write_item()
            .request_items(table_name, requests)
            .send()
            .await
            .map_err(|e| DynamoError::transport("batch write", e))?;

        if let Some(unprocessed) = response.unprocessed_items() {
            let count: usize = unprocessed.values().map(Vec::len).sum();
            if count > 0 {
                warn!("Batch write to '{table_name}' left {count} unprocessed items");
            }
        }
        Ok(())
    }
}
