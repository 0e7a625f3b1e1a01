//! # DynamoDB helpers
//!
//! A type-safe layer in front of DynamoDB: define a table once, then issue
//! get/query/create/update/remove/batch-write calls without hand-writing the
//! store's expression syntax.
//!
//! ## Components
//!
//! - [`TableDescriptor`] / [`PrimaryKey`]: static table definition with
//!   named secondary indexes.
//! - [`Table`]: a descriptor bound to a [`StoreClient`], exposing the CRUD,
//!   query, and batch operations.
//! - [`expression`]: pure builders for key-condition, filter, and update
//!   expressions with placeholder-escaped attribute names.
//! - [`SchemaValidator`] / [`Schema`]: pluggable item-shape validation,
//!   applied before writes and after reads.
//! - [`BatchItem`]: tagged put/delete requests, chunked into the store's
//!   25-item batch limit and dispatched concurrently.
//! - [`generate_prefixed_key`] / [`parse_prefixed_key`]: `#`-delimited
//!   composite key codec.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dynamo_helpers::dynamodb::{
//!     FieldType, Item, PrimaryKey, Schema, Table, TableDescriptor,
//! };
//!
//! # async fn example() -> Result<(), dynamo_helpers::DynamoError> {
//! let client = dynamo_helpers::clients::dynamodb().await.clone();
//! let table = Table::new(
//!     client,
//!     TableDescriptor::new(
//!         "products",
//!         PrimaryKey::new("category").with_sort("product_name"),
//!     ),
//! );
//! let schema = Schema::new()
//!     .field("category", FieldType::String)
//!     .field("product_name", FieldType::String)
//!     .field("price", FieldType::Number);
//!
//! let item = Item::new()
//!     .set_string("category", "Electronics")
//!     .set_string("product_name", "Smartphone")
//!     .set_number("price", 599.99);
//! table.create(&schema, item).await?;
//!
//! let key = Item::new()
//!     .set_string("category", "Electronics")
//!     .set_string("product_name", "Smartphone");
//! let fetched = table.get(&schema, key).await?;
//! # Ok(())
//! # }
//! ```

mod batch;
mod client;
pub mod expression;
mod item;
mod key;
mod schema;
mod table;

pub use batch::{BatchItem, MAX_BATCH_WRITE_ITEMS};
pub use client::{DynamoDb, QueryRequest, QueryResponse, StoreClient, UpdateRequest, WriteRequest};
pub use expression::{Patch, QueryExpression, UpdateExpression};
pub use item::{Attributes, Item};
pub use key::{generate_prefixed_key, parse_prefixed_key};
pub use schema::{FieldType, Schema, SchemaValidator, SchemaViolation};
pub use table::{
    Cursor, Order, PrimaryKey, QueryOptions, QueryOutput, Table, TableDescriptor, UpdateOptions,
};
