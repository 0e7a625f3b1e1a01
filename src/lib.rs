//! Type-safe helpers for DynamoDB tables and S3 buckets.
//!
//! The [`dynamodb`] module is the core: table descriptors, generated
//! key-condition/filter/update expressions, schema validation at the call
//! boundary, and chunked batch writes. The [`storage`] module is a thin S3
//! bucket proxy. [`clients`] provides the process-wide lazily-initialized
//! client handles, and [`logging`] the tracing bootstrap.

pub mod clients;
pub mod dynamodb;
pub mod logging;
pub mod storage;

mod error;

pub use error::DynamoError;
pub use logging::init_logging;
pub use storage::{Bucket, StorageError, DEFAULT_PRESIGN_EXPIRY};
