//! Process-wide, lazily-initialized AWS client handles.
//!
//! Clients are constructed at most once per process and reused read-only
//! across all operations; concurrent first callers race on a `OnceCell`, so
//! a single winner constructs the handle and the rest await it. Prefer
//! constructing clients explicitly and injecting them where testability
//! matters; these accessors exist for application code that wants the
//! conventional environment-driven setup.

use tokio::sync::OnceCell;

use crate::dynamodb::DynamoDb;

static DYNAMODB: OnceCell<DynamoDb> = OnceCell::const_new();
static S3: OnceCell<aws_sdk_s3::Client> = OnceCell::const_new();

async fn sdk_config() -> aws_config::SdkConfig {
    dotenv::dotenv().ok();
    aws_config::load_from_env().await
}

/// The shared DynamoDB client, configured from the environment on first
/// use.
pub async fn dynamodb() -> &'static DynamoDb {
    DYNAMODB
        .get_or_init(|| async { DynamoDb::new(&sdk_config().await) })
        .await
}

/// The shared S3 client, configured from the environment on first use.
pub async fn s3() -> &'static aws_sdk_s3::Client {
    S3.get_or_init(|| async { aws_sdk_s3::Client::new(&sdk_config().await) })
        .await
}
