//! Batch write coordination.
//!
//! DynamoDB accepts at most 25 writes per batch call. The coordinator
//! validates every request up front, splits the validated writes into
//! contiguous chunks of that size (input order preserved within and across
//! chunks), and dispatches all chunks concurrently.
//!
//! Partial-failure semantics: there is no cross-chunk transaction. Chunks
//! the store accepted before another chunk fails are not rolled back, and
//! in-flight sibling chunks are not cancelled; the first error in chunk
//! order is surfaced once every dispatch has settled. Callers that need
//! atomicity must keep a batch within one chunk's worth of items.

use futures::future;
use tracing::debug;

use crate::dynamodb::client::{StoreClient, WriteRequest};
use crate::dynamodb::schema::SchemaValidator;
use crate::dynamodb::table::TableDescriptor;
use crate::dynamodb::Item;
use crate::error::DynamoError;

/// Hard per-call item limit of the store's batch-write command.
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

/// A single request inside a batch write.
#[derive(Debug, Clone)]
pub enum BatchItem {
    /// Write `item`, validated against the caller-supplied schema.
    Put { item: Item },
    /// Delete the item identified by `key`, which must contain exactly the
    /// primary-key attributes.
    Delete { key: Item },
}

fn validate(
    descriptor: &TableDescriptor,
    schema: &impl SchemaValidator,
    requests: Vec<BatchItem>,
) -> Result<Vec<WriteRequest>, DynamoError> {
    let keys = descriptor.primary_key();
    let mut writes = Vec::with_capacity(requests.len());
    for (index, request) in requests.into_iter().enumerate() {
        match request {
            BatchItem::Put { item } => {
                let validated = schema
                    .validate(&item)
                    .map_err(|source| DynamoError::schema_mismatch("batch write item", source))?;
                writes.push(WriteRequest::Put {
                    item: validated.into_attributes(),
                });
            }
            BatchItem::Delete { key } => {
                for attribute in keys.attributes() {
                    if !key.contains(attribute) {
                        return Err(DynamoError::missing_key(
                            attribute,
                            format!("delete request {index} in batch write"),
                        ));
                    }
                }
                writes.push(WriteRequest::Delete {
                    key: key.into_attributes(),
                });
            }
        }
    }
    Ok(writes)
}

fn chunk(writes: Vec<WriteRequest>) -> Vec<Vec<WriteRequest>> {
    let mut chunks = Vec::new();
    let mut writes = writes.into_iter();
    loop {
        let chunk: Vec<_> = writes.by_ref().take(MAX_BATCH_WRITE_ITEMS).collect();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }
    chunks
}

pub(crate) async fn batch_write<C: StoreClient, S: SchemaValidator>(
    client: &C,
    descriptor: &TableDescriptor,
    schema: &S,
    requests: Vec<BatchItem>,
) -> Result<(), DynamoError> {
    let writes = validate(descriptor, schema, requests)?;
    let chunks = chunk(writes);
    debug!(
        "Dispatching {} batch write chunks to '{}'",
        chunks.len(),
        descriptor.name()
    );

    let dispatches = chunks
        .into_iter()
        .map(|chunk| client.batch_write(descriptor.name(), chunk));
    future::join_all(dispatches)
        .await
        .into_iter()
        .collect::<Result<(), _>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::AttributeValue;

    fn put(index: usize) -> WriteRequest {
        WriteRequest::Put {
            item: [(
                "id".to_string(),
                AttributeValue::S(format!("item-{index}")),
            )]
            .into(),
        }
    }

    #[test]
    fn chunks_of_at_most_25_preserving_order() {
        let writes: Vec<_> = (0..47).map(put).collect();
        let chunks = chunk(writes);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 25);
        assert_eq!(chunks[1].len(), 22);

        let flattened: Vec<_> = chunks.into_iter().flatten().collect();
        for (index, write) in flattened.iter().enumerate() {
            let WriteRequest::Put { item } = write else {
                panic!("expected put request");
            };
            assert_eq!(
                item.get("id"),
                Some(&AttributeValue::S(format!("item-{index}")))
            );
        }
    }

    #[test]
    fn exact_multiple_yields_full_chunks() {
        let chunks = chunk((0..50).map(put).collect());
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|chunk| chunk.len() == 25));
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk(Vec::new()).is_empty());
    }
}
