//! Prefixed key codec.
//!
//! Entity keys are often stored as delimited strings (`user#123`,
//! `order#2024#456`). This module joins ordered parts with a `#` delimiter
//! and strips a known prefix back off. The delimiter is not escaped inside
//! parts: a part containing `#` produces an ambiguous key that will not
//! round-trip.

use std::fmt::Display;

use crate::error::DynamoError;

const KEY_DELIMITER: char = '#';

/// Joins the given parts into a single delimited key, in order.
///
/// ```
/// use dynamo_helpers::dynamodb::generate_prefixed_key;
///
/// assert_eq!(generate_prefixed_key(["user", "123"]), "user#123");
/// ```
pub fn generate_prefixed_key<I>(parts: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    parts
        .into_iter()
        .map(|part| part.to_string())
        .collect::<Vec<_>>()
        .join(&KEY_DELIMITER.to_string())
}

/// Strips `prefix` and the delimiter off `key`, returning the remainder
/// verbatim.
///
/// Fails with [`DynamoError::PrefixMismatch`] if `key` does not start with
/// `prefix` followed by the delimiter.
pub fn parse_prefixed_key<'a>(prefix: &str, key: &'a str) -> Result<&'a str, DynamoError> {
    key.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(KEY_DELIMITER))
        .ok_or_else(|| DynamoError::PrefixMismatch {
            prefix: prefix.to_string(),
            key: key.to_string(),
        })
}
