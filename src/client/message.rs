use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::utils::error::MalformedResponse;

/// A message delivered by `PICKUP`.
///
/// `topic` and `from` are the message's own fields; they are passed to
/// callbacks as is, even when they differ from the grouping key of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    pub message: String,
    #[serde(default)]
    pub from: String,
}

/// Messages returned by one pickup, grouped by topic.
pub type PickupBatch = BTreeMap<String, Vec<Message>>;

/// Decodes a pickup body. An empty body, before or after decoding, means no
/// messages.
pub fn parse_batch(body: &str) -> Result<PickupBatch, MalformedResponse> {
    let decoded = codec::decode(body.trim())?;
    if decoded.trim().is_empty() {
        return Ok(PickupBatch::new());
    }
    Ok(serde_json::from_str(&decoded)?)
}

/// Decodes a JSON value answer (`GETVAL`, `STATS`, ...). Empty means `None`.
pub fn parse_value(body: &str) -> Result<Option<serde_json::Value>, MalformedResponse> {
    let decoded = codec::decode(body.trim())?;
    if decoded.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&decoded)?))
}
