// SPDX-FileCopyrightText: 2026 Icebreaker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`KvBackend`] for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use icebreaker_core::{IcebreakerError, KvBackend};
use serde_json::Value;
use tokio::sync::Mutex;

/// A `Mutex<HashMap>`-backed KV store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryKv {
    items: Mutex<HashMap<String, Value>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvBackend for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, IcebreakerError> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), IcebreakerError> {
        self.items.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), IcebreakerError> {
        self.items.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn get_put_delete_round_trip() {
        let kv = MemoryKv::new();
        assert!(kv.get("missing").await.unwrap().is_none());

        kv.put("doc", json!({"a": 1})).await.unwrap();
        assert_eq!(kv.get("doc").await.unwrap(), Some(json!({"a": 1})));

        kv.delete("doc").await.unwrap();
        assert!(kv.get("doc").await.unwrap().is_none());

        // Deleting a missing key is fine.
        kv.delete("doc").await.unwrap();
    }
}
