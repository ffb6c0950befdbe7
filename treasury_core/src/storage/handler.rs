use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use serde_json::Value;
use sled::Db;

use crate::config::KvConfig;
use crate::error::{TreasuryError, TreasuryResult};
use crate::helpers::fetch::UpstreamClient;
use crate::storage::dto::{KvGetResponse, KvSetRequest};

pub const KV_TIMEOUT: Duration = Duration::from_secs(10);
pub const SAVED_AT: &str = "savedAt";

pub fn save_key(device_id: &str) -> String {
    format!("cv:save:{}", device_id)
}

/// Stamps `savedAt` (epoch milliseconds) unless the save already carries a truthy one.
pub fn stamp_saved_at(save: &mut Value, now_ms: i64) {
    let Value::Object(fields) = save else {
        return;
    };
    let present = match fields.get(SAVED_AT) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    if !present {
        fields.insert(SAVED_AT.to_string(), Value::from(now_ms));
    }
}

/// Stamps the current time, see `stamp_saved_at`.
pub fn stamp_now(save: &mut Value) {
    stamp_saved_at(save, Utc::now().timestamp_millis());
}

/// Per-device game saves.
#[async_trait]
pub trait SaveStore: Send + Sync {
    async fn load(&self, device_id: &str) -> TreasuryResult<Option<Value>>;
    async fn store(&self, device_id: &str, save: &Value) -> TreasuryResult<()>;
}

/// Vercel KV compatible REST backend.
pub struct KvRestStore {
    client: UpstreamClient,
    config: KvConfig,
}

impl KvRestStore {
    pub fn new(client: UpstreamClient, config: KvConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, action: &str, device_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.url,
            action,
            urlencoding::encode(&save_key(device_id))
        )
    }
}

#[async_trait]
impl SaveStore for KvRestStore {
    async fn load(&self, device_id: &str) -> TreasuryResult<Option<Value>> {
        let url = self.url("get", device_id);
        let request = self.client.inner().get(&url).bearer_auth(&self.config.token);
        let response: KvGetResponse = self.client.send_json(request, &url, KV_TIMEOUT).await?;

        match response.result {
            Some(text) if !text.is_empty() => Ok(Some(serde_json::from_str(&text)?)),
            _ => Ok(None),
        }
    }

    async fn store(&self, device_id: &str, save: &Value) -> TreasuryResult<()> {
        let url = self.url("set", device_id);
        let body = KvSetRequest {
            value: serde_json::to_string(save)?,
        };
        let request = self
            .client
            .inner()
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(&body);
        let _: Value = self.client.send_json(request, &url, KV_TIMEOUT).await?;

        info!("[SAVE] stored {}", save_key(device_id));
        Ok(())
    }
}

/// Embedded backend for self-hosted deployments.
pub struct SledStore {
    db: Db,
}

impl SledStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn open(path: &str) -> TreasuryResult<Self> {
        Ok(Self::new(sled::open(path)?))
    }
}

#[async_trait]
impl SaveStore for SledStore {
    async fn load(&self, device_id: &str) -> TreasuryResult<Option<Value>> {
        match self.db.get(save_key(device_id))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn store(&self, device_id: &str, save: &Value) -> TreasuryResult<()> {
        let bytes = serde_json::to_vec(save)?;
        self.db.insert(save_key(device_id), bytes)?;
        self.db.flush_async().await?;
        Ok(())
    }
}

/// Used when no backend is configured; every call is a configuration error.
pub struct UnconfiguredStore;

#[async_trait]
impl SaveStore for UnconfiguredStore {
    async fn load(&self, _device_id: &str) -> TreasuryResult<Option<Value>> {
        Err(not_configured())
    }

    async fn store(&self, _device_id: &str, _save: &Value) -> TreasuryResult<()> {
        Err(not_configured())
    }
}

fn not_configured() -> TreasuryError {
    warn!("[SAVE] no save backend configured");
    TreasuryError::Config("KV not configured".to_string())
}
