//! Binary configuration: flags with environment fallbacks, resolved into
//! the adapters every command needs.

use crate::config::{
    DEFAULT_CHANNEL, DEFAULT_CUSTOMER_EMAIL, DEFAULT_PAYMENT_GATEWAY, DEFAULT_PAYMENT_TOKEN,
    PaymentSettings, StorefrontSettings,
};
use crate::domain::ports::SessionStoreRef;
use crate::error::Result;
use crate::infrastructure::file::JsonFileSessionStore;
use crate::infrastructure::graphql::GraphQlGateway;
use crate::infrastructure::retry::RetryPolicy;
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/graphql/";

/// Where persisted session entries live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// JSON file inside the state directory
    File,
    /// RocksDB database inside the state directory (needs the `storage-rocksdb` feature)
    Rocksdb,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// GraphQL endpoint of the storefront API
    #[arg(long, env = "CARTSYNC_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    pub endpoint: String,

    /// Sales channel new checkouts are opened in
    #[arg(long, env = "CARTSYNC_CHANNEL", default_value = DEFAULT_CHANNEL, global = true)]
    pub channel: String,

    /// Customer email attached to new checkouts
    #[arg(long, env = "CARTSYNC_EMAIL", default_value = DEFAULT_CUSTOMER_EMAIL, global = true)]
    pub email: String,

    /// Directory holding the persisted cart session and login token
    #[arg(long, env = "CARTSYNC_STATE_DIR", default_value = ".cartsync", global = true)]
    pub state_dir: PathBuf,

    /// Session store backend
    #[arg(
        long,
        env = "CARTSYNC_STORE",
        value_enum,
        default_value_t = StoreKind::File,
        global = true
    )]
    pub store: StoreKind,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "CARTSYNC_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Payment gateway identifier used at checkout
    #[arg(
        long,
        env = "CARTSYNC_PAYMENT_GATEWAY",
        default_value = DEFAULT_PAYMENT_GATEWAY,
        global = true
    )]
    pub payment_gateway: String,

    /// Payment token used at checkout
    #[arg(
        long,
        env = "CARTSYNC_PAYMENT_TOKEN",
        default_value = DEFAULT_PAYMENT_TOKEN,
        hide_env_values = true,
        global = true
    )]
    pub payment_token: String,

    /// Total attempts per request, including the first
    #[arg(long, env = "CARTSYNC_RETRY_ATTEMPTS", default_value_t = 3, global = true)]
    pub retry_attempts: u32,

    /// Initial retry delay in milliseconds, doubled on every retry
    #[arg(long, env = "CARTSYNC_RETRY_DELAY_MS", default_value_t = 300, global = true)]
    pub retry_delay_ms: u64,

    /// Cap on a single retry delay in milliseconds
    #[arg(long, env = "CARTSYNC_RETRY_MAX_DELAY_MS", global = true)]
    pub retry_max_delay_ms: Option<u64>,

    /// Sleep the full backoff instead of a random share of it
    #[arg(long, global = true)]
    pub no_jitter: bool,
}

/// Adapters and settings resolved from [`GlobalArgs`].
pub struct Context {
    pub store: SessionStoreRef,
    pub gateway: Arc<GraphQlGateway>,
    pub storefront: StorefrontSettings,
    pub payment: PaymentSettings,
}

impl GlobalArgs {
    pub fn retry_policy(&self) -> RetryPolicy {
        let mut policy = RetryPolicy::new(self.retry_attempts)
            .with_initial_delay(Duration::from_millis(self.retry_delay_ms))
            .with_jitter(!self.no_jitter);
        if let Some(max) = self.retry_max_delay_ms {
            policy = policy.with_max_delay(Duration::from_millis(max));
        }
        policy
    }

    /// Opens the session store and builds the gateway. No request is sent.
    pub async fn context(&self) -> Result<Context> {
        let store = open_store(self.store, &self.state_dir).await?;
        let gateway = GraphQlGateway::new(&self.endpoint, store.clone(), self.retry_policy())?;
        debug!(endpoint = %self.endpoint, state_dir = %self.state_dir.display(), "configured");

        Ok(Context {
            store,
            gateway: Arc::new(gateway),
            storefront: StorefrontSettings {
                channel: self.channel.clone(),
                customer_email: self.email.clone(),
            },
            payment: PaymentSettings {
                gateway: self.payment_gateway.clone(),
                token: self.payment_token.clone(),
            },
        })
    }
}

async fn open_store(kind: StoreKind, dir: &Path) -> Result<SessionStoreRef> {
    match kind {
        StoreKind::File => Ok(Arc::new(JsonFileSessionStore::open(dir).await?)),
        StoreKind::Rocksdb => open_rocksdb(dir).await,
    }
}

#[cfg(feature = "storage-rocksdb")]
async fn open_rocksdb(dir: &Path) -> Result<SessionStoreRef> {
    use crate::infrastructure::rocksdb::RocksDBSessionStore;
    Ok(Arc::new(RocksDBSessionStore::open(dir.join("rocksdb"))?))
}

#[cfg(not(feature = "storage-rocksdb"))]
async fn open_rocksdb(dir: &Path) -> Result<SessionStoreRef> {
    tracing::warn!(
        "RocksDB store requested but the 'storage-rocksdb' feature is not enabled; \
         falling back to the JSON file store"
    );
    Ok(Arc::new(JsonFileSessionStore::open(dir).await?))
}
