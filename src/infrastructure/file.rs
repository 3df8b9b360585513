use crate::domain::ports::SessionStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// File name of the session map inside the state directory.
pub const SESSION_FILE: &str = "session.json";

/// Persists session entries as one JSON object in `<state dir>/session.json`.
///
/// Every write rewrites the whole file through a temporary file and a rename,
/// so a crash never leaves a half-written map behind. Writers in other
/// processes are not coordinated.
#[derive(Clone)]
pub struct JsonFileSessionStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl JsonFileSessionStore {
    /// Uses `dir` as the state directory, creating it if needed.
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        tokio::fs::create_dir_all(dir.as_ref()).await?;
        Ok(Self {
            path: dir.as_ref().join(SESSION_FILE),
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }
}
