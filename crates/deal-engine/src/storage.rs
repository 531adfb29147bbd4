//! Mandate storage: a narrow trait with in-memory and JSON-file backends.
//!
//! The store is injected wherever it is needed; nothing in the crate holds a
//! global instance.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::mandate::{AssetClass, InvestorType, Mandate};

/// Error enumeration for storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("mandate '{0}' already exists")]
    Conflict(String),
    #[error("mandate '{0}' not found")]
    NotFound(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Storage abstraction so matching and the API surface can be exercised
/// against either backend.
pub trait MandateStore: Send + Sync {
    fn get(&self, mandate_id: &str) -> Result<Option<Mandate>, StorageError>;
    fn get_all(&self) -> Result<Vec<Mandate>, StorageError>;
    fn create(&self, mandate: Mandate) -> Result<Mandate, StorageError>;
    fn update(&self, mandate: Mandate) -> Result<Mandate, StorageError>;
    fn delete(&self, mandate_id: &str) -> Result<bool, StorageError>;
    fn count(&self) -> Result<usize, StorageError>;
}

/// Optional filters for [`search_mandates`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MandateFilter {
    pub investor_type: Option<InvestorType>,
    pub asset_class: Option<AssetClass>,
    pub is_active: Option<bool>,
}

/// Filter the stored mandates; every criterion is optional.
pub fn search_mandates(
    store: &dyn MandateStore,
    filter: &MandateFilter,
) -> Result<Vec<Mandate>, StorageError> {
    let mandates = store.get_all()?;
    Ok(mandates
        .into_iter()
        .filter(|mandate| {
            filter
                .investor_type
                .is_none_or(|t| mandate.investor_type == t)
                && filter
                    .asset_class
                    .is_none_or(|a| mandate.asset_classes.contains(&a))
                && filter.is_active.is_none_or(|active| mandate.is_active == active)
        })
        .collect())
}

/// Generate a dated, unique mandate id such as `MND-20260824-1A2B3C`.
pub fn generate_mandate_id() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("MND-{date}-{suffix}")
}

/// Volatile store backed by a shared map.
#[derive(Debug, Default, Clone)]
pub struct InMemoryMandateStore {
    mandates: Arc<Mutex<HashMap<String, Mandate>>>,
}

impl InMemoryMandateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MandateStore for InMemoryMandateStore {
    fn get(&self, mandate_id: &str) -> Result<Option<Mandate>, StorageError> {
        let guard = self.mandates.lock().expect("mandate store mutex poisoned");
        Ok(guard.get(mandate_id).cloned())
    }

    fn get_all(&self) -> Result<Vec<Mandate>, StorageError> {
        let guard = self.mandates.lock().expect("mandate store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn create(&self, mandate: Mandate) -> Result<Mandate, StorageError> {
        let mut guard = self.mandates.lock().expect("mandate store mutex poisoned");
        if guard.contains_key(&mandate.mandate_id) {
            return Err(StorageError::Conflict(mandate.mandate_id));
        }
        guard.insert(mandate.mandate_id.clone(), mandate.clone());
        Ok(mandate)
    }

    fn update(&self, mandate: Mandate) -> Result<Mandate, StorageError> {
        let mut guard = self.mandates.lock().expect("mandate store mutex poisoned");
        if !guard.contains_key(&mandate.mandate_id) {
            return Err(StorageError::NotFound(mandate.mandate_id));
        }
        guard.insert(mandate.mandate_id.clone(), mandate.clone());
        Ok(mandate)
    }

    fn delete(&self, mandate_id: &str) -> Result<bool, StorageError> {
        let mut guard = self.mandates.lock().expect("mandate store mutex poisoned");
        Ok(guard.remove(mandate_id).is_some())
    }

    fn count(&self) -> Result<usize, StorageError> {
        let guard = self.mandates.lock().expect("mandate store mutex poisoned");
        Ok(guard.len())
    }
}

/// On-disk envelope for the JSON store.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: String,
    updated_at: DateTime<Utc>,
    mandates: Vec<Mandate>,
}

const STORE_FILE_VERSION: &str = "1.0";

/// Store that persists the full mandate set to a JSON file on every mutation.
#[derive(Debug)]
pub struct JsonMandateStore {
    path: PathBuf,
    mandates: Mutex<HashMap<String, Mandate>>,
}

impl JsonMandateStore {
    /// Open the store, loading any existing file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let mut mandates = HashMap::new();

        if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&raw)?;
            for mandate in file.mandates {
                mandates.insert(mandate.mandate_id.clone(), mandate);
            }
            debug!(path = %path.display(), count = mandates.len(), "loaded mandate store");
        }

        Ok(JsonMandateStore {
            path,
            mandates: Mutex::new(mandates),
        })
    }

    fn persist(&self, mandates: &HashMap<String, Mandate>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = StoreFile {
            version: STORE_FILE_VERSION.to_string(),
            updated_at: Utc::now(),
            mandates: mandates.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl MandateStore for JsonMandateStore {
    fn get(&self, mandate_id: &str) -> Result<Option<Mandate>, StorageError> {
        let guard = self.mandates.lock().expect("mandate store mutex poisoned");
        Ok(guard.get(mandate_id).cloned())
    }

    fn get_all(&self) -> Result<Vec<Mandate>, StorageError> {
        let guard = self.mandates.lock().expect("mandate store mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn create(&self, mandate: Mandate) -> Result<Mandate, StorageError> {
        let mut guard = self.mandates.lock().expect("mandate store mutex poisoned");
        if guard.contains_key(&mandate.mandate_id) {
            return Err(StorageError::Conflict(mandate.mandate_id));
        }
        guard.insert(mandate.mandate_id.clone(), mandate.clone());
        self.persist(&guard)?;
        Ok(mandate)
    }

    fn update(&self, mandate: Mandate) -> Result<Mandate, StorageError> {
        let mut guard = self.mandates.lock().expect("mandate store mutex poisoned");
        if !guard.contains_key(&mandate.mandate_id) {
            return Err(StorageError::NotFound(mandate.mandate_id));
        }
        guard.insert(mandate.mandate_id.clone(), mandate.clone());
        self.persist(&guard)?;
        Ok(mandate)
    }

    fn delete(&self, mandate_id: &str) -> Result<bool, StorageError> {
        let mut guard = self.mandates.lock().expect("mandate store mutex poisoned");
        let removed = guard.remove(mandate_id).is_some();
        if removed {
            self.persist(&guard)?;
        }
        Ok(removed)
    }

    fn count(&self) -> Result<usize, StorageError> {
        let guard = self.mandates.lock().expect("mandate store mutex poisoned");
        Ok(guard.len())
    }
}
