//! Where the roster blob lives between sessions.
//!
//! [`PetStore`] is a plain load/save pair. Local stores keep one blob;
//! [`PinSyncStore`] keeps one record per sync PIN in a [`RemoteTable`] and
//! resolves conflicts by last write wins on `updated_at`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::roster::Roster;

pub const STORAGE_KEY: &str = "pet-dex";
pub const MIN_PIN_LEN: usize = 4;

pub trait PetStore: Send + Sync {
    fn load(&self) -> Result<Option<Roster>, StoreError>;

    fn save(&self, roster: &Roster) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl PetStore for MemoryStore {
    fn load(&self) -> Result<Option<Roster>, StoreError> {
        self.blob
            .lock()
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(StoreError::from)
    }

    fn save(&self, roster: &Roster) -> Result<(), StoreError> {
        *self.blob.lock() = Some(serde_json::to_string(roster)?);
        Ok(())
    }
}

/// Pretty printed JSON on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

impl PetStore for FileStore {
    fn load(&self) -> Result<Option<Roster>, StoreError> {
        read_json(&self.path)
    }

    fn save(&self, roster: &Roster) -> Result<(), StoreError> {
        write_json(&self.path, roster)
    }
}

/// The browser's `localStorage`, under [`STORAGE_KEY`].
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|window| window.local_storage().ok().flatten())
            .ok_or(StoreError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl PetStore for LocalStorageStore {
    fn load(&self) -> Result<Option<Roster>, StoreError> {
        let blob = Self::storage()?
            .get_item(STORAGE_KEY)
            .map_err(|err| {
                warn!("localStorage read failed: {err:?}");
                StoreError::StorageUnavailable
            })?;
        blob.as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(StoreError::from)
    }

    fn save(&self, roster: &Roster) -> Result<(), StoreError> {
        Self::storage()?
            .set_item(STORAGE_KEY, &serde_json::to_string(roster)?)
            .map_err(|err| {
                warn!("localStorage write failed: {err:?}");
                StoreError::StorageUnavailable
            })
    }
}

/// A sync credential: trimmed, uppercased, at least [`MIN_PIN_LEN`] long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SyncPin(String);

impl SyncPin {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let pin = raw.trim().to_uppercase();
        if pin.chars().count() < MIN_PIN_LEN {
            return Err(StoreError::InvalidPin { min: MIN_PIN_LEN });
        }
        Ok(Self(pin))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SyncPin {
    type Error = StoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<SyncPin> for String {
    fn from(pin: SyncPin) -> Self {
        pin.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub pin: SyncPin,
    pub data: Roster,
    /// Milliseconds since the epoch.
    pub updated_at: i64,
}

/// A keyed table of sync records.
pub trait RemoteTable: Send + Sync {
    fn fetch(&self, pin: &SyncPin) -> Result<Option<SyncRecord>, StoreError>;

    /// Stores `record` unless a newer one is already there. Returns whether
    /// it was written.
    fn upsert(&self, record: SyncRecord) -> Result<bool, StoreError>;
}

fn upsert_newest(records: &mut Vec<SyncRecord>, record: SyncRecord) -> bool {
    match records.iter_mut().find(|stored| stored.pin == record.pin) {
        Some(stored) if stored.updated_at > record.updated_at => false,
        Some(stored) => {
            *stored = record;
            true
        }
        None => {
            records.push(record);
            true
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryRemote {
    records: Mutex<Vec<SyncRecord>>,
}

impl RemoteTable for MemoryRemote {
    fn fetch(&self, pin: &SyncPin) -> Result<Option<SyncRecord>, StoreError> {
        Ok(self.records.lock().iter().find(|record| &record.pin == pin).cloned())
    }

    fn upsert(&self, record: SyncRecord) -> Result<bool, StoreError> {
        Ok(upsert_newest(&mut self.records.lock(), record))
    }
}

/// A table kept as a JSON array on disk, shared by every PIN.
#[derive(Debug)]
pub struct FileTable {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }
}

impl RemoteTable for FileTable {
    fn fetch(&self, pin: &SyncPin) -> Result<Option<SyncRecord>, StoreError> {
        let _guard = self.guard.lock();
        let records: Vec<SyncRecord> = read_json(&self.path)?.unwrap_or_default();
        Ok(records.into_iter().find(|record| &record.pin == pin))
    }

    fn upsert(&self, record: SyncRecord) -> Result<bool, StoreError> {
        let _guard = self.guard.lock();
        let mut records: Vec<SyncRecord> = read_json(&self.path)?.unwrap_or_default();
        let written = upsert_newest(&mut records, record);
        if written {
            write_json(&self.path, &records)?;
        }
        Ok(written)
    }
}

pub struct PinSyncStore<R> {
    remote: R,
    pin: SyncPin,
}

impl<R: RemoteTable> PinSyncStore<R> {
    pub const fn new(remote: R, pin: SyncPin) -> Self {
        Self { remote, pin }
    }

    pub const fn pin(&self) -> &SyncPin {
        &self.pin
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Saves with an explicit timestamp. Returns whether the remote took it.
    pub fn save_at(&self, roster: &Roster, updated_at: i64) -> Result<bool, StoreError> {
        let written = self.remote.upsert(SyncRecord {
            pin: self.pin.clone(),
            data: roster.clone(),
            updated_at,
        })?;
        if written {
            debug!("synced roster for pin {}", self.pin.as_str());
        } else {
            warn!("remote roster for pin {} is newer, kept it", self.pin.as_str());
        }
        Ok(written)
    }
}

impl<R: RemoteTable> PetStore for PinSyncStore<R> {
    fn load(&self) -> Result<Option<Roster>, StoreError> {
        Ok(self.remote.fetch(&self.pin)?.map(|record| record.data))
    }

    fn save(&self, roster: &Roster) -> Result<(), StoreError> {
        self.save_at(roster, Utc::now().timestamp_millis()).map(drop)
    }
}
