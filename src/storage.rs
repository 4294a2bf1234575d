//! Encrypted local persistence for logs and settings.
//!
//! Everything lives in one sealed JSON file under the platform data
//! directory. Records are saved wholesale by date; there is no partial
//! update at this boundary, callers read-modify-write the whole record.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto;
use crate::models::{AppSettings, DailyLog};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("crypto error: {0}")]
    Crypto(#[from] crypto::CryptoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("data directory not found")]
    NoDataDir,
}

/// Change notification delivered to subscribers after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    LogsChanged,
    SettingsChanged,
}

type Listener = Box<dyn Fn(StoreEvent) + Send + Sync>;

/// On-disk payload: the full log set keyed by date, plus settings.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    logs: HashMap<NaiveDate, DailyLog>,
    settings: AppSettings,
}

/// Holds the decrypted data while the app is unlocked. The store is a plain
/// owned value; callers that share one across threads wrap it in their own
/// `Mutex`.
pub struct LogStore {
    path: PathBuf,
    passphrase: Zeroizing<String>,
    data: StoreData,
    listeners: Vec<Listener>,
}

impl LogStore {
    /// Open the store at `path`, decrypting the existing file or starting
    /// fresh when none exists yet. A wrong passphrase surfaces as
    /// [`StorageError::Crypto`].
    pub fn open(path: impl Into<PathBuf>, passphrase: &str) -> Result<Self, StorageError> {
        let path = path.into();
        let data = if path.exists() {
            let sealed = fs::read(&path)?;
            let plain = crypto::open_sealed(passphrase, &sealed)?;
            serde_json::from_slice(&plain)?
        } else {
            StoreData::default()
        };
        info!(path = %path.display(), logs = data.logs.len(), "opened log store");

        Ok(Self {
            path,
            passphrase: Zeroizing::new(passphrase.to_owned()),
            data,
            listeners: Vec::new(),
        })
    }

    /// Default location, e.g. `~/.local/share/luna/luna.db` on Linux.
    pub fn default_path() -> Result<PathBuf, StorageError> {
        let dir = dirs::data_local_dir()
            .ok_or(StorageError::NoDataDir)?
            .join("luna");
        fs::create_dir_all(&dir)?;
        Ok(dir.join("luna.db"))
    }

    /// Whether a data file already exists at the default location.
    pub fn data_exists() -> Result<bool, StorageError> {
        Ok(Self::default_path()?.exists())
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyLog> {
        self.data.logs.get(&date)
    }

    /// The full log set keyed by date. This is the prediction engine's
    /// input shape.
    pub fn get_all(&self) -> &HashMap<NaiveDate, DailyLog> {
        &self.data.logs
    }

    pub fn settings(&self) -> &AppSettings {
        &self.data.settings
    }

    /// Insert or replace the record for `log.date` wholesale.
    pub fn upsert(&mut self, mut log: DailyLog) -> Result<(), StorageError> {
        log.normalize();
        self.data.logs.insert(log.date, log);
        self.save()?;
        self.notify(StoreEvent::LogsChanged);
        Ok(())
    }

    pub fn remove(&mut self, date: NaiveDate) -> Result<(), StorageError> {
        if self.data.logs.remove(&date).is_some() {
            self.save()?;
            self.notify(StoreEvent::LogsChanged);
        }
        Ok(())
    }

    pub fn update_settings(&mut self, settings: AppSettings) -> Result<(), StorageError> {
        self.data.settings = settings;
        self.save()?;
        self.notify(StoreEvent::SettingsChanged);
        Ok(())
    }

    /// Drop every log and setting and delete the backing file.
    pub fn clear_all(&mut self) -> Result<(), StorageError> {
        self.data = StoreData::default();
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        info!("cleared all stored data");
        self.notify(StoreEvent::LogsChanged);
        self.notify(StoreEvent::SettingsChanged);
        Ok(())
    }

    /// Register a listener invoked after every successful write. This is how
    /// other views learn that logs changed; the prediction engine itself
    /// never subscribes.
    pub fn subscribe(&mut self, listener: impl Fn(StoreEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn save(&self) -> Result<(), StorageError> {
        let plain = serde_json::to_vec(&self.data)?;
        let sealed = crypto::seal(&self.passphrase, &plain)?;
        fs::write(&self.path, sealed)?;
        debug!(logs = self.data.logs.len(), "saved log store");
        Ok(())
    }

    fn notify(&self, event: StoreEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Mood, Symptom};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct TempPath(PathBuf);

    impl TempPath {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!("luna-store-{}.db", rand::random::<u64>()));
            Self(path)
        }
    }

    impl Drop for TempPath {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn persists_logs_and_settings_across_reopen() {
        let tmp = TempPath::new();

        let mut store = LogStore::open(&tmp.0, "pass").unwrap();
        let mut log = DailyLog::new(date("2024-01-01"));
        log.is_period = true;
        log.notes = Some("first day".into());
        store.upsert(log).unwrap();
        store
            .update_settings(AppSettings {
                user_name: "Ada".into(),
                ..AppSettings::default()
            })
            .unwrap();
        drop(store);

        let store = LogStore::open(&tmp.0, "pass").unwrap();
        let log = store.get(date("2024-01-01")).unwrap();
        assert!(log.is_period);
        assert_eq!(log.notes.as_deref(), Some("first day"));
        assert_eq!(store.settings().user_name, "Ada");
    }

    #[test]
    fn wrong_passphrase_fails_to_open() {
        let tmp = TempPath::new();

        let mut store = LogStore::open(&tmp.0, "correct").unwrap();
        store.upsert(DailyLog::new(date("2024-01-01"))).unwrap();
        drop(store);

        assert!(matches!(
            LogStore::open(&tmp.0, "wrong"),
            Err(StorageError::Crypto(_))
        ));
    }

    #[test]
    fn upsert_replaces_the_whole_record() {
        let tmp = TempPath::new();
        let mut store = LogStore::open(&tmp.0, "pass").unwrap();

        let mut first = DailyLog::new(date("2024-01-01"));
        first.notes = Some("keep me?".into());
        store.upsert(first).unwrap();

        let mut second = DailyLog::new(date("2024-01-01"));
        second.is_period = true;
        store.upsert(second).unwrap();

        let log = store.get(date("2024-01-01")).unwrap();
        assert!(log.is_period);
        // Wholesale replace: the old notes are gone.
        assert_eq!(log.notes, None);
        assert_eq!(store.get_all().len(), 1);
    }

    #[test]
    fn upsert_normalizes_tag_sets() {
        let tmp = TempPath::new();
        let mut store = LogStore::open(&tmp.0, "pass").unwrap();

        let mut log = DailyLog::new(date("2024-01-01"));
        log.moods = vec![Mood::Calm, Mood::Calm];
        log.symptoms = vec![Symptom::Cramps, Symptom::Cramps];
        store.upsert(log).unwrap();

        let log = store.get(date("2024-01-01")).unwrap();
        assert_eq!(log.moods, vec![Mood::Calm]);
        assert_eq!(log.symptoms, vec![Symptom::Cramps]);
    }

    #[test]
    fn remove_deletes_a_single_record() {
        let tmp = TempPath::new();
        let mut store = LogStore::open(&tmp.0, "pass").unwrap();

        store.upsert(DailyLog::new(date("2024-01-01"))).unwrap();
        store.upsert(DailyLog::new(date("2024-01-02"))).unwrap();
        store.remove(date("2024-01-01")).unwrap();

        assert!(store.get(date("2024-01-01")).is_none());
        assert!(store.get(date("2024-01-02")).is_some());
    }

    #[test]
    fn clear_all_wipes_state_and_file() {
        let tmp = TempPath::new();
        let mut store = LogStore::open(&tmp.0, "pass").unwrap();

        store.upsert(DailyLog::new(date("2024-01-01"))).unwrap();
        store
            .update_settings(AppSettings {
                user_name: "Ada".into(),
                ..AppSettings::default()
            })
            .unwrap();
        assert!(tmp.0.exists());

        store.clear_all().unwrap();
        assert!(store.get_all().is_empty());
        assert_eq!(store.settings().user_name, "User");
        assert!(!tmp.0.exists());
    }

    #[test]
    fn subscribers_hear_about_writes() {
        let tmp = TempPath::new();
        let mut store = LogStore::open(&tmp.0, "pass").unwrap();

        let log_events = Arc::new(AtomicUsize::new(0));
        let settings_events = Arc::new(AtomicUsize::new(0));
        let (logs_seen, settings_seen) = (log_events.clone(), settings_events.clone());
        store.subscribe(move |event| match event {
            StoreEvent::LogsChanged => {
                logs_seen.fetch_add(1, Ordering::SeqCst);
            }
            StoreEvent::SettingsChanged => {
                settings_seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        store.upsert(DailyLog::new(date("2024-01-01"))).unwrap();
        store.remove(date("2024-01-01")).unwrap();
        store.update_settings(AppSettings::default()).unwrap();
        // Removing a date that has no record writes nothing and stays quiet.
        store.remove(date("2030-01-01")).unwrap();

        assert_eq!(log_events.load(Ordering::SeqCst), 2);
        assert_eq!(settings_events.load(Ordering::SeqCst), 1);
    }
}
