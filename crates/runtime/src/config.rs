//! Runtime configuration and environment loader.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the record runtime.
#[derive(Clone, Debug)]
pub struct RecordsConfig {
    /// Directory holding the record document.
    pub data_dir: PathBuf,
    /// Document name, without the `.json` extension.
    pub document_name: String,
    /// Period of worker-raised checkpoints. `None` leaves checkpoints to the host.
    pub autosave_interval: Option<Duration>,
    /// Capacity of the worker command queue.
    pub command_buffer: usize,
}

impl RecordsConfig {
    pub const DEFAULT_DOCUMENT_NAME: &'static str = "PlayerRecords";
    pub const DEFAULT_COMMAND_BUFFER: usize = 32;

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = name.into();
        self
    }

    pub fn with_autosave(mut self, interval: Duration) -> Self {
        self.autosave_interval = Some(interval);
        self
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `RECORDS_DATA_DIR` - Directory for the record document (default: `data`)
    /// - `RECORDS_DOCUMENT` - Document name (default: `PlayerRecords`)
    /// - `RECORDS_AUTOSAVE_SECS` - Seconds between worker checkpoints, 0 disables (default: disabled)
    /// - `RECORDS_COMMAND_BUFFER` - Command queue size (default: 32)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("RECORDS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(name) = env::var("RECORDS_DOCUMENT")
            && !name.trim().is_empty()
        {
            config.document_name = name;
        }

        config.autosave_interval = read_env::<u64>("RECORDS_AUTOSAVE_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        if let Some(capacity) = read_env::<usize>("RECORDS_COMMAND_BUFFER") {
            config.command_buffer = capacity.max(1);
        }

        config
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            document_name: Self::DEFAULT_DOCUMENT_NAME.to_string(),
            autosave_interval: None,
            command_buffer: Self::DEFAULT_COMMAND_BUFFER,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
