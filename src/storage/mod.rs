mod profile;
mod weight_log;

pub use profile::{Profile, ProfileStore};
pub use weight_log::{DEFAULT_RECENT_LIMIT, RecentProgress, WeightLog, WeightSample};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

const PROFILE_FILE_NAME: &str = "perfil.json";
const WEIGHT_LOG_FILE_NAME: &str = "progreso.json";
const REPORT_FILE_NAME: &str = "reporte_progreso.csv";

/// Owns the on-disk locations of the profile, the weight log and the exported
/// report. Constructed from a data directory so tests can point it at a
/// temporary one.
#[derive(Debug, Clone)]
pub struct Storage {
    profile_path: PathBuf,
    weight_log_path: PathBuf,
    report_path: PathBuf,
}

impl Storage {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            profile_path: data_dir.join(PROFILE_FILE_NAME),
            weight_log_path: data_dir.join(WEIGHT_LOG_FILE_NAME),
            report_path: data_dir.join(REPORT_FILE_NAME),
        }
    }

    pub fn profile(&self) -> ProfileStore<'_> {
        ProfileStore::new(&self.profile_path)
    }

    pub fn weight_log(&self) -> WeightLog<'_> {
        WeightLog::new(&self.weight_log_path)
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    InvalidInput(String),
    NotFound(&'static str),
    Empty(&'static str),
    Corrupt { path: PathBuf, detail: String },
    Io { path: PathBuf, detail: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::NotFound(what) => write!(f, "{what}"),
            Self::Empty(what) => write!(f, "{what}"),
            Self::Corrupt { path, detail } => {
                write!(f, "corrupt data in {}: {detail}", path.display())
            }
            Self::Io { path, detail } => {
                write!(f, "I/O failure on {}: {detail}", path.display())
            }
        }
    }
}

impl Error for StoreError {}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Reads and parses a JSON file. A missing file is `Ok(None)`; unparseable
/// content is reported as `Corrupt`, distinct from other read failures.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                detail: err.to_string(),
            });
        }
    };

    serde_json::from_str(&text).map(Some).map_err(|err| StoreError::Corrupt {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })
}

pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|err| StoreError::Io {
        path: path.to_path_buf(),
        detail: format!("serialization failed: {err}"),
    })?;
    write_bytes_atomic(path, &bytes)
}

/// Overwrites `path` by writing a sibling temp file and renaming it into
/// place, so a crash mid-write never leaves a torn file behind.
pub(crate) fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let io_err = |detail: String| StoreError::Io {
        path: path.to_path_buf(),
        detail,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| io_err(err.to_string()))?;
    }

    let mut tmp_name = path
        .file_name()
        .ok_or_else(|| io_err("path has no file name".to_string()))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes).map_err(|err| io_err(err.to_string()))?;
    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        io_err(err.to_string())
    })
}

pub(crate) fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
