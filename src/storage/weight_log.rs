use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{StoreError, StoreResult, now_rfc3339, read_json, write_json_atomic};

pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// One body-weight measurement. Immutable once appended; ordering is append
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSample {
    #[serde(rename = "fecha")]
    pub timestamp: String,
    #[serde(rename = "peso")]
    pub weight: f64,
}

/// On-disk shape: `{"peso": [ {fecha, peso}, ... ]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct WeightLogFile {
    #[serde(rename = "peso", default)]
    samples: Vec<WeightSample>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentProgress {
    pub samples: Vec<WeightSample>,
    pub total: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct WeightLog<'a> {
    path: &'a Path,
}

impl<'a> WeightLog<'a> {
    pub(super) fn new(path: &'a Path) -> Self {
        Self { path }
    }

    /// Appends a timestamped sample and rewrites the whole file. An
    /// unparseable existing file is reported as `Corrupt` rather than being
    /// silently reset; the caller decides whether to delete it.
    pub fn append(&self, weight: f64) -> StoreResult<WeightSample> {
        if !weight.is_finite() {
            return Err(StoreError::InvalidInput(
                "weight must be a finite number".to_string(),
            ));
        }

        let mut file: WeightLogFile = read_json(self.path)?.unwrap_or_default();
        let sample = WeightSample {
            timestamp: now_rfc3339(),
            weight,
        };
        file.samples.push(sample.clone());
        write_json_atomic(self.path, &file)?;
        Ok(sample)
    }

    /// Last `limit` samples in chronological order plus the total count.
    pub fn recent(&self, limit: usize) -> StoreResult<RecentProgress> {
        let samples = self.all()?;
        let total = samples.len();
        let start = total.saturating_sub(limit);
        Ok(RecentProgress {
            samples: samples[start..].to_vec(),
            total,
        })
    }

    /// Every sample in chronological order. `NotFound` when the log file does
    /// not exist, `Empty` when it exists but holds no samples.
    pub fn all(&self) -> StoreResult<Vec<WeightSample>> {
        let file: WeightLogFile = read_json(self.path)?.ok_or(StoreError::NotFound(
            "no weight records yet; log a weight first",
        ))?;
        if file.samples.is_empty() {
            return Err(StoreError::Empty("the weight log has no samples"));
        }
        Ok(file.samples)
    }
}
