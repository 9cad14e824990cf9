use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{StoreResult, now_rfc3339, read_json, write_json_atomic};

/// Static per-user attributes, persisted as a single JSON record. Every save
/// overwrites the whole file; there is no partial update and no history.
///
/// Wire keys match the original perfil.json format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "objetivo", skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(rename = "peso", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(rename = "estatura", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(rename = "edad", skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(rename = "sexo", skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(rename = "actividad", skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(rename = "fecha_actualizacion", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Profile {
    /// One-line summary used as report metadata.
    pub fn summary(&self) -> String {
        format!(
            "Objetivo: {}, Actividad: {}",
            self.goal.as_deref().unwrap_or("N/A"),
            self.activity.as_deref().unwrap_or("N/A"),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProfileStore<'a> {
    path: &'a Path,
}

impl<'a> ProfileStore<'a> {
    pub(super) fn new(path: &'a Path) -> Self {
        Self { path }
    }

    /// Stamps `fecha_actualizacion` and overwrites the backing file. Returns
    /// the record as persisted.
    pub fn save(&self, mut profile: Profile) -> StoreResult<Profile> {
        profile.updated_at = Some(now_rfc3339());
        write_json_atomic(self.path, &profile)?;
        Ok(profile)
    }

    /// `Ok(None)` when no profile has been saved yet; `Corrupt` when the file
    /// exists but cannot be parsed.
    pub fn load(&self) -> StoreResult<Option<Profile>> {
        read_json(self.path)
    }
}
