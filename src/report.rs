use std::path::PathBuf;

use crate::storage::{Storage, StoreError, StoreResult, write_bytes_atomic};

const METADATA_MARKER: &str = "METADATO";
const MISSING_PROFILE_SUMMARY: &str = "Perfil no encontrado";

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub path: PathBuf,
    /// Rows written below the CSV header: two metadata rows plus one row per
    /// weight sample.
    pub rows: usize,
}

/// Joins the latest profile snapshot with the full weight log into a flat CSV
/// export. Requires a non-empty weight log; a missing or corrupt profile only
/// degrades the metadata row. The output file is fully overwritten.
pub fn build(storage: &Storage) -> StoreResult<ReportSummary> {
    let samples = storage.weight_log().all()?;

    let profile_summary = match storage.profile().load() {
        Ok(Some(profile)) => profile.summary(),
        Ok(None) | Err(StoreError::Corrupt { .. }) => MISSING_PROFILE_SUMMARY.to_string(),
        Err(err) => return Err(err),
    };

    let generated_on = time::OffsetDateTime::now_utc()
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| String::from("1970-01-01"));

    let path = storage.report_path().to_path_buf();
    let mut writer = csv::Writer::from_writer(Vec::new());
    let write_err = |detail: String| StoreError::Io {
        path: path.clone(),
        detail,
    };

    writer
        .write_record(["fecha", "peso"])
        .map_err(|err| write_err(err.to_string()))?;
    // Metadata rows carry free text in the peso column so the report stays a
    // plain two-column table for downstream consumers.
    let generated_row = format!("Reporte generado: {generated_on}");
    writer
        .write_record([METADATA_MARKER, generated_row.as_str()])
        .map_err(|err| write_err(err.to_string()))?;
    writer
        .write_record([METADATA_MARKER, profile_summary.as_str()])
        .map_err(|err| write_err(err.to_string()))?;
    for sample in &samples {
        let weight = sample.weight.to_string();
        writer
            .write_record([sample.timestamp.as_str(), weight.as_str()])
            .map_err(|err| write_err(err.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| write_err(err.to_string()))?;
    write_bytes_atomic(&path, &bytes)?;

    Ok(ReportSummary {
        path,
        rows: samples.len() + 2,
    })
}
