use crate::error::Result;
use chrono::{DateTime, TimeZone};
use jobscout_core::{JobRecord, SearchQuery};
use std::fmt;
use std::path::{Path, PathBuf};

/// Writes a finished run to a CSV file.
///
/// Columns follow `JobRecord`'s serialized names:
/// Title, Company, Location, Rating, Date, Salary, Description, Links.
#[derive(Debug, Clone)]
pub struct CsvSink {
    directory: PathBuf,
}

impl CsvSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write `records` to `{timestamp}_{position}_{location}.csv`.
    pub fn write<Tz: TimeZone>(
        &self,
        query: &SearchQuery,
        at: &DateTime<Tz>,
        records: &[JobRecord],
    ) -> Result<PathBuf>
    where
        Tz::Offset: fmt::Display,
    {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(query.output_file_name(at));

        let mut writer = csv::Writer::from_path(&path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), rows = records.len(), "Results saved");
        Ok(path)
    }
}
