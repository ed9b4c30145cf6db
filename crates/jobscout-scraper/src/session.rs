use chrono::{DateTime, Local};
use jobscout_core::{JobRecord, SearchQuery};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// State of one scrape run, owned by the orchestrator.
#[derive(Debug)]
pub struct ScrapeSession {
    pub run_id: Uuid,
    pub query: SearchQuery,
    pub target_count: usize,
    pub started_at: DateTime<Local>,
    records: Vec<JobRecord>,
    started: Instant,
}

impl ScrapeSession {
    pub fn new(query: SearchQuery, target_count: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            query,
            target_count,
            started_at: Local::now(),
            records: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn push(&mut self, record: JobRecord) {
        self.records.push(record);
    }

    pub fn collected(&self) -> usize {
        self.records.len()
    }

    pub fn is_target_reached(&self) -> bool {
        self.records.len() >= self.target_count
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    /// Drop the records at `indices`, keeping the order of the rest.
    pub fn remove_indices(&mut self, indices: &HashSet<usize>) -> usize {
        let before = self.records.len();
        let mut index = 0;
        self.records.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });
        before - self.records.len()
    }

    /// Set descriptions positionally; `descriptions` must already be aligned.
    pub fn assign_descriptions(&mut self, descriptions: Vec<String>) {
        for (record, description) in self.records.iter_mut().zip(descriptions) {
            record.description = description;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn into_records(self) -> Vec<JobRecord> {
        self.records
    }
}

/// Pad with empty strings or truncate so `descriptions.len() == len`.
pub fn align_descriptions(mut descriptions: Vec<String>, len: usize) -> Vec<String> {
    descriptions.resize(len, String::new());
    descriptions
}
