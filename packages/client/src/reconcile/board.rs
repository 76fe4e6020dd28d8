//! In-memory copies of the lists a page shows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use hirewire_shared::event::{ApplicationStatusUpdate, JobRecord};

/// Job list shown to users
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobBoard {
    jobs: Vec<JobRecord>,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.jobs.iter().any(|job| job.id == job_id)
    }

    /// Replace the list with a REST snapshot.
    pub fn apply_snapshot(&mut self, jobs: Vec<JobRecord>) {
        self.jobs = jobs;
    }

    /// Prepend a newly posted job. Returns `false` if it is already listed.
    pub fn insert_posted(&mut self, job: JobRecord) -> bool {
        if self.contains(&job.id) {
            return false;
        }
        self.jobs.insert(0, job);
        true
    }

    /// Returns `false` if no job had that id.
    pub fn remove(&mut self, job_id: &str) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|job| job.id != job_id);
        self.jobs.len() != before
    }
}

/// One of the current user's applications, as the REST layer returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedJob {
    #[serde(alias = "_id")]
    pub job_id: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company_name: String,
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppliedJob {
    pub fn new(
        job_id: impl Into<String>,
        job_title: impl Into<String>,
        company_name: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            job_title: job_title.into(),
            company_name: company_name.into(),
            status: status.into(),
            extra: Map::new(),
        }
    }
}

/// The current user's applications
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppliedJobs {
    records: Vec<AppliedJob>,
}

impl AppliedJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[AppliedJob] {
        &self.records
    }

    pub fn get(&self, job_id: &str) -> Option<&AppliedJob> {
        self.records.iter().find(|record| record.job_id == job_id)
    }

    pub fn apply_snapshot(&mut self, records: Vec<AppliedJob>) {
        self.records = records;
    }

    /// Patch the status of a listed application.
    ///
    /// An update for a job that is no longer listed is ignored: the record is
    /// not re-inserted. Returns whether anything was patched.
    pub fn apply_status(&mut self, update: &ApplicationStatusUpdate) -> bool {
        match self
            .records
            .iter_mut()
            .find(|record| record.job_id == update.job_id)
        {
            Some(record) => {
                record.status = update.status.clone();
                true
            }
            None => false,
        }
    }
}

/// Counters on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_jobs: u64,
    #[serde(default)]
    pub total_applications: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Admin dashboard state. Counts only ever come from a refetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminDashboard {
    stats: Option<AdminStats>,
}

impl AdminDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Option<&AdminStats> {
        self.stats.as_ref()
    }

    pub fn apply_snapshot(&mut self, stats: AdminStats) {
        self.stats = Some(stats);
    }
}
