//! Artifact store
//!
//! JSON files the CLI passes between invocations, one per stage output, all
//! in a single output directory.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, eyre};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::domain::{BillingRecord, ProjectProfile, Report};

pub const DESCRIPTION_FILE: &str = "project_description.txt";
pub const PROFILE_FILE: &str = "project_profile.json";
pub const BILLING_FILE: &str = "mock_billing.json";
pub const REPORT_FILE: &str = "cost_optimization_report.json";

/// Reads and writes stage artifacts under one directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("Failed to create output directory {}", self.dir.display()))
    }

    fn save_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.path(file);
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, json).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Saved artifact");
        Ok(path)
    }

    fn load_json<T: DeserializeOwned>(&self, file: &str) -> Result<T> {
        let path = self.path(file);
        debug!(path = %path.display(), "ArtifactStore::load_json: called");
        if !path.exists() {
            return Err(eyre!("{} not found; run the earlier stage first", path.display()));
        }
        let content = std::fs::read_to_string(&path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).map_err(|e| eyre!("Failed to parse {}: {}", path.display(), e))
    }

    pub fn save_description(&self, description: &str) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.path(DESCRIPTION_FILE);
        std::fs::write(&path, description).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn save_profile(&self, profile: &ProjectProfile) -> Result<PathBuf> {
        self.save_json(PROFILE_FILE, profile)
    }

    pub fn load_profile(&self) -> Result<ProjectProfile> {
        self.load_json(PROFILE_FILE)
    }

    pub fn save_billing(&self, records: &[BillingRecord]) -> Result<PathBuf> {
        self.save_json(BILLING_FILE, records)
    }

    pub fn load_billing(&self) -> Result<Vec<BillingRecord>> {
        self.load_json(BILLING_FILE)
    }

    pub fn save_report(&self, report: &Report) -> Result<PathBuf> {
        self.save_json(REPORT_FILE, report)
    }

    pub fn load_report(&self) -> Result<Report> {
        self.load_json(REPORT_FILE)
    }
}

/// Read a description argument; `@path` reads the text from a file
pub fn read_description(arg: &str) -> Result<String> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read description from {}", path))?,
        None => arg.to_string(),
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(eyre!("Project description is empty"));
    }
    Ok(text.to_string())
}
