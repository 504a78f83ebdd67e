//! Test-only fixtures and scripted fetchers.

use serde_json::Value;

use crate::io::fetch::{FetchError, FetchedRecord, Fetcher};

const SAMPLE_RECORD: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/almanac_2024-12-26.json"
));

/// Date of [`sample_record`]; its day pillar is `甲子`.
pub const SAMPLE_DATE: &str = "2024-12-26";

/// Path of the sample upstream response on disk.
pub fn sample_record_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("almanac_2024-12-26.json")
}

/// A full upstream almanac response for [`SAMPLE_DATE`].
pub fn sample_record() -> Value {
    serde_json::from_str(SAMPLE_RECORD).expect("sample record fixture should be valid json")
}

/// Fetcher that always returns the same record with status 200.
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    pub record: Value,
}

impl StaticFetcher {
    pub fn new(record: Value) -> Self {
        Self { record }
    }

    pub fn sample() -> Self {
        Self::new(sample_record())
    }
}

impl Fetcher for StaticFetcher {
    fn fetch(&self, _date: &str) -> Result<FetchedRecord, FetchError> {
        Ok(FetchedRecord {
            status: 200,
            record: self.record.clone(),
        })
    }
}

/// Fetcher that always fails with the given upstream status and body.
#[derive(Debug, Clone)]
pub struct FailingFetcher {
    pub status: u16,
    pub body: String,
}

impl FailingFetcher {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

impl Fetcher for FailingFetcher {
    fn fetch(&self, _date: &str) -> Result<FetchedRecord, FetchError> {
        Err(FetchError::Status {
            status: self.status,
            body: self.body.clone(),
        })
    }
}
