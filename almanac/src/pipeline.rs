//! Orchestration of one almanac request: fetch, filter, derive, translate, render.
//!
//! Every failure is converted into a [`PipelineResult`] at this boundary;
//! nothing past [`Pipeline::run`] or [`Pipeline::process`] returns an error.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::render::render;
use crate::core::schema::{SchemaNode, filter};
use crate::core::sexagenary::{InvalidCodeError, void_branches_for_code};
use crate::core::translate::{KeyMap, translate};
use crate::core::types::{OutputFormat, PipelineResult, ResultData};
use crate::io::config::AlmanacConfig;
use crate::io::fetch::{FetchError, FetchedRecord, Fetcher};

/// Key under which the day's void branches are added before translation.
pub const VOID_BRANCHES_KEY: &str = "空亡";

/// Date format accepted by [`Pipeline::process`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    InvalidCode(#[from] InvalidCodeError),
}

/// Field whitelist, labels and output shape shared by every request.
#[derive(Debug, Clone)]
pub struct Pipeline {
    schema: SchemaNode,
    key_map: KeyMap,
    format: OutputFormat,
}

impl Pipeline {
    pub fn new(schema: SchemaNode, key_map: KeyMap) -> Self {
        Self {
            schema,
            key_map,
            format: OutputFormat::Text,
        }
    }

    pub fn from_config(cfg: &AlmanacConfig) -> Self {
        Self::new(cfg.fields.clone(), cfg.key_map()).with_format(cfg.output.format)
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Filter `raw`, add the void branches of its day pillar, and translate keys.
    ///
    /// A non-mapping upstream body is returned as received. A schema that drops
    /// the whole record yields an empty mapping.
    pub fn transform(&self, raw: Value) -> Result<Value, PipelineError> {
        if !raw.is_object() {
            debug!("upstream body is not a mapping; passing through");
            return Ok(raw);
        }

        let mut filtered = match filter(raw, &self.schema) {
            Some(Value::Object(map)) => map,
            Some(_) | None => Map::new(),
        };
        debug!(keys = filtered.len(), "record filtered");

        if let Some(code) = day_pillar(&filtered)? {
            let voids = void_branches_for_code(&code)?;
            debug!(day = %code, void_branches = %voids, "void branches derived");
            filtered.insert(VOID_BRANCHES_KEY.to_string(), Value::String(voids));
        }

        Ok(translate(Value::Object(filtered), &self.key_map))
    }

    /// Run a fetched record through the pipeline and package the result.
    pub fn run(&self, fetched: FetchedRecord) -> PipelineResult {
        match self.transform(fetched.record) {
            Ok(translated) => PipelineResult::success(fetched.status, self.package(translated)),
            Err(err) => failure(&err),
        }
    }

    /// Validate `date`, fetch its record through `fetcher`, and run the pipeline.
    pub fn process<F: Fetcher + ?Sized>(&self, fetcher: &F, date: &str) -> PipelineResult {
        let date = match parse_date(date) {
            Ok(date) => date,
            Err(err) => return failure(&err),
        };
        match fetcher.fetch(&date) {
            Ok(fetched) => self.run(fetched),
            Err(err) => failure(&PipelineError::from(err)),
        }
    }

    fn package(&self, translated: Value) -> ResultData {
        match self.format {
            OutputFormat::Text => ResultData::Text(render(&translated)),
            OutputFormat::Json => ResultData::Record(translated),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_config(&AlmanacConfig::default())
    }
}

/// Normalize a `YYYY-MM-DD` date string.
pub fn parse_date(date: &str) -> Result<String, PipelineError> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map(|parsed| parsed.format(DATE_FORMAT).to_string())
        .map_err(|_| PipelineError::InvalidDate(date.to_string()))
}

/// The `ganZhi.day` code of a filtered record, if the field survived filtering.
fn day_pillar(filtered: &Map<String, Value>) -> Result<Option<String>, InvalidCodeError> {
    let Some(day) = filtered.get("ganZhi").and_then(|gan_zhi| gan_zhi.get("day")) else {
        return Ok(None);
    };
    match day {
        Value::String(code) => Ok(Some(code.trim().to_string())),
        other => Err(InvalidCodeError {
            code: other.to_string(),
            reason: "day pillar is not a string".to_string(),
        }),
    }
}

fn failure(err: &PipelineError) -> PipelineResult {
    warn!(error = %err, "almanac pipeline failed");
    PipelineResult::failure(err.to_string())
}
