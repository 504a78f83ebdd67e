//! Pipeline configuration stored in `almanac.toml`.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::core::schema::{SchemaNode, default_schema};
use crate::core::translate::{KeyMap, default_key_map};
use crate::core::types::OutputFormat;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "almanac.toml";

/// Almanac configuration (TOML).
///
/// Meant to be edited by hand. Missing sections fall back to the built-in
/// upstream, field set and labels.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlmanacConfig {
    pub upstream: UpstreamConfig,

    pub output: OutputConfig,

    pub context: ContextConfig,

    /// Field whitelist applied to every upstream record.
    pub fields: SchemaNode,

    /// Labels merged over the built-in key map.
    pub labels: KeyMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Almanac endpoint; the date is sent as the `date` query parameter.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContextConfig {
    /// Drop a user's buffered messages after this many idle seconds.
    pub expiry_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.mingdecode.com/api/almanac".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            expiry_secs: 30 * 60,
        }
    }
}

impl ContextConfig {
    pub fn expiry(&self) -> TimeDelta {
        i64::try_from(self.expiry_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Default for AlmanacConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            output: OutputConfig::default(),
            context: ContextConfig::default(),
            fields: default_schema(),
            labels: KeyMap::new(),
        }
    }
}

impl AlmanacConfig {
    pub fn validate(&self) -> Result<()> {
        let base_url = self.upstream.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow!("upstream.base_url must not be empty"));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow!("upstream.base_url must be an http(s) URL"));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(anyhow!("upstream.timeout_secs must be > 0"));
        }
        if self.context.expiry_secs == 0 {
            return Err(anyhow!("context.expiry_secs must be > 0"));
        }
        Ok(())
    }

    /// Built-in labels with the configured `[labels]` applied on top.
    pub fn key_map(&self) -> KeyMap {
        default_key_map().merged(&self.labels)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AlmanacConfig::default()`.
pub fn load_config(path: &Path) -> Result<AlmanacConfig> {
    if !path.exists() {
        let cfg = AlmanacConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AlmanacConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Commented default config written by `almanac init`.
///
/// Inline tables keep the field order, which is also the output order.
pub const DEFAULT_CONFIG_TOML: &str = r#"# Almanac pipeline configuration.

[upstream]
base_url = "https://www.mingdecode.com/api/almanac"
timeout_secs = 10

[output]
# "text" for flattened plaintext, "json" for the translated record.
format = "text"

[context]
# Buffered chat messages are dropped after this many idle seconds.
expiry_secs = 1800

# Field whitelist: true keeps a subtree, false drops it, a table descends.
[fields]
solar = false
lunar = true
ganZhi = { year = true, month = true, day = true, time = false, timeZhi = false }
zodiac = false
yiJi = false
info = true
hours = false
positions = false
bottom = { jiShen = true, taiShen = false, xiu = true, xiuLuck = true, zhiXing = true, liuYao = true, yueXiang = false, xiongSha = true }

# Extra or replacement display labels, merged over the built-in ones.
[labels]
"#;

/// Write [`DEFAULT_CONFIG_TOML`] to `path` unless it exists (or `force` is set).
///
/// Returns whether the file was written.
pub fn init_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    write_atomic(path, DEFAULT_CONFIG_TOML)?;
    Ok(true)
}

/// Atomically write config to disk (temp file + rename).
///
/// `[fields]` entries are written as inline tables so the field order, which
/// is also the output order, survives a reload.
pub fn write_config(path: &Path, cfg: &AlmanacConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = String::new();
    if !matches!(cfg.fields, SchemaNode::Fields(_)) {
        writeln!(buf, "fields = {}", toml_value(&cfg.fields)?)?;
        buf.push('\n');
    }

    let sections = ConfigSections {
        upstream: &cfg.upstream,
        output: &cfg.output,
        context: &cfg.context,
    };
    buf.push_str(&toml::to_string_pretty(&sections).context("serialize config toml")?);

    if let SchemaNode::Fields(fields) = &cfg.fields {
        buf.push_str("\n[fields]\n");
        for (key, node) in fields {
            writeln!(buf, "{} = {}", toml_key(key), toml_value(node)?)?;
        }
    }

    let labels = LabelsSection {
        labels: &cfg.labels,
    };
    buf.push('\n');
    buf.push_str(&toml::to_string_pretty(&labels).context("serialize labels toml")?);
    write_atomic(path, &buf)
}

#[derive(Serialize)]
struct ConfigSections<'a> {
    upstream: &'a UpstreamConfig,
    output: &'a OutputConfig,
    context: &'a ContextConfig,
}

#[derive(Serialize)]
struct LabelsSection<'a> {
    labels: &'a KeyMap,
}

fn toml_value(node: &SchemaNode) -> Result<toml::Value> {
    toml::Value::try_from(node).context("serialize field schema")
}

/// `key` bare when TOML allows it, quoted otherwise.
fn toml_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        toml::Value::String(key.to_string()).to_string()
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, AlmanacConfig::default());
    }

    #[test]
    fn init_then_load_matches_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("almanac.toml");
        assert!(init_config(&path, false).expect("init"));
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, AlmanacConfig::default());
    }

    #[test]
    fn default_template_keeps_field_order() {
        let cfg: AlmanacConfig = toml::from_str(DEFAULT_CONFIG_TOML).expect("parse");
        let SchemaNode::Fields(fields) = cfg.fields else {
            panic!("fields must be a table");
        };
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "solar", "lunar", "ganZhi", "zodiac", "yiJi", "info", "hours", "positions",
                "bottom"
            ]
        );
    }

    #[test]
    fn init_does_not_overwrite_without_force() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("almanac.toml");
        fs::write(&path, "[output]\nformat = \"json\"\n").expect("write");
        assert!(!init_config(&path, false).expect("init"));
        assert_eq!(load_config(&path).expect("load").output.format, OutputFormat::Json);
        assert!(init_config(&path, true).expect("init force"));
        assert_eq!(load_config(&path).expect("load").output.format, OutputFormat::Text);
    }

    #[test]
    fn partial_file_keeps_defaults_and_reads_fields() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("almanac.toml");
        fs::write(
            &path,
            "[output]\nformat = \"json\"\n\n[fields]\nlunar = true\n\n[labels]\nlunar = \"阴历\"\n",
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert_eq!(cfg.upstream, UpstreamConfig::default());
        assert_eq!(cfg.fields, SchemaNode::fields([("lunar", SchemaNode::Keep)]));
        assert_eq!(cfg.key_map().label("lunar"), "阴历");
        assert_eq!(cfg.key_map().label("ganZhi"), "干支");
    }

    #[test]
    fn write_then_load_keeps_nested_field_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("almanac.toml");
        let mut cfg = AlmanacConfig::default();
        cfg.output.format = OutputFormat::Json;
        cfg.upstream.timeout_secs = 3;
        cfg.labels = [("lunar", "阴历"), ("day of week", "周几")].into_iter().collect();

        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
        assert!(!temp.path().join("nested").join("almanac.toml.tmp").exists());

        let SchemaNode::Fields(fields) = loaded.fields else {
            panic!("fields must be a table");
        };
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "solar", "lunar", "ganZhi", "zodiac", "yiJi", "info", "hours", "positions",
                "bottom"
            ]
        );
        let Some(SchemaNode::Fields(bottom)) = fields.get("bottom") else {
            panic!("bottom must be a table");
        };
        assert_eq!(bottom.keys().next().map(String::as_str), Some("jiShen"));
    }

    #[test]
    fn write_config_handles_root_flag_schema() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("almanac.toml");
        let cfg = AlmanacConfig {
            fields: SchemaNode::Keep,
            ..AlmanacConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        assert_eq!(load_config(&path).expect("load").fields, SchemaNode::Keep);
    }

    #[test]
    fn write_config_rejects_invalid_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("almanac.toml");
        let mut cfg = AlmanacConfig::default();
        cfg.upstream.timeout_secs = 0;
        assert!(write_config(&path, &cfg).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn validate_rejects_zero_timeout_and_bad_url() {
        let mut cfg = AlmanacConfig::default();
        cfg.upstream.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AlmanacConfig::default();
        cfg.upstream.base_url = "ftp://example.com".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = AlmanacConfig::default();
        cfg.context.expiry_secs = 0;
        assert!(cfg.validate().is_err());
    }
}
