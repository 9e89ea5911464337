use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const REDFLOWER_DIR_NAME: &str = ".redflower";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_MIN_COUNT: u32 = 3;
pub const DEFAULT_UNIT_SUFFIX: &str = "朵小红花";
pub const DEFAULT_OUTPUT_DIR: &str = "redflower-output";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    #[default]
    LastWins,
    Reject,
}

impl DuplicatePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastWins => "last_wins",
            Self::Reject => "reject",
        }
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "last_wins" => Ok(Self::LastWins),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "invalid duplicate policy '{other}', expected one of: last_wins, reject"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid output format '{other}', expected one of: csv, json"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RedflowerConfig {
    #[serde(default)]
    pub events: EventColumns,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub narrative: NarrativeConfig,
}

/// Header labels of the required event-table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventColumns {
    pub recipient_id: String,
    pub sender_id: String,
    pub recipient_name: String,
}

impl Default for EventColumns {
    fn default() -> Self {
        Self {
            recipient_id: "收花人系统号".to_owned(),
            sender_id: "送花人系统号".to_owned(),
            recipient_name: "收花人姓名".to_owned(),
        }
    }
}

impl EventColumns {
    pub fn required(&self) -> [&str; 3] {
        [&self.recipient_id, &self.sender_id, &self.recipient_name]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub employee_id: String,
    pub org_level3: String,
    pub org_level4: String,
    pub alias: String,
    pub duplicate_ids: DuplicatePolicy,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            employee_id: "员工系统号".to_owned(),
            org_level3: "三级组织".to_owned(),
            org_level4: "四级组织".to_owned(),
            alias: "花名".to_owned(),
            duplicate_ids: DuplicatePolicy::LastWins,
        }
    }
}

impl RosterConfig {
    pub fn required(&self) -> [&str; 4] {
        [
            &self.employee_id,
            &self.org_level3,
            &self.org_level4,
            &self.alias,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
    pub format: OutputFormat,
    pub columns: OutputColumns,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIR.to_owned(),
            format: OutputFormat::Csv,
            columns: OutputColumns::default(),
        }
    }
}

/// Header labels of columns the pipeline derives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputColumns {
    pub recipient_org3: String,
    pub recipient_org4: String,
    pub recipient_alias: String,
    pub sender_org3: String,
    pub sender_org4: String,
    pub count: String,
    pub count_label: String,
    pub roster_text: String,
    pub org3: String,
    pub total: String,
}

impl Default for OutputColumns {
    fn default() -> Self {
        Self {
            recipient_org3: "收花人三级组织".to_owned(),
            recipient_org4: "收花人四级组织".to_owned(),
            recipient_alias: "收花人花名".to_owned(),
            sender_org3: "送花人三级组织".to_owned(),
            sender_org4: "送花人四级组织".to_owned(),
            count: "收花次数".to_owned(),
            count_label: "小红花".to_owned(),
            roster_text: "名单".to_owned(),
            org3: "三级组织".to_owned(),
            total: "收花总数".to_owned(),
        }
    }
}

impl OutputColumns {
    /// Labels inserted into the enriched events table.
    pub fn enrichment_labels(&self) -> [&str; 5] {
        [
            &self.recipient_org3,
            &self.recipient_org4,
            &self.recipient_alias,
            &self.sender_org3,
            &self.sender_org4,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub min_count: u32,
    pub unit_suffix: String,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            min_count: DEFAULT_MIN_COUNT,
            unit_suffix: DEFAULT_UNIT_SUFFIX.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to serialize config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub fn redflower_dir(workspace_root: impl AsRef<Path>) -> PathBuf {
    workspace_root.as_ref().join(REDFLOWER_DIR_NAME)
}

pub fn config_path(workspace_root: impl AsRef<Path>) -> PathBuf {
    redflower_dir(workspace_root).join(CONFIG_FILE_NAME)
}

pub fn load_workspace_config(
    workspace_root: impl AsRef<Path>,
) -> Result<RedflowerConfig, ConfigError> {
    let path = config_path(workspace_root);
    if !path.exists() {
        return Ok(RedflowerConfig::default());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: RedflowerConfig = toml::from_str(&raw)?;
    Ok(normalize_config(parsed))
}

pub fn ensure_workspace_config(
    workspace_root: impl AsRef<Path>,
) -> Result<RedflowerConfig, ConfigError> {
    let workspace_root = workspace_root.as_ref();
    if config_path(workspace_root).exists() {
        return load_workspace_config(workspace_root);
    }

    let config = RedflowerConfig::default();
    write_workspace_config(workspace_root, &config)?;
    Ok(config)
}

pub fn write_workspace_config(
    workspace_root: impl AsRef<Path>,
    config: &RedflowerConfig,
) -> Result<PathBuf, ConfigError> {
    let workspace_root = workspace_root.as_ref();
    fs::create_dir_all(redflower_dir(workspace_root))?;

    let path = config_path(workspace_root);
    let content = toml::to_string_pretty(config)?;
    fs::write(&path, content)?;
    Ok(path)
}

pub fn validate_config(config: &RedflowerConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.narrative.min_count == 0 {
        warnings.push(ConfigWarning {
            code: "narrative_min_count_zero",
            message: "[narrative].min_count = 0 includes every recipient; counts start at 1"
                .to_owned(),
        });
    }

    if config.narrative.unit_suffix.is_empty() {
        warnings.push(ConfigWarning {
            code: "narrative_unit_suffix_empty",
            message: "[narrative].unit_suffix is empty; count labels will be bare numbers"
                .to_owned(),
        });
    }

    if let Some(label) = first_duplicate(config.events.required()) {
        warnings.push(ConfigWarning {
            code: "events_duplicate_label",
            message: format!("[events] maps more than one column to '{label}'"),
        });
    }

    if let Some(label) = first_duplicate(config.roster.required()) {
        warnings.push(ConfigWarning {
            code: "roster_duplicate_label",
            message: format!("[roster] maps more than one column to '{label}'"),
        });
    }

    let event_labels: HashSet<&str> = config.events.required().into_iter().collect();
    for label in config.output.columns.enrichment_labels() {
        if event_labels.contains(label) {
            warnings.push(ConfigWarning {
                code: "output_label_collision",
                message: format!(
                    "[output.columns] label '{label}' is also an [events] column; enrichment will fail"
                ),
            });
        }
    }

    warnings
}

fn first_duplicate<'a>(labels: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    labels.into_iter().find(|label| !seen.insert(*label))
}

fn normalize_label(value: &mut String, fallback: &str) {
    let trimmed = value.trim();
    *value = if trimmed.is_empty() {
        fallback.to_owned()
    } else {
        trimmed.to_owned()
    };
}

fn normalize_config(mut config: RedflowerConfig) -> RedflowerConfig {
    let events = EventColumns::default();
    normalize_label(&mut config.events.recipient_id, &events.recipient_id);
    normalize_label(&mut config.events.sender_id, &events.sender_id);
    normalize_label(&mut config.events.recipient_name, &events.recipient_name);

    let roster = RosterConfig::default();
    normalize_label(&mut config.roster.employee_id, &roster.employee_id);
    normalize_label(&mut config.roster.org_level3, &roster.org_level3);
    normalize_label(&mut config.roster.org_level4, &roster.org_level4);
    normalize_label(&mut config.roster.alias, &roster.alias);

    let columns = OutputColumns::default();
    let out = &mut config.output.columns;
    normalize_label(&mut out.recipient_org3, &columns.recipient_org3);
    normalize_label(&mut out.recipient_org4, &columns.recipient_org4);
    normalize_label(&mut out.recipient_alias, &columns.recipient_alias);
    normalize_label(&mut out.sender_org3, &columns.sender_org3);
    normalize_label(&mut out.sender_org4, &columns.sender_org4);
    normalize_label(&mut out.count, &columns.count);
    normalize_label(&mut out.count_label, &columns.count_label);
    normalize_label(&mut out.roster_text, &columns.roster_text);
    normalize_label(&mut out.org3, &columns.org3);
    normalize_label(&mut out.total, &columns.total);

    normalize_label(&mut config.output.directory, DEFAULT_OUTPUT_DIR);
    config.narrative.unit_suffix = config.narrative.unit_suffix.trim().to_owned();

    config
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn ensure_workspace_config_creates_default_file() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path();

        let config = ensure_workspace_config(workspace).expect("ensure config");

        assert_eq!(config.narrative.min_count, DEFAULT_MIN_COUNT);
        assert_eq!(config.roster.duplicate_ids, DuplicatePolicy::LastWins);
        assert!(config_path(workspace).exists());

        let content = fs::read_to_string(config_path(workspace)).expect("read config file");
        assert!(content.contains("[narrative]"));
        assert!(content.contains("duplicate_ids = \"last_wins\""));
        assert!(content.contains("[output.columns]"));
    }

    #[test]
    fn load_workspace_config_defaults_when_missing() {
        let temp = tempdir().expect("tempdir");

        let config = load_workspace_config(temp.path()).expect("load config");

        assert_eq!(config, RedflowerConfig::default());
        assert!(!config_path(temp.path()).exists());
    }

    #[test]
    fn load_workspace_config_parses_partial_sections() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path();
        fs::create_dir_all(redflower_dir(workspace)).expect("create .redflower");

        let raw = r#"
[events]
recipient_id = " recipient_id "
sender_id = "sender_id"

[roster]
alias = ""
duplicate_ids = "reject"

[output]
format = "json"

[output.columns]
count = "count"

[narrative]
min_count = 5
"#;
        fs::write(config_path(workspace), raw).expect("write config");

        let config = load_workspace_config(workspace).expect("load config");

        assert_eq!(config.events.recipient_id, "recipient_id");
        assert_eq!(config.events.sender_id, "sender_id");
        assert_eq!(config.events.recipient_name, "收花人姓名");
        assert_eq!(config.roster.alias, "花名");
        assert_eq!(config.roster.duplicate_ids, DuplicatePolicy::Reject);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.directory, DEFAULT_OUTPUT_DIR);
        assert_eq!(config.output.columns.count, "count");
        assert_eq!(config.output.columns.total, "收花总数");
        assert_eq!(config.narrative.min_count, 5);
        assert_eq!(config.narrative.unit_suffix, DEFAULT_UNIT_SUFFIX);
    }

    #[test]
    fn load_workspace_config_rejects_unknown_policy() {
        let temp = tempdir().expect("tempdir");
        let workspace = temp.path();
        fs::create_dir_all(redflower_dir(workspace)).expect("create .redflower");
        fs::write(
            config_path(workspace),
            "[roster]\nduplicate_ids = \"first_wins\"\n",
        )
        .expect("write config");

        let err = load_workspace_config(workspace).expect_err("expected parse error");
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn validate_config_is_quiet_for_defaults() {
        assert!(validate_config(&RedflowerConfig::default()).is_empty());
    }

    #[test]
    fn validate_config_flags_zero_threshold_and_label_collisions() {
        let mut config = RedflowerConfig::default();
        config.narrative.min_count = 0;
        config.events.sender_id = config.events.recipient_id.clone();
        config.output.columns.recipient_alias = config.events.recipient_name.clone();

        let codes = validate_config(&config)
            .into_iter()
            .map(|warning| warning.code)
            .collect::<Vec<_>>();

        assert_eq!(
            codes,
            vec![
                "narrative_min_count_zero",
                "events_duplicate_label",
                "output_label_collision",
            ]
        );
    }

    #[test]
    fn policy_and_format_parse_from_strings() {
        assert_eq!("reject".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Reject));
        assert_eq!(" json ".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }
}
