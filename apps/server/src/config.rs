use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ledger_app::{AppConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy};
use ledger_core::{DEFAULT_TABLE_COUNT, DEFAULT_TOLERANCE_MINUTES, RecordDay};
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DB_PATH: &str = "billiard-ledger.sqlite";

/// Resolved server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub database: PathBuf,
    pub port: u16,
    pub table_count: u32,
    pub tolerance_minutes: i64,
    pub allowed_origins: Vec<String>,
    pub api_token: Option<String>,
    pub record_day: RecordDay,
    pub retry_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DB_PATH),
            port: DEFAULT_PORT,
            table_count: DEFAULT_TABLE_COUNT,
            tolerance_minutes: DEFAULT_TOLERANCE_MINUTES,
            allowed_origins: Vec::new(),
            api_token: None,
            record_day: RecordDay::default(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl ServerConfig {
    pub fn app_config(&self) -> AppConfig {
        let mut config = AppConfig::new(self.database.clone());
        config.table_count = self.table_count;
        config.tolerance_minutes = self.tolerance_minutes;
        config.record_day = self.record_day;
        config.retry = RetryPolicy::new(DEFAULT_MAX_ATTEMPTS, self.retry_delay);
        config
    }

    /// Applies one raw setting, keeping the current value and recording a
    /// warning when the input is invalid.
    fn apply(&mut self, key: &str, raw: &str, warnings: &mut Vec<String>) {
        let value = raw.trim();
        match key {
            "database" => {
                if value.is_empty() {
                    warnings.push("empty database path ignored".to_string());
                } else {
                    self.database = PathBuf::from(value);
                }
            }
            "port" => self.port = resolve_port(value, warnings),
            "num_tables" => match value.parse::<u32>() {
                Ok(count) if count > 0 => self.table_count = count,
                _ => warnings.push(format!(
                    "invalid table count {value:?}, using {}",
                    self.table_count
                )),
            },
            "tolerance_minutes" => match value.parse::<i64>() {
                Ok(minutes) if minutes >= 0 => self.tolerance_minutes = minutes,
                _ => warnings.push(format!(
                    "invalid duration tolerance {value:?}, using {}",
                    self.tolerance_minutes
                )),
            },
            "allowed_origins" => {
                self.allowed_origins = value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "api_token" => {
                self.api_token = (!value.is_empty()).then(|| value.to_string());
            }
            "record_day" => match RecordDay::parse(value) {
                Some(policy) => self.record_day = policy,
                None => warnings.push(format!(
                    "invalid record day policy {value:?}, using {:?}",
                    self.record_day
                )),
            },
            "retry_delay_ms" => match value.parse::<u64>() {
                Ok(millis) => self.retry_delay = Duration::from_millis(millis),
                Err(_) => warnings.push(format!(
                    "invalid retry delay {value:?}, using {} ms",
                    self.retry_delay.as_millis()
                )),
            },
            _ => {}
        }
    }
}

/// Parses a listen port, falling back to the default outside `1..=65535`.
pub fn resolve_port(raw: &str, warnings: &mut Vec<String>) -> u16 {
    match raw.trim().parse::<i64>() {
        Ok(port) if (1..=65535).contains(&port) => port as u16,
        _ => {
            warnings.push(format!(
                "invalid port {raw:?}, falling back to {DEFAULT_PORT}"
            ));
            DEFAULT_PORT
        }
    }
}

/// On-disk settings. Every field is optional and validated like its
/// environment counterpart.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    database: Option<String>,
    port: Option<toml::Value>,
    num_tables: Option<toml::Value>,
    tolerance_minutes: Option<toml::Value>,
    allowed_origins: Option<Vec<String>>,
    api_token: Option<String>,
    record_day: Option<String>,
    retry_delay_ms: Option<toml::Value>,
}

impl FileConfig {
    fn entries(self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                entries.push((key, value));
            }
        };
        push("database", self.database);
        push("port", self.port.map(raw_value));
        push("num_tables", self.num_tables.map(raw_value));
        push("tolerance_minutes", self.tolerance_minutes.map(raw_value));
        push(
            "allowed_origins",
            self.allowed_origins.map(|origins| origins.join(",")),
        );
        push("api_token", self.api_token);
        push("record_day", self.record_day);
        push("retry_delay_ms", self.retry_delay_ms.map(raw_value));
        entries
    }
}

fn raw_value(value: toml::Value) -> String {
    match value {
        toml::Value::String(text) => text,
        other => other.to_string(),
    }
}

const ENV_KEYS: &[(&str, &str)] = &[
    ("LEDGER_DATABASE", "database"),
    ("PORT", "port"),
    ("NUM_TABLES", "num_tables"),
    ("DURATION_TOLERANCE_MINUTES", "tolerance_minutes"),
    ("ALLOWED_ORIGINS", "allowed_origins"),
    ("API_TOKEN", "api_token"),
    ("RECORD_DAY", "record_day"),
    ("RETRY_DELAY_MS", "retry_delay_ms"),
];

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: ServerConfig,
    pub file: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Builds settings from defaults, then the optional TOML file, then the
/// environment as seen through `env`.
pub fn load(
    file: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ConfigLoad, String> {
    let mut config = ServerConfig::default();
    let mut warnings = Vec::new();

    if let Some(path) = file {
        let contents = fs::read_to_string(path)
            .map_err(|err| format!("read config {}: {}", path.display(), err))?;
        let parsed: FileConfig = toml::from_str(&contents)
            .map_err(|err| format!("parse config {}: {}", path.display(), err))?;
        for (key, value) in parsed.entries() {
            config.apply(key, &value, &mut warnings);
        }
    }

    for (var, key) in ENV_KEYS {
        if let Some(value) = env(var) {
            config.apply(key, &value, &mut warnings);
        }
    }

    Ok(ConfigLoad {
        config,
        file: file.map(Path::to_path_buf),
        warnings,
    })
}
