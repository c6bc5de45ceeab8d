use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::dialect::Dialect;
use crate::error::{WeaveError, WeaveResult};

/// Settings for a [`Connection`](super::Connection).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use sqlweave::{ConnectionConfig, Dialect};
///
/// let config = ConnectionConfig::from_json(r#"{ "dialect": "pgsql" }"#).unwrap();
/// assert_eq!(config.dialect, Dialect::Pgsql);
/// assert!(config.wrap_inserts_in_transaction);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Dialect statements are compiled for.
    pub dialect: Dialect,
    /// Emit every executed statement on the `sqlweave.sql` target.
    pub log_sql: bool,
    /// Level of the SQL log events (`"trace"` .. `"error"`).
    pub log_level: String,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    pub max_sql_log_length: Option<usize>,
    /// Run an INSERT issued outside a transaction inside its own
    /// transaction, so the generated id is read on the same session.
    pub wrap_inserts_in_transaction: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            log_sql: true,
            log_level: "debug".to_string(),
            max_sql_log_length: Some(200),
            wrap_inserts_in_transaction: true,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> WeaveResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level.as_str().to_ascii_lowercase();
        self
    }

    pub fn with_max_sql_log_length(mut self, len: Option<usize>) -> Self {
        self.max_sql_log_length = len;
        self
    }

    pub fn with_wrap_inserts_in_transaction(mut self, wrap: bool) -> Self {
        self.wrap_inserts_in_transaction = wrap;
        self
    }

    /// The configured log level.
    pub fn level(&self) -> WeaveResult<Level> {
        self.log_level
            .parse()
            .map_err(|_| WeaveError::Config(format!("unknown log level \"{}\"", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.dialect, Dialect::Sql);
        assert_eq!(config.level().unwrap(), Level::DEBUG);
        assert_eq!(config.max_sql_log_length, Some(200));
    }

    #[test]
    fn test_from_json_partial() {
        let config = ConnectionConfig::from_json(
            r#"{ "dialect": "mysql", "log_level": "info", "max_sql_log_length": null }"#,
        )
        .unwrap();
        assert_eq!(config.dialect, Dialect::Mysql);
        assert_eq!(config.level().unwrap(), Level::INFO);
        assert_eq!(config.max_sql_log_length, None);
        assert!(config.log_sql);
    }

    #[test]
    fn test_from_json_errors() {
        let err = ConnectionConfig::from_json(r#"{ "dialect": "oracle" }"#).unwrap_err();
        assert!(matches!(err, WeaveError::Config(_)));
        assert!(ConnectionConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_bad_level() {
        let config = ConnectionConfig {
            log_level: "loud".into(),
            ..Default::default()
        };
        assert!(matches!(config.level(), Err(WeaveError::Config(_))));
    }

    #[test]
    fn test_builder_round_trip() {
        let config = ConnectionConfig::new()
            .with_dialect(Dialect::Pgsql)
            .with_log_level(Level::WARN)
            .with_wrap_inserts_in_transaction(false);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ConnectionConfig::from_json(&json).unwrap(), config);
        assert_eq!(config.log_level, "warn");
    }
}
