use tracing::Level;

use crate::compiler::Compiled;
use crate::statement::StatementKind;

use super::ConnectionConfig;

/// Emits the SQL a [`Connection`](super::Connection) hands to its executor.
///
/// Events go to the `sqlweave.sql` target at a configurable level.
#[derive(Debug, Clone)]
pub struct SqlLogger {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes, on a char boundary). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlLogger {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl SqlLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_config(config: &ConnectionConfig) -> crate::WeaveResult<Option<Self>> {
        if !config.log_sql {
            return Ok(None);
        }
        Ok(Some(Self {
            level: config.level()?,
            max_sql_length: config.max_sql_log_length,
        }))
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_at_char_boundary(sql, max)),
            _ => sql.to_string(),
        }
    }

    pub fn log(&self, kind: StatementKind, dialect: &str, compiled: &Compiled) {
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(&compiled.sql);
        emit_at_level!(
            self.level,
            target: "sqlweave.sql",
            kind = %kind,
            dialect,
            param_count = compiled.params.len(),
            sql = %sql,
        );
    }
}

fn truncate_at_char_boundary(sql: &str, max: usize) -> &str {
    if sql.len() <= max {
        return sql;
    }
    let mut end = max;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
