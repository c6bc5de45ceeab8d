//! The boundary to whatever actually runs SQL.
//!
//! sqlweave never talks to a database itself. An [`Executor`] receives the
//! compiled text and parameters and returns rows or affected counts.

use std::future::Future;

use crate::error::WeaveResult;
use crate::value::Value;

/// A trait for anything that can run compiled SQL.
///
/// Implementations are expected to be cheap to share (`&self` methods) and
/// to handle their own connection state. Transaction methods act on that
/// state; the compiled statements themselves carry no transaction info.
pub trait Executor: Send + Sync {
    /// Run a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = WeaveResult<Vec<Row>>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value])
    -> impl Future<Output = WeaveResult<u64>> + Send;

    /// The id generated by the most recent INSERT, if the backend reports one.
    fn last_insert_id(&self) -> impl Future<Output = WeaveResult<Option<Value>>> + Send {
        async { Ok(None) }
    }

    fn begin(&self) -> impl Future<Output = WeaveResult<()>> + Send;

    fn commit(&self) -> impl Future<Output = WeaveResult<()>> + Send;

    fn rollback(&self) -> impl Future<Output = WeaveResult<()>> + Send;
}

impl<E: Executor> Executor for &E {
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = WeaveResult<Vec<Row>>> + Send {
        (**self).query(sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = WeaveResult<u64>> + Send {
        (**self).execute(sql, params)
    }

    fn last_insert_id(&self) -> impl Future<Output = WeaveResult<Option<Value>>> + Send {
        (**self).last_insert_id()
    }

    fn begin(&self) -> impl Future<Output = WeaveResult<()>> + Send {
        (**self).begin()
    }

    fn commit(&self) -> impl Future<Output = WeaveResult<()>> + Send {
        (**self).commit()
    }

    fn rollback(&self) -> impl Future<Output = WeaveResult<()>> + Send {
        (**self).rollback()
    }
}

/// One result row: column names mapped to values, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    /// Value of the first column named `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, v)| v)
    }

    /// Value at a column index.
    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.columns.get(idx).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Result of running a [`Save`](crate::Save).
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// An INSERT ran.
    Inserted {
        affected: u64,
        last_insert_id: Option<Value>,
    },
    /// An UPDATE ran.
    Updated { affected: u64 },
}

impl SaveOutcome {
    pub fn affected(&self) -> u64 {
        match self {
            SaveOutcome::Inserted { affected, .. } | SaveOutcome::Updated { affected } => *affected,
        }
    }

    pub fn last_insert_id(&self) -> Option<&Value> {
        match self {
            SaveOutcome::Inserted { last_insert_id, .. } => last_insert_id.as_ref(),
            SaveOutcome::Updated { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup() {
        let row: Row = vec![("id", Value::Int(1)), ("name", Value::from("a"))]
            .into_iter()
            .collect();
        assert_eq!(row.get("name"), Some(&Value::from("a")));
        assert_eq!(row.get_index(0), Some(&Value::Int(1)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name"]);
    }

    #[test]
    fn test_save_outcome_accessors() {
        let inserted = SaveOutcome::Inserted {
            affected: 2,
            last_insert_id: Some(Value::Int(9)),
        };
        assert_eq!(inserted.affected(), 2);
        assert_eq!(inserted.last_insert_id(), Some(&Value::Int(9)));
        assert_eq!(SaveOutcome::Updated { affected: 1 }.last_insert_id(), None);
    }
}
