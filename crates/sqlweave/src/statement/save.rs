//! INSERT/UPDATE statement builder.

use crate::error::{WeaveError, WeaveResult};
use crate::expression::SourceExpr;
use crate::statement::conditions::Conditions;
use crate::value::Value;

/// One row of data: field names mapped to values, in insertion order.
///
/// NULL values are kept; they compile to a bound `NULL` parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTuple {
    entries: Vec<(String, Value)>,
}

impl DataTuple {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`, replacing an earlier value in place.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(f, _)| f.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether both tuples name the same fields, in any order.
    pub fn same_fields(&self, other: &DataTuple) -> bool {
        self.len() == other.len() && self.fields().all(|f| other.get(f).is_some())
    }

    /// Build a tuple from a JSON object. Nested arrays/objects are kept as JSON values.
    pub fn from_json(json: serde_json::Value) -> WeaveResult<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, Value::from_json(v)))
                .collect()),
            other => Err(WeaveError::malformed(
                other.to_string(),
                "data tuple must be a JSON object",
            )),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DataTuple {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tuple = DataTuple::new();
        for (k, v) in iter {
            tuple.insert(k, v);
        }
        tuple
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for DataTuple {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for DataTuple {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// INSERT/UPDATE statement builder.
///
/// Without conditions it compiles to a (multi-row) INSERT; with conditions
/// it compiles to an UPDATE of exactly one data tuple.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Save {
    sources: Vec<SourceExpr>,
    data: Vec<DataTuple>,
    conditions: Conditions,
    error: Option<WeaveError>,
}

impl Save {
    pub fn new() -> Self {
        Self::default()
    }

    condition_methods!();

    /// Append one data tuple.
    pub fn data(mut self, tuple: impl Into<DataTuple>) -> Self {
        self.data.push(tuple.into());
        self.check_update_arity();
        self
    }

    /// Append several data tuples (one row each on INSERT).
    pub fn data_set<T, I>(mut self, tuples: I) -> Self
    where
        T: Into<DataTuple>,
        I: IntoIterator<Item = T>,
    {
        self.data.extend(tuples.into_iter().map(Into::into));
        self.check_update_arity();
        self
    }

    /// Append data from JSON: an object is one tuple, an array of objects is many.
    pub fn data_json(mut self, json: serde_json::Value) -> Self {
        let tuples = match json {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(DataTuple::from_json)
                .collect::<WeaveResult<Vec<_>>>(),
            other => DataTuple::from_json(other).map(|t| vec![t]),
        };
        match tuples {
            Ok(tuples) => {
                self.data.extend(tuples);
                self.check_update_arity();
            }
            Err(err) => self.record(Err(err)),
        }
        self
    }

    fn check_update_arity(&mut self) {
        if self.is_update() && self.data.len() > 1 {
            self.record(Err(WeaveError::unsupported(format!(
                "UPDATE accepts exactly one data tuple, got {}",
                self.data.len()
            ))));
        }
    }

    /// Whether this compiles to UPDATE (conditions present) rather than INSERT.
    pub fn is_update(&self) -> bool {
        !self.conditions.wheres().is_empty()
    }

    pub fn data_tuples(&self) -> &[DataTuple] {
        &self.data
    }
}
