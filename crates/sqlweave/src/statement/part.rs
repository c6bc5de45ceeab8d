//! Building blocks shared by the statement builders: where parts, joins and
//! bound values.

use crate::error::{WeaveError, WeaveResult};
use crate::expression::{Clause, SourceExpr};
use crate::statement::Find;
use crate::value::Value;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// How a condition attaches to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concat {
    #[default]
    And,
    Or,
}

impl Concat {
    pub fn as_sql(self) -> &'static str {
        match self {
            Concat::And => "AND",
            Concat::Or => "OR",
        }
    }
}

/// The value bound to a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    /// A single scalar (NULL turns the condition into `IS [NOT] NULL`).
    Value(Value),
    /// A list, expanded into `(?, ?, ...)` for IN / NOT IN.
    List(Vec<Value>),
    /// A sub-select, rendered inline with its parameters spliced in place.
    Query(Box<Find>),
}

impl Bind {
    /// Whether this bind is a scalar NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Bind::Value(Value::Null))
    }
}

/// Convert an input into a [`Bind`].
///
/// Implemented for the scalar types [`Value`] converts from, `Option<T>`,
/// `()` (no value, i.e. NULL), sequences (IN lists) and [`Find`] (sub-select).
pub trait IntoBind {
    fn into_bind(self) -> Bind;
}

macro_rules! impl_into_bind_scalar {
    ($($ty:ty),*) => {
        $(
            impl IntoBind for $ty {
                fn into_bind(self) -> Bind {
                    Bind::Value(Value::from(self))
                }
            }
        )*
    };
}

impl_into_bind_scalar!(
    bool, i8, i16, i32, i64, u8, u16, u32, f32, f64, &str, String, &String, DateTime<Utc>, Uuid,
    serde_json::Value
);

impl IntoBind for Value {
    fn into_bind(self) -> Bind {
        Bind::Value(self)
    }
}

impl IntoBind for Bind {
    fn into_bind(self) -> Bind {
        self
    }
}

impl IntoBind for () {
    fn into_bind(self) -> Bind {
        Bind::Value(Value::Null)
    }
}

impl<T: Into<Value>> IntoBind for Option<T> {
    fn into_bind(self) -> Bind {
        Bind::Value(self.into())
    }
}

impl<T: Into<Value>> IntoBind for Vec<T> {
    fn into_bind(self) -> Bind {
        Bind::List(self.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> IntoBind for &[T] {
    fn into_bind(self) -> Bind {
        Bind::List(self.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> IntoBind for [T; N] {
    fn into_bind(self) -> Bind {
        Bind::List(self.into_iter().map(Into::into).collect())
    }
}

impl IntoBind for Find {
    fn into_bind(self) -> Bind {
        Bind::Query(Box::new(self))
    }
}

/// One condition of a WHERE or JOIN-ON chain.
///
/// The close-bracket count is the only thing that changes after creation: a
/// later `close()` bumps it on the most recently appended part.
#[derive(Debug, Clone, PartialEq)]
pub struct WherePart {
    clause: Clause,
    bind: Bind,
    concat: Concat,
    open: u32,
    close: u32,
}

impl WherePart {
    pub fn new(clause: Clause, bind: Bind, concat: Concat, open: u32) -> Self {
        Self {
            clause,
            bind,
            concat,
            open,
            close: 0,
        }
    }

    /// Parse `expr` and wrap it with its bound value.
    pub fn parse(expr: &str, bind: Bind, concat: Concat, open: u32) -> WeaveResult<Self> {
        Ok(Self::new(Clause::parse(expr)?, bind, concat, open))
    }

    pub fn clause(&self) -> &Clause {
        &self.clause
    }

    pub fn bind(&self) -> &Bind {
        &self.bind
    }

    pub fn concat(&self) -> Concat {
        self.concat
    }

    pub fn open_brackets(&self) -> u32 {
        self.open
    }

    pub fn close_brackets(&self) -> u32 {
        self.close
    }

    pub(crate) fn add_close(&mut self, n: u32) {
        self.close += n;
    }
}

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Cross,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Cross => "CROSS",
        }
    }
}

impl std::str::FromStr for JoinKind {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "cross" => Ok(JoinKind::Cross),
            other => Err(WeaveError::unsupported(format!("join type \"{other}\""))),
        }
    }
}

/// A joined source with its own ON conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    source: SourceExpr,
    kind: JoinKind,
    conditions: Vec<WherePart>,
}

impl Join {
    pub fn new(source: SourceExpr, kind: JoinKind) -> Self {
        Self {
            source,
            kind,
            conditions: Vec::new(),
        }
    }

    pub fn source(&self) -> &SourceExpr {
        &self.source
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    /// The ON conditions, in the order they were added.
    pub fn conditions(&self) -> &[WherePart] {
        &self.conditions
    }

    pub(crate) fn conditions_mut(&mut self) -> &mut Vec<WherePart> {
        &mut self.conditions
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Case-insensitive: `"asc"` is ascending, anything else descending.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            Direction::Asc
        } else {
            Direction::Desc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl From<&str> for Direction {
    fn from(s: &str) -> Self {
        Direction::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_bind_variants() {
        assert_eq!(1i32.into_bind(), Bind::Value(Value::Int(1)));
        assert!(().into_bind().is_null());
        assert!(Option::<&str>::None.into_bind().is_null());
        assert_eq!(
            vec![1, 2].into_bind(),
            Bind::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(["a"].into_bind(), Bind::List(vec![Value::from("a")]));
    }

    #[test]
    fn direction_is_case_insensitive() {
        assert_eq!(Direction::parse("AsC"), Direction::Asc);
        assert_eq!(Direction::parse("desc"), Direction::Desc);
        assert_eq!(Direction::from("DESC").as_sql(), "DESC");
    }

    #[test]
    fn join_kind_from_str() {
        assert_eq!("left".parse::<JoinKind>().unwrap(), JoinKind::Left);
        assert_eq!("CROSS".parse::<JoinKind>().unwrap(), JoinKind::Cross);
        assert!("outer".parse::<JoinKind>().is_err());
    }

    #[test]
    fn where_part_close_accumulates() {
        let mut part = WherePart::parse("a", Bind::Value(Value::Int(1)), Concat::And, 2).unwrap();
        part.add_close(1);
        part.add_close(2);
        assert_eq!(part.open_brackets(), 2);
        assert_eq!(part.close_brackets(), 3);
    }
}
