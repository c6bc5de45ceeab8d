//! SQL dialects as data: quote character, operator table, LIMIT shape and
//! boolean representation. The compiler holds one [`DialectSpec`] and never
//! branches on the dialect name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{WeaveError, WeaveResult};
use crate::value::Value;

/// Operator translations shared by the built-in dialects. Operators not
/// listed here are emitted as written.
pub const STANDARD_OPERATORS: &[(&str, &str)] = &[
    ("~", "LIKE"),
    ("!~", "NOT LIKE"),
    ("*", "IN"),
    ("!*", "NOT IN"),
];

/// Tokens emitted as-is instead of being quoted as identifiers.
const RESERVED: &[&str] = &["?", "true", "false", "null"];

/// Shape of the LIMIT clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStyle {
    /// `LIMIT ?, ?` bound as `[limit, offset]`.
    CommaPlaceholders,
    /// `LIMIT n` or `LIMIT n, offset`, written inline; offset omitted when zero.
    CommaInline,
    /// `LIMIT ? OFFSET ?` bound as `[limit, offset]`.
    LimitOffset,
}

/// How boolean parameters are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolStyle {
    /// `1` / `0`
    Integer,
    /// `'TRUE'` / `'FALSE'`
    Text,
}

/// Everything the compiler needs to know about a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectSpec {
    pub name: &'static str,
    pub quote: char,
    pub operators: &'static [(&'static str, &'static str)],
    pub limit: LimitStyle,
    pub booleans: BoolStyle,
}

impl DialectSpec {
    /// Translate an expression operator (`~`, `*`, ...) into SQL.
    pub fn operator<'a>(&self, op: &'a str) -> &'a str {
        self.operators
            .iter()
            .find(|(from, _)| *from == op)
            .map(|(_, to)| *to)
            .unwrap_or(op)
    }

    /// Whether the translated operator takes a list (`IN` / `NOT IN`).
    pub fn is_list_operator(sql_op: &str) -> bool {
        sql_op.eq_ignore_ascii_case("IN") || sql_op.eq_ignore_ascii_case("NOT IN")
    }

    /// Quote an identifier such as `users`, `u.name` or `u.*`.
    ///
    /// Reserved tokens, numbers and `'string'` literals are returned
    /// unchanged. Each dot-separated segment other than `*` is quoted, with
    /// embedded quote characters doubled.
    pub fn quote_identifier(&self, ident: &str) -> String {
        if is_passthrough(ident) {
            return ident.to_string();
        }
        let quote = self.quote.to_string();
        let doubled = quote.repeat(2);
        ident
            .split('.')
            .map(|segment| {
                if segment == "*" {
                    segment.to_string()
                } else {
                    format!("{quote}{}{quote}", segment.replace(&quote, &doubled))
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Map a parameter to its wire form (booleans only; other values pass through).
    pub fn filter_value(&self, value: Value) -> Value {
        match (value, self.booleans) {
            (Value::Bool(b), BoolStyle::Integer) => Value::Int(i64::from(b)),
            (Value::Bool(b), BoolStyle::Text) => {
                Value::Text(if b { "TRUE" } else { "FALSE" }.to_string())
            }
            (other, _) => other,
        }
    }
}

fn is_passthrough(token: &str) -> bool {
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(token))
        || is_numeric_literal(token)
        || (token.len() >= 2 && token.starts_with('\'') && token.ends_with('\''))
}

fn is_numeric_literal(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    let mut parts = digits.splitn(2, '.');
    let int = parts.next().unwrap_or("");
    let frac = parts.next();
    !int.is_empty()
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.is_none_or(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()))
}

/// Generic ANSI-style dialect.
pub const SQL: DialectSpec = DialectSpec {
    name: "sql",
    quote: '"',
    operators: STANDARD_OPERATORS,
    limit: LimitStyle::CommaPlaceholders,
    booleans: BoolStyle::Integer,
};

/// MySQL / MariaDB.
pub const MYSQL: DialectSpec = DialectSpec {
    name: "mysql",
    quote: '`',
    operators: STANDARD_OPERATORS,
    limit: LimitStyle::CommaInline,
    booleans: BoolStyle::Integer,
};

/// PostgreSQL.
pub const PGSQL: DialectSpec = DialectSpec {
    name: "pgsql",
    quote: '"',
    operators: STANDARD_OPERATORS,
    limit: LimitStyle::LimitOffset,
    booleans: BoolStyle::Text,
};

/// Built-in dialects, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Sql,
    Mysql,
    Pgsql,
}

impl Dialect {
    pub fn spec(self) -> DialectSpec {
        match self {
            Dialect::Sql => SQL,
            Dialect::Mysql => MYSQL,
            Dialect::Pgsql => PGSQL,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = WeaveError;

    fn from_str(s: &str) -> WeaveResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sql" => Ok(Dialect::Sql),
            "mysql" => Ok(Dialect::Mysql),
            "pgsql" | "postgres" | "postgresql" => Ok(Dialect::Pgsql),
            _ => Err(WeaveError::unknown_operation(format!("dialect {s}"))),
        }
    }
}

impl From<Dialect> for DialectSpec {
    fn from(dialect: Dialect) -> Self {
        dialect.spec()
    }
}
