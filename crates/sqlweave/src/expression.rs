//! The condition mini-language and the field/source alias parsers.
//!
//! A condition is written as one string of up to three space-separated tokens:
//!
//! ```text
//! field [operator [value-marker]]
//! ```
//!
//! - `"id"` is `id = ?`
//! - `"age >"` is `age > ?`
//! - `"name ~ *?*"` is `name LIKE ?` with the bound value wrapped in `%...%`
//! - `"b.a = a.b"` compares two columns; nothing is bound
//!
//! Fields and sources accept one optional alias separated by a single space:
//! `"users u"`, `"name n"`.

use crate::error::{WeaveError, WeaveResult};

/// Reserved wildcard character used in value markers (`*?`, `?*`, `*?*`).
pub const WILDCARD: char = '*';

/// The value marker that makes a condition parameter-bindable.
pub const PLACEHOLDER: &str = "?";

const DEFAULT_OPERATOR: &str = "=";

/// A parsed condition: `field operator value-marker`.
///
/// Immutable after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    field: String,
    operator: String,
    marker: String,
    wildcard_before: bool,
    wildcard_after: bool,
}

impl Clause {
    /// Parse a condition string.
    ///
    /// # Errors
    /// Returns [`WeaveError::MalformedExpression`] for empty input, empty tokens
    /// (doubled spaces) or more than three tokens.
    pub fn parse(raw: &str) -> WeaveResult<Self> {
        let parts = split_tokens(raw, 3, "conditions take at most \"field operator value\"")?;

        let field = parts[0].to_string();
        let operator = parts.get(1).copied().unwrap_or(DEFAULT_OPERATOR).to_string();
        let marker = parts.get(2).copied().unwrap_or(PLACEHOLDER);

        let before = format!("{WILDCARD}{PLACEHOLDER}");
        let after = format!("{PLACEHOLDER}{WILDCARD}");
        let both = format!("{WILDCARD}{PLACEHOLDER}{WILDCARD}");

        let wildcard_before = marker == before || marker == both;
        let wildcard_after = marker == after || marker == both;

        let marker = if wildcard_before || wildcard_after {
            PLACEHOLDER.to_string()
        } else {
            marker.to_string()
        };

        Ok(Self {
            field,
            operator,
            marker,
            wildcard_before,
            wildcard_after,
        })
    }

    /// The left-hand identifier.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The operator as written (before dialect translation).
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// The value marker: `?` for bindable conditions, otherwise a literal.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether the bound value gets a leading `%`.
    pub fn wildcard_before(&self) -> bool {
        self.wildcard_before
    }

    /// Whether the bound value gets a trailing `%`.
    pub fn wildcard_after(&self) -> bool {
        self.wildcard_after
    }

    /// Whether the condition takes a bound parameter.
    pub fn is_bindable(&self) -> bool {
        self.marker == PLACEHOLDER
    }
}

impl std::str::FromStr for Clause {
    type Err = WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A selected field with an optional alias: `"name"` or `"name n"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExpr {
    name: String,
    alias: Option<String>,
}

impl FieldExpr {
    /// Parse `field [alias]`.
    pub fn parse(raw: &str) -> WeaveResult<Self> {
        let (name, alias) = parse_aliased(raw, "field")?;
        Ok(Self { name, alias })
    }

    /// Build from parts without parsing.
    pub fn new(name: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            name: name.into(),
            alias,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// A table (or other source) with an optional alias: `"users"` or `"users u"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceExpr {
    name: String,
    alias: Option<String>,
}

impl SourceExpr {
    /// Parse `source [alias]`.
    pub fn parse(raw: &str) -> WeaveResult<Self> {
        let (name, alias) = parse_aliased(raw, "source")?;
        Ok(Self { name, alias })
    }

    /// Build from parts without parsing.
    pub fn new(name: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            name: name.into(),
            alias,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

fn parse_aliased(raw: &str, what: &str) -> WeaveResult<(String, Option<String>)> {
    let reason = format!(
        "{what} expressions may only contain a single space separating the {what} and alias"
    );
    let parts = split_tokens(raw, 2, &reason)?;
    Ok((parts[0].to_string(), parts.get(1).map(|s| s.to_string())))
}

/// Split on single spaces, rejecting empty input, empty tokens and excess tokens.
fn split_tokens<'a>(raw: &'a str, max: usize, too_many: &str) -> WeaveResult<Vec<&'a str>> {
    if raw.is_empty() {
        return Err(WeaveError::malformed(raw, "expression is empty"));
    }

    let parts: Vec<&str> = raw.split(' ').collect();
    if parts.len() > max {
        return Err(WeaveError::malformed(raw, too_many));
    }
    if parts.iter().any(|p| p.is_empty()) {
        return Err(WeaveError::malformed(
            raw,
            "tokens must be separated by exactly one space",
        ));
    }
    Ok(parts)
}

/// Convert an input into a list of parsed expressions.
///
/// Accepts a single string, a pre-built expression, or a sequence of either,
/// so `in_("users")`, `in_(["users u", "posts p"])` and
/// `get(FieldExpr::new("id", None))` all work.
pub trait IntoExprList<E> {
    fn into_expr_list(self) -> WeaveResult<Vec<E>>;
}

macro_rules! impl_into_expr_list {
    ($expr:ty) => {
        impl IntoExprList<$expr> for $expr {
            fn into_expr_list(self) -> WeaveResult<Vec<$expr>> {
                Ok(vec![self])
            }
        }

        impl IntoExprList<$expr> for Vec<$expr> {
            fn into_expr_list(self) -> WeaveResult<Vec<$expr>> {
                Ok(self)
            }
        }

        impl IntoExprList<$expr> for &str {
            fn into_expr_list(self) -> WeaveResult<Vec<$expr>> {
                Ok(vec![<$expr>::parse(self)?])
            }
        }

        impl IntoExprList<$expr> for String {
            fn into_expr_list(self) -> WeaveResult<Vec<$expr>> {
                Ok(vec![<$expr>::parse(&self)?])
            }
        }

        impl IntoExprList<$expr> for &[&str] {
            fn into_expr_list(self) -> WeaveResult<Vec<$expr>> {
                self.iter().map(|s| <$expr>::parse(s)).collect()
            }
        }

        impl<const N: usize> IntoExprList<$expr> for [&str; N] {
            fn into_expr_list(self) -> WeaveResult<Vec<$expr>> {
                self.iter().map(|s| <$expr>::parse(s)).collect()
            }
        }

        impl IntoExprList<$expr> for Vec<&str> {
            fn into_expr_list(self) -> WeaveResult<Vec<$expr>> {
                self.iter().map(|s| <$expr>::parse(s)).collect()
            }
        }

        impl IntoExprList<$expr> for Vec<String> {
            fn into_expr_list(self) -> WeaveResult<Vec<$expr>> {
                self.iter().map(|s| <$expr>::parse(s)).collect()
            }
        }
    };
}

impl_into_expr_list!(FieldExpr);
impl_into_expr_list!(SourceExpr);
