//! SELECT statement builder.

use crate::error::WeaveError;
use crate::expression::{FieldExpr, IntoExprList, SourceExpr};
use crate::statement::conditions::Conditions;
use crate::statement::part::{Concat, Direction, IntoBind, Join, JoinKind};

/// LIMIT/OFFSET pair held by a [`Find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub limit: u64,
    pub offset: u64,
}

/// Convert an input into a list of GROUP BY field names.
///
/// A single string is split on commas, so `"a, b"` and `["a", "b"]` are
/// equivalent.
pub trait IntoGroupFields {
    fn into_group_fields(self) -> Vec<String>;
}

fn split_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl IntoGroupFields for &str {
    fn into_group_fields(self) -> Vec<String> {
        split_fields(self)
    }
}

impl IntoGroupFields for String {
    fn into_group_fields(self) -> Vec<String> {
        split_fields(&self)
    }
}

impl IntoGroupFields for &[&str] {
    fn into_group_fields(self) -> Vec<String> {
        self.iter().map(|s| s.trim().to_string()).collect()
    }
}

impl<const N: usize> IntoGroupFields for [&str; N] {
    fn into_group_fields(self) -> Vec<String> {
        self.iter().map(|s| s.trim().to_string()).collect()
    }
}

impl IntoGroupFields for Vec<&str> {
    fn into_group_fields(self) -> Vec<String> {
        self.into_iter().map(|s| s.trim().to_string()).collect()
    }
}

impl IntoGroupFields for Vec<String> {
    fn into_group_fields(self) -> Vec<String> {
        self.into_iter().map(|s| s.trim().to_string()).collect()
    }
}

/// SELECT statement builder.
///
/// All methods consume and return the builder. Problems found while
/// building (malformed expressions, `close()` without a condition, ...) are
/// recorded and reported when the statement is compiled.
///
/// ```
/// use sqlweave::{Compiler, Dialect, Find};
///
/// let find = Find::new()
///     .in_("users u")
///     .get(["u.id", "u.name"])
///     .where_("u.age >", 18)
///     .sort_desc("u.name")
///     .limit(10);
///
/// let built = Compiler::new(Dialect::Sql).build(&find).unwrap();
/// assert_eq!(
///     built.sql,
///     r#"SELECT "u"."id", "u"."name" FROM "users" "u" WHERE "u"."age" > ? ORDER BY "u"."name" DESC LIMIT ?, ?"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Find {
    /// FROM sources
    sources: Vec<SourceExpr>,
    /// Selected fields (empty means `*`)
    fields: Vec<FieldExpr>,
    /// WHERE and JOIN conditions
    conditions: Conditions,
    /// SELECT DISTINCT
    distinct: bool,
    /// LIMIT/OFFSET
    limit: Option<Limit>,
    /// ORDER BY fields
    sorts: Vec<(String, Direction)>,
    /// GROUP BY fields
    groups: Vec<String>,
    /// First build error
    error: Option<WeaveError>,
}

impl Find {
    /// Create an empty SELECT builder.
    pub fn new() -> Self {
        Self::default()
    }

    condition_methods!();

    // ==================== SELECT fields ====================

    /// Append selected fields (`"name"`, `"name alias"`, or a list).
    ///
    /// A field already selected with the same alias is not added again.
    pub fn get(mut self, fields: impl IntoExprList<FieldExpr>) -> Self {
        match fields.into_expr_list() {
            Ok(list) => {
                for field in list {
                    if !self.fields.contains(&field) {
                        self.fields.push(field);
                    }
                }
            }
            Err(err) => self.record(Err(err)),
        }
        self
    }

    /// Toggle SELECT DISTINCT.
    pub fn distinct(mut self, on: bool) -> Self {
        self.distinct = on;
        self
    }

    // ==================== JOIN ====================

    /// Add an INNER JOIN and switch `where_` to its ON conditions.
    pub fn join(self, source: &str) -> Self {
        self.join_kind(source, JoinKind::Inner)
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, source: &str) -> Self {
        self.join_kind(source, JoinKind::Left)
    }

    /// Add a CROSS JOIN.
    pub fn cross_join(self, source: &str) -> Self {
        self.join_kind(source, JoinKind::Cross)
    }

    /// Add a join of the given kind.
    pub fn join_kind(mut self, source: &str, kind: JoinKind) -> Self {
        match SourceExpr::parse(source) {
            Ok(source) => self.conditions.push_join(source, kind),
            Err(err) => self.record(Err(err)),
        }
        self
    }

    /// Add an AND condition to the current join's ON list.
    pub fn on(self, expr: &str, value: impl IntoBind) -> Self {
        self.on_concat(expr, value, Concat::And)
    }

    /// Add an AND condition to the current join's ON list.
    pub fn and_on(self, expr: &str, value: impl IntoBind) -> Self {
        self.on_concat(expr, value, Concat::And)
    }

    /// Add an OR condition to the current join's ON list.
    pub fn or_on(self, expr: &str, value: impl IntoBind) -> Self {
        self.on_concat(expr, value, Concat::Or)
    }

    /// Add an ON condition with an explicit concatenator.
    pub fn on_concat(mut self, expr: &str, value: impl IntoBind, concat: Concat) -> Self {
        let result = self.conditions.push_on(expr, value.into_bind(), concat);
        self.record(result);
        self
    }

    // ==================== LIMIT / ORDER / GROUP ====================

    /// Limit the number of rows.
    pub fn limit(self, limit: u64) -> Self {
        self.limit_offset(limit, 0)
    }

    /// Limit the number of rows, skipping `offset` rows first.
    ///
    /// A limit of 0 clears the limit.
    pub fn limit_offset(mut self, limit: u64, offset: u64) -> Self {
        self.limit = (limit > 0).then_some(Limit { limit, offset });
        self
    }

    /// Select page `number` (1-based) of `size` rows. Page 0 is treated as 1.
    pub fn page(self, size: u64, number: u64) -> Self {
        let number = number.max(1);
        self.limit_offset(size, size.saturating_mul(number - 1))
    }

    /// Append an ORDER BY field. Sorting on the same field again only
    /// replaces its direction.
    pub fn sort(mut self, field: &str, direction: impl Into<Direction>) -> Self {
        let direction = direction.into();
        match self.sorts.iter_mut().find(|(f, _)| f == field) {
            Some(existing) => existing.1 = direction,
            None => self.sorts.push((field.to_string(), direction)),
        }
        self
    }

    /// Append an ascending ORDER BY field.
    pub fn sort_asc(self, field: &str) -> Self {
        self.sort(field, Direction::Asc)
    }

    /// Append a descending ORDER BY field.
    pub fn sort_desc(self, field: &str) -> Self {
        self.sort(field, Direction::Desc)
    }

    /// Append GROUP BY fields.
    pub fn group(mut self, fields: impl IntoGroupFields) -> Self {
        self.groups.extend(fields.into_group_fields());
        self
    }

    // ==================== Accessors ====================

    pub fn fields(&self) -> &[FieldExpr] {
        &self.fields
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn joins(&self) -> &[Join] {
        self.conditions.joins()
    }

    /// Whether `where_` currently targets a join's ON list.
    pub fn in_join_mode(&self) -> bool {
        self.conditions.in_join_mode()
    }

    pub fn limit_value(&self) -> Option<Limit> {
        self.limit
    }

    pub fn sorts(&self) -> &[(String, Direction)] {
        &self.sorts
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }
}
