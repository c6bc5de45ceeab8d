//! Statement compiler: turns a statement into SQL text plus an ordered
//! parameter list for one dialect.
//!
//! SQL and parameters are produced by the same walk over the statement, so
//! the Nth `?` in the text always matches the Nth parameter.

use tracing::trace;

use crate::dialect::{Dialect, DialectSpec, LimitStyle};
use crate::error::{WeaveError, WeaveResult};
use crate::expression::{FieldExpr, SourceExpr};
use crate::statement::{
    Bind, DataTuple, Find, Join, JoinKind, Limit, Remove, Save, SqlStatement, StatementRef,
    WherePart,
};
use crate::value::Value;

/// LIKE wildcard applied to bound values.
const LIKE_WILDCARD: &str = "%";

/// Compiled SQL with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Compiled {
    /// Number of `?` placeholders in the SQL text.
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

/// Stateless per-dialect compiler; cheap to copy and safe to share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compiler {
    spec: DialectSpec,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

impl Compiler {
    /// Create a compiler for a built-in dialect.
    pub fn new(dialect: Dialect) -> Self {
        Self::with_spec(dialect.spec())
    }

    /// Create a compiler for a custom dialect table.
    pub fn with_spec(spec: DialectSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &DialectSpec {
        &self.spec
    }

    /// Compile a statement to SQL text.
    pub fn compile(&self, stmt: &impl SqlStatement) -> WeaveResult<String> {
        self.build(stmt).map(|c| c.sql)
    }

    /// Compute the ordered parameter list of a statement.
    pub fn parameters(&self, stmt: &impl SqlStatement) -> WeaveResult<Vec<Value>> {
        self.build(stmt).map(|c| c.params)
    }

    /// Compile a statement to SQL text and parameters.
    ///
    /// # Errors
    /// Returns the first error recorded while the statement was built, or a
    /// [`WeaveError::StructuralState`] / [`WeaveError::UnsupportedOperation`]
    /// when the statement cannot be expressed as SQL.
    pub fn build(&self, stmt: &impl SqlStatement) -> WeaveResult<Compiled> {
        let stmt = stmt.as_statement();
        let compiled = match stmt {
            StatementRef::Find(find) => self.compile_find(find)?,
            StatementRef::Save(save) => self.compile_save(save)?,
            StatementRef::Remove(remove) => self.compile_remove(remove)?,
        };

        trace!(
            target: "sqlweave.compile",
            kind = %stmt.kind(),
            dialect = self.spec.name,
            param_count = compiled.params.len(),
            "compiled statement"
        );
        Ok(compiled)
    }

    // ==================== Find ====================

    fn compile_find(&self, find: &Find) -> WeaveResult<Compiled> {
        check_error(find.error())?;

        let mut params = Vec::new();
        let mut clauses = Vec::new();

        let fields = if find.fields().is_empty() {
            "*".to_string()
        } else {
            self.field_list(find.fields())
        };
        let distinct = if find.is_distinct() { "DISTINCT " } else { "" };
        clauses.push(format!("SELECT {distinct}{fields}"));

        if !find.sources().is_empty() {
            clauses.push(format!("FROM {}", self.source_list(find.sources())));
        }

        for join in find.joins() {
            clauses.push(self.join_clause(join, &mut params)?);
        }

        if !find.wheres().is_empty() {
            clauses.push(format!(
                "WHERE {}",
                self.condition_chain(find.wheres(), &mut params)?
            ));
        }

        if !find.groups().is_empty() {
            let groups: Vec<_> = find
                .groups()
                .iter()
                .map(|g| self.spec.quote_identifier(g))
                .collect();
            clauses.push(format!("GROUP BY {}", groups.join(", ")));
        }

        if !find.sorts().is_empty() {
            let sorts: Vec<_> = find
                .sorts()
                .iter()
                .map(|(field, dir)| {
                    format!("{} {}", self.spec.quote_identifier(field), dir.as_sql())
                })
                .collect();
            clauses.push(format!("ORDER BY {}", sorts.join(", ")));
        }

        if let Some(limit) = find.limit_value() {
            clauses.push(self.limit_clause(limit, &mut params));
        }

        Ok(Compiled {
            sql: clauses.join(" "),
            params,
        })
    }

    fn join_clause(&self, join: &Join, params: &mut Vec<Value>) -> WeaveResult<String> {
        if join.kind() == JoinKind::Cross && !join.conditions().is_empty() {
            return Err(WeaveError::unsupported(format!(
                "CROSS JOIN {} cannot have ON conditions",
                join.source().name()
            )));
        }
        let mut sql = format!("{} JOIN {}", join.kind().as_sql(), self.source(join.source()));
        if !join.conditions().is_empty() {
            sql.push_str(" ON ");
            sql.push_str(&self.condition_chain(join.conditions(), params)?);
        }
        Ok(sql)
    }

    fn limit_clause(&self, limit: Limit, params: &mut Vec<Value>) -> String {
        match self.spec.limit {
            LimitStyle::CommaPlaceholders => {
                params.push(int_param(limit.limit));
                params.push(int_param(limit.offset));
                "LIMIT ?, ?".to_string()
            }
            LimitStyle::CommaInline if limit.offset == 0 => format!("LIMIT {}", limit.limit),
            LimitStyle::CommaInline => format!("LIMIT {}, {}", limit.limit, limit.offset),
            LimitStyle::LimitOffset => {
                params.push(int_param(limit.limit));
                params.push(int_param(limit.offset));
                "LIMIT ? OFFSET ?".to_string()
            }
        }
    }

    // ==================== Save ====================

    fn compile_save(&self, save: &Save) -> WeaveResult<Compiled> {
        check_error(save.error())?;

        if save.sources().is_empty() {
            return Err(WeaveError::structural("save has no source"));
        }
        let first = match save.data_tuples().first() {
            Some(tuple) if !tuple.is_empty() => tuple,
            _ => return Err(WeaveError::structural("save has no data")),
        };

        if save.is_update() {
            self.compile_update(save, first)
        } else {
            self.compile_insert(save, first)
        }
    }

    fn compile_update(&self, save: &Save, tuple: &DataTuple) -> WeaveResult<Compiled> {
        if save.data_tuples().len() > 1 {
            return Err(WeaveError::unsupported(format!(
                "UPDATE accepts exactly one data tuple, got {}",
                save.data_tuples().len()
            )));
        }

        let mut params = Vec::with_capacity(tuple.len());
        let assignments: Vec<_> = tuple
            .iter()
            .map(|(field, value)| {
                params.push(self.spec.filter_value(value.clone()));
                format!("{} = ?", self.spec.quote_identifier(field))
            })
            .collect();

        let conditions = self.condition_chain(save.wheres(), &mut params)?;
        Ok(Compiled {
            sql: format!(
                "UPDATE {} SET {} WHERE {}",
                self.source_list(save.sources()),
                assignments.join(", "),
                conditions
            ),
            params,
        })
    }

    fn compile_insert(&self, save: &Save, first: &DataTuple) -> WeaveResult<Compiled> {
        let [source] = save.sources() else {
            return Err(WeaveError::structural(format!(
                "INSERT takes exactly one source, got {}",
                save.sources().len()
            )));
        };

        let fields: Vec<&str> = first.fields().collect();
        let mut params = Vec::with_capacity(fields.len() * save.data_tuples().len());
        let mut rows = Vec::with_capacity(save.data_tuples().len());

        for (idx, tuple) in save.data_tuples().iter().enumerate() {
            if !tuple.same_fields(first) {
                return Err(WeaveError::structural(format!(
                    "data tuple {idx} does not have the same fields as the first tuple"
                )));
            }
            for field in &fields {
                let value = tuple.get(field).cloned().unwrap_or(Value::Null);
                params.push(self.spec.filter_value(value));
            }
            rows.push(format!("({})", placeholders(fields.len())));
        }

        let quoted: Vec<_> = fields
            .iter()
            .map(|f| self.spec.quote_identifier(f))
            .collect();
        Ok(Compiled {
            sql: format!(
                "INSERT INTO {} ({}) VALUES {}",
                self.source(source),
                quoted.join(", "),
                rows.join(", ")
            ),
            params,
        })
    }

    // ==================== Remove ====================

    fn compile_remove(&self, remove: &Remove) -> WeaveResult<Compiled> {
        check_error(remove.error())?;

        if remove.sources().is_empty() {
            return Err(WeaveError::structural("remove has no source"));
        }

        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM {}", self.source_list(remove.sources()));
        if !remove.wheres().is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.condition_chain(remove.wheres(), &mut params)?);
        } else if !remove.allows_all() {
            return Err(WeaveError::structural(
                "remove without conditions deletes every row; call allow_all() to permit it",
            ));
        }
        Ok(Compiled { sql, params })
    }

    // ==================== Conditions ====================

    fn condition_chain(&self, parts: &[WherePart], params: &mut Vec<Value>) -> WeaveResult<String> {
        let mut sql = String::new();
        for (idx, part) in parts.iter().enumerate() {
            if idx > 0 {
                sql.push(' ');
                sql.push_str(part.concat().as_sql());
                sql.push(' ');
            }
            sql.push_str(&"(".repeat(part.open_brackets() as usize));
            sql.push_str(&self.condition(part, params)?);
            sql.push_str(&")".repeat(part.close_brackets() as usize));
        }
        Ok(sql)
    }

    fn condition(&self, part: &WherePart, params: &mut Vec<Value>) -> WeaveResult<String> {
        let clause = part.clause();
        let field = self.spec.quote_identifier(clause.field());
        let op = self.spec.operator(clause.operator());
        let is_list_op = DialectSpec::is_list_operator(op);

        if !clause.is_bindable() {
            return Ok(format!(
                "{field} {op} {}",
                self.spec.quote_identifier(clause.marker())
            ));
        }

        match part.bind() {
            Bind::Value(Value::Null) => {
                let test = if clause.operator() == "=" {
                    "IS NULL"
                } else {
                    "IS NOT NULL"
                };
                Ok(format!("{field} {test}"))
            }
            Bind::Value(value) => {
                params.push(self.bound_param(part, value));
                if is_list_op {
                    Ok(format!("{field} {op} (?)"))
                } else {
                    Ok(format!("{field} {op} ?"))
                }
            }
            Bind::List(_) if !is_list_op => Err(WeaveError::unsupported(format!(
                "list bound to \"{}\" which is not IN / NOT IN",
                clause.operator()
            ))),
            Bind::List(values) if values.is_empty() => {
                // x IN () matches nothing, x NOT IN () matches everything
                Ok(if op.eq_ignore_ascii_case("IN") { "1=0" } else { "1=1" }.to_string())
            }
            Bind::List(values) => {
                params.extend(values.iter().map(|v| self.bound_param(part, v)));
                Ok(format!("{field} {op} ({})", placeholders(values.len())))
            }
            Bind::Query(sub) => {
                let sub = self.compile_find(sub)?;
                params.extend(sub.params);
                Ok(format!("{field} {op} ({})", sub.sql))
            }
        }
    }

    /// Apply LIKE wildcards and boolean mapping to a bound value.
    fn bound_param(&self, part: &WherePart, value: &Value) -> Value {
        let clause = part.clause();
        if clause.wildcard_before() || clause.wildcard_after() {
            let before = if clause.wildcard_before() { LIKE_WILDCARD } else { "" };
            let after = if clause.wildcard_after() { LIKE_WILDCARD } else { "" };
            return Value::Text(format!("{before}{}{after}", value.to_plain_text()));
        }
        self.spec.filter_value(value.clone())
    }

    // ==================== Identifiers ====================

    fn field_list(&self, fields: &[FieldExpr]) -> String {
        fields
            .iter()
            .map(|f| match f.alias() {
                Some(alias) => format!(
                    "{} AS {}",
                    self.spec.quote_identifier(f.name()),
                    self.spec.quote_identifier(alias)
                ),
                None => self.spec.quote_identifier(f.name()),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn source(&self, source: &SourceExpr) -> String {
        match source.alias() {
            Some(alias) => format!(
                "{} {}",
                self.spec.quote_identifier(source.name()),
                self.spec.quote_identifier(alias)
            ),
            None => self.spec.quote_identifier(source.name()),
        }
    }

    fn source_list(&self, sources: &[SourceExpr]) -> String {
        sources
            .iter()
            .map(|s| self.source(s))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn check_error(error: Option<&WeaveError>) -> WeaveResult<()> {
    match error {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

fn int_param(n: u64) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Concat;

    fn sql() -> Compiler {
        Compiler::new(Dialect::Sql)
    }

    #[test]
    fn test_select_star_without_sources() {
        assert_eq!(sql().compile(&Find::new()).unwrap(), "SELECT *");
    }

    #[test]
    fn test_simple_where() {
        let find = Find::new().in_("t").where_("field1 = ?", "v1");
        let built = sql().build(&find).unwrap();
        assert_eq!(built.sql, r#"SELECT * FROM "t" WHERE "field1" = ?"#);
        assert_eq!(built.params, vec![Value::from("v1")]);
    }

    #[test]
    fn test_nested_brackets() {
        let find = Find::new()
            .where_("a", 1)
            .open()
            .and_where("b", ())
            .open()
            .or_where("c", ())
            .and_where("d", ())
            .close_n(2);
        let built = sql().build(&find).unwrap();
        assert_eq!(
            built.sql,
            r#"SELECT * WHERE "a" = ? AND ("b" IS NULL OR ("c" IS NULL AND "d" IS NULL))"#
        );
        assert_eq!(built.params, vec![Value::Int(1)]);
    }

    #[test]
    fn test_null_with_other_operator_is_not_null() {
        let find = Find::new().in_("t").where_("a !=", Option::<i32>::None);
        assert_eq!(
            sql().compile(&find).unwrap(),
            r#"SELECT * FROM "t" WHERE "a" IS NOT NULL"#
        );
    }

    #[test]
    fn test_literal_marker_is_not_bound() {
        let find = Find::new().in_("t").where_("age > 18", ()).where_("a = b.c", ());
        let built = sql().build(&find).unwrap();
        assert_eq!(
            built.sql,
            r#"SELECT * FROM "t" WHERE "age" > 18 AND "a" = "b"."c""#
        );
        assert!(built.params.is_empty());
    }

    #[test]
    fn test_in_expansion_and_empty_lists() {
        let find = Find::new()
            .in_("t")
            .where_("id *", vec![1, 2, 3])
            .where_("x *", Vec::<i32>::new())
            .or_where("y !*", Vec::<i32>::new());
        let built = sql().build(&find).unwrap();
        assert_eq!(
            built.sql,
            r#"SELECT * FROM "t" WHERE "id" IN (?, ?, ?) AND 1=0 OR 1=1"#
        );
        assert_eq!(built.params.len(), 3);
    }

    #[test]
    fn test_list_on_scalar_operator_is_unsupported() {
        let find = Find::new().where_("id >", vec![1, 2]);
        assert!(sql().compile(&find).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_wildcards_wrap_bound_value() {
        let find = Find::new()
            .in_("t")
            .where_("name ~ *?*", "bob")
            .where_("code !~ ?*", "A")
            .where_("tag * *?", vec!["x", "y"]);
        let built = sql().build(&find).unwrap();
        assert_eq!(
            built.sql,
            r#"SELECT * FROM "t" WHERE "name" LIKE ? AND "code" NOT LIKE ? AND "tag" IN (?, ?)"#
        );
        assert_eq!(
            built.params,
            vec![
                Value::from("%bob%"),
                Value::from("A%"),
                Value::from("%x"),
                Value::from("%y"),
            ]
        );
    }

    #[test]
    fn test_sub_select_params_are_spliced() {
        let sub = Find::new().in_("test").where_("subId >", 5);
        let find = Find::new()
            .in_("t")
            .where_("a", 1)
            .where_("id !*", sub)
            .where_("b", 2);
        let built = sql().build(&find).unwrap();
        assert_eq!(
            built.sql,
            r#"SELECT * FROM "t" WHERE "a" = ? AND "id" NOT IN (SELECT * FROM "test" WHERE "subId" > ?) AND "b" = ?"#
        );
        assert_eq!(built.params, vec![Value::Int(1), Value::Int(5), Value::Int(2)]);
    }

    #[test]
    fn test_sub_select_error_propagates() {
        let sub = Find::new().close();
        let find = Find::new().where_("id *", sub);
        assert!(sql().compile(&find).unwrap_err().is_structural());
    }

    #[test]
    fn test_join_params_precede_where_params() {
        let find = Find::new()
            .in_("users u")
            .where_("u.active", true)
            .join("posts p")
            .on("p.user_id = u.id", ())
            .and_on("p.kind", "news")
            .cross_join("tags");
        let built = sql().build(&find).unwrap();
        assert_eq!(
            built.sql,
            r#"SELECT * FROM "users" "u" INNER JOIN "posts" "p" ON "p"."user_id" = "u"."id" AND "p"."kind" = ? CROSS JOIN "tags" WHERE "u"."active" = ?"#
        );
        assert_eq!(built.params, vec![Value::from("news"), Value::Int(1)]);
        assert_eq!(built.placeholder_count(), built.params.len());
    }

    #[test]
    fn test_cross_join_with_conditions_is_unsupported() {
        let find = Find::new().in_("a").cross_join("b").on("b.x", 5);
        assert!(sql().compile(&find).unwrap_err().is_unsupported());

        let find = Find::new().in_("a").cross_join("b").where_("b.x", 5);
        assert!(sql().compile(&find).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_duplicate_fields_compile_once() {
        let find = Find::new().in_("t").get(["a", "b"]).get(["b", "c"]);
        assert_eq!(sql().compile(&find).unwrap(), r#"SELECT "a", "b", "c" FROM "t""#);
    }

    #[test]
    fn test_insert_multi_row_keeps_first_tuple_order() {
        let save = Save::new()
            .in_("t")
            .data([("a", 1), ("b", 2)])
            .data([("b", 4), ("a", 3)]);
        let built = sql().build(&save).unwrap();
        assert_eq!(built.sql, r#"INSERT INTO "t" ("a", "b") VALUES (?, ?), (?, ?)"#);
        assert_eq!(
            built.params,
            vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]
        );
    }

    #[test]
    fn test_insert_mismatched_tuples_is_structural() {
        let save = Save::new().in_("t").data([("a", 1)]).data([("b", 2)]);
        assert!(sql().compile(&save).unwrap_err().is_structural());
    }

    #[test]
    fn test_insert_requires_single_source() {
        let save = Save::new().in_(["a", "b"]).data([("x", 1)]);
        assert!(sql().compile(&save).unwrap_err().is_structural());
    }

    #[test]
    fn test_update_keeps_null_data() {
        let save = Save::new()
            .in_("t")
            .data(DataTuple::new().set("f", Value::Null).set("g", true))
            .where_("id", 7);
        let built = sql().build(&save).unwrap();
        assert_eq!(built.sql, r#"UPDATE "t" SET "f" = ?, "g" = ? WHERE "id" = ?"#);
        assert_eq!(built.params, vec![Value::Null, Value::Int(1), Value::Int(7)]);
    }

    #[test]
    fn test_update_with_many_tuples_is_unsupported() {
        // data first, then where: arity is only known at compile time
        let save = Save::new()
            .in_("t")
            .data_set(vec![vec![("a", 1)], vec![("a", 2)]])
            .where_("id", 1);
        assert!(sql().compile(&save).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_save_without_data_or_source() {
        assert!(sql().compile(&Save::new().in_("t")).unwrap_err().is_structural());
        assert!(sql().compile(&Save::new().data([("a", 1)])).unwrap_err().is_structural());
    }

    #[test]
    fn test_remove() {
        let remove = Remove::new().in_("t").where_concat("id", 1, Concat::And);
        let built = sql().build(&remove).unwrap();
        assert_eq!(built.sql, r#"DELETE FROM "t" WHERE "id" = ?"#);

        assert!(sql().compile(&Remove::new().in_("t")).unwrap_err().is_structural());
        assert_eq!(
            sql().compile(&Remove::new().in_("t").allow_all()).unwrap(),
            r#"DELETE FROM "t""#
        );
    }

    #[test]
    fn test_builder_error_is_returned_before_sql() {
        let find = Find::new().in_("t").where_("a  b", 1);
        assert!(sql().build(&find).unwrap_err().is_malformed());
        assert!(sql().parameters(&find).is_err());
    }
}
