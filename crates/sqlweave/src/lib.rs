//! # sqlweave
//!
//! A dialect-aware SQL statement builder.
//!
//! ## Features
//!
//! - **String expressions**: conditions are written as `"field operator ?"`
//!   (`"age >"`, `"name ~ *?*"`, `"id !*"`) and values are always bound
//! - **Three statements**: `Find` (SELECT), `Save` (INSERT / UPDATE) and `Remove` (DELETE)
//! - **Dialects as data**: quoting, operators, LIMIT shape and booleans come from a small table
//! - **Ordered parameters**: the Nth `?` in the SQL matches the Nth parameter
//! - **Safe defaults**: DELETE needs conditions, UPDATE takes exactly one row
//! - **Bring your own driver**: execution goes through the [`Executor`] trait
//!
//! ## Building statements
//!
//! ```
//! use sqlweave::{Compiler, Dialect, Find, Save, Remove, Value};
//!
//! let compiler = Compiler::new(Dialect::Pgsql);
//!
//! // SELECT
//! let find = Find::new()
//!     .in_("users")
//!     .where_("status", "active")
//!     .open()
//!     .and_where("age >=", 18)
//!     .or_where("verified", true)
//!     .close()
//!     .page(20, 2);
//! let built = compiler.build(&find).unwrap();
//! assert_eq!(
//!     built.sql,
//!     r#"SELECT * FROM "users" WHERE "status" = ? AND ("age" >= ? OR "verified" = ?) LIMIT ? OFFSET ?"#
//! );
//! assert_eq!(built.params[2], Value::from("TRUE"));
//!
//! // INSERT
//! let save = Save::new().in_("users").data([("name", "alice"), ("status", "new")]);
//! assert_eq!(
//!     compiler.compile(&save).unwrap(),
//!     r#"INSERT INTO "users" ("name", "status") VALUES (?, ?)"#
//! );
//!
//! // DELETE
//! let remove = Remove::new().in_("users").where_("id", 7);
//! assert_eq!(compiler.compile(&remove).unwrap(), r#"DELETE FROM "users" WHERE "id" = ?"#);
//! ```
//!
//! Builder calls never fail on their own. The first problem (a malformed
//! expression, `close()` without a condition, ...) is kept on the statement
//! and returned by the compiler, so no partial SQL is ever produced.

pub mod compiler;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod expression;
pub mod prelude;
pub mod statement;
pub mod value;

pub use compiler::{Compiled, Compiler};
pub use connection::{Connection, ConnectionConfig, SqlLogger};
pub use dialect::{BoolStyle, Dialect, DialectSpec, LimitStyle};
pub use error::{WeaveError, WeaveResult};
pub use executor::{Executor, Row, SaveOutcome};
pub use expression::{Clause, FieldExpr, IntoExprList, SourceExpr};
pub use statement::{
    Bind, Concat, DataTuple, Direction, Find, IntoBind, IntoGroupFields, Join, JoinKind, Limit,
    Remove, Save, SqlStatement, Statement, StatementKind, StatementRef, WherePart,
};
pub use value::Value;
