//! Convenient imports for typical `sqlweave` usage.
//!
//! ```ignore
//! use sqlweave::prelude::*;
//! ```

pub use crate::{
    Compiled, Compiler, Concat, Connection, ConnectionConfig, DataTuple, Dialect, Direction,
    Executor, Find, JoinKind, Remove, Row, Save, SaveOutcome, SqlStatement, Value, WeaveError,
    WeaveResult,
};
