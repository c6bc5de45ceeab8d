//! Statement model: the three statement builders and the parts they are made of.
//!
//! Builders are consuming and infallible per call; the first problem found
//! is kept on the statement and reported by the compiler.

#[macro_use]
mod conditions;
mod find;
pub mod part;
mod remove;
mod save;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use crate::error::{WeaveError, WeaveResult};

pub use find::{Find, IntoGroupFields, Limit};
pub use part::{Bind, Concat, Direction, IntoBind, Join, JoinKind, WherePart};
pub use remove::Remove;
pub use save::{DataTuple, Save};

/// The three statement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Find,
    Save,
    Remove,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::Find => "find",
            StatementKind::Save => "save",
            StatementKind::Remove => "remove",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = WeaveError;

    fn from_str(s: &str) -> WeaveResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "find" => Ok(StatementKind::Find),
            "save" => Ok(StatementKind::Save),
            "remove" => Ok(StatementKind::Remove),
            _ => Err(WeaveError::unknown_operation(s)),
        }
    }
}

/// An owned statement of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Find(Find),
    Save(Save),
    Remove(Remove),
}

impl Statement {
    /// Create an empty statement of the given kind.
    pub fn new(kind: StatementKind) -> Self {
        match kind {
            StatementKind::Find => Statement::Find(Find::new()),
            StatementKind::Save => Statement::Save(Save::new()),
            StatementKind::Remove => Statement::Remove(Remove::new()),
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.as_statement().kind()
    }
}

impl From<Find> for Statement {
    fn from(find: Find) -> Self {
        Statement::Find(find)
    }
}

impl From<Save> for Statement {
    fn from(save: Save) -> Self {
        Statement::Save(save)
    }
}

impl From<Remove> for Statement {
    fn from(remove: Remove) -> Self {
        Statement::Remove(remove)
    }
}

/// A borrowed view of a statement, used by the compiler to dispatch on kind.
#[derive(Debug, Clone, Copy)]
pub enum StatementRef<'a> {
    Find(&'a Find),
    Save(&'a Save),
    Remove(&'a Remove),
}

impl StatementRef<'_> {
    pub fn kind(&self) -> StatementKind {
        match self {
            StatementRef::Find(_) => StatementKind::Find,
            StatementRef::Save(_) => StatementKind::Save,
            StatementRef::Remove(_) => StatementKind::Remove,
        }
    }

    /// The first error recorded while building the statement.
    pub fn error(&self) -> Option<&WeaveError> {
        match self {
            StatementRef::Find(s) => s.error(),
            StatementRef::Save(s) => s.error(),
            StatementRef::Remove(s) => s.error(),
        }
    }
}

/// Anything the compiler can turn into SQL.
pub trait SqlStatement {
    fn as_statement(&self) -> StatementRef<'_>;
}

impl SqlStatement for Find {
    fn as_statement(&self) -> StatementRef<'_> {
        StatementRef::Find(self)
    }
}

impl SqlStatement for Save {
    fn as_statement(&self) -> StatementRef<'_> {
        StatementRef::Save(self)
    }
}

impl SqlStatement for Remove {
    fn as_statement(&self) -> StatementRef<'_> {
        StatementRef::Remove(self)
    }
}

impl SqlStatement for Statement {
    fn as_statement(&self) -> StatementRef<'_> {
        match self {
            Statement::Find(s) => StatementRef::Find(s),
            Statement::Save(s) => StatementRef::Save(s),
            Statement::Remove(s) => StatementRef::Remove(s),
        }
    }
}

impl<T: SqlStatement + ?Sized> SqlStatement for &T {
    fn as_statement(&self) -> StatementRef<'_> {
        (**self).as_statement()
    }
}
