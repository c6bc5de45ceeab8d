//! DELETE statement builder.

use crate::error::WeaveError;
use crate::expression::SourceExpr;
use crate::statement::conditions::Conditions;

/// DELETE statement builder.
///
/// A DELETE without conditions is refused at compile time unless
/// [`Remove::allow_all`] was called.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Remove {
    sources: Vec<SourceExpr>,
    conditions: Conditions,
    allow_all: bool,
    error: Option<WeaveError>,
}

impl Remove {
    pub fn new() -> Self {
        Self::default()
    }

    condition_methods!();

    /// Permit a DELETE with no conditions (every row).
    pub fn allow_all(mut self) -> Self {
        self.allow_all = true;
        self
    }

    pub fn allows_all(&self) -> bool {
        self.allow_all
    }
}
