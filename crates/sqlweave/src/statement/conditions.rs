//! Where/join condition state shared by every statement kind.
//!
//! Parts live in owned, ordered lists. The "current" join is an index into
//! `joins`, never a reference, so statements stay plain data that can be
//! cloned and compared.

use crate::error::{WeaveError, WeaveResult};
use crate::expression::SourceExpr;
use crate::statement::part::{Bind, Concat, Join, JoinKind, WherePart};

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Conditions {
    wheres: Vec<WherePart>,
    joins: Vec<Join>,
    /// Set while in join mode: `where_` and `close` target this join's ON list.
    active_join: Option<usize>,
    /// Brackets opened but not yet attached to a part.
    pending_open: u32,
}

impl Conditions {
    pub(crate) fn wheres(&self) -> &[WherePart] {
        &self.wheres
    }

    pub(crate) fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub(crate) fn in_join_mode(&self) -> bool {
        self.active_join.is_some()
    }

    /// Append a condition to the active target.
    pub(crate) fn push_where(&mut self, expr: &str, bind: Bind, concat: Concat) -> WeaveResult<()> {
        let part = WherePart::parse(expr, bind, concat, self.pending_open)?;
        match self.active_join {
            Some(idx) => self.joins[idx].conditions_mut().push(part),
            None => self.wheres.push(part),
        }
        self.pending_open = 0;
        Ok(())
    }

    /// Append an ON condition to the most recent join.
    pub(crate) fn push_on(&mut self, expr: &str, bind: Bind, concat: Concat) -> WeaveResult<()> {
        let pending = self.pending_open;
        let join = self
            .joins
            .last_mut()
            .ok_or_else(|| WeaveError::structural(format!("on(\"{expr}\") called before join()")))?;
        join.conditions_mut().push(WherePart::parse(expr, bind, concat, pending)?);
        self.pending_open = 0;
        Ok(())
    }

    /// Start a new join and enter join mode.
    pub(crate) fn push_join(&mut self, source: SourceExpr, kind: JoinKind) {
        self.joins.push(Join::new(source, kind));
        self.active_join = Some(self.joins.len() - 1);
    }

    pub(crate) fn open(&mut self, n: u32) {
        self.pending_open += n;
    }

    /// Close `n` brackets on the last part of the active target.
    pub(crate) fn close(&mut self, n: u32) -> WeaveResult<()> {
        let last = match self.active_join {
            Some(idx) => self.joins[idx].conditions_mut().last_mut(),
            None => self.wheres.last_mut(),
        };
        match last {
            Some(part) => {
                part.add_close(n);
                Ok(())
            }
            None => Err(WeaveError::structural(if self.active_join.is_some() {
                "close() called before any on() condition of the current join"
            } else {
                "close() called before any where() condition"
            })),
        }
    }
}

/// Generate the source/where/bracket builder methods shared by every statement.
///
/// The implementing type needs `sources: Vec<SourceExpr>`,
/// `conditions: Conditions` and `error: Option<WeaveError>` fields.
macro_rules! condition_methods {
    () => {
        /// Keep the first error; later calls keep building but cannot clear it.
        fn record(&mut self, result: $crate::error::WeaveResult<()>) {
            if let Err(err) = result {
                if self.error.is_none() {
                    self.error = Some(err);
                }
            }
        }

        /// Append one or more sources (`"users"`, `"users u"`, or a list).
        pub fn in_(
            mut self,
            sources: impl $crate::expression::IntoExprList<$crate::expression::SourceExpr>,
        ) -> Self {
            match sources.into_expr_list() {
                Ok(list) => self.sources.extend(list),
                Err(err) => self.record(Err(err)),
            }
            self
        }

        /// Add an AND condition (`"field [operator [value]]"`) with a bound value.
        pub fn where_(self, expr: &str, value: impl $crate::statement::part::IntoBind) -> Self {
            self.where_concat(expr, value, $crate::statement::part::Concat::And)
        }

        /// Add a condition with an explicit concatenator.
        pub fn where_concat(
            mut self,
            expr: &str,
            value: impl $crate::statement::part::IntoBind,
            concat: $crate::statement::part::Concat,
        ) -> Self {
            let result = self.conditions.push_where(expr, value.into_bind(), concat);
            self.record(result);
            self
        }

        /// Add an AND condition.
        pub fn and_where(self, expr: &str, value: impl $crate::statement::part::IntoBind) -> Self {
            self.where_concat(expr, value, $crate::statement::part::Concat::And)
        }

        /// Add an OR condition.
        pub fn or_where(self, expr: &str, value: impl $crate::statement::part::IntoBind) -> Self {
            self.where_concat(expr, value, $crate::statement::part::Concat::Or)
        }

        /// Add one AND condition per `(expression, value)` pair, in iteration order.
        pub fn where_map<K, V, I>(mut self, pairs: I) -> Self
        where
            K: AsRef<str>,
            V: $crate::statement::part::IntoBind,
            I: IntoIterator<Item = (K, V)>,
        {
            for (expr, value) in pairs {
                self = self.where_(expr.as_ref(), value);
            }
            self
        }

        /// Open a bracket before the next condition.
        pub fn open(self) -> Self {
            self.open_n(1)
        }

        /// Open `n` brackets before the next condition.
        pub fn open_n(mut self, n: u32) -> Self {
            self.conditions.open(n);
            self
        }

        /// Close a bracket after the most recent condition.
        pub fn close(self) -> Self {
            self.close_n(1)
        }

        /// Close `n` brackets after the most recent condition.
        pub fn close_n(mut self, n: u32) -> Self {
            let result = self.conditions.close(n);
            self.record(result);
            self
        }

        /// The first error recorded while building, if any.
        pub fn error(&self) -> Option<&$crate::error::WeaveError> {
            self.error.as_ref()
        }

        /// The statement's sources.
        pub fn sources(&self) -> &[$crate::expression::SourceExpr] {
            &self.sources
        }

        /// The top-level WHERE conditions.
        pub fn wheres(&self) -> &[$crate::statement::part::WherePart] {
            self.conditions.wheres()
        }
    };
}
