//! Runs compiled statements through an [`Executor`].
//!
//! `Connection` owns a compiler for its dialect and an executor. It logs each
//! statement before handing it over and takes care of the INSERT/last-id
//! transaction dance.

mod config;
mod logger;

pub use config::ConnectionConfig;
pub use logger::SqlLogger;

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::compiler::{Compiled, Compiler};
use crate::dialect::Dialect;
use crate::error::{WeaveError, WeaveResult};
use crate::executor::{Executor, Row, SaveOutcome};
use crate::statement::{Find, Remove, Save, SqlStatement, Statement};

/// A compiler bound to an executor.
///
/// The transaction flag is shared by every caller of one `Connection`.
/// Statements issued while a transaction is open, from any task, run inside
/// it; use one `Connection` per task for independent transactions.
pub struct Connection<E> {
    executor: E,
    compiler: Compiler,
    logger: Option<SqlLogger>,
    wrap_inserts: bool,
    in_transaction: AtomicBool,
}

impl<E> std::fmt::Debug for Connection<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.compiler.spec().name)
            .field("logger", &self.logger)
            .field("wrap_inserts", &self.wrap_inserts)
            .field("in_transaction", &self.in_transaction())
            .finish_non_exhaustive()
    }
}

impl<E> Connection<E> {
    /// Create a connection with default settings for `dialect`.
    pub fn new(executor: E, dialect: Dialect) -> Self {
        Self {
            executor,
            compiler: Compiler::new(dialect),
            logger: Some(SqlLogger::default()),
            wrap_inserts: true,
            in_transaction: AtomicBool::new(false),
        }
    }

    /// Create a connection from a configuration.
    ///
    /// # Errors
    /// Returns [`WeaveError::Config`](crate::WeaveError::Config) for an unknown log level.
    pub fn with_config(executor: E, config: &ConnectionConfig) -> WeaveResult<Self> {
        Ok(Self {
            executor,
            compiler: Compiler::new(config.dialect),
            logger: SqlLogger::from_config(config)?,
            wrap_inserts: config.wrap_inserts_in_transaction,
            in_transaction: AtomicBool::new(false),
        })
    }

    /// Replace the SQL logger (`None` disables logging).
    pub fn with_logger(mut self, logger: Option<SqlLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction.load(Ordering::Acquire)
    }

    // ==================== Statement factories ====================

    pub fn find(&self) -> Find {
        Find::new()
    }

    pub fn save(&self) -> Save {
        Save::new()
    }

    pub fn remove(&self) -> Remove {
        Remove::new()
    }

    /// Create a statement by name (`"find"`, `"save"` or `"remove"`).
    ///
    /// # Errors
    /// Returns [`WeaveError::UnknownDialectOperation`](crate::WeaveError::UnknownDialectOperation)
    /// for any other name.
    pub fn statement(&self, name: &str) -> WeaveResult<Statement> {
        Ok(Statement::new(name.parse()?))
    }

    /// Compile a statement and log it.
    pub fn build(&self, stmt: &impl SqlStatement) -> WeaveResult<Compiled> {
        let compiled = self.compiler.build(stmt)?;
        if let Some(logger) = &self.logger {
            logger.log(stmt.as_statement().kind(), self.compiler.spec().name, &compiled);
        }
        Ok(compiled)
    }
}

impl<E: Executor> Connection<E> {
    // ==================== Execution ====================

    /// Run a SELECT and return every row.
    pub async fn all(&self, find: &Find) -> WeaveResult<Vec<Row>> {
        let compiled = self.build(find)?;
        self.executor
            .query(&compiled.sql, &compiled.params)
            .await
            .inspect_err(|err| warn!(target: "sqlweave.sql", error = %err, "query failed"))
    }

    /// Run a SELECT limited to one row.
    pub async fn one(&self, find: &Find) -> WeaveResult<Option<Row>> {
        let limited = find.clone().limit(1);
        Ok(self.all(&limited).await?.into_iter().next())
    }

    /// Run a Save as INSERT or UPDATE.
    ///
    /// An INSERT outside a transaction runs in its own transaction (unless
    /// disabled in the config) and is rolled back if any step fails.
    pub async fn store(&self, save: &Save) -> WeaveResult<SaveOutcome> {
        let compiled = self.build(save)?;
        if save.is_update() {
            let affected = self.run(&compiled).await?;
            return Ok(SaveOutcome::Updated { affected });
        }

        let wrap = self.wrap_inserts && self.claim_transaction();
        if wrap {
            debug!(target: "sqlweave.sql", "begin transaction");
            if let Err(err) = self.executor.begin().await {
                self.in_transaction.store(false, Ordering::Release);
                return Err(err);
            }
        }

        let inserted = async {
            let affected = self.run(&compiled).await?;
            let last_insert_id = self.executor.last_insert_id().await?;
            Ok::<_, WeaveError>(SaveOutcome::Inserted {
                affected,
                last_insert_id,
            })
        }
        .await;

        match inserted {
            Ok(outcome) => {
                if wrap {
                    self.commit().await?;
                }
                Ok(outcome)
            }
            Err(err) => {
                if wrap {
                    if let Err(rollback_err) = self.rollback().await {
                        warn!(
                            target: "sqlweave.sql",
                            error = %rollback_err,
                            "rollback after failed insert failed"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    /// Run a DELETE and return the number of removed rows.
    pub async fn delete(&self, remove: &Remove) -> WeaveResult<u64> {
        let compiled = self.build(remove)?;
        self.run(&compiled).await
    }

    /// Run any statement for its affected-row count.
    pub async fn execute(&self, stmt: &impl SqlStatement) -> WeaveResult<u64> {
        let compiled = self.build(stmt)?;
        self.run(&compiled).await
    }

    async fn run(&self, compiled: &Compiled) -> WeaveResult<u64> {
        self.executor
            .execute(&compiled.sql, &compiled.params)
            .await
            .inspect_err(|err| warn!(target: "sqlweave.sql", error = %err, "statement failed"))
    }

    // ==================== Transactions ====================

    /// Set the transaction flag if it was clear. Returns whether this call set it.
    fn claim_transaction(&self) -> bool {
        self.in_transaction
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub async fn begin(&self) -> WeaveResult<()> {
        debug!(target: "sqlweave.sql", "begin transaction");
        self.executor.begin().await?;
        self.in_transaction.store(true, Ordering::Release);
        Ok(())
    }

    pub async fn commit(&self) -> WeaveResult<()> {
        debug!(target: "sqlweave.sql", "commit transaction");
        self.executor.commit().await?;
        self.in_transaction.store(false, Ordering::Release);
        Ok(())
    }

    pub async fn rollback(&self) -> WeaveResult<()> {
        debug!(target: "sqlweave.sql", "rollback transaction");
        let result = self.executor.rollback().await;
        self.in_transaction.store(false, Ordering::Release);
        result
    }
}
