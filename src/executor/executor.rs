//! Statement executor for PicoDB
//!
//! This module applies parsed statements to a catalog and streams selected
//! rows to a caller-supplied consumer.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::sql::ast::Statement;
use crate::sql::StatementKind;
use crate::storage::BlockAllocator;

/// One streamed row
#[derive(Debug, Clone, Copy)]
pub struct ResultRow<'a> {
    values: &'a [Option<String>],
    columns: &'a [&'a str],
}

impl<'a> ResultRow<'a> {
    pub fn new(values: &'a [Option<String>], columns: &'a [&'a str]) -> Self {
        Self { values, columns }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Value of column `index`; `None` for null or out of range
    pub fn value(&self, index: usize) -> Option<&'a str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    pub fn column_name(&self, index: usize) -> Option<&'a str> {
        self.columns.get(index).copied()
    }

    pub fn values(&self) -> &'a [Option<String>] {
        self.values
    }

    pub fn column_names(&self) -> &'a [&'a str] {
        self.columns
    }
}

/// Result consumer invoked once per selected row.
///
/// Returning `ControlFlow::Break(())` stops the stream and the select fails
/// with [`Error::Aborted`].
pub type RowCallback<'a> = dyn FnMut(&ResultRow<'_>) -> ControlFlow<()> + 'a;

/// Summary of a successfully executed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    pub kind: StatementKind,
    /// Rows inserted
    pub rows_affected: usize,
    /// Rows handed to the consumer
    pub rows_streamed: usize,
    pub message: Option<String>,
}

impl ExecOutcome {
    fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            rows_affected: 0,
            rows_streamed: 0,
            message: None,
        }
    }

    fn with_message(kind: StatementKind, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(kind)
        }
    }

    /// Statement was accepted without any effect
    pub fn is_unimplemented(&self) -> bool {
        self.kind.is_unimplemented()
    }
}

/// Per-handle settings changed by statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub in_transaction: bool,
    pub cache_size: usize,
    pub page_size: usize,
}

impl SessionState {
    pub fn new(config: &Config) -> Self {
        Self {
            in_transaction: false,
            cache_size: config.cache_size,
            page_size: config.page_size,
        }
    }
}

/// Cancellation flag shared between a handle and other threads
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle(Arc<AtomicBool>);

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the running select on this handle stop
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Execution Engine
///
/// Borrows everything it mutates from the owning handle for the duration of
/// one statement.
pub struct ExecutionEngine<'a> {
    catalog: &'a mut Catalog,
    allocator: &'a mut dyn BlockAllocator,
    session: &'a mut SessionState,
    config: &'a Config,
    interrupt: &'a InterruptHandle,
}

impl<'a> ExecutionEngine<'a> {
    pub fn new(
        catalog: &'a mut Catalog,
        allocator: &'a mut dyn BlockAllocator,
        session: &'a mut SessionState,
        config: &'a Config,
        interrupt: &'a InterruptHandle,
    ) -> Self {
        Self {
            catalog,
            allocator,
            session,
            config,
            interrupt,
        }
    }

    /// Execute a parsed statement
    pub fn execute(
        &mut self,
        statement: Statement,
        callback: Option<&mut RowCallback<'_>>,
    ) -> Result<ExecOutcome> {
        debug!(kind = %statement.kind(), "executing statement");

        match statement {
            Statement::CreateTable { name, columns } => self.execute_create_table(&name, columns),
            Statement::DropTable { name } => self.execute_drop_table(&name),
            Statement::Insert { table, values } => self.execute_insert(&table, values),
            Statement::Select { table, .. } => self.execute_select(&table, callback),
            Statement::Begin => {
                self.session.in_transaction = true;
                Ok(ExecOutcome::new(StatementKind::Begin))
            }
            Statement::Commit => {
                self.session.in_transaction = false;
                Ok(ExecOutcome::new(StatementKind::Commit))
            }
            Statement::Rollback => {
                self.session.in_transaction = false;
                Ok(ExecOutcome::new(StatementKind::Rollback))
            }
            Statement::Pragma { name, value } => self.execute_pragma(&name, value, callback),
            Statement::Unimplemented(kind) => {
                warn!(%kind, "statement accepted without effect");
                Ok(ExecOutcome::with_message(
                    kind,
                    format!("{} not yet implemented", kind.keyword()),
                ))
            }
            Statement::Empty => Ok(ExecOutcome::new(StatementKind::Empty)),
        }
    }

    fn execute_create_table(
        &mut self,
        name: &str,
        columns: Vec<crate::catalog::Column>,
    ) -> Result<ExecOutcome> {
        let table = self.catalog.create_table(name, columns)?;
        debug!(table = %table.name(), columns = table.column_count(), "created table");

        Ok(ExecOutcome::with_message(
            StatementKind::CreateTable,
            format!("Table '{}' created", name),
        ))
    }

    fn execute_drop_table(&mut self, name: &str) -> Result<ExecOutcome> {
        self.catalog.drop_table(name, &mut *self.allocator)?;
        debug!(table = %name, "dropped table");

        Ok(ExecOutcome::with_message(
            StatementKind::DropTable,
            format!("Table '{}' dropped", name),
        ))
    }

    fn execute_insert(&mut self, name: &str, values: Vec<Option<String>>) -> Result<ExecOutcome> {
        let table = self.catalog.get_table_mut(name)?;
        table.insert_row(values, &mut *self.allocator, self.config)?;
        debug!(table = %name, rows = table.row_count(), "inserted row");

        Ok(ExecOutcome {
            rows_affected: 1,
            ..ExecOutcome::new(StatementKind::Insert)
        })
    }

    fn execute_select(
        &mut self,
        name: &str,
        mut callback: Option<&mut RowCallback<'_>>,
    ) -> Result<ExecOutcome> {
        let table = self.catalog.get_table(name)?;
        let mut outcome = ExecOutcome::new(StatementKind::Select);

        // Nothing has ever been inserted into a column-less table.
        if table.column_count() == 0 {
            return Ok(outcome);
        }

        let columns = table.column_names();
        for row in table.rows() {
            if self.interrupt.is_interrupted() {
                return Err(Error::Interrupted);
            }

            let result_row = ResultRow::new(row.values(), &columns);
            if let Some(callback) = callback.as_deref_mut() {
                if callback(&result_row).is_break() {
                    debug!(table = %name, streamed = outcome.rows_streamed + 1, "select aborted by consumer");
                    return Err(Error::Aborted);
                }
            }
            outcome.rows_streamed += 1;
        }

        Ok(outcome)
    }

    fn execute_pragma(
        &mut self,
        name: &str,
        value: Option<String>,
        callback: Option<&mut RowCallback<'_>>,
    ) -> Result<ExecOutcome> {
        let setting = match name.to_ascii_lowercase().as_str() {
            "cache_size" => &mut self.session.cache_size,
            "page_size" => &mut self.session.page_size,
            _ => {
                debug!(pragma = %name, "ignoring unsupported pragma");
                return Ok(ExecOutcome::new(StatementKind::Pragma));
            }
        };

        match value {
            Some(value) => {
                let parsed: usize = value.parse().map_err(|_| {
                    Error::SyntaxError(format!("invalid value '{}' for pragma {}", value, name))
                })?;
                if name.eq_ignore_ascii_case("page_size")
                    && (parsed < 512 || !parsed.is_power_of_two())
                {
                    return Err(Error::InvalidArgument(format!(
                        "page_size must be a power of two of at least 512, got {}",
                        parsed
                    )));
                }
                *setting = parsed;
                debug!(pragma = %name, value = parsed, "pragma set");
                Ok(ExecOutcome::new(StatementKind::Pragma))
            }
            None => {
                let current = [Some(setting.to_string())];
                let column = [name];
                let mut outcome = ExecOutcome::new(StatementKind::Pragma);
                if let Some(callback) = callback {
                    if callback(&ResultRow::new(&current, &column)).is_break() {
                        return Err(Error::Aborted);
                    }
                }
                outcome.rows_streamed = 1;
                Ok(outcome)
            }
        }
    }
}
