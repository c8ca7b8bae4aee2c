//! Database handle
//!
//! A [`Database`] owns one catalog, the collaborators it charges memory to
//! and stores through, and the status of the most recent statement.

use std::mem::size_of;
use std::ops::ControlFlow;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{Error, Result, StatusCode};
use crate::executor::{
    ExecOutcome, ExecutionEngine, InterruptHandle, ResultRow, RowCallback, SessionState,
};
use crate::sql::parse;
use crate::storage::{
    Block, BlockAllocator, FileBackend, FileRef, MemStats, MemoryBackend, OpenFlags,
    StorageBackend, Table, TrackingAllocator,
};

/// Name that selects the volatile storage backend
pub const MEMORY_DB_NAME: &str = ":memory:";

/// Bytes charged for the handle itself
const HANDLE_BYTES: usize = size_of::<Database>();

/// An open database
pub struct Database {
    filename: String,
    config: Config,
    catalog: Catalog,
    session: SessionState,
    backend: Box<dyn StorageBackend>,
    allocator: Box<dyn BlockAllocator>,
    file: Option<FileRef>,
    handle_block: Option<Block>,
    catalog_block: Option<Block>,
    name_block: Option<Block>,
    interrupt: InterruptHandle,
    last_error: Option<String>,
    last_status: StatusCode,
    is_open: bool,
}

impl Database {
    /// Open `name` with the default configuration.
    ///
    /// [`MEMORY_DB_NAME`] opens a volatile database; any other name is a
    /// file, created when missing.
    pub fn open(name: &str) -> Result<Self> {
        Self::open_with_config(name, Config::default())
    }

    /// Open `name` with an explicit configuration
    pub fn open_with_config(name: &str, config: Config) -> Result<Self> {
        let backend: Box<dyn StorageBackend> = if name == MEMORY_DB_NAME {
            Box::new(MemoryBackend::new())
        } else {
            Box::new(FileBackend::new())
        };
        let allocator = Box::new(TrackingAllocator::new(config.memory_budget));
        Self::open_with(name, config, backend, allocator)
    }

    /// Open `name` on caller-supplied collaborators
    pub fn open_with(
        name: &str,
        config: Config,
        backend: Box<dyn StorageBackend>,
        allocator: Box<dyn BlockAllocator>,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("database name is empty".to_string()));
        }
        config.validate()?;

        let mut db = Self {
            filename: name.to_string(),
            catalog: Catalog::new(config.max_tables)
                .with_name_limit(config.max_table_name_len),
            session: SessionState::new(&config),
            config,
            backend,
            allocator,
            file: None,
            handle_block: None,
            catalog_block: None,
            name_block: None,
            interrupt: InterruptHandle::new(),
            last_error: None,
            last_status: StatusCode::Ok,
            is_open: false,
        };

        // Anything claimed before a failure is returned when `db` drops.
        db.handle_block = Some(db.allocator.allocate(HANDLE_BYTES)?);
        db.catalog_block = Some(
            db.allocator
                .allocate(size_of::<Table>() * db.config.max_tables)?,
        );
        db.name_block = Some(db.allocator.allocate(name.len() + 1)?);

        let file = db
            .backend
            .open(name, OpenFlags::READ_WRITE)
            .or_else(|_| db.backend.open(name, OpenFlags::READ_WRITE.with_create()))
            .map_err(|e| {
                debug!(db = %name, error = %e, "backend open failed");
                Error::CannotOpen(name.to_string())
            })?;
        db.file = Some(file);
        db.is_open = true;

        info!(db = %name, "opened database");
        Ok(db)
    }

    /// Execute one statement, streaming selected rows to `callback`.
    ///
    /// The outcome is also recorded for [`last_error`](Self::last_error)
    /// and [`last_status`](Self::last_status).
    pub fn exec(
        &mut self,
        sql: &str,
        callback: Option<&mut RowCallback<'_>>,
    ) -> Result<ExecOutcome> {
        let result = self.run(sql, callback);

        self.last_status = StatusCode::of(&result);
        self.last_error = result.as_ref().err().map(|e| e.to_string());
        if let Err(e) = &result {
            debug!(error = %e, status = %self.last_status, "statement failed");
        }
        result
    }

    /// Execute one statement without a row consumer
    pub fn execute(&mut self, sql: &str) -> Result<ExecOutcome> {
        self.exec(sql, None)
    }

    /// Execute one statement, streaming rows to a closure
    pub fn query<F>(&mut self, sql: &str, mut f: F) -> Result<ExecOutcome>
    where
        F: FnMut(&ResultRow<'_>) -> ControlFlow<()>,
    {
        let callback: &mut RowCallback<'_> = &mut f;
        self.exec(sql, Some(callback))
    }

    fn run(&mut self, sql: &str, callback: Option<&mut RowCallback<'_>>) -> Result<ExecOutcome> {
        if !self.is_open {
            return Err(Error::NotOpen);
        }
        if sql.len() > self.config.max_sql_length {
            return Err(Error::InvalidArgument(format!(
                "statement exceeds {} bytes",
                self.config.max_sql_length
            )));
        }

        self.interrupt.clear();
        let statement = parse(sql, &self.config)?;

        let mut engine = ExecutionEngine::new(
            &mut self.catalog,
            &mut *self.allocator,
            &mut self.session,
            &self.config,
            &self.interrupt,
        );
        engine.execute(statement, callback)
    }

    pub fn table_count(&self) -> usize {
        self.catalog.len()
    }

    /// Name of the `index`-th table in creation order
    pub fn table_name(&self, index: usize) -> Option<&str> {
        self.catalog.table_at(index).map(|t| t.name())
    }

    pub fn column_count(&self, table: &str) -> Option<usize> {
        self.catalog.find(table).map(|t| t.column_count())
    }

    pub fn column_name(&self, table: &str, index: usize) -> Option<&str> {
        self.catalog
            .find(table)
            .and_then(|t| t.column(index))
            .map(|c| c.name.as_str())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Schema description of one table
    pub fn table_info(&self, table: &str) -> Result<String> {
        self.catalog.get_table_info(table)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn in_transaction(&self) -> bool {
        self.session.in_transaction
    }

    pub fn cache_size(&self) -> usize {
        self.session.cache_size
    }

    pub fn page_size(&self) -> usize {
        self.session.page_size
    }

    /// Size of the backing object in bytes
    pub fn file_size(&mut self) -> Result<u64> {
        let file = self.file.ok_or(Error::NotOpen)?;
        self.backend.size(file)
    }

    pub fn memory_stats(&self) -> MemStats {
        self.allocator.stats()
    }

    /// A handle that can interrupt selects on this database from elsewhere
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Message of the last failed statement, cleared by a successful one
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_status(&self) -> StatusCode {
        self.last_status
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Close the database, returning the allocator's final statistics
    pub fn close(mut self) -> MemStats {
        self.shutdown();
        self.allocator.stats()
    }

    /// Release tables, bookkeeping blocks and the backing file
    fn shutdown(&mut self) {
        let was_open = std::mem::replace(&mut self.is_open, false);

        self.catalog.release(&mut *self.allocator);
        for block in [
            self.catalog_block.take(),
            self.name_block.take(),
            self.handle_block.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.allocator.free(block);
        }

        if let Some(file) = self.file.take() {
            if let Err(e) = self.backend.close(file) {
                warn!(db = %self.filename, error = %e, "failed to close database file");
            }
        }

        if was_open {
            info!(db = %self.filename, "closed database");
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Database {
        Database::open(MEMORY_DB_NAME).unwrap()
    }

    #[test]
    fn test_open_memory() {
        let db = memory_db();
        assert!(db.is_open());
        assert_eq!(db.filename(), MEMORY_DB_NAME);
        assert_eq!(db.table_count(), 0);
        assert_eq!(db.last_status(), StatusCode::Ok);
        assert!(db.memory_stats().current_allocated > 0);
    }

    #[test]
    fn test_open_empty_name() {
        assert!(matches!(
            Database::open(""),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_open_out_of_memory_releases_claims() {
        let result = Database::open_with(
            MEMORY_DB_NAME,
            Config::default(),
            Box::new(MemoryBackend::new()),
            Box::new(TrackingAllocator::new(HANDLE_BYTES + 8)),
        );
        assert!(matches!(result, Err(Error::OutOfMemory)));
    }

    #[test]
    fn test_open_cannot_open() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no/such/dir/db.pico");
        let result = Database::open(missing.to_str().unwrap());
        assert!(matches!(result, Err(Error::CannotOpen(_))));
    }

    #[test]
    fn test_last_error_tracks_statements() {
        let mut db = memory_db();

        assert!(db.execute("SELECT * FROM nope").is_err());
        assert_eq!(db.last_status(), StatusCode::Error);
        assert!(db.last_error().unwrap().contains("nope"));

        db.execute("CREATE TABLE t").unwrap();
        assert_eq!(db.last_status(), StatusCode::Ok);
        assert!(db.last_error().is_none());
    }

    #[test]
    fn test_statement_too_long() {
        let config = Config {
            max_sql_length: 16,
            ..Config::default()
        };
        let mut db = Database::open_with_config(MEMORY_DB_NAME, config).unwrap();

        let result = db.execute("INSERT INTO t VALUES ('far too long')");
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_introspection() {
        let mut db = memory_db();
        db.execute("CREATE TABLE a").unwrap();
        db.execute("CREATE TABLE b").unwrap();
        db.execute("INSERT INTO b VALUES ('x')").unwrap();

        assert_eq!(db.table_count(), 2);
        assert_eq!(db.table_name(0), Some("a"));
        assert_eq!(db.table_name(1), Some("b"));
        assert_eq!(db.table_name(2), None);
        assert_eq!(db.column_count("a"), Some(0));
        assert_eq!(db.column_count("B"), Some(1));
        assert_eq!(db.column_name("b", 0), Some("value"));
        assert_eq!(db.column_count("c"), None);
        assert!(db.table_info("b").unwrap().contains("value TEXT"));
    }

    #[test]
    fn test_interrupt_cleared_between_statements() {
        let mut db = memory_db();
        db.execute("CREATE TABLE t").unwrap();
        db.execute("INSERT INTO t VALUES ('a')").unwrap();

        // A stale request does not carry over into the next statement.
        db.interrupt_handle().interrupt();
        let outcome = db.query("SELECT * FROM t", |_| ControlFlow::Continue(())).unwrap();
        assert_eq!(outcome.rows_streamed, 1);
    }

    #[test]
    fn test_close_releases_everything() {
        let mut db = memory_db();
        db.execute("CREATE TABLE t").unwrap();
        for i in 0..25 {
            db.execute(&format!("INSERT INTO t VALUES ('{}')", i)).unwrap();
        }

        let stats = db.close();
        assert_eq!(stats.current_allocated, 0);
        assert_eq!(stats.allocation_count, stats.free_count);
    }

    #[test]
    fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pico");
        let name = path.to_str().unwrap();

        let mut db = Database::open(name).unwrap();
        assert!(path.exists());
        assert_eq!(db.file_size().unwrap(), 0);
        db.close();

        // Reopening an existing file succeeds.
        let db = Database::open(name).unwrap();
        assert!(db.is_open());
    }
}
