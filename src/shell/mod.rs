//! Interactive shell
//!
//! Line-oriented front end over a [`Database`]: dot commands plus SQL
//! statements that may span several lines. Output goes to two writers so
//! the shell can be driven from tests as easily as from a terminal.

pub mod buffer;

use std::io::{self, Write};
use std::ops::ControlFlow;

use crate::config::Config;
use crate::database::{Database, MEMORY_DB_NAME};
use crate::error::Result;
use crate::executor::ResultRow;

pub use buffer::{StatementBuffer, StatementTooLong};

/// Prompt for a new statement
pub const PROMPT: &str = "picodb> ";
/// Prompt while a statement is incomplete
pub const CONTINUE_PROMPT: &str = "   ...> ";

/// What the caller should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Exit,
}

/// Interactive shell state
pub struct Shell<W: Write, E: Write> {
    db: Option<Database>,
    config: Config,
    out: W,
    err: E,
    buffer: StatementBuffer,
    verbose: bool,
    headers: bool,
}

impl<W: Write, E: Write> Shell<W, E> {
    pub fn new(config: Config, out: W, err: E) -> Self {
        Self {
            db: None,
            buffer: StatementBuffer::new(config.max_sql_length),
            config,
            out,
            err,
            verbose: false,
            headers: true,
        }
    }

    /// Open `name`, replacing any open database
    pub fn open(&mut self, name: &str) -> Result<()> {
        // Release the old handle before its file may be reopened.
        self.db = None;
        self.db = Some(Database::open_with_config(name, self.config.clone())?);
        Ok(())
    }

    pub fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    pub fn prompt(&self) -> &'static str {
        if self.buffer.is_empty() {
            PROMPT
        } else {
            CONTINUE_PROMPT
        }
    }

    /// Discard a partially entered statement
    pub fn reset_statement(&mut self) {
        self.buffer.clear();
    }

    pub fn print_banner(&mut self) -> io::Result<()> {
        writeln!(self.out, "PicoDB {}", crate::VERSION)?;
        writeln!(self.out, "Type '.help' for available commands")?;
        writeln!(self.out)
    }

    /// Report which database is open, the way startup announces it
    pub fn print_opened(&mut self) -> io::Result<()> {
        match self.db.as_ref().map(|db| db.filename().to_string()) {
            Some(name) if name == MEMORY_DB_NAME => {
                writeln!(self.out, "Opened in-memory database")
            }
            Some(name) => writeln!(self.out, "Opened '{}'", name),
            None => Ok(()),
        }
    }

    /// Handle one input line
    pub fn handle_line(&mut self, line: &str) -> io::Result<LineOutcome> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(LineOutcome::Continue);
        }

        if self.buffer.is_empty() && trimmed.starts_with('.') {
            return self.exec_dot_command(trimmed);
        }

        match self.buffer.push_line(line) {
            Ok(Some(sql)) => self.exec_sql(&sql)?,
            Ok(None) => {}
            Err(e) => writeln!(self.err, "{}", e)?,
        }
        Ok(LineOutcome::Continue)
    }

    fn exec_dot_command(&mut self, line: &str) -> io::Result<LineOutcome> {
        let mut parts = line[1..].split_whitespace();
        let command = parts.next().unwrap_or("");
        let arg = parts.next();

        match command {
            "quit" | "exit" => return Ok(LineOutcome::Exit),
            "help" => self.print_help()?,
            "open" => self.cmd_open(arg)?,
            "tables" => self.cmd_tables()?,
            "schema" => self.cmd_schema(arg)?,
            "verbose" => {
                if let Some(enabled) = self.toggle(arg, self.verbose)? {
                    self.verbose = enabled;
                    writeln!(self.out, "Verbose mode {}", on_off(enabled))?;
                }
            }
            "headers" => {
                if let Some(enabled) = self.toggle(arg, self.headers)? {
                    self.headers = enabled;
                    writeln!(self.out, "Headers {}", on_off(enabled))?;
                }
            }
            "dbinfo" => self.cmd_dbinfo()?,
            "memstats" => self.cmd_memstats(arg)?,
            _ => {
                writeln!(self.err, "Unknown command: .{}", command)?;
                writeln!(self.err, "Type .help for available commands")?;
            }
        }
        Ok(LineOutcome::Continue)
    }

    /// `on`/`off` argument, or flip `current` when absent
    fn toggle(&mut self, arg: Option<&str>, current: bool) -> io::Result<Option<bool>> {
        match arg {
            None => Ok(Some(!current)),
            Some("on") => Ok(Some(true)),
            Some("off") => Ok(Some(false)),
            Some(_) => {
                writeln!(self.out, "Usage: .verbose|.headers [on|off]")?;
                Ok(None)
            }
        }
    }

    fn cmd_open(&mut self, arg: Option<&str>) -> io::Result<()> {
        let Some(name) = arg else {
            return writeln!(self.err, "Usage: .open <filename>");
        };

        match self.open(name) {
            Ok(()) => writeln!(self.out, "Opened database '{}'", name),
            Err(e) => writeln!(self.err, "Cannot open database '{}': {}", name, e),
        }
    }

    fn cmd_tables(&mut self) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return writeln!(self.err, "No database open");
        };

        let tables = db.catalog().list_tables();
        if tables.is_empty() {
            return writeln!(self.out, "(No tables)");
        }
        writeln!(self.out, "Tables:")?;
        for name in tables {
            writeln!(self.out, "  {}", name)?;
        }
        Ok(())
    }

    fn cmd_schema(&mut self, table: Option<&str>) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return writeln!(self.err, "No database open");
        };

        let names: Vec<String> = match table {
            Some(name) => vec![name.to_string()],
            None => db
                .catalog()
                .list_tables()
                .into_iter()
                .map(str::to_string)
                .collect(),
        };

        for name in names {
            match db.table_info(&name) {
                Ok(info) => write!(self.out, "{}", info)?,
                Err(e) => writeln!(self.err, "Error: {}", e)?,
            }
        }
        Ok(())
    }

    fn cmd_dbinfo(&mut self) -> io::Result<()> {
        let Some(db) = self.db.as_mut() else {
            return writeln!(self.err, "No database open");
        };

        let file_size = match db.file_size() {
            Ok(size) => format!("{} bytes", size),
            Err(e) => format!("unknown ({})", e),
        };
        writeln!(self.out, "Database:    {}", db.filename())?;
        writeln!(self.out, "Tables:      {}", db.table_count())?;
        writeln!(self.out, "File size:   {}", file_size)?;
        writeln!(self.out, "Cache size:  {}", db.cache_size())?;
        writeln!(self.out, "Page size:   {}", db.page_size())?;
        writeln!(
            self.out,
            "Transaction: {}",
            if db.in_transaction() { "active" } else { "none" }
        )
    }

    fn cmd_memstats(&mut self, arg: Option<&str>) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return writeln!(self.err, "No database open");
        };
        let stats = db.memory_stats();
        match arg {
            None => writeln!(self.out, "{}", stats),
            Some("json") => {
                let json = serde_json::to_string_pretty(&stats).map_err(io::Error::from)?;
                writeln!(self.out, "{}", json)
            }
            Some(_) => writeln!(self.out, "Usage: .memstats [json]"),
        }
    }

    fn exec_sql(&mut self, sql: &str) -> io::Result<()> {
        let Some(db) = self.db.as_mut() else {
            return writeln!(self.err, "No database open");
        };

        if self.verbose {
            writeln!(self.out, "Executing: {}", sql)?;
        }

        let out = &mut self.out;
        let mut header_pending = self.headers;
        let mut write_error = None;
        let result = db.query(sql, |row| {
            match write_row(&mut *out, row, &mut header_pending) {
                Ok(()) => ControlFlow::Continue(()),
                Err(e) => {
                    write_error = Some(e);
                    ControlFlow::Break(())
                }
            }
        });
        if let Some(e) = write_error {
            return Err(e);
        }

        match result {
            Ok(outcome) if outcome.is_unimplemented() => {
                if let Some(message) = outcome.message {
                    writeln!(self.out, "Note: {}", message)?;
                }
            }
            Ok(outcome) => {
                if self.verbose {
                    if let Some(message) = outcome.message {
                        writeln!(self.out, "{}", message)?;
                    }
                }
            }
            Err(e) => writeln!(self.err, "SQL Error: {}", e)?,
        }
        Ok(())
    }

    fn print_help(&mut self) -> io::Result<()> {
        write!(
            self.out,
            r#"Dot commands:
  .quit, .exit         Exit the shell
  .help                Show this message
  .open <file>         Open database file (:memory: for a volatile one)
  .tables              List all tables
  .schema [table]      Show table schema
  .verbose [on|off]    Echo statements and their messages
  .headers [on|off]    Print column headers above results
  .dbinfo              Show database information
  .memstats [json]     Show memory allocator statistics

SQL statements end with a semicolon (;) and may span several lines.

Supported SQL:
  CREATE TABLE name [(columns)]
  DROP TABLE name
  INSERT INTO name VALUES (v1, v2, ...)
  SELECT * FROM name
  BEGIN / COMMIT / ROLLBACK
  PRAGMA cache_size [= n], PRAGMA page_size [= n]
  UPDATE and DELETE are accepted but not yet implemented
"#
        )
    }

    /// Close the database, if any
    pub fn close(&mut self) {
        if let Some(db) = self.db.take() {
            db.close();
        }
    }

    /// Close the database and hand back the writers
    pub fn into_inner(mut self) -> (W, E) {
        self.close();
        (self.out, self.err)
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

/// Print a row as `a | b`, preceded once by a header and its underline
fn write_row(out: &mut impl Write, row: &ResultRow<'_>, header_pending: &mut bool) -> io::Result<()> {
    if std::mem::take(header_pending) {
        writeln!(out, "{}", row.column_names().join(" | "))?;
        let underline: Vec<String> = row
            .column_names()
            .iter()
            .map(|name| "-".repeat(name.chars().count()))
            .collect();
        writeln!(out, "{}", underline.join("-+-"))?;
    }

    let values: Vec<&str> = row
        .values()
        .iter()
        .map(|v| v.as_deref().unwrap_or("NULL"))
        .collect();
    writeln!(out, "{}", values.join(" | "))
}
