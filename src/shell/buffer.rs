//! Multi-line statement accumulation

use thiserror::Error;

/// The accumulated statement outgrew the limit and was discarded
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("SQL statement too long (max {0} bytes)")]
pub struct StatementTooLong(pub usize);

/// Joins input lines until one ends with `;`
#[derive(Debug, Clone)]
pub struct StatementBuffer {
    sql: String,
    max_len: usize,
}

impl StatementBuffer {
    pub fn new(max_len: usize) -> Self {
        Self {
            sql: String::new(),
            max_len,
        }
    }

    /// Nothing pending
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn clear(&mut self) {
        self.sql.clear();
    }

    /// Add a line.
    ///
    /// Returns the complete statement, without its terminator, once a line
    /// ends with `;`. Blank lines are ignored.
    pub fn push_line(&mut self, line: &str) -> Result<Option<String>, StatementTooLong> {
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
        if line.is_empty() {
            return Ok(None);
        }

        let separator = usize::from(!self.sql.is_empty());
        if self.sql.len() + separator + line.len() > self.max_len {
            self.sql.clear();
            return Err(StatementTooLong(self.max_len));
        }

        if separator == 1 {
            self.sql.push(' ');
        }
        self.sql.push_str(line);

        if self.sql.ends_with(';') {
            self.sql.pop();
            return Ok(Some(std::mem::take(&mut self.sql)));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_statement() {
        let mut buffer = StatementBuffer::new(100);
        assert_eq!(
            buffer.push_line("SELECT * FROM t;\n").unwrap(),
            Some("SELECT * FROM t".to_string())
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_multi_line_statement() {
        let mut buffer = StatementBuffer::new(100);
        assert_eq!(buffer.push_line("INSERT INTO t").unwrap(), None);
        assert_eq!(buffer.push_line("").unwrap(), None);
        assert!(!buffer.is_empty());
        assert_eq!(
            buffer.push_line("VALUES ('a');").unwrap(),
            Some("INSERT INTO t VALUES ('a')".to_string())
        );
    }

    #[test]
    fn test_too_long_resets() {
        let mut buffer = StatementBuffer::new(10);
        buffer.push_line("SELECT").unwrap();
        assert_eq!(
            buffer.push_line("* FROM t;"),
            Err(StatementTooLong(10))
        );
        assert!(buffer.is_empty());
        assert_eq!(
            buffer.push_line("BEGIN;").unwrap(),
            Some("BEGIN".to_string())
        );
    }
}
