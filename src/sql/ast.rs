//! Parsed statements

use super::classifier::StatementKind;
use crate::catalog::Column;

/// A parsed statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE name [(column definitions)]
    CreateTable { name: String, columns: Vec<Column> },
    /// DROP TABLE name
    DropTable { name: String },
    /// INSERT INTO name VALUES (v1, v2, ...)
    Insert {
        table: String,
        values: Vec<Option<String>>,
    },
    /// SELECT projection FROM name; the projection is kept but never applied
    Select { table: String, projection: String },
    Begin,
    Commit,
    Rollback,
    /// PRAGMA name [= value]
    Pragma { name: String, value: Option<String> },
    /// Accepted without effect
    Unimplemented(StatementKind),
    /// Blank input
    Empty,
}

impl Statement {
    /// Kind this statement was classified as
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::CreateTable { .. } => StatementKind::CreateTable,
            Statement::DropTable { .. } => StatementKind::DropTable,
            Statement::Insert { .. } => StatementKind::Insert,
            Statement::Select { .. } => StatementKind::Select,
            Statement::Begin => StatementKind::Begin,
            Statement::Commit => StatementKind::Commit,
            Statement::Rollback => StatementKind::Rollback,
            Statement::Pragma { .. } => StatementKind::Pragma,
            Statement::Unimplemented(kind) => *kind,
            Statement::Empty => StatementKind::Empty,
        }
    }
}
