//! Column definitions for PicoDB

use super::types::DataType;

/// Name of the column materialized by the first insert into a column-less table
pub const DEFAULT_COLUMN_NAME: &str = "value";

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Declared type
    pub data_type: DataType,
    /// Is this part of the primary key?
    pub primary_key: bool,
    /// Was NOT NULL declared?
    pub not_null: bool,
}

impl Column {
    /// Create a new column with minimal required fields
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            not_null: false,
        }
    }

    /// The synthetic single text column of a table declared without columns
    pub fn materialized() -> Self {
        Self::new(DEFAULT_COLUMN_NAME, DataType::Text)
    }

    /// Set primary key flag
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.primary_key = pk;
        if pk {
            self.not_null = true;
        }
        self
    }

    /// Set not-null flag
    pub fn not_null(mut self, not_null: bool) -> Self {
        self.not_null = not_null;
        self
    }

    /// One-line description, e.g. `id INTEGER [PRIMARY KEY, NOT NULL]`
    pub fn describe(&self) -> String {
        let mut flags = Vec::new();
        if self.primary_key {
            flags.push("PRIMARY KEY");
        }
        if self.not_null {
            flags.push("NOT NULL");
        }

        if flags.is_empty() {
            format!("{} {}", self.name, self.data_type)
        } else {
            format!("{} {} [{}]", self.name, self.data_type, flags.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_builders() {
        let id = Column::new("id", DataType::Integer).primary_key(true);
        assert!(id.primary_key);
        assert!(id.not_null);
        assert_eq!(id.describe(), "id INTEGER [PRIMARY KEY, NOT NULL]");

        let name = Column::new("name", DataType::Text);
        assert_eq!(name.describe(), "name TEXT");
    }

    #[test]
    fn test_materialized_column() {
        let col = Column::materialized();
        assert_eq!(col.name, DEFAULT_COLUMN_NAME);
        assert_eq!(col.data_type, DataType::Text);
        assert!(!col.not_null);
    }
}
