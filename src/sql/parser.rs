//! Statement parser
//!
//! Turns classified statement text into a [`Statement`]. Each grammar is
//! deliberately narrow: names are runs of non-whitespace characters and
//! values are text.

use std::collections::HashSet;

use super::ast::Statement;
use super::classifier::{classify, normalize, StatementKind};
use super::scanner::{Boundary, Scanner};
use crate::catalog::{Column, DataType};
use crate::config::Config;
use crate::error::{Error, Result};

/// Words that end a column's type and start its constraints
const CONSTRAINT_WORDS: [&str; 9] = [
    "PRIMARY",
    "NOT",
    "NULL",
    "UNIQUE",
    "DEFAULT",
    "CHECK",
    "REFERENCES",
    "COLLATE",
    "CONSTRAINT",
];

/// Statement parser
pub struct Parser<'a> {
    kind: StatementKind,
    scanner: Scanner,
    config: &'a Config,
}

impl<'a> Parser<'a> {
    /// Create a parser for one statement
    pub fn new(sql: &str, config: &'a Config) -> Self {
        let text = normalize(sql);
        Self {
            kind: classify(text),
            scanner: Scanner::new(text),
            config,
        }
    }

    /// Kind of the statement being parsed
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Parse the statement
    pub fn parse(&mut self) -> Result<Statement> {
        match self.kind {
            StatementKind::CreateTable => self.parse_create_table(),
            StatementKind::DropTable => self.parse_drop_table(),
            StatementKind::Insert => self.parse_insert(),
            StatementKind::Select => self.parse_select(),
            StatementKind::Begin => Ok(Statement::Begin),
            StatementKind::Commit => Ok(Statement::Commit),
            StatementKind::Rollback => Ok(Statement::Rollback),
            StatementKind::Pragma => self.parse_pragma(),
            StatementKind::Empty => Ok(Statement::Empty),
            kind @ (StatementKind::Update
            | StatementKind::Delete
            | StatementKind::Unrecognized) => Ok(Statement::Unimplemented(kind)),
        }
    }

    /// Consume the classified leading keywords
    fn skip_leading(&mut self, keywords: &[&str]) -> Result<()> {
        for keyword in keywords {
            self.scanner.expect_keyword(keyword, Boundary::Whitespace)?;
        }
        self.scanner.skip_whitespace();
        Ok(())
    }

    fn parse_create_table(&mut self) -> Result<Statement> {
        self.skip_leading(&["CREATE", "TABLE"])?;

        let name = self
            .scanner
            .read_while(|c| !c.is_whitespace() && c != '(');

        self.scanner.skip_whitespace();
        let columns = if self.config.declared_columns && self.scanner.current_char() == Some('(')
        {
            let body = self.scanner.read_group()?;
            self.parse_column_defs(&body)?
        } else {
            Vec::new()
        };

        Ok(Statement::CreateTable { name, columns })
    }

    fn parse_drop_table(&mut self) -> Result<Statement> {
        self.skip_leading(&["DROP", "TABLE"])?;

        let name = self.scanner.read_while(|c| !c.is_whitespace());
        let name = self.checked_table_name(name)?;
        Ok(Statement::DropTable { name })
    }

    fn parse_insert(&mut self) -> Result<Statement> {
        self.skip_leading(&["INSERT"])?;
        self.scanner.expect_keyword("INTO", Boundary::Whitespace)?;
        self.scanner.skip_whitespace();

        let table = self
            .scanner
            .read_while(|c| !c.is_whitespace() && c != '(');
        let table = self.checked_table_name(table)?;

        // An explicit column list is tolerated and ignored.
        self.scanner.skip_whitespace();
        if self.scanner.current_char() == Some('(') {
            self.scanner.read_group()?;
        }

        self.scanner
            .expect_keyword("VALUES", Boundary::WhitespaceOrParen)?;
        self.scanner.expect_char('(')?;
        let values = self.parse_value_list()?;

        Ok(Statement::Insert { table, values })
    }

    /// Values after `VALUES (`, through the closing `)`
    fn parse_value_list(&mut self) -> Result<Vec<Option<String>>> {
        let mut values = Vec::new();

        self.scanner.skip_whitespace();
        if self.scanner.current_char() == Some(')') {
            self.scanner.advance();
            return Ok(values);
        }

        loop {
            self.scanner.skip_whitespace();
            let value = match self.scanner.current_char() {
                Some('\'' | '"') => Some(self.scanner.read_quoted()?),
                Some(_) => {
                    let raw = self.scanner.read_while(|c| c != ',' && c != ')');
                    let raw = raw.trim_end();
                    if raw.eq_ignore_ascii_case("NULL") {
                        None
                    } else {
                        Some(raw.to_string())
                    }
                }
                None => {
                    return Err(Error::SyntaxError("unterminated VALUES list".to_string()));
                }
            };
            values.push(value);

            self.scanner.skip_whitespace();
            match self.scanner.current_char() {
                Some(',') => self.scanner.advance(),
                Some(')') => {
                    self.scanner.advance();
                    return Ok(values);
                }
                Some(c) => {
                    return Err(Error::SyntaxError(format!(
                        "unexpected '{}' in VALUES list",
                        c
                    )));
                }
                None => {
                    return Err(Error::SyntaxError("unterminated VALUES list".to_string()));
                }
            }
        }
    }

    fn parse_select(&mut self) -> Result<Statement> {
        self.skip_leading(&["SELECT"])?;

        let projection = self
            .scanner
            .seek_word("FROM")
            .ok_or_else(|| Error::SyntaxError("expected FROM".to_string()))?;
        self.scanner.skip_whitespace();

        let table = self.scanner.read_while(|c| !c.is_whitespace());
        let table = self.checked_table_name(table)?;

        Ok(Statement::Select {
            table,
            projection: projection.trim().to_string(),
        })
    }

    fn parse_pragma(&mut self) -> Result<Statement> {
        self.skip_leading(&["PRAGMA"])?;

        let name = self
            .scanner
            .read_while(|c| c.is_ascii_alphanumeric() || c == '_');
        if name.is_empty() {
            return Err(Error::SyntaxError("missing pragma name".to_string()));
        }

        self.scanner.skip_whitespace();
        let value = match self.scanner.current_char() {
            Some('=') => {
                self.scanner.advance();
                Some(self.scanner.rest().trim().to_string())
            }
            Some('(') => Some(self.scanner.read_group()?.trim().to_string()),
            Some(c) => {
                return Err(Error::SyntaxError(format!(
                    "unexpected '{}' after pragma name",
                    c
                )));
            }
            None => None,
        };

        let value = value.map(|v| unquote(&v).to_string());
        if value.as_deref() == Some("") {
            return Err(Error::SyntaxError(format!("missing value for pragma {}", name)));
        }

        Ok(Statement::Pragma { name, value })
    }

    /// Column definitions inside `CREATE TABLE name ( ... )`
    fn parse_column_defs(&self, body: &str) -> Result<Vec<Column>> {
        let mut columns: Vec<Column> = Vec::new();
        let mut seen = HashSet::new();
        let mut table_primary_key = Vec::new();

        for def in split_top_level(body) {
            let def = def.trim();
            if def.is_empty() {
                if body.trim().is_empty() {
                    break;
                }
                return Err(Error::SyntaxError("empty column definition".to_string()));
            }

            let words: Vec<&str> = def.split_whitespace().collect();
            if is_table_constraint(&words) {
                if let Some(keys) = primary_key_list(def) {
                    table_primary_key.extend(keys);
                }
                continue;
            }

            let column = self.parse_column_def(&words)?;
            if !seen.insert(column.name.to_ascii_lowercase()) {
                return Err(Error::DuplicateColumn(column.name));
            }
            if columns.len() >= self.config.max_columns {
                return Err(Error::TooManyColumns(self.config.max_columns));
            }
            columns.push(column);
        }

        for key in table_primary_key {
            match columns
                .iter_mut()
                .find(|c| c.name.eq_ignore_ascii_case(&key))
            {
                Some(column) => *column = column.clone().primary_key(true),
                None => {
                    return Err(Error::SyntaxError(format!(
                        "primary key column '{}' is not defined",
                        key
                    )));
                }
            }
        }

        Ok(columns)
    }

    fn parse_column_def(&self, words: &[&str]) -> Result<Column> {
        let name = unquote(words[0]).to_string();
        let name_len = name.chars().count();
        if name_len == 0 {
            return Err(Error::SyntaxError("missing column name".to_string()));
        }
        if name_len > self.config.max_column_name_len {
            return Err(Error::NameTooLong {
                name,
                limit: self.config.max_column_name_len,
            });
        }

        let upper: Vec<String> = words[1..].iter().map(|w| w.to_ascii_uppercase()).collect();
        let type_end = upper
            .iter()
            .position(|w| CONSTRAINT_WORDS.contains(&w.as_str()))
            .unwrap_or(upper.len());
        let declared_type = words[1..1 + type_end].join(" ");

        let constraints = &upper[type_end..];
        let has_pair = |a: &str, b: &str| constraints.windows(2).any(|w| w[0] == a && w[1] == b);

        Ok(Column::new(name, DataType::from_declared(&declared_type))
            .not_null(has_pair("NOT", "NULL"))
            .primary_key(has_pair("PRIMARY", "KEY")))
    }

    fn checked_table_name(&self, name: String) -> Result<String> {
        if name.is_empty() {
            return Err(Error::MissingName);
        }
        if name.chars().count() > self.config.max_table_name_len {
            return Err(Error::NameTooLong {
                name,
                limit: self.config.max_table_name_len,
            });
        }
        Ok(name)
    }
}

/// Split on commas outside parentheses and quotes
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

/// `PRIMARY KEY (a, b)` → `["a", "b"]`
fn primary_key_list(def: &str) -> Option<Vec<String>> {
    let mut scanner = Scanner::new(def);
    scanner.skip_whitespace();
    if scanner.match_keyword("CONSTRAINT", Boundary::Whitespace) {
        scanner.skip_whitespace();
        scanner.read_while(|c| !c.is_whitespace());
        scanner.skip_whitespace();
    }
    if !scanner.match_keyword("PRIMARY", Boundary::Whitespace) {
        return None;
    }
    scanner.skip_whitespace();
    if !scanner.match_keyword("KEY", Boundary::WhitespaceOrParen) {
        return None;
    }
    scanner.skip_whitespace();
    let group = scanner.read_group().ok()?;
    Some(
        group
            .split(',')
            .map(|k| unquote(k.trim()).to_string())
            .filter(|k| !k.is_empty())
            .collect(),
    )
}

/// Does this definition start a table-level constraint?
///
/// `unique TEXT` declares a column named "unique"; `UNIQUE (a)` does not.
fn is_table_constraint(words: &[&str]) -> bool {
    let first = words[0].to_ascii_uppercase();
    let second = words.get(1).map(|w| w.to_ascii_uppercase()).unwrap_or_default();
    let opens_group =
        |word: &str| first.starts_with(word) && (first.contains('(') || second.starts_with('('));

    match first.as_str() {
        "CONSTRAINT" => true,
        "PRIMARY" | "FOREIGN" => second.starts_with("KEY"),
        _ => opens_group("UNIQUE") || opens_group("CHECK"),
    }
}

/// Strip one layer of matching quotes, backticks or brackets
fn unquote(s: &str) -> &str {
    let pairs = [('\'', '\''), ('"', '"'), ('`', '`'), ('[', ']')];
    for (open, close) in pairs {
        if s.len() >= 2 && s.starts_with(open) && s.ends_with(close) {
            return &s[open.len_utf8()..s.len() - close.len_utf8()];
        }
    }
    s
}

/// Parse one statement with the given configuration
pub fn parse(sql: &str, config: &Config) -> Result<Statement> {
    Parser::new(sql, config).parse()
}
