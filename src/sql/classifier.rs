//! Statement classifier
//!
//! Identifies a statement's kind from its leading keyword(s). Matching is
//! case-insensitive and a keyword must be followed by whitespace or the end
//! of input, so `INSERTS` is not `INSERT`.

use std::fmt;

/// Kind of a statement, in classification order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    CreateTable,
    DropTable,
    Insert,
    Select,
    Update,
    Delete,
    Begin,
    Commit,
    Rollback,
    Pragma,
    /// Leading keyword not in the supported list
    Unrecognized,
    /// Nothing but whitespace and terminators
    Empty,
}

impl StatementKind {
    /// Leading keyword(s) of the statement
    pub fn keyword(&self) -> &'static str {
        match self {
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::DropTable => "DROP TABLE",
            StatementKind::Insert => "INSERT",
            StatementKind::Select => "SELECT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Begin => "BEGIN",
            StatementKind::Commit => "COMMIT",
            StatementKind::Rollback => "ROLLBACK",
            StatementKind::Pragma => "PRAGMA",
            StatementKind::Unrecognized => "(unrecognized)",
            StatementKind::Empty => "(empty)",
        }
    }

    /// Accepted without any effect
    pub fn is_unimplemented(&self) -> bool {
        matches!(
            self,
            StatementKind::Update | StatementKind::Delete | StatementKind::Unrecognized
        )
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Single-keyword statements, checked after CREATE/DROP
const SIMPLE_KEYWORDS: [(&str, StatementKind); 8] = [
    ("INSERT", StatementKind::Insert),
    ("SELECT", StatementKind::Select),
    ("UPDATE", StatementKind::Update),
    ("DELETE", StatementKind::Delete),
    ("BEGIN", StatementKind::Begin),
    ("COMMIT", StatementKind::Commit),
    ("ROLLBACK", StatementKind::Rollback),
    ("PRAGMA", StatementKind::Pragma),
];

/// Strip surrounding whitespace and trailing `;` terminators
pub fn normalize(sql: &str) -> &str {
    sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

/// Does `s` start with `keyword` followed by whitespace or end of input?
pub fn keyword_match(s: &str, keyword: &str) -> bool {
    let Some(head) = s.get(..keyword.len()) else {
        return false;
    };
    head.eq_ignore_ascii_case(keyword)
        && s[keyword.len()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace)
}

/// Classify a statement
pub fn classify(sql: &str) -> StatementKind {
    let s = normalize(sql);
    if s.is_empty() {
        return StatementKind::Empty;
    }

    for (keyword, kind) in [
        ("CREATE", StatementKind::CreateTable),
        ("DROP", StatementKind::DropTable),
    ] {
        if keyword_match(s, keyword) {
            let rest = s[keyword.len()..].trim_start();
            return if keyword_match(rest, "TABLE") {
                kind
            } else {
                StatementKind::Unrecognized
            };
        }
    }

    SIMPLE_KEYWORDS
        .iter()
        .find(|(keyword, _)| keyword_match(s, keyword))
        .map_or(StatementKind::Unrecognized, |(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        assert_eq!(classify("CREATE TABLE users"), StatementKind::CreateTable);
        assert_eq!(classify("  create\ttable t (a)"), StatementKind::CreateTable);
        assert_eq!(classify("drop table t;"), StatementKind::DropTable);
        assert_eq!(classify("Insert into t values (1)"), StatementKind::Insert);
        assert_eq!(classify("SELECT * FROM t"), StatementKind::Select);
        assert_eq!(classify("update t set a = 1"), StatementKind::Update);
        assert_eq!(classify("DELETE FROM t"), StatementKind::Delete);
        assert_eq!(classify("BEGIN TRANSACTION"), StatementKind::Begin);
        assert_eq!(classify("commit"), StatementKind::Commit);
        assert_eq!(classify("ROLLBACK;"), StatementKind::Rollback);
        assert_eq!(classify("PRAGMA cache_size = 50"), StatementKind::Pragma);
    }

    #[test]
    fn test_classify_requires_word_boundary() {
        assert_eq!(classify("SELECTED"), StatementKind::Unrecognized);
        assert_eq!(classify("create tables x"), StatementKind::Unrecognized);
        assert_eq!(classify("CREATE INDEX i ON t"), StatementKind::Unrecognized);
        assert_eq!(classify("VACUUM"), StatementKind::Unrecognized);
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(""), StatementKind::Empty);
        assert_eq!(classify("  ;  "), StatementKind::Empty);
    }

    #[test]
    fn test_keyword_match_non_ascii() {
        assert!(!keyword_match("sé", "SELECT"));
        assert!(!keyword_match("ÿÿÿÿÿÿÿ", "SELECT"));
    }

    #[test]
    fn test_unimplemented_kinds() {
        assert!(StatementKind::Update.is_unimplemented());
        assert!(StatementKind::Unrecognized.is_unimplemented());
        assert!(!StatementKind::Pragma.is_unimplemented());
    }
}
