//! Character scanner
//!
//! A cursor over statement text with the handful of primitives the
//! statement grammars need: whitespace skipping, keyword matching, names,
//! quoted literals and whole-word search.

use crate::error::{Error, Result};

/// Which characters may directly follow a keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// End of input or whitespace
    Whitespace,
    /// End of input, whitespace, or an opening parenthesis
    WhitespaceOrParen,
}

impl Boundary {
    fn accepts(self, next: Option<char>) -> bool {
        match next {
            None => true,
            Some(c) if c.is_whitespace() => true,
            Some('(') => self == Boundary::WhitespaceOrParen,
            Some(_) => false,
        }
    }
}

/// Statement scanner
pub struct Scanner {
    /// Input characters
    input: Vec<char>,
    /// Current position in input
    position: usize,
}

impl Scanner {
    /// Create a new scanner for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Character under the cursor
    pub fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.position += 1;
        }
    }

    pub fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.position += 1;
        }
    }

    /// Unconsumed input
    pub fn rest(&self) -> String {
        self.input[self.position..].iter().collect()
    }

    /// Consume `keyword` (case-insensitive) if it is next and properly bounded
    pub fn match_keyword(&mut self, keyword: &str, boundary: Boundary) -> bool {
        let len = keyword.chars().count();
        let end = self.position + len;
        if end > self.input.len() {
            return false;
        }

        let matches = self.input[self.position..end]
            .iter()
            .zip(keyword.chars())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b));

        if matches && boundary.accepts(self.input.get(end).copied()) {
            self.position = end;
            true
        } else {
            false
        }
    }

    /// Skip whitespace, then require `keyword`
    pub fn expect_keyword(&mut self, keyword: &str, boundary: Boundary) -> Result<()> {
        self.skip_whitespace();
        if self.match_keyword(keyword, boundary) {
            Ok(())
        } else {
            Err(Error::SyntaxError(format!("expected {}", keyword)))
        }
    }

    /// Skip whitespace, then require `ch`
    pub fn expect_char(&mut self, ch: char) -> Result<()> {
        self.skip_whitespace();
        if self.current_char() == Some(ch) {
            self.advance();
            Ok(())
        } else {
            Err(Error::SyntaxError(format!("expected '{}'", ch)))
        }
    }

    /// Consume characters while `pred` holds
    pub fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.position;
        while self.current_char().is_some_and(&pred) {
            self.position += 1;
        }
        self.input[start..self.position].iter().collect()
    }

    /// Read a quoted literal; the cursor must be on the opening quote.
    ///
    /// The literal ends at the next identical quote; there is no escaping.
    pub fn read_quoted(&mut self) -> Result<String> {
        let quote = match self.current_char() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(Error::SyntaxError("expected quoted value".to_string())),
        };
        let start = self.position;
        self.advance();

        let value = self.read_while(|c| c != quote);
        if self.is_at_end() {
            return Err(Error::SyntaxError(format!(
                "unterminated quoted value starting at position {}",
                start
            )));
        }
        self.advance();
        Ok(value)
    }

    /// Consume a parenthesized group (cursor on `(`), returning its contents.
    ///
    /// Nested parentheses and quoted text are kept intact.
    pub fn read_group(&mut self) -> Result<String> {
        if self.current_char() != Some('(') {
            return Err(Error::SyntaxError("expected '('".to_string()));
        }
        self.advance();

        let mut depth = 0usize;
        let mut contents = String::new();
        while let Some(c) = self.current_char() {
            match c {
                '\'' | '"' => {
                    let quoted = self.read_quoted()?;
                    contents.push(c);
                    contents.push_str(&quoted);
                    contents.push(c);
                    continue;
                }
                '(' => depth += 1,
                ')' if depth == 0 => {
                    self.advance();
                    return Ok(contents);
                }
                ')' => depth -= 1,
                _ => {}
            }
            contents.push(c);
            self.advance();
        }
        Err(Error::SyntaxError("missing ')'".to_string()))
    }

    /// Advance past the whole word `keyword`, skipping quoted text.
    ///
    /// Returns the text before the keyword, or `None` (cursor at end) when
    /// the keyword never appears.
    pub fn seek_word(&mut self, keyword: &str) -> Option<String> {
        let start = self.position;
        loop {
            self.skip_whitespace();
            let word_start = self.position;
            if self.is_at_end() {
                return None;
            }
            if self.match_keyword(keyword, Boundary::Whitespace) {
                return Some(self.input[start..word_start].iter().collect());
            }

            while let Some(c) = self.current_char() {
                if c.is_whitespace() {
                    break;
                }
                if c == '\'' || c == '"' {
                    if self.read_quoted().is_err() {
                        return None;
                    }
                } else {
                    self.advance();
                }
            }
        }
    }
}
