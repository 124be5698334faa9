//! Scanner for the `define("name", [deps], function` header that `tsc`
//! writes for every module in an AMD `--outFile` bundle.
//!
//! Only lines that begin (column 0) with `define` followed by `(` are
//! considered module headers. Module bodies are always indented by the
//! compiler, so a user-level call named `define` inside a module never
//! reaches the scanner. A column-0 header that does not match the expected
//! shape is an error: it means the compiler's emission format drifted.

use std::ops::Range;

use crate::ReadError;

/// One `define(...)` header as it appears in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefineCall<'a> {
    /// 1-based line number of the header
    pub line: usize,
    pub name: &'a str,
    pub dependencies: Vec<StringLiteral<'a>>,
}

/// A quoted string literal and its location in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StringLiteral<'a> {
    /// Literal content without quotes
    pub value: &'a str,
    /// Byte range of the literal including its quotes
    pub span: Range<usize>,
    pub quote: char,
}

/// Scan `code` for module headers in source order.
pub(crate) fn scan(code: &str) -> Result<Vec<DefineCall<'_>>, ReadError> {
    let mut calls = Vec::new();
    let mut offset = 0;
    for (index, line) in code.split_inclusive('\n').enumerate() {
        if is_define_header(line) {
            let mut cursor = Cursor::new(code, offset, index + 1);
            calls.push(cursor.define_call()?);
        }
        offset += line.len();
    }
    Ok(calls)
}

fn is_define_header(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("define") else {
        return false;
    };
    rest.trim_start_matches([' ', '\t']).starts_with('(')
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, pos: usize, line: usize) -> Self {
        Self { src, pos, line }
    }

    fn define_call(&mut self) -> Result<DefineCall<'a>, ReadError> {
        self.keyword("define")?;
        self.skip_ws();
        self.punct('(')?;
        self.skip_ws();
        let name = self
            .string_literal()
            .ok_or_else(|| self.error("expected module name string literal"))?;
        self.skip_ws();
        self.punct(',')?;
        self.skip_ws();
        self.punct('[')?;
        let dependencies = self.dependency_list()?;
        self.skip_ws();
        self.punct(',')?;
        self.skip_ws();
        self.keyword("function")?;
        Ok(DefineCall {
            line: self.line,
            name: name.value,
            dependencies,
        })
    }

    fn dependency_list(&mut self) -> Result<Vec<StringLiteral<'a>>, ReadError> {
        let mut out = Vec::new();
        self.skip_ws();
        if self.eat(']') {
            return Ok(out);
        }
        loop {
            self.skip_ws();
            let literal = self
                .string_literal()
                .ok_or_else(|| self.error("expected dependency string literal"))?;
            out.push(literal);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                return Ok(out);
            }
            return Err(self.error("expected ',' or ']' in dependency list"));
        }
    }

    fn string_literal(&mut self) -> Option<StringLiteral<'a>> {
        let start = self.pos;
        let quote = self.peek().filter(|c| *c == '"' || *c == '\'')?;
        let body_start = start + quote.len_utf8();
        let mut escaped = false;
        for (i, c) in self.src[body_start..].char_indices() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '\n' {
                return None;
            } else if c == quote {
                let end = body_start + i;
                self.pos = end + quote.len_utf8();
                return Some(StringLiteral {
                    value: &self.src[body_start..end],
                    span: start..self.pos,
                    quote,
                });
            }
        }
        None
    }

    fn keyword(&mut self, word: &str) -> Result<(), ReadError> {
        let rest = &self.src[self.pos..];
        let boundary = rest.starts_with(word)
            && rest[word.len()..]
                .chars()
                .next()
                .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == '$'));
        if boundary {
            self.pos += word.len();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", word)))
        }
    }

    fn punct(&mut self, c: char) -> Result<(), ReadError> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, reason: &str) -> ReadError {
        let found: String = self.src[self.pos..].chars().take(24).collect();
        let found = found.lines().next().unwrap_or_default();
        ReadError::MalformedDefine {
            line: self.line,
            reason: format!("{} (found '{}')", reason, found),
        }
    }
}
