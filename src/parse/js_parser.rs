use crate::error::{AuditError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::collections::BTreeSet;
use std::path::Path;

use super::translation::TranslationTree;

static EXPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(?:export\s+default|module\.exports\s*=|exports\.default\s*=|export\s+const\s+[A-Za-z_$][\w$]*\s*(?::[^=\n]+)?=)",
    )
    .expect("export pattern is valid")
});

/// Parser for JavaScript/TypeScript translation modules
///
/// Supports ES module and CommonJS exports:
/// - `export default { ... }`
/// - `module.exports = { ... }`
/// - `export const messages = { ... }`
///
/// The exported value is read by a restricted literal parser: objects,
/// arrays, strings, numbers, booleans and null. Identifiers, calls, spreads
/// and template interpolation are rejected. Module code is never evaluated.
pub struct JsParser;

impl JsParser {
    pub fn parse_str(content: &str, path: &Path) -> Result<TranslationTree> {
        Self::parse_with_duplicates(content, path).map(|(tree, _)| tree)
    }

    /// Parse the exported object and report key names repeated within one object
    pub fn parse_with_duplicates(
        content: &str,
        path: &Path,
    ) -> Result<(TranslationTree, Vec<String>)> {
        let mut last_error = None;

        for export in EXPORT_RE.find_iter(content) {
            let mut parser = LiteralParser::new(content, export.end());
            match parser.parse_value() {
                Ok(value @ Value::Object(_)) => {
                    let tree = TranslationTree::from_value(value, path)?;
                    return Ok((tree, parser.duplicates.into_iter().collect()));
                }
                Ok(other) => {
                    last_error = Some(format!(
                        "exported value must be an object literal, found {}",
                        super::translation::value_kind(&other)
                    ))
                }
                Err(e) => last_error = Some(e.describe(content)),
            }
        }

        Err(AuditError::parse_error(
            path,
            last_error.unwrap_or_else(|| "No object export found".to_string()),
        ))
    }
}

struct LiteralError {
    offset: usize,
    message: String,
}

impl LiteralError {
    fn describe(&self, content: &str) -> String {
        let prefix = &content[..self.offset.min(content.len())];
        let line = prefix.matches('\n').count() + 1;
        format!("{} (line {})", self.message, line)
    }
}

type LiteralResult<T> = std::result::Result<T, LiteralError>;

/// Cursor over source text that accepts literal expressions only
struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
    duplicates: BTreeSet<String>,
}

impl<'a> LiteralParser<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self {
            src,
            pos,
            duplicates: BTreeSet::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut it = self.src[self.pos..].chars();
        it.next();
        it.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error<T>(&self, message: impl Into<String>) -> LiteralResult<T> {
        Err(LiteralError {
            offset: self.pos,
            message: message.into(),
        })
    }

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    let mut prev = ' ';
                    while let Some(c) = self.bump() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        prev = c;
                    }
                }
                _ => break,
            }
        }
    }

    fn parse_value(&mut self) -> LiteralResult<Value> {
        self.skip_trivia();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some(q @ ('"' | '\'' | '`')) => {
                self.bump();
                self.parse_string(q).map(Value::String)
            }
            Some(c) if c.is_ascii_digit() || c == '-' || c == '.' => self.parse_number(),
            Some(c) if is_ident_start(c) => {
                let ident = self.parse_identifier();
                match ident.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" | "undefined" => Ok(Value::Null),
                    other => self.error(format!(
                        "`{}` is not a literal value; only literals are read from translation modules",
                        other
                    )),
                }
            }
            Some(c) => self.error(format!("unexpected character `{}`", c)),
            None => self.error("unexpected end of input"),
        }
    }

    fn parse_object(&mut self) -> LiteralResult<Value> {
        self.bump();
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(Value::Object(map));
                }
                Some('.') => return self.error("spread elements are not supported"),
                Some('[') => return self.error("computed keys are not supported"),
                None => return self.error("unterminated object literal"),
                _ => {}
            }

            let key = self.parse_key()?;
            self.skip_trivia();
            if self.bump() != Some(':') {
                return self.error(format!("expected `:` after key `{}`", key));
            }
            let value = self.parse_value()?;
            if map.insert(key.clone(), value).is_some() {
                self.duplicates.insert(key);
            }

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                _ => return self.error("expected `,` or `}` in object literal"),
            }
        }
    }

    fn parse_key(&mut self) -> LiteralResult<String> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                self.parse_string(q)
            }
            Some(c) if is_ident_start(c) => Ok(self.parse_identifier()),
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.bump();
                }
                Ok(self.src[start..self.pos].to_string())
            }
            _ => self.error("expected a property name"),
        }
    }

    fn parse_array(&mut self) -> LiteralResult<Value> {
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(']') => {
                    self.bump();
                    return Ok(Value::Array(items));
                }
                None => return self.error("unterminated array literal"),
                _ => {}
            }

            items.push(self.parse_value()?);

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                _ => return self.error("expected `,` or `]` in array literal"),
            }
        }
    }

    fn parse_string(&mut self, quote: char) -> LiteralResult<String> {
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return self.error("unterminated string literal");
            };
            match c {
                c if c == quote => return Ok(out),
                '\n' if quote != '`' => return self.error("unterminated string literal"),
                '$' if quote == '`' && self.peek() == Some('{') => {
                    return self.error("template interpolation is not a literal value")
                }
                '\\' => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some('\n') => {}
                    Some('u') => {
                        let start = self.pos;
                        for _ in 0..4 {
                            self.bump();
                        }
                        let hex = &self.src[start..self.pos.min(self.src.len())];
                        match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                            Some(ch) => out.push(ch),
                            None => return self.error("invalid unicode escape"),
                        }
                    }
                    Some(other) => out.push(other),
                    None => return self.error("unterminated string literal"),
                },
                c => out.push(c),
            }
        }
    }

    fn parse_number(&mut self) -> LiteralResult<Value> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+' | '_')
        ) {
            self.bump();
        }
        let raw: String = self.src[start..self.pos].chars().filter(|c| *c != '_').collect();

        if let Ok(i) = raw.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        match raw.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Ok(Value::Number(n)),
            None => self.error(format!("invalid number literal `{}`", raw)),
        }
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '$') {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}
