//! Duplicate key detection on raw resource text.
//!
//! Parsers keep the last of two identical keys and drop the first without a
//! trace, so duplicates have to be found before parsing.

use std::collections::{BTreeSet, HashSet};

enum Frame {
    Object(HashSet<String>),
    Array,
}

/// Scan raw JSON/JSONC text and return key names repeated at the same level.
///
/// Malformed input never fails: an unbalanced or unterminated document yields
/// an empty set, leaving the report of the broken file to the parser.
pub fn find_duplicate_keys(raw: &str) -> BTreeSet<String> {
    scan(raw).unwrap_or_default()
}

fn scan(raw: &str) -> Option<BTreeSet<String>> {
    let mut duplicates = BTreeSet::new();
    let mut frames: Vec<Frame> = Vec::new();
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => frames.push(Frame::Object(HashSet::new())),
            '[' => frames.push(Frame::Array),
            '}' => match frames.pop() {
                Some(Frame::Object(_)) => {}
                _ => return None,
            },
            ']' => match frames.pop() {
                Some(Frame::Array) => {}
                _ => return None,
            },
            '"' => {
                let literal = read_string(&mut chars)?;

                // A string is a key when a colon follows it
                let mut is_key = false;
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() {
                        chars.next();
                        continue;
                    }
                    is_key = next == ':';
                    break;
                }

                if is_key {
                    if let Some(Frame::Object(seen)) = frames.last_mut() {
                        if !seen.insert(literal.clone()) {
                            duplicates.insert(literal);
                        }
                    }
                }
            }
            '/' => match chars.peek() {
                Some('/') => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut prev = ' ';
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            closed = true;
                            break;
                        }
                        prev = c;
                    }
                    if !closed {
                        return None;
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    if frames.is_empty() {
        Some(duplicates)
    } else {
        None
    }
}

/// Read a string literal body after its opening quote, decoding simple escapes
fn read_string(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut out = String::new();
    loop {
        match chars.next()? {
            '"' => return Some(out),
            '\\' => {
                let escaped = chars.next()?;
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'u' => {
                        let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(c) => out.push(c),
                            None => {
                                out.push_str("\\u");
                                out.push_str(&hex);
                            }
                        }
                    }
                    other => out.push(other),
                }
            }
            c => out.push(c),
        }
    }
}
