use std::{fs::File, io::Read, path::Path};

use memchr::memchr_iter;

use crate::ruleset::Rule;

/// Parse a CODEOWNERS file from a string. Lines that don't form a rule
/// (blank lines, comments, patterns without owners, unterminated quotes) are
/// skipped.
pub fn parse(source: &str) -> Vec<Rule> {
    source.lines().filter_map(parse_line).collect()
}

/// Parse a CODEOWNERS file from a file path.
pub fn parse_file(path: &Path) -> std::io::Result<Vec<Rule>> {
    let mut file = File::open(path)?;
    let mut source = String::new();
    file.read_to_string(&mut source)?;
    Ok(parse(&source))
}

/// Parse a single line of a CODEOWNERS file into a rule. Returns `None` if the
/// line doesn't contain both a pattern and at least one owner.
///
/// Whitespace separates the pattern from the owners. Double quotes and
/// backslash escapes keep whitespace inside the pattern; both are removed
/// from the result.
pub fn parse_line(line: &str) -> Option<Rule> {
    let content = strip_comment(line)?;
    let mut tokens = LineParser::new(content).parse()?;
    if tokens.len() < 2 {
        return None;
    }

    let owners = tokens
        .split_off(1)
        .into_iter()
        .filter_map(strip_owner_comment)
        .collect::<Vec<_>>();
    if owners.is_empty() {
        return None;
    }

    let pattern = tokens.pop()?;
    if pattern.is_empty() {
        return None;
    }
    Some(Rule::new(pattern, owners))
}

// Comments start at a `#` that begins the line or follows whitespace. A `#`
// inside a token (`src/main#.js`) is part of it.
fn strip_comment(line: &str) -> Option<&str> {
    if line.trim_start().starts_with('#') {
        return None;
    }

    let bytes = line.as_bytes();
    let end = memchr_iter(b'#', bytes)
        .find(|&i| i > 0 && matches!(bytes[i - 1], b' ' | b'\t'))
        .unwrap_or(line.len());
    let content = line[..end].trim_end();
    if content.trim_start().is_empty() {
        None
    } else {
        Some(content)
    }
}

fn strip_owner_comment(mut owner: String) -> Option<String> {
    if let Some(idx) = owner.find('#') {
        owner.truncate(idx);
    }
    if owner.is_empty() {
        None
    } else {
        Some(owner)
    }
}

struct LineParser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> LineParser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    // Split into whitespace-separated tokens. A quoted empty string (`""`) is
    // kept as an empty token. Returns `None` if a quote is left open.
    fn parse(mut self) -> Option<Vec<String>> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut quoted = false;
        let mut had_quotes = false;
        while let Some(c) = self.next() {
            match c {
                '\\' => {
                    if let Some(escaped) = self.next() {
                        current.push(escaped);
                    }
                }
                '"' => {
                    quoted = !quoted;
                    had_quotes = true;
                }
                ' ' | '\t' if !quoted => {
                    if had_quotes || !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                        had_quotes = false;
                    }
                }
                _ => current.push(c),
            }
        }

        if quoted {
            return None;
        }
        if had_quotes || !current.is_empty() {
            tokens.push(current);
        }
        Some(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}
