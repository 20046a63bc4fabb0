use memchr::memchr;

use super::{
    lexer::{ClassItem, Token},
    GlobError,
};

/// How a compiled pattern is checked against a path. Most CODEOWNERS patterns
/// are simple enough that a string comparison does the job, so a regex is only
/// built for the ones that need it.
#[derive(Debug, Clone)]
pub(crate) enum Strategy {
    Everything,
    Literal(String),
    /// `foo*`: the prefix, then anything but a separator.
    Prefix(String),
    /// `*.rs`: anything but a separator, then the suffix.
    Suffix(String),
    /// `dir/`: the directory itself or anything below it.
    Directory(String),
    Regex(regex::Regex),
}

impl Strategy {
    pub(crate) fn for_file(tokens: &[Token]) -> Result<Self, GlobError> {
        if let Some(literal) = literal_text(tokens) {
            return Ok(Self::Literal(literal));
        }

        match tokens {
            [head @ .., Token::Star] => {
                if let Some(prefix) = literal_text(head) {
                    return Ok(Self::Prefix(prefix));
                }
            }
            [Token::Star, tail @ ..] => {
                if let Some(suffix) = literal_text(tail).filter(|s| !s.contains('/')) {
                    return Ok(Self::Suffix(suffix));
                }
            }
            _ => {}
        }

        let mut regex = String::with_capacity(tokens.len() * 2 + 8);
        push_tokens(tokens, &mut regex);
        compile(&regex).map(Self::Regex)
    }

    pub(crate) fn for_directory(tokens: &[Token]) -> Result<Self, GlobError> {
        if let Some(literal) = literal_text(tokens) {
            return Ok(Self::Directory(literal));
        }

        let mut regex = String::from("(?:");
        push_tokens(tokens, &mut regex);
        regex.push_str(")(?:/.*)?");
        compile(&regex).map(Self::Regex)
    }

    pub(crate) fn is_match(&self, path: &str) -> bool {
        match self {
            Self::Everything => true,
            Self::Literal(literal) => path == literal,
            Self::Prefix(prefix) => path
                .strip_prefix(prefix.as_str())
                .map_or(false, |rest| memchr(b'/', rest.as_bytes()).is_none()),
            Self::Suffix(suffix) => path
                .strip_suffix(suffix.as_str())
                .map_or(false, |head| memchr(b'/', head.as_bytes()).is_none()),
            Self::Directory(dir) => path
                .strip_prefix(dir.as_str())
                .map_or(false, |rest| rest.is_empty() || rest.starts_with('/')),
            Self::Regex(re) => re.is_match(path),
        }
    }
}

// The text of a pattern with no glob syntax in it.
fn literal_text(tokens: &[Token]) -> Option<String> {
    tokens
        .iter()
        .map(|token| match token {
            Token::Literal(c) => Some(*c),
            Token::Separator => Some('/'),
            _ => None,
        })
        .collect()
}

fn compile(body: &str) -> Result<regex::Regex, GlobError> {
    let anchored = format!(r#"(?s)\A{}\z"#, body);
    regex::Regex::new(&anchored).map_err(|err| GlobError::Regex(err.to_string()))
}

fn push_tokens(tokens: &[Token], regex: &mut String) {
    for token in tokens {
        match token {
            Token::Literal(c) => push_escaped(*c, regex),
            Token::Separator => regex.push('/'),
            Token::Star => regex.push_str(r#"[^/]*"#),
            Token::Question => regex.push_str(r#"[^/]"#),
            Token::AnyDirs => regex.push_str(r#"(?:.*/)?"#),
            Token::AnyPath => regex.push_str(r#".*"#),
            Token::Class { negated, items } => {
                regex.push('[');
                if *negated {
                    regex.push_str("^/");
                }
                for item in items {
                    match *item {
                        ClassItem::Char(c) => push_escaped(c, regex),
                        ClassItem::Range(start, end) => {
                            push_escaped(start, regex);
                            regex.push('-');
                            push_escaped(end, regex);
                        }
                    }
                }
                regex.push(']');
            }
            Token::Alternation(alternatives) => {
                regex.push_str("(?:");
                for (i, alternative) in alternatives.iter().enumerate() {
                    if i > 0 {
                        regex.push('|');
                    }
                    push_tokens(alternative, regex);
                }
                regex.push(')');
            }
        }
    }
}

fn push_escaped(c: char, regex: &mut String) {
    if regex_syntax::is_meta_character(c) {
        regex.push('\\');
    }
    regex.push(c);
}
