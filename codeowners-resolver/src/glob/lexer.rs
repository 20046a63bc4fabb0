use super::GlobError;

/// A single element of a glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(char),
    Separator,
    /// `*`: any run of characters within one path segment.
    Star,
    /// `?`: exactly one character, never a separator.
    Question,
    /// `**/` at the start of a segment: zero or more whole directories.
    AnyDirs,
    /// `**` as the final segment: everything, separators included.
    AnyPath,
    Class {
        negated: bool,
        items: Vec<ClassItem>,
    },
    Alternation(Vec<Vec<Token>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClassItem {
    Char(char),
    Range(char, char),
}

/// The tokens of a pattern, plus whether a `**` appeared anywhere in it (even
/// one that degraded to a single-segment `*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lexed {
    pub(crate) tokens: Vec<Token>,
    pub(crate) double_star: bool,
}

pub(crate) struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    double_star: bool,
}

impl<'a> Lexer<'a> {
    /// `source` must already have stray path-separator backslashes rewritten,
    /// so every `\` left in it escapes the following character.
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            double_star: false,
        }
    }

    pub(crate) fn tokenize(mut self) -> Result<Lexed, GlobError> {
        let tokens = self.parse_sequence(true, false)?;
        Ok(Lexed {
            tokens,
            double_star: self.double_star,
        })
    }

    // Parse tokens until the end of the input or, inside a brace group, until
    // an unnested `,` or `}` (which is left for the caller to consume).
    fn parse_sequence(
        &mut self,
        mut segment_start: bool,
        in_braces: bool,
    ) -> Result<Vec<Token>, GlobError> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                ',' | '}' if in_braces => break,
                '\\' => {
                    self.next();
                    tokens.push(Token::Literal(self.next().unwrap_or('\\')));
                }
                '/' => {
                    self.next();
                    tokens.push(Token::Separator);
                    segment_start = true;
                    continue;
                }
                '*' => {
                    self.next();
                    if self.peek() == Some('*') {
                        while self.peek() == Some('*') {
                            self.next();
                        }
                        self.double_star = true;

                        // Only a whole segment of stars crosses directories,
                        // anything else behaves like a single star
                        if segment_start {
                            match self.peek() {
                                Some('/') => {
                                    self.next();
                                    tokens.push(Token::AnyDirs);
                                    continue;
                                }
                                None => {
                                    tokens.push(Token::AnyPath);
                                    continue;
                                }
                                Some(',' | '}') if in_braces => {
                                    tokens.push(Token::AnyPath);
                                    continue;
                                }
                                _ => {}
                            }
                        }
                    }
                    tokens.push(Token::Star);
                }
                '?' => {
                    self.next();
                    tokens.push(Token::Question);
                }
                '[' => tokens.push(self.parse_class()?),
                '{' => tokens.push(self.parse_alternation(segment_start)?),
                _ => {
                    self.next();
                    tokens.push(Token::Literal(c));
                }
            }
            segment_start = false;
        }
        Ok(tokens)
    }

    fn parse_class(&mut self) -> Result<Token, GlobError> {
        let start = self.pos;
        self.next();

        let negated = matches!(self.peek(), Some('!' | '^'));
        if negated {
            self.next();
        }

        let mut items = Vec::new();
        loop {
            let c = match self.next() {
                // A `]` straight after the opening bracket is a member
                Some(']') if !items.is_empty() => break,
                Some('\\') => self.next().ok_or(GlobError::UnclosedClass { pos: start })?,
                Some(c) => c,
                None => return Err(GlobError::UnclosedClass { pos: start }),
            };

            let is_range = self.peek() == Some('-') && !matches!(self.peek_nth(1), Some(']') | None);
            if !is_range {
                items.push(ClassItem::Char(c));
                continue;
            }

            self.next();
            let end = match self.next() {
                Some('\\') => self.next(),
                other => other,
            }
            .ok_or(GlobError::UnclosedClass { pos: start })?;
            if end < c {
                return Err(GlobError::InvalidRange { start: c, end });
            }
            items.push(ClassItem::Range(c, end));
        }

        Ok(Token::Class { negated, items })
    }

    fn parse_alternation(&mut self, segment_start: bool) -> Result<Token, GlobError> {
        let start = self.pos;
        self.next();

        let mut alternatives = Vec::new();
        loop {
            alternatives.push(self.parse_sequence(segment_start, true)?);
            match self.next() {
                Some(',') => continue,
                Some('}') => break,
                _ => return Err(GlobError::UnclosedBrace { pos: start }),
            }
        }

        Ok(Token::Alternation(alternatives))
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}
