//! Ranking of patterns that match the same path.
//!
//! When several rules match a path, the winner is the one with the most
//! specific pattern. Specificity is decided by a ladder of criteria, each one
//! only consulted when every earlier one is undecided:
//!
//! 1. exact paths beat patterns (and deeper exact paths beat shallower ones)
//! 2. file patterns beat directory patterns (`src/`)
//! 3. patterns without `**` beat recursive ones
//! 4. a literal extension (`*.rs`) beats a wildcard or missing one
//! 5. fewer brace alternatives beat more
//! 6. more literal characters beat fewer
//! 7. `?` beats `*`
//! 8. deeper patterns beat shallower ones
//!
//! The global pattern `*` is the fallback rule and ranks below everything.

use std::cmp::Ordering;

use crate::glob::{
    lexer::{ClassItem, Lexer, Token},
    normalize_pattern,
};

/// Returns true if `a` strictly outranks `b`. Equally specific patterns
/// outrank neither each other nor themselves.
pub fn is_more_specific(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Greater
}

/// Compares two patterns by specificity. `Ordering::Greater` means `a` is more
/// specific than `b`.
pub fn compare(a: &str, b: &str) -> Ordering {
    Specificity::of(a).compare(&Specificity::of(b))
}

/// The traits of a pattern that the ranking looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specificity {
    /// The pattern is exactly `*`.
    pub catch_all: bool,
    /// No glob syntax and no trailing slash.
    pub exact: bool,
    /// Ends with `/`.
    pub directory: bool,
    /// Contains `**`.
    pub recursive: bool,
    /// The last segment ends in `.ext` where `ext` is plain text.
    pub literal_extension: bool,
    /// Total number of brace alternatives, nested groups included.
    pub alternatives: usize,
    /// Number of characters that aren't glob syntax.
    pub literals: usize,
    pub question_marks: usize,
    pub stars: usize,
    /// Number of path segments.
    pub depth: usize,
}

impl Specificity {
    pub fn of(pattern: &str) -> Specificity {
        let normalized = normalize_pattern(pattern);
        let (body, directory) = match normalized.strip_suffix('/') {
            Some(body) => (body, true),
            None => (&*normalized, false),
        };
        let body = body.strip_prefix('/').unwrap_or(body);

        let lexed = match Lexer::new(body).tokenize() {
            Ok(lexed) => lexed,
            Err(_) => return Self::of_malformed(body, directory),
        };
        let tokens = &lexed.tokens;

        let mut counts = Counts::default();
        counts.add(tokens);

        let top_level_separators = tokens
            .iter()
            .filter(|t| matches!(t, Token::Separator | Token::AnyDirs))
            .count();

        Specificity {
            catch_all: normalized == "*",
            exact: !directory
                && tokens
                    .iter()
                    .all(|t| matches!(t, Token::Literal(_) | Token::Separator)),
            directory,
            recursive: lexed.double_star,
            literal_extension: has_literal_extension(tokens),
            alternatives: counts.alternatives,
            literals: counts.literals,
            question_marks: counts.question_marks,
            stars: counts.stars,
            depth: top_level_separators + 1,
        }
    }

    // Patterns that can't be compiled never match, so this is only reached
    // when comparing patterns directly. Keep it total with a rough reading.
    fn of_malformed(body: &str, directory: bool) -> Specificity {
        let is_syntax = |c: char| matches!(c, '*' | '?' | '[' | ']' | '{' | '}' | '\\');
        Specificity {
            catch_all: false,
            exact: false,
            directory,
            recursive: body.contains("**"),
            literal_extension: false,
            alternatives: 0,
            literals: body.chars().filter(|&c| !is_syntax(c)).count(),
            question_marks: body.matches('?').count(),
            stars: body.matches('*').count(),
            depth: body.split('/').count(),
        }
    }

    /// Compares by specificity. `Ordering::Greater` means `self` is more
    /// specific than `other`.
    pub fn compare(&self, other: &Specificity) -> Ordering {
        match (self.catch_all, other.catch_all) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }

        // Two exact paths are only ever ranked by depth
        match (self.exact, other.exact) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (true, true) => return self.depth.cmp(&other.depth),
            (false, false) => {}
        }

        other
            .directory
            .cmp(&self.directory)
            .then_with(|| other.recursive.cmp(&self.recursive))
            .then_with(|| self.literal_extension.cmp(&other.literal_extension))
            .then_with(|| other.alternatives.cmp(&self.alternatives))
            .then_with(|| self.literals.cmp(&other.literals))
            .then_with(|| self.compare_single_char(other))
            .then_with(|| self.depth.cmp(&other.depth))
    }

    // `?` only wins against a pattern that has no `?` but does have a `*`.
    fn compare_single_char(&self, other: &Specificity) -> Ordering {
        let prefers = |a: &Specificity, b: &Specificity| {
            a.question_marks > 0 && b.question_marks == 0 && b.stars > 0
        };
        if prefers(self, other) {
            Ordering::Greater
        } else if prefers(other, self) {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}

#[derive(Default)]
struct Counts {
    alternatives: usize,
    literals: usize,
    question_marks: usize,
    stars: usize,
}

impl Counts {
    fn add(&mut self, tokens: &[Token]) {
        for token in tokens {
            match token {
                Token::Literal(_) | Token::Separator => self.literals += 1,
                Token::Star => self.stars += 1,
                Token::Question => self.question_marks += 1,
                Token::AnyDirs | Token::AnyPath => {}
                Token::Class { items, .. } => {
                    self.literals += items
                        .iter()
                        .map(|item| match item {
                            ClassItem::Char(_) => 1,
                            ClassItem::Range(..) => 2,
                        })
                        .sum::<usize>();
                }
                Token::Alternation(alternatives) => {
                    self.alternatives += alternatives.len();
                    for alternative in alternatives {
                        self.add(alternative);
                    }
                }
            }
        }
    }
}

fn has_literal_extension(tokens: &[Token]) -> bool {
    let segment_start = tokens
        .iter()
        .rposition(|t| matches!(t, Token::Separator | Token::AnyDirs))
        .map_or(0, |i| i + 1);
    let last_segment = &tokens[segment_start..];

    match last_segment.iter().rposition(|t| *t == Token::Literal('.')) {
        Some(dot) => {
            let extension = &last_segment[dot + 1..];
            !extension.is_empty() && extension.iter().all(|t| matches!(t, Token::Literal(_)))
        }
        None => false,
    }
}
