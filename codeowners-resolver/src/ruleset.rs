use std::{cmp::Ordering, convert::Infallible, str::FromStr};

use crate::{
    glob::{Glob, GlobError, PatternCache},
    parser,
    specificity::Specificity,
};

/// A CODEOWNERS rule: a pattern and the owners of the paths it matches.
/// Owners are kept verbatim, in the order they were written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub pattern: String,
    pub owners: Vec<String>,
}

impl Rule {
    pub fn new(pattern: String, owners: Vec<String>) -> Rule {
        Rule { pattern, owners }
    }
}

/// A set of rules with every pattern compiled up front, for resolving owners
/// of many paths against the same CODEOWNERS file.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    glob: Result<Glob, GlobError>,
    specificity: Specificity,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self::build(rules, Glob::new)
    }

    /// Like [`RuleSet::new`], but takes compiled patterns from `cache` and adds
    /// any new ones to it. Rebuilding a rule set after its CODEOWNERS file
    /// changes then only compiles the patterns that changed.
    pub fn with_cache(rules: Vec<Rule>, cache: &PatternCache) -> Self {
        Self::build(rules, |pattern| (*cache.get_or_compile(pattern)).clone())
    }

    fn build(rules: Vec<Rule>, mut compile: impl FnMut(&str) -> Result<Glob, GlobError>) -> Self {
        let entries = rules
            .iter()
            .map(|rule| {
                let glob = compile(&rule.pattern);
                if let Err(err) = &glob {
                    tracing::debug!(pattern = %rule.pattern, %err, "invalid pattern never matches");
                }
                Entry {
                    glob,
                    specificity: Specificity::of(&rule.pattern),
                }
            })
            .collect();
        Self { rules, entries }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The most specific rule matching `path`. When two matching rules are
    /// equally specific, the one appearing first wins.
    pub fn best_match(&self, path: &str) -> Option<&Rule> {
        let mut best: Option<usize> = None;
        for idx in self.matching_indices(path) {
            let outranks = match best {
                Some(best_idx) => {
                    self.entries[idx]
                        .specificity
                        .compare(&self.entries[best_idx].specificity)
                        == Ordering::Greater
                }
                None => true,
            };
            if outranks {
                best = Some(idx);
            }
        }

        let rule = &self.rules[best?];
        tracing::trace!(path, pattern = %rule.pattern, "resolved best match");
        Some(rule)
    }

    /// Every rule matching `path`, with its index, in file order.
    pub fn matching_rules(&self, path: &str) -> Vec<(usize, &Rule)> {
        self.matching_indices(path)
            .map(|idx| (idx, &self.rules[idx]))
            .collect()
    }

    /// The owners of the most specific rule matching `path`.
    pub fn owners(&self, path: &str) -> Option<&[String]> {
        self.best_match(path).map(|rule| rule.owners.as_ref())
    }

    /// Every distinct owner named in the rules, in order of first appearance.
    pub fn owners_list(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.rules
            .iter()
            .flat_map(|rule| rule.owners.iter())
            .map(String::as_str)
            .filter(|owner| seen.insert(*owner))
            .collect()
    }

    /// Rules whose pattern couldn't be compiled. These never match anything.
    pub fn invalid_patterns(&self) -> impl Iterator<Item = (&Rule, &GlobError)> {
        self.rules
            .iter()
            .zip(&self.entries)
            .filter_map(|(rule, entry)| entry.glob.as_ref().err().map(|err| (rule, err)))
    }

    fn matching_indices<'a>(&'a self, path: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, entry)| matches!(&entry.glob, Ok(glob) if glob.is_match(path)))
            .map(|(idx, _)| idx)
    }
}

impl FromStr for RuleSet {
    type Err = Infallible;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Ok(RuleSet::new(parser::parse(source)))
    }
}
