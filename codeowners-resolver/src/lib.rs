//! Parse CODEOWNERS files and find which rule owns a path.
//!
//! Unlike GitHub, which lets the last matching line win, rules here are ranked
//! by how specific their pattern is (see [`specificity`]), so the order of
//! lines doesn't matter.
//!
//! ```
//! let rules = "*.js @team4\nsrc/main.js @team1 @team2\nsrc/utils/ @team3";
//!
//! let rule = codeowners_resolver::find_best_match("src/main.js", rules).unwrap();
//! assert_eq!(rule.owners, vec!["@team1", "@team2"]);
//!
//! let rule = codeowners_resolver::find_best_match("src/utils/helper.js", rules).unwrap();
//! assert_eq!(rule.pattern, "src/utils/");
//!
//! assert!(codeowners_resolver::find_best_match("unknown/file.txt", rules).is_none());
//! ```

pub mod glob;
pub mod owner;
pub mod parser;
mod ruleset;
pub mod specificity;

use std::{io, path::Path};

pub use glob::{matches, Glob, GlobError, PatternCache};
pub use owner::{Owner, OwnerKind};
pub use parser::parse_line;
pub use ruleset::{Rule, RuleSet};
pub use specificity::is_more_specific;

/// Find the most specific rule in `source` (the text of a CODEOWNERS file)
/// that matches `path`.
///
/// This parses and compiles the whole file on every call. To resolve many
/// paths, build a [`RuleSet`] once instead.
pub fn find_best_match(path: &str, source: &str) -> Option<Rule> {
    RuleSet::new(parser::parse(source)).best_match(path).cloned()
}

/// Read and parse the CODEOWNERS file at `path`.
pub fn from_path(path: impl AsRef<Path>) -> io::Result<RuleSet> {
    let rules = parser::parse_file(path.as_ref())?;
    Ok(RuleSet::new(rules))
}
