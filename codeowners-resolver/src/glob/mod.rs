mod cache;
pub(crate) mod lexer;
mod strategy;

use std::borrow::Cow;

use memchr::memchr;

pub use self::cache::PatternCache;
use self::lexer::Lexer;
use self::strategy::Strategy;

/// Returns true if `path` is matched by the CODEOWNERS `pattern`. Patterns that
/// fail to compile never match.
///
/// `path` is a `/`-separated path relative to the repository root. Any `\` in
/// it is treated as a separator.
pub fn matches(path: &str, pattern: &str) -> bool {
    match Glob::new(pattern) {
        Ok(glob) => glob.is_match(path),
        Err(err) => {
            tracing::debug!(pattern, %err, "invalid pattern never matches");
            false
        }
    }
}

/// An error produced when a pattern can't be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GlobError {
    #[error("unclosed character class starting at offset {pos}")]
    UnclosedClass { pos: usize },
    #[error("unclosed brace group starting at offset {pos}")]
    UnclosedBrace { pos: usize },
    #[error("invalid character range `{start}-{end}`")]
    InvalidRange { start: char, end: char },
    #[error("failed to compile pattern: {0}")]
    Regex(String),
}

/// A compiled CODEOWNERS pattern. Compiling is comparatively expensive, so
/// build a `Glob` once and reuse it for every path.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    strategy: Strategy,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Glob, GlobError> {
        let normalized = normalize_pattern(pattern);

        let strategy = if normalized == "*" {
            Strategy::Everything
        } else if let Some(body) = normalized.strip_suffix('/') {
            let body = body.strip_prefix('/').unwrap_or(body);
            Strategy::for_directory(&Lexer::new(body).tokenize()?.tokens)?
        } else {
            let body = normalized.strip_prefix('/').unwrap_or(&*normalized);
            Strategy::for_file(&Lexer::new(body).tokenize()?.tokens)?
        };

        Ok(Glob {
            pattern: pattern.to_owned(),
            strategy,
        })
    }

    /// The pattern this glob was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.strategy.is_match(&normalize_path(path))
    }
}

pub(crate) fn normalize_path(path: &str) -> Cow<'_, str> {
    if memchr(b'\\', path.as_bytes()).is_none() {
        return Cow::Borrowed(path);
    }
    Cow::Owned(path.replace('\\', "/"))
}

// Keep backslashes that escape something meaningful and turn the rest into
// path separators, so `src\lib\main.rs` means `src/lib/main.rs` but `a\*` is
// a literal star.
pub(crate) fn normalize_pattern(pattern: &str) -> Cow<'_, str> {
    if memchr(b'\\', pattern.as_bytes()).is_none() {
        return Cow::Borrowed(pattern);
    }

    let mut normalized = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            normalized.push(c);
            continue;
        }
        match chars.peek() {
            Some(&next) if is_escapable(next) => {
                normalized.push('\\');
                normalized.push(next);
                chars.next();
            }
            _ => normalized.push('/'),
        }
    }
    Cow::Owned(normalized)
}

fn is_escapable(c: char) -> bool {
    matches!(
        c,
        '*' | '?' | '[' | ']' | '{' | '}' | ',' | '!' | '^' | '-' | ' ' | '\t' | '#' | '"' | '\\'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_pattern() {
        assert!(matches("main.js", "*"));
        assert!(matches("a/b/c.js", "*"));
        assert!(matches(".github/CODEOWNERS", "*"));
    }

    #[test]
    fn test_directory_patterns() {
        let examples = [
            ("src/main.js", "src/", true),
            ("src/utils/helper.js", "src/", true),
            ("src", "src/", true),
            ("docs/x.js", "src/", false),
            ("srcfoo/x.js", "src/", false),
            ("docs/readme.md", "/docs/", true),
            ("src/utils/helper.js", "src/utils/", true),
            ("src/parser/subdir/thing.rs", "src/*/subdir/", true),
            ("src/parser/thing.rs", "src/*/subdir/", false),
            ("src/my dir/a.txt", "src/my\\ dir/", true),
        ];

        for (path, pattern, expected) in examples {
            assert_eq!(
                matches(path, pattern),
                expected,
                "expected `{}` matching `{}` to be {}",
                pattern,
                path,
                expected
            );
        }
    }

    #[test]
    fn test_literals() {
        assert!(matches("src/main.js", "src/main.js"));
        assert!(matches("src/main.js", "/src/main.js"));
        assert!(!matches("src/main.js", "src/other.js"));
        assert!(!matches("src/Main.js", "src/main.js"));
        assert!(!matches("SRC/main.js", "src/main.js"));
        assert!(!matches("lib/src/main.js", "src/main.js"));

        let glob = Glob::new("/src/main.js").unwrap();
        assert_eq!(glob.pattern(), "/src/main.js");
        assert!(glob.is_match("src/main.js"));
    }

    #[test]
    fn test_single_star() {
        let examples = [
            ("main.js", "*.js", true),
            ("main.ts", "*.js", false),
            ("src/main.js", "*.js", false),
            ("src/main.js", "src/*", true),
            ("src/utils/helper.js", "src/*", false),
            ("src/main.js", "src/*.js", true),
            ("docs/main.js", "src/*.js", false),
            ("src/.eslintrc.js", "src/*.js", true),
            ("src/café.js", "src/*.js", true),
            ("src/测试.js", "src/*.js", true),
            ("src/component-💯.js", "src/*-*.js", true),
            ("main.js", "/*", true),
            ("src/main.js", "/*", false),
        ];

        for (path, pattern, expected) in examples {
            assert_eq!(matches(path, pattern), expected, "`{}` vs `{}`", pattern, path);
        }
    }

    #[test]
    fn test_double_star() {
        let examples = [
            ("src/main.js", "**/*.js", true),
            ("src/deep/nested/file.js", "**/*.js", true),
            ("main.js", "**/*.js", true),
            ("src/main.js", "src/**/*.js", true),
            ("src/utils/helper.js", "src/**/*.js", true),
            ("docs/helper.js", "src/**/*.js", false),
            ("src/components/Button.js", "**/components/*.js", true),
            ("src/pages/home/Header.js", "**/components/*.js", false),
            ("src/components/Button.js", "src/**", true),
            ("docs/README.md", "src/**", false),
            ("anything/at/all", "**", true),
            ("foo/bar/baz", "foo/**/baz", true),
            ("foo/baz", "foo/**/baz", true),
            ("foo/bar", "foo/**/baz", false),
        ];

        for (path, pattern, expected) in examples {
            assert_eq!(matches(path, pattern), expected, "`{}` vs `{}`", pattern, path);
        }
    }

    #[test]
    fn test_question_mark() {
        assert!(matches("main1.js", "main?.js"));
        assert!(matches("maina.js", "main?.js"));
        assert!(!matches("main.js", "main?.js"));
        assert!(!matches("main12.js", "main?.js"));
        assert!(matches("src1/main.js", "src?/main.js"));
        assert!(!matches("src/main.js", "src?main.js"));
        assert!(matches("src1main.js", "src?main.js"));
    }

    #[test]
    fn test_character_classes() {
        let examples = [
            ("maina.js", "main[abc].js", true),
            ("maind.js", "main[abc].js", false),
            ("main.js", "main[abc].js", false),
            ("main5.js", "main[0-9].js", true),
            ("maina.js", "main[0-9].js", false),
            ("mainA.js", "main[A-Z].js", true),
            ("main1.js", "main[!abc].js", true),
            ("maina.js", "main[!abc].js", false),
            ("main/.js", "main[!abc].js", false),
            ("main[.js", "main[\\[].js", true),
            ("main].js", "main[\\]].js", true),
        ];

        for (path, pattern, expected) in examples {
            assert_eq!(matches(path, pattern), expected, "`{}` vs `{}`", pattern, path);
        }
    }

    #[test]
    fn test_brace_expansion() {
        let examples = [
            ("main.js", "main.{js,ts}", true),
            ("main.py", "main.{js,ts}", false),
            ("src/pages/Home.tsx", "src/{components,pages}/*.{js,jsx,ts,tsx}", true),
            ("src/utils/helper.js", "src/{components,pages}/*.{js,jsx,ts,tsx}", false),
            ("src/test.spec.ts", "src/*.{test,spec}.{js,ts}", true),
            ("src/main.js", "src/*.{test,spec}.{js,ts}", false),
            ("src/a.js", "src/{a,{b,c}}.js", true),
            ("src/c.js", "src/{a,{b,c}}.js", true),
            ("src/components/Button.test.jsx", "src/**/[BC]*.{test,spec}.{js,jsx,ts,tsx}", true),
            ("src/utils/helper.test.js", "src/**/[BC]*.{test,spec}.{js,jsx,ts,tsx}", false),
        ];

        for (path, pattern, expected) in examples {
            assert_eq!(matches(path, pattern), expected, "`{}` vs `{}`", pattern, path);
        }
    }

    #[test]
    fn test_escape_sequences() {
        let examples = [
            ("src/main*.js", "src/main\\*.js", true),
            ("src/main.js", "src/main\\*.js", false),
            ("src/main?.js", "src/main\\?.js", true),
            ("src/main1.js", "src/main\\?.js", false),
            ("src/main[abc].js", "src/main\\[abc\\].js", true),
            ("src/maina.js", "src/main\\[abc\\].js", false),
            ("src/main{a,b}.js", "src/main\\{a,b\\}.js", true),
            ("src/maina.js", "src/main\\{a,b\\}.js", false),
            ("src/my component/Button.js", "src/**/my\\ component/*.js", true),
            ("src/mycomponent/Button.js", "src/**/my\\ component/*.js", false),
            // Not an escape, so it's a separator
            ("src/main.js", "src/main\\.js", false),
            ("src/lib/main.rs", "src\\lib\\main.rs", true),
            // `\*` is still an escape, so the last backslash isn't a separator
            ("src/lib*.rs", "src\\lib\\*.rs", true),
            ("src/lib/a.rs", "src\\lib\\*.rs", false),
        ];

        for (path, pattern, expected) in examples {
            assert_eq!(matches(path, pattern), expected, "`{}` vs `{}`", pattern, path);
        }
    }

    #[test]
    fn test_windows_separators() {
        assert!(matches("src\\main.js", "src/*.js"));
        assert!(matches("src\\utils\\helper.js", "src/**/*.js"));
        assert!(matches("src/utils\\helper.js", "src/**/*.js"));
        assert!(matches("src\\utils/helper.js", "src/**/*.js"));
        assert!(matches("src\\utils\\helper.js", "src/utils/"));
    }

    #[test]
    fn test_malformed_patterns_never_match() {
        assert!(!matches("src/main.js[", "src/main.js["));
        assert!(!matches("src/main.js", "src/{main.js"));
        assert!(!matches("b", "[z-a]"));
        assert!(matches("src/main.js(", "src/main.js("));
        assert!(Glob::new("src/main.js[").is_err());
    }

    #[test]
    fn test_many_double_stars() {
        let pattern = "**/a/**/b/**/c/**/d/**/e/**/f/**/g/**/h/**/i/**/j/**/k/**/l/**/m/**/z";
        assert!(!matches("src/main.js", pattern));
        assert!(matches("a/b/c/d/e/f/g/h/i/j/k/l/m/z", pattern));
    }

    #[test]
    fn test_normalize_pattern() {
        assert_eq!(normalize_pattern("src/*.rs"), "src/*.rs");
        assert_eq!(normalize_pattern("src\\lib\\main.rs"), "src/lib/main.rs");
        assert_eq!(normalize_pattern("src\\lib\\*.rs"), "src/lib\\*.rs");
        assert_eq!(normalize_pattern("a\\*b\\ c"), "a\\*b\\ c");
        assert_eq!(normalize_pattern("trailing\\"), "trailing/");
    }
}
