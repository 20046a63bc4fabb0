use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use super::{Glob, GlobError};

type CompileResult = Arc<Result<Glob, GlobError>>;

/// A caller-owned memo of compiled patterns, keyed by pattern string. Clones
/// share the same cache, so one can be handed to many threads. Patterns that
/// fail to compile are remembered too, and never match.
#[derive(Clone, Default)]
pub struct PatternCache {
    compiled: Arc<RwLock<HashMap<String, CompileResult>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`super::matches`], compiling `pattern` at most once.
    pub fn matches(&self, path: &str, pattern: &str) -> bool {
        match self.get_or_compile(pattern).as_ref() {
            Ok(glob) => glob.is_match(path),
            Err(_) => false,
        }
    }

    /// Number of distinct patterns compiled so far.
    pub fn len(&self) -> usize {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every compiled pattern.
    pub fn clear(&self) {
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub(crate) fn get_or_compile(&self, pattern: &str) -> CompileResult {
        if let Some(compiled) = self.get_cached(pattern) {
            return compiled;
        }

        let compiled = Arc::new(Glob::new(pattern));
        if let Err(err) = compiled.as_ref() {
            tracing::debug!(pattern, %err, "invalid pattern never matches");
        }
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(pattern.to_owned())
            .or_insert(compiled)
            .clone()
    }

    fn get_cached(&self, pattern: &str) -> Option<CompileResult> {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
            .cloned()
    }
}
