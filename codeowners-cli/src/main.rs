use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;

use codeowners_resolver::{Owner, RuleSet};

/// Places a CODEOWNERS file is conventionally kept, in lookup order.
const CODEOWNERS_LOCATIONS: &[&str] = &["CODEOWNERS", ".github/CODEOWNERS", "docs/CODEOWNERS"];

#[derive(Parser)]
#[command(version, about = "Show the owners of paths according to a CODEOWNERS file")]
struct Cli {
    /// Paths to resolve, relative to the repository root. Read from stdin,
    /// one per line, when none are given.
    paths: Vec<String>,

    #[clap(short = 'f', long = "file", env = "CODEOWNERS_FILE")]
    codeowners_file: Option<PathBuf>,

    /// Repository root to look for a CODEOWNERS file in.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Print every matching rule instead of only the most specific one.
    #[arg(long)]
    all_matching_rules: bool,

    /// Print every owner named in the file, with its kind and GitHub page,
    /// and exit.
    #[arg(long, conflicts_with = "all_matching_rules")]
    owners: bool,

    /// Organization for team names written without one.
    #[arg(long, env = "CODEOWNERS_ORG")]
    org: Option<String>,

    /// Fail if any pattern in the file can't be compiled.
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn codeowners_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.codeowners_file {
            return Ok(path.clone());
        }
        match find_codeowners_file(&self.root) {
            Some(path) => Ok(path),
            None => bail!(
                "no CODEOWNERS file found in {} (looked for {})",
                self.root.display(),
                CODEOWNERS_LOCATIONS.join(", ")
            ),
        }
    }

    /// Logs every pattern that can't be compiled. With `--check`, any such
    /// pattern is an error.
    fn check_patterns(&self, ruleset: &RuleSet, codeowners_path: &Path) -> Result<()> {
        let mut invalid = 0;
        for (rule, err) in ruleset.invalid_patterns() {
            tracing::warn!(pattern = %rule.pattern, %err, "pattern never matches");
            invalid += 1;
        }
        if self.check && invalid > 0 {
            bail!("{} invalid pattern(s) in {}", invalid, codeowners_path.display());
        }
        Ok(())
    }

    fn input_paths(&self) -> Result<Vec<String>> {
        if !self.paths.is_empty() {
            return Ok(self.paths.clone());
        }
        let mut paths = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line.context("failed to read paths from stdin")?;
            let line = line.trim();
            if !line.is_empty() {
                paths.push(line.to_owned());
            }
        }
        Ok(paths)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let codeowners_path = cli.codeowners_path()?;
    tracing::debug!(path = %codeowners_path.display(), "using CODEOWNERS file");
    let ruleset = codeowners_resolver::from_path(&codeowners_path)
        .with_context(|| format!("failed to read {}", codeowners_path.display()))?;

    cli.check_patterns(&ruleset, &codeowners_path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.owners {
        for line in owners_listing(&ruleset, cli.org.as_deref()) {
            writeln!(out, "{}", line)?;
        }
        return Ok(());
    }

    let paths = cli.input_paths()?;
    let lines = if cli.all_matching_rules {
        resolve(&paths, |path| all_matching_rules(&ruleset, path))
    } else {
        resolve(&paths, |path| best_owners(&ruleset, path))
    };
    for line in lines {
        writeln!(out, "{}", line)?;
    }

    Ok(())
}

#[cfg(feature = "rayon")]
fn resolve<F>(paths: &[String], format: F) -> Vec<String>
where
    F: Fn(&str) -> String + Sync,
{
    use rayon::prelude::*;
    paths.par_iter().map(|path| format(path)).collect()
}

#[cfg(not(feature = "rayon"))]
fn resolve<F>(paths: &[String], format: F) -> Vec<String>
where
    F: Fn(&str) -> String,
{
    paths.iter().map(|path| format(path)).collect()
}

fn best_owners(ruleset: &RuleSet, path: &str) -> String {
    match ruleset.owners(path) {
        Some(owners) => format!("{:<70}  {}", path, owners.join(" ")),
        None => format!("{:<70}  (unowned)", path),
    }
}

fn owners_listing(ruleset: &RuleSet, default_org: Option<&str>) -> Vec<String> {
    ruleset
        .owners_list()
        .into_iter()
        .map(|name| {
            let owner = Owner::from(name);
            let url = owner.profile_url(default_org).unwrap_or_default();
            format!("{:<40}  {:<7}  {}", owner, owner.kind(), url)
                .trim_end()
                .to_owned()
        })
        .collect()
}

fn all_matching_rules(ruleset: &RuleSet, path: &str) -> String {
    let best = ruleset.best_match(path);
    let mut out = path.to_owned();
    let matching = ruleset.matching_rules(path);
    if matching.is_empty() {
        out.push_str("\n  (unowned)");
    }
    for (idx, rule) in matching {
        let marker = if best.map_or(false, |b| std::ptr::eq(b, rule)) {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!(
            "\n {} rule {:>3}: {:<40}  {}",
            marker,
            idx + 1,
            rule.pattern,
            rule.owners.join(" ")
        ));
    }
    out
}

fn find_codeowners_file(root: &Path) -> Option<PathBuf> {
    CODEOWNERS_LOCATIONS
        .iter()
        .map(|location| root.join(location))
        .find(|path| path.is_file())
}
