use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use patmat::{Bindings, Pattern, PatternError};

const CASE_SUFFIX: &str = ".test.toml";

/// One `.test.toml` case file.
#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable case description.
    #[serde(default)]
    pub description: Option<String>,

    /// Pattern in patmat notation.
    pub pattern: String,

    /// Subject value in patmat notation.
    pub subject: String,

    /// Exact expected bindings, name to value notation.
    #[serde(default)]
    pub expect_bindings: Option<BTreeMap<String, String>>,

    /// The pattern must not match the subject.
    #[serde(default)]
    pub expect_no_match: bool,

    /// Matching must fail with an error whose message contains this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Either the pattern or the subject must fail to parse.
    #[serde(default)]
    pub expect_parse_error: bool,
}

fn parse_test_file(content: &str) -> Result<TestConfig, String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM
    let config: TestConfig =
        toml::from_str(content).map_err(|e| format!("TOML parse error: {}", e))?;
    if config.expect_no_match && (config.expect_bindings.is_some() || config.expect_error.is_some())
    {
        return Err("expect_no_match cannot be combined with other expectations".into());
    }
    Ok(config)
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_suffix(CASE_SUFFIX))
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let (description, outcome) = match std::fs::read_to_string(path) {
        Ok(content) => match parse_test_file(&content) {
            Ok(config) => (config.description.clone(), check_case(&config)),
            Err(e) => (None, Err(format!("case file error: {}", e))),
        },
        Err(e) => (None, Err(format!("cannot read file: {}", e))),
    };
    tracing::debug!(path = %path.display(), passed = outcome.is_ok(), "ran case");

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: match outcome {
            Ok(()) => TestOutcome::Pass,
            Err(reason) => TestOutcome::Fail(reason),
        },
    }
}

/// Returns `Err(reason)` when the case does not behave as declared.
fn check_case(config: &TestConfig) -> Result<(), String> {
    let parsed = notation::parse_pattern(&config.pattern, 0).and_then(|template| {
        Ok((template, notation::parse_value(&config.subject, 1)?))
    });

    if config.expect_parse_error {
        return match parsed {
            Err(_) => Ok(()),
            Ok(_) => Err("expected parse error, but parsing succeeded".into()),
        };
    }

    let (template, subject) =
        parsed.map_err(|e| format!("unexpected parse error: {}", e.message))?;
    let result = Pattern::of(template).match_value(&subject);

    match (&config.expect_error, result) {
        (Some(expected), Err(error)) => check_error(expected, &error),
        (Some(expected), Ok(_)) => Err(format!(
            "expected error containing \"{}\", but matching succeeded",
            expected
        )),
        (None, Err(error)) => Err(format!("unexpected error: {}", error)),
        (None, Ok(None)) if config.expect_no_match => Ok(()),
        (None, Ok(None)) => Err("pattern did not match".into()),
        (None, Ok(Some(bindings))) if config.expect_no_match => Err(format!(
            "expected no match, got bindings {}",
            format_bindings(&bindings)
        )),
        (None, Ok(Some(bindings))) => match &config.expect_bindings {
            Some(expected) => check_bindings(expected, &bindings),
            None => Ok(()),
        },
    }
}

fn check_error(expected: &str, error: &PatternError) -> Result<(), String> {
    let message = error.to_string();
    if message.contains(expected) {
        Ok(())
    } else {
        Err(format!(
            "expected error containing \"{}\", got: {}",
            expected, message
        ))
    }
}

fn check_bindings(expected: &BTreeMap<String, String>, actual: &Bindings) -> Result<(), String> {
    let mut problems = Vec::new();

    for (name, source) in expected {
        let expected_value = notation::parse_value(source, 2)
            .map_err(|e| format!("bad expected value for `{}`: {}", name, e.message))?;
        match actual.get(name) {
            None => problems.push(format!("`{}` was not bound", name)),
            Some(value) if *value != expected_value => problems.push(format!(
                "`{}`\n    expected: {}\n    actual:   {}",
                name, expected_value, value
            )),
            Some(_) => {}
        }
    }
    for name in actual.names().filter(|name| !expected.contains_key(*name)) {
        problems.push(format!("unexpected binding `{}` = {}", name, actual[name]));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(format!("binding mismatch\n  {}", problems.join("\n  ")))
    }
}

fn format_bindings(bindings: &Bindings) -> String {
    let parts: Vec<String> = bindings
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Discover case files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(CASE_SUFFIX))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// Keep the requested categories and their subcategories.
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a [PathBuf]> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v.as_slice())).collect();
    }
    let mut selected = BTreeMap::new();
    for request in requested {
        let request = request.trim_matches('/');
        let prefix = format!("{}/", request);
        let before = selected.len();
        for (category, files) in all {
            if category == request || category.starts_with(&prefix) {
                selected.insert(category.as_str(), files.as_slice());
            }
        }
        if selected.len() == before {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                request,
                all.keys()
                    .map(|k| category_label(k))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    selected
}

/// List available categories for the given case path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", CASE_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} cases)", category_label(category), files.len());
    }
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

fn paint(text: &str, code: &str, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    }
}

/// Run every case file under `path` (or a single file).
/// If `categories` is non-empty, only run cases in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let all_categories = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover_categorized(path)
    };

    if all_categories.is_empty() {
        eprintln!("no {} files found in {}", CASE_SUFFIX, path.display());
        return 1;
    }

    let selected = select_categories(&all_categories, categories);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (category, files) in &selected {
        eprintln!();
        eprintln!("{}", paint(category_label(category), "1", no_color));

        for file in files.iter() {
            let result = run_single_test(file);
            match result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let TestOutcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            paint("ok", "32", no_color),
            passed
        );
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
