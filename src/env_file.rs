//! Merge `KEY=VALUE` lines into a `.env` file.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

static ENV_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=").unwrap());

/// One line of the generated block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    pub key: &'static str,
    pub value: String,
    /// Placeholder value: only written when the key is absent.
    pub keep_existing: bool,
}

impl EnvEntry {
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
            keep_existing: false,
        }
    }

    pub fn placeholder(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            keep_existing: true,
            ..Self::new(key, value)
        }
    }

    pub fn line(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub replaced: usize,
    pub appended: usize,
}

/// Key assigned on a `.env` line, if any. Comments and blanks have none.
pub fn line_key(line: &str) -> Option<&str> {
    assignment(line).map(|(_, key)| key)
}

/// Split an assignment into the text before its key (indent, `export `) and the key.
fn assignment(line: &str) -> Option<(&str, &str)> {
    if line.trim_start().starts_with('#') {
        return None;
    }
    let key = ENV_KEY_RE.captures(line)?.get(1)?;
    Some((&line[..key.start()], key.as_str()))
}

/// Split off the line terminator (`\r\n`, `\n`, or none on the last line).
fn split_ending(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}

/// Rewrite `content` so every entry's key carries the entry's value.
///
/// Existing assignments are replaced in place (all of them, if duplicated),
/// keeping their `export ` prefix and line ending. Keys not present are
/// appended at the end using the file's line ending. Other lines are untouched.
pub fn merge(content: &str, entries: &[EnvEntry]) -> (String, MergeSummary) {
    let eol = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut summary = MergeSummary::default();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = String::with_capacity(content.len());

    for raw in content.split_inclusive('\n') {
        let (line, ending) = split_ending(raw);
        let matched = assignment(line)
            .and_then(|(prefix, key)| entries.iter().find(|e| e.key == key).map(|e| (prefix, e)));
        match matched {
            Some((prefix, entry)) => {
                seen.insert(entry.key);
                if entry.keep_existing {
                    out.push_str(raw);
                } else {
                    out.push_str(prefix);
                    out.push_str(&entry.line());
                    out.push_str(ending);
                    summary.replaced += 1;
                }
            }
            None => out.push_str(raw),
        }
    }

    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(eol);
    }
    for entry in entries {
        if !seen.contains(entry.key) {
            out.push_str(&entry.line());
            out.push_str(eol);
            summary.appended += 1;
        }
    }

    (out, summary)
}

/// Merge entries into the file at `path`, creating it if missing.
pub fn write_env_file(path: &Path, entries: &[EnvEntry]) -> Result<MergeSummary> {
    let content = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };
    let (merged, summary) = merge(&content, entries);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, merged)?;
    tracing::debug!(path = %path.display(), ?summary, "wrote env file");
    Ok(summary)
}
