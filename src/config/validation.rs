//! Config validation: unknown-key detection with "did you mean" suggestions.
//!
//! The raw TOML is walked as a `toml::Value` tree and every dotted key is
//! compared against the known schema before serde sees it. Unknown keys only
//! warn; a typo never stops the service from starting.

use std::collections::HashSet;

/// A non-fatal config warning (typo, unknown section).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

/// Every valid dotted key path in `engine_support.toml`.
///
/// Must be kept in step with the structs in `app_config.rs`.
pub fn known_config_keys() -> HashSet<&'static str> {
    [
        // [server]
        "server",
        "server.addr",
        "server.max_body_bytes",
        // [logging]
        "logging",
        "logging.level",
        "logging.format",
        "logging.audit_file",
    ]
    .into_iter()
    .collect()
}

/// Collect the dotted path of every key in a TOML tree, tables included.
///
/// `{ a = { b = 1 } }` yields `["a", "a.b"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let Some(table) = value.as_table() else {
        return Vec::new();
    };
    let mut keys = Vec::new();
    for (k, v) in table {
        let path = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{prefix}.{k}")
        };
        if v.is_table() {
            keys.push(path.clone());
            keys.extend(walk_toml_keys(v, &path));
        } else {
            keys.push(path);
        }
    }
    keys
}

/// Levenshtein edit distance over Unicode scalar values.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }

    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(ca != cb);
            row[j + 1] = substitution.min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Closest known key within edit distance 3, if any.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        // Tie-break on the key itself so the answer does not depend on
        // hash-set iteration order.
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

/// Warnings for every unknown key in `raw_toml`.
///
/// Parse errors are left for serde to report.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}
