//! Contraction words scanned from liblouis grade-2 table files.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use braille::translate::Grade;
use braille::{Language, TranslatorConfig};
use tracing::debug;

const OPCODES: [&str; 3] = ["always", "word", "contraction"];

/// Words defined by contraction-style rules in `path` and the tables it
/// includes, lowercased and sorted.
pub fn scan_table(path: &Path) -> Result<Vec<String>> {
    let mut words = BTreeSet::new();
    let mut seen = HashSet::new();
    scan_into(path, &mut words, &mut seen)?;
    Ok(words.into_iter().collect())
}

fn scan_into(path: &Path, words: &mut BTreeSet<String>, seen: &mut HashSet<PathBuf>) -> Result<()> {
    if !seen.insert(path.to_path_buf()) {
        return Ok(());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading table {}", path.display()))?;
    let dir = path.parent().unwrap_or(Path::new("."));

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        let Some(opcode) = tokens.next() else {
            continue;
        };
        let Some(operand) = tokens.next() else {
            continue;
        };
        if opcode == "include" {
            let included = dir.join(operand);
            if included.is_file() {
                scan_into(&included, words, seen)?;
            } else {
                debug!(table = %included.display(), "skipping missing include");
            }
        } else if OPCODES.contains(&opcode) {
            let word = operand.trim_matches('"');
            if is_word(word) {
                words.insert(word.to_lowercase());
            }
        }
    }
    Ok(())
}

fn is_word(s: &str) -> bool {
    s.chars().count() >= 2
        && s
            .chars()
            .all(|c| c.is_ascii_alphabetic() || ('가'..='힣').contains(&c))
}

/// Contraction words for every language whose grade-2 table exists under
/// `table_dir`. Languages without a readable table are left out.
pub fn discover(table_dir: &Path, config: &TranslatorConfig) -> BTreeMap<Language, Vec<String>> {
    let mut found = BTreeMap::new();
    for (&language, pair) in &config.tables {
        let path = table_dir.join(pair.table(Grade::Two).as_str());
        if !path.is_file() {
            continue;
        }
        match scan_table(&path) {
            Ok(words) if !words.is_empty() => {
                debug!(%language, count = words.len(), "loaded contraction words");
                found.insert(language, words);
            }
            Ok(_) => {}
            Err(e) => debug!(%language, "no contraction words: {e:#}"),
        }
    }
    found
}
