//! Seed gene list reading

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::DEFAULT_SEEDS;
use crate::error::Result;

/// The built-in seed set
pub fn default_seeds() -> Vec<String> {
    DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect()
}

/// Load seeds from a file, or the default seeds when no path is given
pub fn load_seeds(path: Option<&Path>) -> Result<Vec<String>> {
    let Some(path) = path else {
        log::info!("No seed file given, using default seeds");
        return Ok(default_seeds());
    };

    log::info!("Reading seed file: {}", path.display());
    let file = File::open(path)?;
    let seeds = read_seeds(BufReader::new(file))?;
    if seeds.is_empty() {
        log::warn!(
            "Seed file {} lists no genes, using default seeds",
            path.display()
        );
        return Ok(default_seeds());
    }

    Ok(seeds)
}

/// Read seed identifiers: one per line, commas and whitespace also separate.
/// Duplicates are collapsed keeping first-seen order.
pub fn read_seeds<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();

    for line in reader.lines() {
        let line = line?;
        for token in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            if seen.insert(token.to_string()) {
                seeds.push(token.to_string());
            }
        }
    }

    Ok(seeds)
}
