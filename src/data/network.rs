//! Network file reading: plain edge lists and STRING interaction tables

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SCORE_THRESHOLD;
use crate::data::preprocessing::filter_by_score;
use crate::error::{ExpansionError, Result};
use crate::graph::{CompressedGraph, GraphBuilder};

/// Column holding the edge confidence in STRING files
pub const STRING_SCORE_COLUMN: &str = "combined_score";

const HEADER_FIRST: [&str; 4] = ["protein1", "node1", "gene", "protein"];
const HEADER_SECOND: [&str; 4] = ["protein2", "node2", "gene", "protein"];

/// Layout of a network file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkFormat {
    /// STRING if the header names a `combined_score` column, else edge list
    Auto,

    /// Two identifier columns, optional numeric score in the third
    EdgeList,

    /// STRING table with a named `combined_score` column
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Tab,
    Comma,
    Whitespace,
}

impl Delimiter {
    fn detect(line: &str) -> Self {
        if line.contains('\t') {
            Delimiter::Tab
        } else if line.contains(',') {
            Delimiter::Comma
        } else {
            Delimiter::Whitespace
        }
    }

    fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Tab => line.split('\t').map(str::trim).collect(),
            Delimiter::Comma => line.split(',').map(str::trim).collect(),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }
}

fn is_header(fields: &[&str]) -> bool {
    let named = |value: Option<&&str>, names: &[&str]| {
        value.is_some_and(|v| names.iter().any(|name| v.eq_ignore_ascii_case(name)))
    };
    named(fields.first(), &HEADER_FIRST)
        || named(fields.get(1), &HEADER_SECOND)
        || fields
            .iter()
            .any(|f| f.eq_ignore_ascii_case(STRING_SCORE_COLUMN))
}

fn score_column(fields: &[&str]) -> Option<usize> {
    fields
        .iter()
        .position(|f| f.eq_ignore_ascii_case(STRING_SCORE_COLUMN))
}

/// Load a network file and apply the score threshold.
///
/// STRING input is filtered at `score_threshold` (default 400). Plain edge
/// lists are only filtered when a threshold is given.
pub fn load_network(
    path: &Path,
    format: NetworkFormat,
    score_threshold: Option<f64>,
) -> Result<CompressedGraph> {
    log::info!("Reading network file: {}", path.display());
    let file = File::open(path)?;
    read_network(BufReader::new(file), format, score_threshold)
}

/// Parse a network from any buffered reader
pub fn read_network<R: BufRead>(
    reader: R,
    format: NetworkFormat,
    score_threshold: Option<f64>,
) -> Result<CompressedGraph> {
    let mut builder = GraphBuilder::new();
    let mut delimiter: Option<Delimiter> = None;
    let mut resolved: Option<NetworkFormat> = match format {
        NetworkFormat::Auto => None,
        fixed => Some(fixed),
    };
    let mut score_idx: Option<usize> = None;
    let mut rows = 0usize;

    for (line_idx, line) in reader.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let delim = *delimiter.get_or_insert_with(|| Delimiter::detect(trimmed));
        let fields = delim.split(trimmed);

        if is_header(&fields) {
            if let Some(idx) = score_column(&fields) {
                score_idx = Some(idx);
                resolved.get_or_insert(NetworkFormat::String);
            }
            continue;
        }

        let format = *resolved.get_or_insert(NetworkFormat::EdgeList);

        let (a, b) = match (fields.first(), fields.get(1)) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => (*a, *b),
            _ => {
                return Err(ExpansionError::malformed(
                    line_no,
                    format!("expected two gene identifiers, found {:?}", trimmed),
                ))
            }
        };

        let score = match format {
            NetworkFormat::String => {
                let idx = score_idx.ok_or_else(|| {
                    ExpansionError::malformed(
                        line_no,
                        format!("STRING input needs a header with a {} column", STRING_SCORE_COLUMN),
                    )
                })?;
                let raw = fields.get(idx).ok_or_else(|| {
                    ExpansionError::malformed(
                        line_no,
                        format!("row has {} columns, {} is column {}", fields.len(), STRING_SCORE_COLUMN, idx + 1),
                    )
                })?;
                let value = raw.parse::<f64>().map_err(|_| {
                    ExpansionError::malformed(line_no, format!("non-numeric score {:?}", raw))
                })?;
                Some(value)
            }
            // A non-numeric third column is an annotation, not a score
            _ => fields.get(2).and_then(|raw| raw.parse::<f64>().ok()),
        };

        builder.add_edge(a, b, score);
        rows += 1;
    }

    let format = resolved.unwrap_or(NetworkFormat::EdgeList);
    log::debug!("Parsed {} interaction rows as {:?}", rows, format);

    let graph = builder.build()?;
    log::info!(
        "Loaded network with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let threshold = match format {
        NetworkFormat::String => Some(score_threshold.unwrap_or(DEFAULT_SCORE_THRESHOLD)),
        _ => score_threshold,
    };

    match threshold {
        Some(min_score) => filter_by_score(&graph, min_score),
        None => Ok(graph),
    }
}
