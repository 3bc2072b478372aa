//! Results persistence module

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{json, to_string_pretty};

use crate::config::ExpansionConfig;
use crate::error::Result;
use crate::expansion::ExpansionResult;
use crate::graph::CompressedGraph;

/// Write admitted genes to `path`, one per line in admission order.
///
/// With `with_pvalues`, writes a tab-separated table with a header instead.
pub fn save_results(result: &ExpansionResult, path: &Path, with_pvalues: bool) -> Result<()> {
    log::info!("Saving {} admitted genes to {}", result.admissions.len(), path.display());

    ensure_parent(path)?;
    let mut out = BufWriter::new(File::create(path)?);
    write_admissions(result, &mut out, with_pvalues)?;
    out.flush()?;

    Ok(())
}

/// Write admissions to any writer
pub fn write_admissions<W: Write>(result: &ExpansionResult, out: &mut W, with_pvalues: bool) -> Result<()> {
    if with_pvalues {
        writeln!(out, "rank\tgene\tp_value\tk_s\tdegree")?;
        for a in &result.admissions {
            writeln!(
                out,
                "{}\t{}\t{:.6e}\t{}\t{}",
                a.rank, a.gene, a.p_value, a.weighted_links, a.degree
            )?;
        }
    } else {
        for a in &result.admissions {
            writeln!(out, "{}", a.gene)?;
        }
    }
    Ok(())
}

/// Save a JSON summary of the run
pub fn save_summary(
    result: &ExpansionResult,
    graph_stats: &GraphStats,
    config: &ExpansionConfig,
    path: &Path,
) -> Result<()> {
    log::info!("Saving run summary to {}", path.display());

    ensure_parent(path)?;
    let mut file = File::create(path)?;

    let summary = json!({
        "graph_stats": {
            "node_count": graph_stats.node_count,
            "edge_count": graph_stats.edge_count,
            "avg_degree": graph_stats.avg_degree,
        },
        "parameters": config,
        "seeds_used": result.seeds_used,
        "dropped_seeds": result.dropped_seeds,
        "termination": result.termination,
        "admitted_count": result.admissions.len(),
        "admissions": result.admissions,
        "module": result.module,
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Network size figures reported in the summary
#[derive(Debug, Clone, Copy)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub avg_degree: f64,
}

impl GraphStats {
    pub fn of(graph: &CompressedGraph) -> Self {
        Self {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            avg_degree: 2.0 * graph.edge_count() as f64 / graph.node_count().max(1) as f64,
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::{Admission, Termination};
    use crate::module::ModuleMetrics;

    fn result() -> ExpansionResult {
        ExpansionResult {
            admissions: vec![
                Admission {
                    rank: 1,
                    gene: "C".to_string(),
                    p_value: 0.3,
                    ln_p: 0.3f64.ln(),
                    weighted_links: 2,
                    degree: 3,
                },
                Admission {
                    rank: 2,
                    gene: "D".to_string(),
                    p_value: 0.6,
                    ln_p: 0.6f64.ln(),
                    weighted_links: 1,
                    degree: 2,
                },
            ],
            seeds_used: vec!["A".to_string(), "B".to_string()],
            dropped_seeds: Vec::new(),
            termination: Termination::TargetReached,
            module: ModuleMetrics {
                size: 4,
                seed_count: 2,
                admitted_count: 2,
                internal_edges: 4,
                density: 4.0 / 6.0,
                largest_component: 4,
                hubs: vec!["C".to_string()],
            },
        }
    }

    #[test]
    fn plain_output_is_one_gene_per_line() {
        let mut buf = Vec::new();
        write_admissions(&result(), &mut buf, false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "C\nD\n");
    }

    #[test]
    fn pvalue_output_has_header_and_rows() {
        let mut buf = Vec::new();
        write_admissions(&result(), &mut buf, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "rank\tgene\tp_value\tk_s\tdegree");
        assert!(lines[1].starts_with("1\tC\t3.000000e-1\t2\t3"));
    }

    #[test]
    fn summary_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("summary.json");
        let stats = GraphStats {
            node_count: 5,
            edge_count: 5,
            avg_degree: 2.0,
        };
        save_summary(&result(), &stats, &ExpansionConfig::default(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["admitted_count"], 2);
        assert_eq!(value["termination"], "target_reached");
        assert_eq!(value["admissions"][0]["gene"], "C");
        assert_eq!(value["parameters"]["alpha"], 1);
    }
}
