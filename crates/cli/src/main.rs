use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;
use wavefront::prelude::*;

mod io;
mod provenance;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Straight skeletons of simple polygons")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Compute the skeleton of a vertex ring and write it as JSON
    Skeleton {
        /// `[[x, y], ...]` or `{"vertices": [[x, y], ...]}`
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Scheduler step cap; derived from the vertex count when omitted
        #[arg(long)]
        max_steps: Option<usize>,
        /// Scale distance tolerances by the input's bounding-box diagonal
        #[arg(long)]
        scaled_tolerance: bool,
    },
    /// Print a provenance block, with a skeleton summary if an input is given
    Report {
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Skeleton {
            input,
            out,
            max_steps,
            scaled_tolerance,
        } => skeleton(input, out, max_steps, scaled_tolerance),
        Action::Report { input } => report(input),
    }
}

fn config(vertices: &[Vec2<f64>], max_steps: Option<usize>, scaled_tolerance: bool) -> SolverCfg {
    let base = if scaled_tolerance {
        SolverCfg::scaled_for(vertices)
    } else {
        SolverCfg::default()
    };
    SolverCfg { max_steps, ..base }
}

fn skeleton(
    input: PathBuf,
    out: PathBuf,
    max_steps: Option<usize>,
    scaled_tolerance: bool,
) -> Result<()> {
    tracing::info!(input = %input.display(), out = %out.display(), "skeleton");
    let vertices = io::read_vertices(&input)?;
    let cfg = config(&vertices, max_steps, scaled_tolerance);
    let g = solve_with(&vertices, cfg)
        .with_context(|| format!("solving {} ({} vertices)", input.display(), vertices.len()))?;
    tracing::info!(
        nodes = g.nodes.len(),
        interior_edges = g.interior.len(),
        length = g.total_length(),
        "solved"
    );
    io::write_skeleton(&out, &g)?;

    let params = json!({
        "max_steps": max_steps,
        "scaled_tolerance": scaled_tolerance,
        "tolerance": {
            "eps_parallel": cfg.tolerance.eps_parallel,
            "eps_offset": cfg.tolerance.eps_offset,
            "eps_merge": cfg.tolerance.eps_merge,
            "eps_length": cfg.tolerance.eps_length
        }
    });
    let payload = provenance::Payload::new(params).with_input(&input);
    let sidecar = provenance::write_sidecar(&out, payload)?;
    tracing::info!(sidecar = %sidecar.display(), "provenance written");
    Ok(())
}

fn report(input: Option<PathBuf>) -> Result<()> {
    let mut payload = provenance::Payload::new(json!({}));
    if let Some(path) = &input {
        let vertices = io::read_vertices(path)?;
        let g = solve(&vertices).with_context(|| format!("solving {}", path.display()))?;
        payload.params = json!({
            "vertices": g.num_exterior,
            "interior_nodes": g.interior_nodes().len(),
            "interior_edges": g.interior.len(),
            "total_length": g.total_length()
        });
        payload = payload.with_input(path);
    }
    let doc = provenance::document(&payload, &[]);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
