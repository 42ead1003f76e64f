//! JSON documents read and written by the CLI.
//!
//! Input: either a bare ring `[[x, y], ...]` or `{"vertices": [[x, y], ...]}`.
//! Output: the skeleton graph flattened into index-based records.

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use wavefront::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InputDoc {
    Ring(Vec<[f64; 2]>),
    Object { vertices: Vec<[f64; 2]> },
}

impl InputDoc {
    pub fn into_vertices(self) -> Vec<Vec2<f64>> {
        let ring = match self {
            InputDoc::Ring(r) | InputDoc::Object { vertices: r } => r,
        };
        ring.into_iter().map(|[x, y]| Vec2::new(x, y)).collect()
    }
}

pub fn read_vertices(path: &Path) -> Result<Vec<Vec2<f64>>> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let doc: InputDoc = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing vertex list in {}", path.display()))?;
    let vertices = doc.into_vertices();
    ensure!(
        vertices.iter().all(|v| v.x.is_finite() && v.y.is_finite()),
        "non-finite coordinate in {}",
        path.display()
    );
    Ok(vertices)
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct NodeDoc {
    pub position: [f64; 2],
    pub in_edges: Vec<usize>,
    pub out_edges: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EdgeDoc {
    pub source: usize,
    pub target: Option<usize>,
    pub basis: [f64; 2],
    /// Exterior parents `[clockwise, widdershins]`; absent for polygon edges.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parents: Option<[usize; 2]>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SkeletonDoc {
    pub num_exterior_nodes: usize,
    pub winding: String,
    pub nodes: Vec<NodeDoc>,
    pub edges: Vec<EdgeDoc>,
    pub total_length: f64,
}

impl From<&Graph> for SkeletonDoc {
    fn from(g: &Graph) -> Self {
        let nodes = g
            .nodes
            .iter()
            .map(|n| NodeDoc {
                position: [n.position.x, n.position.y],
                in_edges: n.in_edges.iter().map(|e| e.0).collect(),
                out_edges: n.out_edges.iter().map(|e| e.0).collect(),
            })
            .collect();
        let edges = g
            .edges
            .iter()
            .map(|e| EdgeDoc {
                source: e.source.0,
                target: e.target.map(|t| t.0),
                basis: [e.basis.x, e.basis.y],
                parents: g
                    .interior_edge(e.id)
                    .map(|ie| [ie.clockwise, ie.widdershins]),
            })
            .collect();
        Self {
            num_exterior_nodes: g.num_exterior,
            winding: format!("{:?}", g.winding),
            nodes,
            edges,
            total_length: g.total_length(),
        }
    }
}

pub fn write_skeleton(path: &Path, g: &Graph) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    let doc = SkeletonDoc::from(g);
    fs::write(path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))
}
