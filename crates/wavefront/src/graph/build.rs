//! Graph construction from an ordered vertex list.

use nalgebra::Vector2;

use crate::geom::{normalize, signed_area, Winding};

use super::types::{EdgeId, Graph, NodeId, PolygonEdge, PolygonNode};

/// Build the exterior ring: one node and one edge per vertex, in input order.
///
/// Fewer than three vertices yield the empty graph. No interior edges are
/// created here; the solver context seeds the primary bisectors.
pub fn build_graph(vertices: &[Vector2<f64>]) -> Graph {
    let n = vertices.len();
    if n < 3 {
        return Graph::default();
    }
    let winding = Winding::from_area(signed_area(vertices));
    let mut nodes = Vec::with_capacity(n);
    let mut edges = Vec::with_capacity(n);
    for (i, &p) in vertices.iter().enumerate() {
        let j = (i + 1) % n;
        nodes.push(PolygonNode {
            id: NodeId(i),
            position: p,
            in_edges: vec![EdgeId((i + n - 1) % n)],
            out_edges: vec![EdgeId(i)],
        });
        edges.push(PolygonEdge {
            id: EdgeId(i),
            source: NodeId(i),
            target: Some(NodeId(j)),
            basis: normalize(vertices[j] - p).0,
        });
    }
    Graph {
        nodes,
        edges,
        interior: Vec::new(),
        num_exterior: n,
        winding,
    }
}
