//! Node, edge and graph records.

use nalgebra::Vector2;

use crate::geom::{perp, Winding};

/// Identifier types for clarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct PolygonNode {
    pub id: NodeId,
    pub position: Vector2<f64>,
    pub in_edges: Vec<EdgeId>,
    pub out_edges: Vec<EdgeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PolygonEdge {
    pub id: EdgeId,
    pub source: NodeId,
    /// Unset on interior edges until a collision resolves the ray's end.
    pub target: Option<NodeId>,
    /// Unit direction from `source` toward `target`.
    pub basis: Vector2<f64>,
}

/// Auxiliary record of an interior edge (same id as its `PolygonEdge`).
#[derive(Clone, Debug, PartialEq)]
pub struct InteriorEdge {
    pub id: EdgeId,
    /// Exterior edge on the clockwise side (the one following the source in winding order).
    pub clockwise: usize,
    /// Exterior edge on the widdershins side (the one preceding the source).
    pub widdershins: usize,
    /// Shortest forward collision distance seen so far; a hint only.
    pub length: f64,
}

impl InteriorEdge {
    #[inline]
    pub fn has_parent(&self, exterior: usize) -> bool {
        self.clockwise == exterior || self.widdershins == exterior
    }
}

/// Straight-skeleton graph.
///
/// Invariants:
/// - `edges.len() == num_exterior + interior.len()`.
/// - `interior[k].id == EdgeId(num_exterior + k)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<PolygonNode>,
    pub edges: Vec<PolygonEdge>,
    pub interior: Vec<InteriorEdge>,
    pub num_exterior: usize,
    pub winding: Winding,
}

impl Graph {
    #[inline]
    pub fn is_exterior(&self, id: EdgeId) -> bool {
        id.0 < self.num_exterior
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &PolygonNode {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &PolygonEdge {
        &self.edges[id.0]
    }

    /// Interior record for `id`, `None` for exterior or unknown ids.
    pub fn interior_edge(&self, id: EdgeId) -> Option<&InteriorEdge> {
        id.0
            .checked_sub(self.num_exterior)
            .and_then(|k| self.interior.get(k))
    }

    pub(crate) fn interior_edge_mut(&mut self, id: EdgeId) -> Option<&mut InteriorEdge> {
        id.0
            .checked_sub(self.num_exterior)
            .and_then(|k| self.interior.get_mut(k))
    }

    /// Nodes created by collisions.
    pub fn interior_nodes(&self) -> &[PolygonNode] {
        &self.nodes[self.num_exterior.min(self.nodes.len())..]
    }

    /// Start point of exterior edge `i`.
    #[inline]
    pub fn exterior_anchor(&self, i: usize) -> Vector2<f64> {
        self.nodes[self.edges[i].source.0].position
    }

    /// Unit normal of exterior edge `i` pointing into the polygon.
    #[inline]
    pub fn inward_normal(&self, i: usize) -> Vector2<f64> {
        perp(self.edges[i].basis) * self.winding.sign()
    }

    /// True for the later of two interior edges spanning the same nodes in
    /// opposite directions (a stalled ridge grown from both ends).
    fn is_mirror(&self, e: &PolygonEdge) -> bool {
        let Some(t) = e.target else {
            return false;
        };
        e.id.0 >= self.num_exterior
            && self.node(t).out_edges.iter().any(|&o| {
                o < e.id && o.0 >= self.num_exterior && self.edge(o).target == Some(e.source)
            })
    }

    /// Resolved edges as position pairs (exterior boundary included). A ridge
    /// stored once per direction is listed once.
    pub fn segments(&self) -> Vec<(Vector2<f64>, Vector2<f64>)> {
        self.edges
            .iter()
            .filter(|e| !self.is_mirror(e))
            .filter_map(|e| {
                let t = e.target?;
                Some((self.node(e.source).position, self.node(t).position))
            })
            .collect()
    }

    /// True when every exterior edge is flagged in `accepted` (indexed by edge id).
    pub fn is_complete(&self, accepted: &[bool]) -> bool {
        accepted.len() >= self.num_exterior && accepted[..self.num_exterior].iter().all(|&a| a)
    }

    /// Total length of resolved interior edges, each ridge counted once.
    pub fn total_length(&self) -> f64 {
        self.edges[self.num_exterior.min(self.edges.len())..]
            .iter()
            .filter(|e| !self.is_mirror(e))
            .filter_map(|e| {
                let t = e.target?;
                Some((self.node(t).position - self.node(e.source).position).norm())
            })
            .sum()
    }

    pub(crate) fn push_node(&mut self, position: Vector2<f64>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PolygonNode {
            id,
            position,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
        });
        id
    }

    /// Append an interior ray from `source` and its parent record.
    pub(crate) fn push_interior_edge(
        &mut self,
        source: NodeId,
        clockwise: usize,
        widdershins: usize,
        basis: Vector2<f64>,
    ) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(PolygonEdge {
            id,
            source,
            target: None,
            basis,
        });
        self.interior.push(InteriorEdge {
            id,
            clockwise,
            widdershins,
            length: f64::INFINITY,
        });
        let out = &mut self.nodes[source.0].out_edges;
        if !out.contains(&id) {
            out.push(id);
        }
        debug_assert_eq!(self.edges.len(), self.num_exterior + self.interior.len());
        id
    }

    /// Set the end node of an interior edge. Returns `false` if it was already set.
    pub(crate) fn set_target(&mut self, edge: EdgeId, node: NodeId) -> bool {
        if self.edges[edge.0].target.is_some() {
            return false;
        }
        self.edges[edge.0].target = Some(node);
        self.nodes[node.0].in_edges.push(edge);
        true
    }
}
