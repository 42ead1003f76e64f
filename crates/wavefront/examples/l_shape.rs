//! Skeleton of an L-shaped room, printed edge by edge.
//!
//! Run: `cargo run -p wavefront --example l_shape`

use nalgebra::vector;
use wavefront::prelude::*;

fn main() -> Result<(), SolverError> {
    let room = [
        vector![0.0, 0.0],
        vector![2.0, 0.0],
        vector![2.0, 1.0],
        vector![1.0, 1.0],
        vector![1.0, 2.0],
        vector![0.0, 2.0],
    ];
    let g = solve(&room)?;
    println!(
        "{} vertices, {} interior nodes, {} bisectors ({:?})",
        g.num_exterior,
        g.interior_nodes().len(),
        g.interior.len(),
        g.winding
    );
    for ie in &g.interior {
        let e = g.edge(ie.id);
        let from = g.node(e.source).position;
        let to = e.target.map(|t| g.node(t).position);
        println!(
            "edge {:>2}: ({:.3}, {:.3}) -> {:?}  parents cw={} ws={}",
            ie.id.0,
            from.x,
            from.y,
            to.map(|p| (p.x, p.y)),
            ie.clockwise,
            ie.widdershins
        );
    }
    println!("total skeleton length {:.4}", g.total_length());
    Ok(())
}
