use log::{debug, info};

use crate::error::PhyloResult;

use super::distance::DistanceMatrix;
use super::tree::{clamp_length, PhyloNode, PhyloTree, TreeBuild};
use super::upgma::{argmin_pair, working_matrix};

struct Active {
    row: usize,
    node: PhyloNode,
}

/// Neighbor-joining tree, unrooted.
///
/// The last two active nodes are joined by a single edge: the remaining node
/// is hung directly below the most recently created internal node, which then
/// serves as the (three-way) root. That leaves `n - 2` internal nodes. Two
/// labels have no internal node to hang from, so they are joined under one
/// root at half their distance each.
pub fn neighbor_joining(dist: &DistanceMatrix) -> PhyloResult<TreeBuild> {
    let n = dist.n();
    let mut warnings = Vec::new();

    if n == 2 {
        let half = dist.distance(0, 1) / 2.0;
        let labels = dist.labels();
        let root = PhyloNode::internal(vec![
            PhyloNode::leaf(labels[0].clone()).with_branch_length(half),
            PhyloNode::leaf(labels[1].clone()).with_branch_length(half),
        ]);
        return Ok(TreeBuild {
            tree: PhyloTree::new(root),
            warnings,
        });
    }

    let (mut d, cap) = working_matrix(dist, n - 2);
    let mut active: Vec<Active> = dist
        .labels()
        .iter()
        .enumerate()
        .map(|(row, label)| Active {
            row,
            node: PhyloNode::leaf(label.clone()),
        })
        .collect();

    // r[row] = sum of distances from `row` to every other active node
    let mut r = vec![0.0f64; cap];
    for i in 0..n {
        r[i] = (0..n).map(|j| d[i * cap + j]).sum();
    }
    let mut next_row = n;

    while active.len() > 2 {
        let m = active.len() as f64;
        let (pi, pj) = argmin_pair(active.len(), |a, b| {
            let (i, j) = (active[a].row, active[b].row);
            (m - 2.0) * d[i * cap + j] - r[i] - r[j]
        });
        let nj = active.remove(pj);
        let ni = active.remove(pi);
        let (i, j) = (ni.row, nj.row);
        let dij = d[i * cap + j];

        let li = dij / 2.0 + (r[i] - r[j]) / (2.0 * (m - 2.0));
        let lj = dij - li;
        debug!(
            "nj: joining rows {} and {} (lengths {}, {}; {} nodes left)",
            i,
            j,
            li,
            lj,
            active.len() + 1
        );

        let u = next_row;
        next_row += 1;
        let mut ru = 0.0;
        for other in &active {
            let k = other.row;
            let duk = (d[i * cap + k] + d[j * cap + k] - dij) / 2.0;
            d[u * cap + k] = duk;
            d[k * cap + u] = duk;
            r[k] += duk - d[i * cap + k] - d[j * cap + k];
            ru += duk;
        }
        r[u] = ru;

        let li = clamp_length(li, &ni.node, &mut warnings);
        let lj = clamp_length(lj, &nj.node, &mut warnings);
        active.push(Active {
            row: u,
            node: PhyloNode::internal(vec![
                ni.node.with_branch_length(li),
                nj.node.with_branch_length(lj),
            ]),
        });
    }

    debug_assert_eq!(active.len(), 2);
    let other = active.remove(0);
    // the newest internal node was pushed last
    let mut root = active.remove(0);
    let length = clamp_length(d[root.row * cap + other.row], &other.node, &mut warnings);
    root.node.children.push(other.node.with_branch_length(length));
    let root = root.node;

    let tree = PhyloTree::new(root);
    info!(
        "nj: built tree with {} leaves and {} internal nodes ({} warnings)",
        tree.num_leaves(),
        tree.num_internal(),
        warnings.len()
    );
    Ok(TreeBuild { tree, warnings })
}
