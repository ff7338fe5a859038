use log::{debug, info};

use crate::error::PhyloResult;

use super::distance::DistanceMatrix;
use super::tree::{clamp_length, PhyloNode, PhyloTree, TreeBuild};

/// Returns the positions `(a, b)`, `a < b`, of the pair with the lowest score
/// among `m` active entries.
///
/// Pairs are visited in lexicographic order of `(a, b)` and only a strictly
/// lower score replaces the current best, so ties go to the first such pair.
pub(crate) fn argmin_pair(m: usize, mut score: impl FnMut(usize, usize) -> f64) -> (usize, usize) {
    let mut best = f64::INFINITY;
    let mut best_pair = (0, 1);
    for a in 0..m {
        for b in (a + 1)..m {
            let s = score(a, b);
            if s < best {
                best = s;
                best_pair = (a, b);
            }
        }
    }
    best_pair
}

/// Copies a matrix into a dense working table with room for `extra` merged rows.
pub(crate) fn working_matrix(dist: &DistanceMatrix, extra: usize) -> (Vec<f64>, usize) {
    let n = dist.n();
    let cap = n + extra;
    let mut d = vec![0.0f64; cap * cap];
    for i in 0..n {
        for (j, &v) in dist.lower_row(i).iter().enumerate().take(i) {
            d[i * cap + j] = v;
            d[j * cap + i] = v;
        }
    }
    (d, cap)
}

struct Cluster {
    row: usize,
    size: usize,
    height: f64,
    node: PhyloNode,
}

/// Average-linkage clustering into a rooted, ultrametric binary tree.
///
/// Merged clusters are appended to the end of the active list while the
/// others keep their relative order, which together with [`argmin_pair`]
/// fixes the merge order for tied distances.
pub fn upgma(dist: &DistanceMatrix) -> PhyloResult<TreeBuild> {
    let n = dist.n();
    let (mut d, cap) = working_matrix(dist, n - 1);

    let mut active: Vec<Cluster> = dist
        .labels()
        .iter()
        .enumerate()
        .map(|(row, label)| Cluster {
            row,
            size: 1,
            height: 0.0,
            node: PhyloNode::leaf(label.clone()),
        })
        .collect();
    let mut warnings = Vec::new();
    let mut next_row = n;

    while active.len() > 1 {
        let (pa, pb) = argmin_pair(active.len(), |a, b| {
            d[active[a].row * cap + active[b].row]
        });
        let b = active.remove(pb);
        let a = active.remove(pa);
        let dab = d[a.row * cap + b.row];
        let h = dab / 2.0;
        debug!(
            "upgma: merging rows {} and {} at height {} ({} clusters left)",
            a.row,
            b.row,
            h,
            active.len() + 1
        );

        let u = next_row;
        next_row += 1;
        let (sa, sb) = (a.size as f64, b.size as f64);
        for c in &active {
            let k = c.row;
            let duk = (sa * d[a.row * cap + k] + sb * d[b.row * cap + k]) / (sa + sb);
            d[u * cap + k] = duk;
            d[k * cap + u] = duk;
        }

        let la = clamp_length(h - a.height, &a.node, &mut warnings);
        let lb = clamp_length(h - b.height, &b.node, &mut warnings);
        active.push(Cluster {
            row: u,
            size: a.size + b.size,
            height: h,
            node: PhyloNode::internal(vec![
                a.node.with_branch_length(la),
                b.node.with_branch_length(lb),
            ]),
        });
    }

    let root = active.remove(0).node;
    let tree = PhyloTree::new(root);
    info!(
        "upgma: built tree with {} leaves and {} internal nodes",
        tree.num_leaves(),
        tree.num_internal()
    );
    Ok(TreeBuild { tree, warnings })
}
