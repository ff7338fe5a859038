use log::{debug, info};

use crate::error::{PhyloError, PhyloResult};

use super::tree::{PhyloNode, PhyloTree};

struct Vertex {
    label: Option<Box<str>>,
    leaf: bool,
    adj: Vec<(usize, f64)>,
}

/// Undirected view of a tree: every edge is stored in both endpoints'
/// adjacency lists with its length, so a new root can be picked anywhere.
struct Unrooted {
    vertices: Vec<Vertex>,
}

impl Unrooted {
    fn from_tree(tree: &PhyloTree) -> Self {
        let mut unrooted = Self {
            vertices: Vec::with_capacity(tree.num_nodes() + 1),
        };
        unrooted.add_subtree(tree.root(), None);
        unrooted
    }

    fn add_subtree(&mut self, node: &PhyloNode, parent: Option<(usize, f64)>) {
        let idx = self.vertices.len();
        self.vertices.push(Vertex {
            label: node.label.clone(),
            leaf: node.is_leaf(),
            adj: Vec::with_capacity(node.children.len() + 1),
        });
        if let Some((p, len)) = parent {
            self.vertices[idx].adj.push((p, len));
            self.vertices[p].adj.push((idx, len));
        }
        for child in &node.children {
            self.add_subtree(child, Some((idx, child.branch_length.unwrap_or(0.0))));
        }
    }

    fn leaves(&self) -> impl Iterator<Item = usize> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.leaf)
            .map(|(i, _)| i)
    }

    /// Path lengths from `start` to every vertex, plus the predecessor of
    /// each vertex on its path back to `start`.
    fn distances_from(&self, start: usize) -> (Vec<f64>, Vec<Option<usize>>) {
        let n = self.vertices.len();
        let mut dist = vec![0.0f64; n];
        let mut prev = vec![None; n];
        let mut visited = vec![false; n];
        visited[start] = true;
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            for &(w, len) in &self.vertices[v].adj {
                if !visited[w] {
                    visited[w] = true;
                    prev[w] = Some(v);
                    dist[w] = dist[v] + len;
                    stack.push(w);
                }
            }
        }
        (dist, prev)
    }

    /// First leaf (in vertex order) other than `source` at maximal distance.
    fn farthest_leaf(&self, dist: &[f64], source: usize) -> Option<usize> {
        let mut best: Option<usize> = None;
        for leaf in self.leaves().filter(|&l| l != source) {
            if best.map_or(true, |b| dist[leaf] > dist[b]) {
                best = Some(leaf);
            }
        }
        best
    }

    /// Replaces the edge `u`-`v` with `u`-`w`-`v`, `w` a new unlabeled vertex
    /// at distance `from_u` from `u`. Returns `w`.
    fn split_edge(&mut self, u: usize, v: usize, from_u: f64) -> PhyloResult<usize> {
        let pu = self.vertices[u].adj.iter().position(|&(x, _)| x == v);
        let pv = self.vertices[v].adj.iter().position(|&(x, _)| x == u);
        let (Some(pu), Some(pv)) = (pu, pv) else {
            return Err(PhyloError::DegenerateTree {
                msg: format!("vertices {} and {} are not adjacent", u, v),
            });
        };
        let len = self.vertices[u].adj[pu].1;
        let from_u = from_u.clamp(0.0, len.max(0.0));
        let w = self.vertices.len();
        self.vertices[u].adj[pu] = (w, from_u);
        self.vertices[v].adj[pv] = (w, len - from_u);
        self.vertices.push(Vertex {
            label: None,
            leaf: false,
            adj: vec![(u, from_u), (v, len - from_u)],
        });
        Ok(w)
    }

    /// Rebuilds an owned tree hanging from `v`. Former internal vertices left
    /// with a single child are spliced out and their two edges merged.
    fn rebuild(&self, v: usize, from: Option<usize>) -> PhyloNode {
        let vertex = &self.vertices[v];
        let children = vertex
            .adj
            .iter()
            .filter(|&&(w, _)| Some(w) != from)
            .map(|&(w, len)| {
                let mut child = self.rebuild(w, Some(v));
                if !self.vertices[w].leaf && child.children.len() == 1 {
                    let mut only = child.children.remove(0);
                    let below = only.branch_length.unwrap_or(0.0);
                    only.branch_length = Some(len + below);
                    only
                } else {
                    child.with_branch_length(len)
                }
            })
            .collect();
        PhyloNode {
            label: vertex.label.clone(),
            branch_length: None,
            children,
        }
    }
}

/// Reroots at the midpoint of the longest leaf-to-leaf path.
///
/// The new root always splits an edge of that path (possibly at offset 0),
/// so it has exactly two children and the total branch length is unchanged.
pub fn root_at_midpoint(tree: &mut PhyloTree) -> PhyloResult<()> {
    if tree.num_leaves() < 2 {
        return Err(PhyloError::DegenerateTree {
            msg: format!(
                "midpoint rooting needs at least 2 leaves, tree has {}",
                tree.num_leaves()
            ),
        });
    }
    let mut graph = Unrooted::from_tree(tree);

    let Some(start) = graph.leaves().next() else {
        return Err(PhyloError::DegenerateTree {
            msg: "tree has no leaves".into(),
        });
    };
    let (dist, _) = graph.distances_from(start);
    let a = graph.farthest_leaf(&dist, start).unwrap_or(start);
    let (dist, prev) = graph.distances_from(a);
    let b = graph.farthest_leaf(&dist, a).unwrap_or(a);
    let diameter = dist[b];
    let half = diameter / 2.0;
    debug!(
        "midpoint: diameter {} between {:?} and {:?}",
        diameter, graph.vertices[a].label, graph.vertices[b].label
    );

    // Walk back from `b` until the predecessor is no farther from `a` than half
    // the diameter; the midpoint lies on that edge.
    let mut cur = b;
    let mut edge = None;
    while let Some(p) = prev[cur] {
        if dist[p] <= half {
            edge = Some((p, cur));
            break;
        }
        cur = p;
    }
    let Some((p, c)) = edge else {
        return Err(PhyloError::DegenerateTree {
            msg: "no path between the two farthest leaves".into(),
        });
    };

    let root = graph.split_edge(p, c, half - dist[p])?;
    *tree = PhyloTree::new(graph.rebuild(root, None));
    info!("midpoint: rerooted at half of diameter {}", diameter);
    Ok(())
}

/// Reroots so that the leaf named `outgroup` is a direct child of the root.
///
/// The outgroup keeps its full branch length; the rest of the tree hangs from
/// the other side of the root at length 0.
pub fn root_with_outgroup(tree: &mut PhyloTree, outgroup: &str) -> PhyloResult<()> {
    let mut graph = Unrooted::from_tree(tree);
    let Some(leaf) = graph
        .leaves()
        .find(|&i| graph.vertices[i].label.as_deref() == Some(outgroup))
    else {
        return Err(PhyloError::LabelNotFound {
            label: outgroup.to_string(),
        });
    };
    let Some(&(parent, len)) = graph.vertices[leaf].adj.first() else {
        return Err(PhyloError::DegenerateTree {
            msg: format!("outgroup '{}' is the only node in the tree", outgroup),
        });
    };

    let root = graph.split_edge(leaf, parent, len)?;
    *tree = PhyloTree::new(graph.rebuild(root, None));
    info!("outgroup: rerooted on '{}'", outgroup);
    Ok(())
}
