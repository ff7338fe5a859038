use log::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct PhyloNode {
    pub label: Option<Box<str>>,
    pub branch_length: Option<f64>,
    pub children: Vec<PhyloNode>,
}

impl PhyloNode {
    pub fn leaf(label: impl Into<Box<str>>) -> Self {
        Self {
            label: Some(label.into()),
            branch_length: None,
            children: Vec::new(),
        }
    }

    pub fn internal(children: Vec<PhyloNode>) -> Self {
        Self {
            label: None,
            branch_length: None,
            children,
        }
    }

    pub fn with_branch_length(mut self, length: f64) -> Self {
        self.branch_length = Some(length);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn num_leaves(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(PhyloNode::num_leaves).sum()
        }
    }

    pub fn num_internal(&self) -> usize {
        if self.is_leaf() {
            0
        } else {
            1 + self
                .children
                .iter()
                .map(PhyloNode::num_internal)
                .sum::<usize>()
        }
    }

    /// Smallest leaf label in this subtree; unlabeled leaves count as "".
    pub fn min_leaf_label(&self) -> &str {
        if self.is_leaf() {
            return self.label.as_deref().unwrap_or("");
        }
        self.children
            .iter()
            .map(PhyloNode::min_leaf_label)
            .min()
            .unwrap_or("")
    }

    fn collect_leaf_labels(&self, out: &mut Vec<String>) {
        if self.is_leaf() {
            out.push(self.label.as_deref().unwrap_or("").to_string());
        }
        for child in &self.children {
            child.collect_leaf_labels(out);
        }
    }

    /// Sum of branch lengths of every edge below this node.
    fn edge_length_sum(&self) -> f64 {
        self.children
            .iter()
            .map(|c| c.branch_length.unwrap_or(0.0) + c.edge_length_sum())
            .sum()
    }

    fn collect_leaf_depths(&self, depth: f64, out: &mut Vec<(String, f64)>) {
        if self.is_leaf() {
            out.push((self.label.as_deref().unwrap_or("").to_string(), depth));
        }
        for child in &self.children {
            child.collect_leaf_depths(depth + child.branch_length.unwrap_or(0.0), out);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhyloTree {
    root: PhyloNode,
    num_leaves: usize,
}

impl PhyloTree {
    pub fn new(root: PhyloNode) -> Self {
        let num_leaves = root.num_leaves();
        Self { root, num_leaves }
    }

    pub fn root(&self) -> &PhyloNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut PhyloNode {
        &mut self.root
    }

    pub fn num_leaves(&self) -> usize {
        self.num_leaves
    }

    pub fn num_internal(&self) -> usize {
        self.root.num_internal()
    }

    pub fn num_nodes(&self) -> usize {
        self.num_leaves + self.num_internal()
    }

    /// Leaf labels in pre-order.
    pub fn leaf_labels(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.num_leaves);
        self.root.collect_leaf_labels(&mut out);
        out
    }

    /// Sum of all edge lengths; the root's own length is not an edge.
    pub fn total_branch_length(&self) -> f64 {
        self.root.edge_length_sum()
    }

    /// Path length from the root to every leaf, in pre-order.
    pub fn leaf_depths(&self) -> Vec<(String, f64)> {
        let mut out = Vec::with_capacity(self.num_leaves);
        self.root.collect_leaf_depths(0.0, &mut out);
        out
    }
}

/// Non-fatal condition noticed while building a tree.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildWarning {
    /// A computed branch length was negative and has been set to zero.
    NegativeBranchLength { label: Option<Box<str>>, length: f64 },
}

/// Clamps a computed length at zero, recording a warning when it was negative.
pub(crate) fn clamp_length(
    length: f64,
    node: &PhyloNode,
    warnings: &mut Vec<BuildWarning>,
) -> f64 {
    if length >= 0.0 {
        return length;
    }
    warn!(
        "negative branch length {} above {} clamped to 0",
        length,
        node.label.as_deref().unwrap_or("internal node")
    );
    warnings.push(BuildWarning::NegativeBranchLength {
        label: node.label.clone(),
        length,
    });
    0.0
}

/// A finished tree together with the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct TreeBuild {
    pub tree: PhyloTree,
    pub warnings: Vec<BuildWarning>,
}
