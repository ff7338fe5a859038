#![allow(clippy::useless_conversion)]

use pyo3::exceptions::{PyOSError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyModule;

use phylowizard_core::error::PhyloError;
use phylowizard_core::io;
use phylowizard_core::phylo::{self, BuildWarning, PhyloNode};

fn to_py_err(e: PhyloError) -> PyErr {
    match e {
        PhyloError::Io(err) => PyOSError::new_err(err.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

#[pyclass(frozen, name = "DistanceMatrix")]
pub struct PyDistanceMatrix {
    inner: phylo::DistanceMatrix,
}

#[pymethods]
impl PyDistanceMatrix {
    /// `lower_triangle[i]` holds the distances from label `i` to labels `0..=i`.
    #[new]
    fn new(labels: Vec<String>, lower_triangle: Vec<Vec<f64>>) -> PyResult<Self> {
        let labels = labels.into_iter().map(String::into_boxed_str).collect();
        phylo::DistanceMatrix::new(labels, lower_triangle)
            .map(|inner| Self { inner })
            .map_err(to_py_err)
    }

    #[getter]
    fn n(&self) -> usize {
        self.inner.n()
    }

    fn labels(&self) -> Vec<String> {
        self.inner.labels().iter().map(|s| s.to_string()).collect()
    }

    fn get(&self, i: usize, j: usize) -> PyResult<f64> {
        let n = self.inner.n();
        if i >= n || j >= n {
            return Err(PyValueError::new_err(format!(
                "index ({}, {}) out of range for {}x{} matrix",
                i, j, n, n
            )));
        }
        Ok(self.inner.distance(i, j))
    }

    fn normalized(&self) -> PyResult<Self> {
        self.inner
            .clone()
            .normalize()
            .map(|inner| Self { inner })
            .map_err(to_py_err)
    }

    fn lower_triangle(&self) -> Vec<Vec<f64>> {
        self.inner.lower_triangle()
    }

    fn to_list_of_lists(&self) -> Vec<Vec<f64>> {
        let n = self.inner.n();
        (0..n)
            .map(|i| (0..n).map(|j| self.inner.distance(i, j)).collect())
            .collect()
    }

    fn __len__(&self) -> usize {
        self.inner.n()
    }

    fn __repr__(&self) -> String {
        format!("DistanceMatrix(n={})", self.inner.n())
    }

    fn __str__(&self) -> String {
        let n = self.inner.n();
        let labels = self.inner.labels();
        let pad = labels.iter().map(|l| l.len()).max().unwrap_or(0);

        let mut lines = Vec::with_capacity(n + 1);

        // Header line
        let mut header = format!("{:>pad$}", "", pad = pad + 2);
        for label in labels {
            header.push_str(&format!("{:>10}", &**label));
        }
        lines.push(header);

        for (i, label) in labels.iter().enumerate() {
            let mut row = format!("{:>pad$}  ", &**label, pad = pad);
            for j in 0..n {
                row.push_str(&format!("{:>10.4}", self.inner.distance(i, j)));
            }
            lines.push(row);
        }

        lines.join("\n")
    }
}

#[pyclass(frozen, name = "PhyloTree")]
pub struct PyPhyloTree {
    inner: phylo::PhyloTree,
    warnings: Vec<String>,
}

impl PyPhyloTree {
    fn new(inner: phylo::PhyloTree) -> Self {
        Self {
            inner,
            warnings: Vec::new(),
        }
    }
}

#[pymethods]
impl PyPhyloTree {
    fn to_newick(&self) -> String {
        phylo::to_newick(&self.inner)
    }

    fn ascii_diagram(&self) -> String {
        let root = self.inner.root();
        let mut out = String::new();
        out.push_str(&format_node_label(root));
        out.push('\n');

        for (i, child) in root.children.iter().enumerate() {
            let last = i + 1 == root.children.len();
            write_ascii_subtree(child, "", last, &mut out);
        }

        if out.ends_with('\n') {
            out.pop();
        }

        out
    }

    fn leaf_labels(&self) -> Vec<String> {
        self.inner.leaf_labels()
    }

    fn num_leaves(&self) -> usize {
        self.inner.num_leaves()
    }

    fn num_nodes(&self) -> usize {
        self.inner.num_nodes()
    }

    fn total_branch_length(&self) -> f64 {
        self.inner.total_branch_length()
    }

    /// Negative branch lengths that were clamped to zero while building.
    #[getter]
    fn warnings(&self) -> Vec<String> {
        self.warnings.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "PhyloTree(leaves={}, nodes={}, root_children={})",
            self.inner.num_leaves(),
            self.inner.num_nodes(),
            self.inner.root().children.len()
        )
    }

    fn __str__(&self) -> String {
        self.to_newick()
    }
}

fn format_node_label(node: &PhyloNode) -> String {
    let mut label = match node.label {
        Some(ref l) => l.to_string(),
        None if node.is_leaf() => "leaf".to_string(),
        None => "node".to_string(),
    };

    if let Some(bl) = node.branch_length {
        label.push_str(&format!(":{:.6}", bl));
    }

    label
}

fn write_ascii_subtree(node: &PhyloNode, prefix: &str, is_last: bool, out: &mut String) {
    out.push_str(prefix);
    out.push_str(if is_last { "`-- " } else { "|-- " });
    out.push_str(&format_node_label(node));
    out.push('\n');

    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "|   " });
    for (i, child) in node.children.iter().enumerate() {
        let last = i + 1 == node.children.len();
        write_ascii_subtree(child, &child_prefix, last, out);
    }
}

fn describe_warning(warning: &BuildWarning) -> String {
    match warning {
        BuildWarning::NegativeBranchLength { label, length } => format!(
            "negative branch length {} above {} clamped to 0",
            length,
            label.as_deref().unwrap_or("internal node")
        ),
    }
}

#[pyfunction]
#[pyo3(signature = (dist_matrix, method = "nj", normalize = false, rooting = Some("midpoint")))]
fn build_tree(
    py: Python<'_>,
    dist_matrix: &PyDistanceMatrix,
    method: &str,
    normalize: bool,
    rooting: Option<&str>,
) -> PyResult<PyPhyloTree> {
    let method: phylo::TreeMethod = method.parse().map_err(to_py_err)?;
    let rooting = rooting
        .map(|r| r.parse::<phylo::Rooting>())
        .transpose()
        .map_err(to_py_err)?;
    let request = phylo::TreeRequest::new(method)
        .with_normalize(normalize)
        .with_rooting(rooting);
    let dm = &dist_matrix.inner;

    let build = py
        .allow_threads(|| phylo::build_tree(dm, &request))
        .map_err(to_py_err)?;

    Ok(PyPhyloTree {
        warnings: build.warnings.iter().map(describe_warning).collect(),
        inner: build.tree,
    })
}

#[pyfunction]
fn parse_newick(text: &str) -> PyResult<PyPhyloTree> {
    phylo::parse_newick(text)
        .map(PyPhyloTree::new)
        .map_err(to_py_err)
}

#[pyfunction]
fn read_newick(path: &str) -> PyResult<PyPhyloTree> {
    io::read_newick(path)
        .map(PyPhyloTree::new)
        .map_err(to_py_err)
}

#[pyfunction]
fn write_newick(path: &str, tree: &PyPhyloTree) -> PyResult<()> {
    io::write_newick(path, &tree.inner).map_err(to_py_err)
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyDistanceMatrix>()?;
    m.add_class::<PyPhyloTree>()?;
    m.add_function(wrap_pyfunction!(build_tree, m)?)?;
    m.add_function(wrap_pyfunction!(parse_newick, m)?)?;
    m.add_function(wrap_pyfunction!(read_newick, m)?)?;
    m.add_function(wrap_pyfunction!(write_newick, m)?)?;
    Ok(())
}
