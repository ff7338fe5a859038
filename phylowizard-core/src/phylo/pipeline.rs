use std::fmt;
use std::str::FromStr;

use log::info;

use crate::error::{PhyloError, PhyloResult};

use super::canonical::{canonicalize, strip_internal_labels};
use super::distance::DistanceMatrix;
use super::nj::neighbor_joining;
use super::reroot::{root_at_midpoint, root_with_outgroup};
use super::tree::TreeBuild;
use super::upgma::upgma;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeMethod {
    Upgma,
    #[default]
    NeighborJoining,
}

impl TreeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeMethod::Upgma => "upgma",
            TreeMethod::NeighborJoining => "nj",
        }
    }
}

impl fmt::Display for TreeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeMethod {
    type Err = PhyloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upgma" => Ok(TreeMethod::Upgma),
            "nj" => Ok(TreeMethod::NeighborJoining),
            _ => Err(PhyloError::UnknownOption {
                kind: "tree method",
                value: s.to_string(),
                valid: "'upgma', 'nj'",
            }),
        }
    }
}

/// How a neighbor-joining tree is rooted after it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rooting {
    Midpoint,
    /// Root on the named leaf; `None` means the first matrix label.
    Outgroup(Option<String>),
}

impl FromStr for Rooting {
    type Err = PhyloError;

    /// Accepts `midpoint`, `outgroup` and `outgroup:<label>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "midpoint" => Ok(Rooting::Midpoint),
            "outgroup" => Ok(Rooting::Outgroup(None)),
            _ => match s.strip_prefix("outgroup:") {
                Some(label) if !label.is_empty() => Ok(Rooting::Outgroup(Some(label.to_string()))),
                _ => Err(PhyloError::UnknownOption {
                    kind: "rooting",
                    value: s.to_string(),
                    valid: "'midpoint', 'outgroup', 'outgroup:<label>'",
                }),
            },
        }
    }
}

/// Knobs for a single tree build.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRequest {
    pub method: TreeMethod,
    pub normalize: bool,
    /// Only applies to neighbor joining; UPGMA trees are already rooted.
    pub rooting: Option<Rooting>,
}

impl Default for TreeRequest {
    fn default() -> Self {
        Self {
            method: TreeMethod::NeighborJoining,
            normalize: false,
            rooting: Some(Rooting::Midpoint),
        }
    }
}

impl TreeRequest {
    pub fn new(method: TreeMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_rooting(mut self, rooting: Option<Rooting>) -> Self {
        self.rooting = rooting;
        self
    }
}

/// Builds, roots (NJ only) and canonicalizes a tree for `dist`.
pub fn build_tree(dist: &DistanceMatrix, request: &TreeRequest) -> PhyloResult<TreeBuild> {
    let normalized;
    let dist = if request.normalize {
        normalized = dist.clone().normalize()?;
        &normalized
    } else {
        dist
    };

    let mut build = match request.method {
        TreeMethod::Upgma => upgma(dist)?,
        TreeMethod::NeighborJoining => {
            let mut build = neighbor_joining(dist)?;
            match &request.rooting {
                Some(Rooting::Midpoint) => root_at_midpoint(&mut build.tree)?,
                Some(Rooting::Outgroup(label)) => {
                    let label = label.as_deref().unwrap_or(&*dist.labels()[0]);
                    root_with_outgroup(&mut build.tree, label)?;
                }
                None => {}
            }
            build
        }
    };

    strip_internal_labels(&mut build.tree);
    canonicalize(&mut build.tree);
    debug_assert_eq!(build.tree.num_leaves(), dist.n());
    info!(
        "{}: finished tree over {} labels ({} warnings)",
        request.method,
        dist.n(),
        build.warnings.len()
    );
    Ok(build)
}

/// Runs [`build_tree`] over independent matrices, in parallel when the
/// `parallel` feature is enabled. Fails with the first error encountered.
pub fn build_trees(
    matrices: &[DistanceMatrix],
    request: &TreeRequest,
) -> PhyloResult<Vec<TreeBuild>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
        matrices
            .par_iter()
            .map(|dist| build_tree(dist, request))
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        matrices.iter().map(|dist| build_tree(dist, request)).collect()
    }
}
