pub mod canonical;
pub mod distance;
pub mod newick;
pub mod nj;
pub mod pipeline;
pub mod reroot;
pub mod tree;
pub mod upgma;

pub use canonical::{canonicalize, strip_internal_labels};
pub use distance::DistanceMatrix;
pub use newick::{parse_newick, to_newick};
pub use nj::neighbor_joining;
pub use pipeline::{build_tree, build_trees, Rooting, TreeMethod, TreeRequest};
pub use reroot::{root_at_midpoint, root_with_outgroup};
pub use tree::{BuildWarning, PhyloNode, PhyloTree, TreeBuild};
pub use upgma::upgma;
