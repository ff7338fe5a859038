use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PhyloResult;
use crate::phylo::{parse_newick, to_newick, PhyloTree, TreeMethod};

/// Reads a file holding a single Newick tree.
///
/// Surrounding whitespace is skipped by the decoder itself, so parse error
/// offsets count bytes from the start of the file.
pub fn read_newick(path: impl AsRef<Path>) -> PhyloResult<PhyloTree> {
    let text = fs::read_to_string(path)?;
    parse_newick(&text)
}

/// Writes `tree` as one Newick line.
pub fn write_newick(path: impl AsRef<Path>, tree: &PhyloTree) -> PhyloResult<()> {
    let mut text = to_newick(tree);
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

/// `<base>.<method>.newick`, e.g. `data/primates.nj.newick` for `data/primates`.
pub fn output_path(base: impl AsRef<Path>, method: TreeMethod) -> PathBuf {
    let mut name = base.as_ref().as_os_str().to_owned();
    name.push(".");
    name.push(method.as_str());
    name.push(".newick");
    PathBuf::from(name)
}
