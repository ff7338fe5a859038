mod newick;

pub use newick::{output_path, read_newick, write_newick};

#[cfg(test)]
mod tests;
