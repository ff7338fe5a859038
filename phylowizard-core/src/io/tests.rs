use std::path::PathBuf;

use super::*;
use crate::error::PhyloError;
use crate::phylo::{parse_newick, to_newick, TreeMethod};

#[test]
fn output_path_appends_method_suffix() {
    assert_eq!(
        output_path("data/primates", TreeMethod::NeighborJoining),
        PathBuf::from("data/primates.nj.newick")
    );
    assert_eq!(
        output_path("primates", TreeMethod::Upgma),
        PathBuf::from("primates.upgma.newick")
    );
}

#[test]
fn write_then_read_newick() {
    let dir = tempfile::tempdir().unwrap();
    let path = output_path(dir.path().join("sample"), TreeMethod::Upgma);
    let tree = parse_newick("((A:1,B:1):1,'C D':2);").unwrap();

    write_newick(&path, &tree).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "((A:1.000000,B:1.000000):1.000000,'C D':2.000000);\n"
    );

    let back = read_newick(&path).unwrap();
    assert_eq!(to_newick(&back), to_newick(&tree));
}

#[test]
fn read_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_newick(dir.path().join("absent.newick")).unwrap_err();
    assert!(matches!(err, PhyloError::Io(_)));
}

#[test]
fn read_reports_file_offsets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.newick");
    std::fs::write(&path, "\n  (A:x,B);\n").unwrap();
    match read_newick(&path) {
        Err(PhyloError::Parse { offset, .. }) => assert_eq!(offset, 6),
        other => panic!("expected parse error, got {:?}", other),
    }

    std::fs::write(&path, "\n  (A:1,B:2);\n\n").unwrap();
    let tree = read_newick(&path).unwrap();
    assert_eq!(to_newick(&tree), "(A:1.000000,B:2.000000);");
}
