use std::collections::HashSet;

use crate::error::{PhyloError, PhyloResult};

/// Symmetric distance table over a set of unique labels.
///
/// Only the lower triangle (diagonal included) is stored, packed row by row:
/// row `i` holds the distances to `labels[0..=i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    labels: Vec<Box<str>>,
    data: Vec<f64>,
    n: usize,
}

#[inline]
fn tri_index(i: usize, j: usize) -> usize {
    debug_assert!(j <= i);
    i * (i + 1) / 2 + j
}

impl DistanceMatrix {
    pub fn new(labels: Vec<Box<str>>, lower_triangle: Vec<Vec<f64>>) -> PhyloResult<Self> {
        let n = labels.len();
        if n != lower_triangle.len() {
            return Err(PhyloError::shape(format!(
                "{} labels but {} matrix rows",
                n,
                lower_triangle.len()
            )));
        }
        if n < 2 {
            return Err(PhyloError::shape(format!(
                "need at least 2 labels, got {}",
                n
            )));
        }

        let mut seen = HashSet::with_capacity(n);
        for label in &labels {
            if !seen.insert(&**label) {
                return Err(PhyloError::shape(format!("duplicate label '{}'", label)));
            }
        }

        let mut data = Vec::with_capacity(n * (n + 1) / 2);
        for (i, row) in lower_triangle.into_iter().enumerate() {
            if row.len() != i + 1 {
                return Err(PhyloError::shape(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    i + 1
                )));
            }
            for (j, &d) in row.iter().enumerate() {
                if !d.is_finite() {
                    return Err(PhyloError::shape(format!(
                        "non-finite distance at ({}, {})",
                        i, j
                    )));
                }
                if d < 0.0 {
                    let what = if i == j { "self-distance" } else { "distance" };
                    return Err(PhyloError::shape(format!(
                        "negative {} {} at ({}, {})",
                        what, d, i, j
                    )));
                }
            }
            data.extend(row);
        }

        Ok(Self { labels, data, n })
    }

    /// Builds a matrix from a full square table, keeping its lower triangle.
    pub fn from_square(labels: Vec<Box<str>>, square: &[Vec<f64>]) -> PhyloResult<Self> {
        let n = square.len();
        for (i, row) in square.iter().enumerate() {
            if row.len() != n {
                return Err(PhyloError::shape(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
        }
        for i in 0..n {
            for j in 0..i {
                let (a, b) = (square[i][j], square[j][i]);
                if (a - b).abs() > 1e-9 * a.abs().max(b.abs()).max(1.0) {
                    return Err(PhyloError::shape(format!(
                        "asymmetric entries at ({}, {}): {} vs {}",
                        i, j, a, b
                    )));
                }
            }
        }
        let lower = square
            .iter()
            .enumerate()
            .map(|(i, row)| row[..=i].to_vec())
            .collect();
        Self::new(labels, lower)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn labels(&self) -> &[Box<str>] {
        &self.labels
    }

    /// Symmetric lookup; panics if `i` or `j` is out of range.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.n && j < self.n,
            "index ({}, {}) out of range for {}x{} matrix",
            i,
            j,
            self.n,
            self.n
        );
        self.data[tri_index(i.max(j), i.min(j))]
    }

    /// Row `i` of the stored triangle, i.e. distances to `labels[0..=i]`.
    pub fn lower_row(&self, i: usize) -> &[f64] {
        let start = tri_index(i, 0);
        &self.data[start..start + i + 1]
    }

    pub fn lower_triangle(&self) -> Vec<Vec<f64>> {
        (0..self.n).map(|i| self.lower_row(i).to_vec()).collect()
    }

    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Scales every entry by the largest one so distances fall in `[0, 1]`.
    pub fn normalize(self) -> PhyloResult<Self> {
        let max = self.max_value();
        if max <= 0.0 {
            return Err(PhyloError::DegenerateMatrix {
                msg: "distance matrix contains all zeros or invalid values".into(),
            });
        }
        let data = self.data.into_iter().map(|d| d / max).collect();
        Ok(Self {
            labels: self.labels,
            data,
            n: self.n,
        })
    }
}
