//! How an m × n output is carved into kernel panels and remainder strips.
//!
//! ```text
//!            0          blocked_cols     n
//!          0 +---------------+-----------+
//!            | RA × block    | column    |
//!            | panels        | remainder |
//! blocked_rows+---------------+-----------+
//!            | row remainder (all cols)  |
//!          m +---------------------------+
//! ```
//!
//! The three regions are disjoint and cover every element exactly once.

use std::ops::Range;

use crate::kernels::{self, RA};
use crate::Element;

/// Panel layout for one multiplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiling {
    /// Rows of A and C.
    pub m: usize,
    /// Columns of B and C.
    pub n: usize,
    /// Columns of A, rows of B.
    pub k: usize,
    /// Output columns per panel (`RB * lanes`).
    pub block_cols: usize,
}

impl Tiling {
    pub fn new(m: usize, n: usize, k: usize, block_cols: usize) -> Self {
        Self { m, n, k, block_cols }
    }

    /// Tiling for element type `T`'s vector width.
    pub fn for_element<T: Element>(m: usize, n: usize, k: usize) -> Self {
        Self::new(m, n, k, kernels::block_cols(T::LANES))
    }

    /// Number of full `RA`-row blocks.
    pub fn row_blocks(&self) -> usize {
        self.m / RA
    }

    /// Number of full `block_cols`-column blocks.
    pub fn col_blocks(&self) -> usize {
        self.n / self.block_cols
    }

    pub fn blocked_rows(&self) -> usize {
        self.row_blocks() * RA
    }

    pub fn blocked_cols(&self) -> usize {
        self.col_blocks() * self.block_cols
    }

    /// Rows below the last full row block, across all columns.
    pub fn row_remainder(&self) -> (Range<usize>, Range<usize>) {
        (self.blocked_rows()..self.m, 0..self.n)
    }

    /// Columns right of the last full column block, for blocked rows only.
    pub fn column_remainder(&self) -> (Range<usize>, Range<usize>) {
        (0..self.blocked_rows(), self.blocked_cols()..self.n)
    }

    /// Top-left `(row, col)` of every panel in the given row blocks.
    pub fn panels(&self, row_blocks: Range<usize>) -> impl Iterator<Item = (usize, usize)> + '_ {
        row_blocks.flat_map(move |block_row| {
            (0..self.col_blocks())
                .map(move |block_col| (block_row * RA, block_col * self.block_cols))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(t: &Tiling) -> Vec<u32> {
        let mut hits = vec![0u32; t.m * t.n];
        for (i, j) in t.panels(0..t.row_blocks()) {
            for ii in i..i + RA {
                for jj in j..j + t.block_cols {
                    hits[ii * t.n + jj] += 1;
                }
            }
        }
        for (rows, cols) in [t.row_remainder(), t.column_remainder()] {
            for i in rows {
                for j in cols.clone() {
                    hits[i * t.n + j] += 1;
                }
            }
        }
        hits
    }

    #[test]
    fn test_every_element_covered_once() {
        for (m, n) in [(2, 2), (3, 32), (4, 33), (128, 128), (100, 70), (5, 1), (1, 40)] {
            for block_cols in [16, 32] {
                let t = Tiling::new(m, n, 7, block_cols);
                assert!(
                    coverage(&t).iter().all(|&h| h == 1),
                    "m={} n={} block_cols={}",
                    m,
                    n,
                    block_cols
                );
            }
        }
    }

    #[test]
    fn test_small_order_is_all_remainder() {
        let t = Tiling::for_element::<f32>(2, 2, 2);
        assert_eq!(t.row_blocks(), 0);
        assert_eq!(t.row_remainder(), (0..2, 0..2));
        assert!(t.column_remainder().0.is_empty());
        assert_eq!(t.panels(0..t.row_blocks()).count(), 0);
    }

    #[test]
    fn test_block_cols_follow_lane_width() {
        assert_eq!(Tiling::for_element::<f32>(9, 9, 9).block_cols, 32);
        assert_eq!(Tiling::for_element::<f64>(9, 9, 9).block_cols, 16);
    }
}
