//! Binary matrices and their rank over GF(2).
//!
//! Rows are packed into `u32` words and stored contiguously in a single buffer,
//! so that adding one row to another (which over GF(2) is just XOR) is a tight
//! loop over `ncols / 32 + 1` words.

use std::fmt;
use itertools::Itertools;

const PW: [u32; 32] = [ // PW[i] = 2^i
    1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
    65536, 131072, 262144, 524288, 1048576, 2097152, 4194304, 8388608, 16777216,
    33554432, 67108864, 134217728, 268435456, 536870912, 1073741824, 2147483648
];

/// A dense `nrows × ncols` matrix over GF(2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinMatrix {
    nrows: usize,
    ncols: usize,
    over32: usize, // = floor(ncols / 32) + 1
    data: Vec<u32>, // row-major; size nrows × over32
}

impl BinMatrix {
    /// Create a new all-zero matrix.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        let over32: usize = (ncols >> 5) + 1;
        Self { nrows, ncols, over32, data: vec![0; nrows * over32] }
    }

    /// Build a matrix from explicit rows of 0s and 1s; any non-zero entry is
    /// taken as 1.
    ///
    /// *Panics if the rows are not all the same length.*
    pub fn from_rows<R>(rows: &[R]) -> Self
    where R: AsRef<[u8]>
    {
        let ncols = rows.first().map(|row| row.as_ref().len()).unwrap_or(0);
        let mut mat = Self::zeros(rows.len(), ncols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            assert_eq!(
                row.len(), ncols,
                "BinMatrix::from_rows: row {} has length {}, expected {}",
                i, row.len(), ncols,
            );
            row.iter().enumerate()
                .filter(|(_, b)| **b != 0)
                .for_each(|(j, _)| { mat.set(i, j, true); });
        }
        mat
    }

    /// Return the number of rows.
    pub fn nrows(&self) -> usize { self.nrows }

    /// Return the number of columns.
    pub fn ncols(&self) -> usize { self.ncols }

    /// Return `true` if the matrix has no entries.
    pub fn is_empty(&self) -> bool { self.nrows == 0 || self.ncols == 0 }

    fn row(&self, i: usize) -> &[u32] {
        &self.data[i * self.over32..(i + 1) * self.over32]
    }

    /// Get the `(i, j)`-th entry.
    ///
    /// *Panics if either index is out of bounds.*
    pub fn get(&self, i: usize, j: usize) -> bool {
        assert!(i < self.nrows && j < self.ncols, "BinMatrix::get: index out of bounds");
        self.data[i * self.over32 + (j >> 5)] & PW[j & 31] != 0
    }

    /// Set the `(i, j)`-th entry.
    ///
    /// *Panics if either index is out of bounds.*
    pub fn set(&mut self, i: usize, j: usize, val: bool) -> &mut Self {
        assert!(i < self.nrows && j < self.ncols, "BinMatrix::set: index out of bounds");
        let w = &mut self.data[i * self.over32 + (j >> 5)];
        if val { *w |= PW[j & 31]; } else { *w &= !PW[j & 31]; }
        self
    }

    // add row a to row b
    fn row_add(&mut self, a: usize, b: usize) {
        for w in 0..self.over32 {
            let aw = self.data[a * self.over32 + w];
            self.data[b * self.over32 + w] ^= aw;
        }
    }

    fn row_is_zero(&self, i: usize) -> bool {
        self.row(i).iter().all(|w| *w == 0)
    }

    /// Compute the rank of `self` over GF(2).
    ///
    /// See [`rank`].
    pub fn rank(&self) -> usize { rank(self) }
}

impl fmt::Display for BinMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.nrows {
            let row
                = (0..self.ncols)
                .map(|j| if self.get(i, j) { '1' } else { '0' })
                .join(" ");
            write!(f, "{}", row)?;
            if i < self.nrows - 1 { writeln!(f)?; }
        }
        Ok(())
    }
}

/// Compute the rank of a binary matrix over GF(2) by Gaussian elimination.
///
/// Columns are processed left to right. For each column, the first remaining
/// row with a 1 in that column is added to every other remaining row with a 1
/// there and then retired, counting one toward the rank. Any remaining non-zero
/// rows after the last column each count once more.
pub fn rank(mat: &BinMatrix) -> usize {
    let mut work: BinMatrix = mat.clone();
    let mut live: Vec<bool> = vec![true; work.nrows];
    let mut rank: usize = 0;
    for j in 0..work.ncols {
        let rows: Vec<usize>
            = (0..work.nrows)
            .positions(|i| live[i] && work.get(i, j))
            .collect();
        if let Some((&pivot, rest)) = rows.split_first() {
            rest.iter().for_each(|&i| { work.row_add(pivot, i); });
            live[pivot] = false;
            rank += 1;
        }
    }
    rank + (0..work.nrows).filter(|&i| live[i] && !work.row_is_zero(i)).count()
}
