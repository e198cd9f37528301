//! Sparse storage for face-pair data
//!
//! [`MultiSparse`] collects items by `(row, col)` during assembly;
//! [`Csr`] is the compressed, read-only form used by the kernels. Items can
//! be arbitrary types, so several arrays sharing one sparsity pattern are
//! stored together.

use std::collections::BTreeMap;

/// Builder holding items keyed by `(row, col)`
#[derive(Debug, Clone)]
pub struct MultiSparse<T> {
    rows: BTreeMap<usize, BTreeMap<usize, T>>,
}

impl<T> Default for MultiSparse<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MultiSparse<T> {
    /// An empty matrix
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    /// Store an item, replacing any previous one at the same position
    pub fn insert(&mut self, row: usize, col: usize, item: T) {
        self.rows.entry(row).or_default().insert(col, item);
    }

    /// The item at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.rows.values().all(BTreeMap::is_empty)
    }

    /// Iterate over `((row, col), item)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> + '_ {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, item)| ((row, col), item)))
    }

    /// Compress into CSR form
    ///
    /// `indptr` covers rows `0..=max_row`; rows without items get empty
    /// ranges.
    pub fn to_csr(self) -> Csr<T> {
        let num_rows = self.rows.keys().next_back().map_or(0, |&r| r + 1);
        let nnz = self.len();
        let mut data = Vec::with_capacity(nnz);
        let mut indices = Vec::with_capacity(nnz);
        let mut indptr = Vec::with_capacity(num_rows + 1);
        indptr.push(0);

        let mut rows = self.rows.into_iter().peekable();
        for row in 0..num_rows {
            if let Some((_, cols)) = rows.next_if(|(r, _)| *r == row) {
                for (col, item) in cols {
                    indices.push(col);
                    data.push(item);
                }
            }
            indptr.push(data.len());
        }

        Csr {
            data,
            indices,
            indptr,
        }
    }
}

/// Compressed sparse row storage of arbitrary items
#[derive(Debug, Clone, PartialEq)]
pub struct Csr<T> {
    /// Items in row-major order
    pub data: Vec<T>,
    /// Column of each item, ascending within a row
    pub indices: Vec<usize>,
    /// `indptr[r]..indptr[r + 1]` is the range of row `r`
    pub indptr: Vec<usize>,
}

impl<T> Csr<T> {
    /// Number of rows covered by `indptr`
    pub fn num_rows(&self) -> usize {
        self.indptr.len().saturating_sub(1)
    }

    /// Number of stored items
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// The item at `(row, col)`, if stored
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.num_rows() {
            return None;
        }
        let range = self.indptr[row]..self.indptr[row + 1];
        self.indices[range.clone()]
            .binary_search(&col)
            .ok()
            .map(|offset| &self.data[range.start + offset])
    }

    /// Iterate over `(col, item)` in one row
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, &T)> + '_ {
        let range = if row < self.num_rows() {
            self.indptr[row]..self.indptr[row + 1]
        } else {
            0..0
        };
        self.indices[range.clone()]
            .iter()
            .copied()
            .zip(self.data[range].iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multisparse_insert_and_len() {
        let mut m = MultiSparse::new();
        assert!(m.is_empty());
        m.insert(2, 5, (1.0, 'a'));
        m.insert(0, 1, (2.0, 'b'));
        m.insert(2, 1, (3.0, 'c'));
        m.insert(2, 1, (4.0, 'd'));
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(2, 1), Some(&(4.0, 'd')));
        assert_eq!(m.get(1, 1), None);

        let keys: Vec<(usize, usize)> = m.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![(0, 1), (2, 1), (2, 5)]);
    }

    #[test]
    fn test_to_csr_with_empty_rows() {
        let mut m = MultiSparse::new();
        m.insert(0, 3, 10);
        m.insert(3, 0, 20);
        m.insert(3, 2, 30);
        let csr = m.to_csr();

        assert_eq!(csr.indptr, vec![0, 1, 1, 1, 3]);
        assert_eq!(csr.indices, vec![3, 0, 2]);
        assert_eq!(csr.data, vec![10, 20, 30]);
        assert_eq!(csr.num_rows(), 4);
        assert_eq!(csr.get(3, 2), Some(&30));
        assert_eq!(csr.get(1, 0), None);
        assert_eq!(csr.get(9, 0), None);
        assert_eq!(csr.row(3).map(|(c, _)| c).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_empty_to_csr() {
        let csr = MultiSparse::<f64>::new().to_csr();
        assert_eq!(csr.indptr, vec![0]);
        assert_eq!(csr.nnz(), 0);
        assert_eq!(csr.num_rows(), 0);
    }
}
