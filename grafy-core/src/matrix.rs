//! Square edge-multiplicity matrices for directed multigraphs.

use crate::error::MatrixError;

/// Number of parallel directed edges between an ordered pair of vertices.
pub type Multiplicity = u32;

/// Dense row-major adjacency matrix of a directed multigraph.
///
/// Entry `(u, v)` holds the number of parallel edges from `u` to `v`. The
/// matrix is square by construction; a size of zero is valid and describes
/// the empty graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    order: usize,
    entries: Vec<Multiplicity>,
}

impl AdjacencyMatrix {
    /// Creates an `order × order` matrix with every entry set to zero.
    ///
    /// # Examples
    /// ```
    /// use grafy_core::AdjacencyMatrix;
    ///
    /// let matrix = AdjacencyMatrix::zeroed(3);
    /// assert_eq!(matrix.order(), 3);
    /// assert_eq!(matrix.edge_count(), 0);
    /// ```
    #[must_use]
    pub fn zeroed(order: usize) -> Self {
        Self {
            order,
            entries: vec![0; order.saturating_mul(order)],
        }
    }

    /// Builds a matrix from explicit rows.
    ///
    /// # Errors
    /// Returns [`MatrixError`] when any row length differs from the number of
    /// rows.
    ///
    /// # Examples
    /// ```
    /// use grafy_core::AdjacencyMatrix;
    ///
    /// let matrix = AdjacencyMatrix::from_rows(vec![vec![0, 2], vec![1, 0]])?;
    /// assert_eq!(matrix.get(0, 1), Some(2));
    /// assert!(AdjacencyMatrix::from_rows(vec![vec![0, 2]]).is_err());
    /// # Ok::<(), grafy_core::MatrixError>(())
    /// ```
    pub fn from_rows(rows: Vec<Vec<Multiplicity>>) -> Result<Self, MatrixError> {
        let order = rows.len();
        let mut entries = Vec::with_capacity(order.saturating_mul(order));
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != order {
                return Err(MatrixError {
                    row,
                    expected: order,
                    actual: values.len(),
                });
            }
            entries.extend(values);
        }
        Ok(Self { order, entries })
    }

    /// Number of vertices.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Returns the multiplicity of edge `source → target`, or `None` when
    /// either vertex is out of range.
    #[must_use]
    pub fn get(&self, source: usize, target: usize) -> Option<Multiplicity> {
        self.offset(source, target)
            .and_then(|offset| self.entries.get(offset).copied())
    }

    pub(crate) fn set(&mut self, source: usize, target: usize, value: Multiplicity) {
        if let Some(slot) = self
            .offset(source, target)
            .and_then(|offset| self.entries.get_mut(offset))
        {
            *slot = value;
        }
    }

    /// Iterates over the rows in vertex order.
    pub fn rows(&self) -> impl Iterator<Item = &[Multiplicity]> {
        // `chunks` rejects a zero width; an empty matrix has no entries anyway.
        self.entries.chunks(self.order.max(1))
    }

    /// Total number of directed edges, counting parallel edges separately.
    #[must_use]
    pub fn edge_count(&self) -> u64 {
        self.entries.iter().map(|&value| u64::from(value)).sum()
    }

    /// Returns `true` when no vertex carries a self-loop.
    #[must_use]
    pub fn has_zero_diagonal(&self) -> bool {
        (0..self.order).all(|vertex| self.get(vertex, vertex) == Some(0))
    }

    fn offset(&self, source: usize, target: usize) -> Option<usize> {
        if source >= self.order || target >= self.order {
            return None;
        }
        source
            .checked_mul(self.order)
            .and_then(|base| base.checked_add(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_matrix_has_no_rows() {
        let matrix = AdjacencyMatrix::zeroed(0);
        assert_eq!(matrix.rows().count(), 0);
        assert!(matrix.has_zero_diagonal());
    }

    #[test]
    fn set_ignores_out_of_range_pairs() {
        let mut matrix = AdjacencyMatrix::zeroed(2);
        matrix.set(2, 0, 5);
        matrix.set(1, 0, 3);
        assert_eq!(matrix.edge_count(), 3);
        assert_eq!(matrix.get(2, 0), None);
    }

    #[test]
    fn rows_follow_vertex_order() {
        let matrix = AdjacencyMatrix::from_rows(vec![vec![0, 1], vec![2, 0]])
            .expect("rows must be square");
        let rows: Vec<&[Multiplicity]> = matrix.rows().collect();
        assert_eq!(rows, vec![&[0, 1][..], &[2, 0][..]]);
    }

    #[test]
    fn from_rows_reports_ragged_row() {
        let err = AdjacencyMatrix::from_rows(vec![vec![0, 1], vec![2]])
            .expect_err("ragged rows must fail");
        assert_eq!(
            err,
            MatrixError {
                row: 1,
                expected: 2,
                actual: 1,
            }
        );
    }
}
