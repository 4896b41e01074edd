/// Exact nearest-neighbour index over squared Euclidean distance
use ndarray::{ArrayView1, ArrayView2};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorIndexError {
    #[error("Invalid dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid vector: {0}")]
    InvalidVector(String),
}

/// One search hit: the row's insertion ordinal and its squared L2 distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub row: usize,
    pub distance: f32,
}

/// Brute-force vector index
///
/// Rows are stored contiguously in insertion order, so row `i` is always the
/// `i`-th vector ever inserted. The dimension is fixed by the first
/// non-empty insert and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    dimension: Option<usize>,
    data: Vec<f32>,
    rows: usize,
}

impl VectorIndex {
    /// Create an empty index; the dimension is taken from the first insert
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        dimension: usize,
        data: Vec<f32>,
    ) -> Result<Self, VectorIndexError> {
        if dimension == 0 {
            if !data.is_empty() {
                return Err(VectorIndexError::InvalidVector(
                    "vector data present with zero dimension".to_string(),
                ));
            }
            return Ok(Self::new());
        }
        if data.len() % dimension != 0 {
            return Err(VectorIndexError::InvalidVector(format!(
                "{} values do not divide into rows of {}",
                data.len(),
                dimension
            )));
        }
        let rows = data.len() / dimension;
        Ok(Self {
            dimension: Some(dimension),
            data,
            rows,
        })
    }

    /// Append `vectors` as new rows, returning how many were added.
    ///
    /// Fails without modifying the index if the width disagrees with the
    /// established dimension or any value is not finite.
    pub fn insert(&mut self, vectors: ArrayView2<'_, f32>) -> Result<usize, VectorIndexError> {
        let (count, width) = vectors.dim();
        if count == 0 {
            return Ok(0);
        }
        if width == 0 {
            return Err(VectorIndexError::InvalidVector(
                "zero-width vectors".to_string(),
            ));
        }
        if let Some(expected) = self.dimension {
            if expected != width {
                return Err(VectorIndexError::InvalidDimension {
                    expected,
                    actual: width,
                });
            }
        }
        if vectors.iter().any(|v| !v.is_finite()) {
            return Err(VectorIndexError::InvalidVector(
                "non-finite component".to_string(),
            ));
        }

        self.dimension = Some(width);
        self.data.reserve(count * width);
        self.data.extend(vectors.iter().copied());
        self.rows += count;

        Ok(count)
    }

    /// The `k` nearest rows to `query`, closest first.
    ///
    /// Ties keep insertion order. Returns fewer than `k` hits when the index
    /// is smaller than `k`, and none when it is empty.
    pub fn search(
        &self,
        query: ArrayView1<'_, f32>,
        k: usize,
    ) -> Result<Vec<Neighbor>, VectorIndexError> {
        let dimension = match self.dimension {
            Some(d) if self.rows > 0 && k > 0 => d,
            _ => return Ok(Vec::new()),
        };
        if query.len() != dimension {
            return Err(VectorIndexError::InvalidDimension {
                expected: dimension,
                actual: query.len(),
            });
        }

        let matrix = self.matrix(dimension)?;
        let mut hits: Vec<Neighbor> = matrix
            .rows()
            .into_iter()
            .enumerate()
            .map(|(row, vector)| {
                let diff = &vector - &query;
                Neighbor {
                    row,
                    distance: diff.dot(&diff),
                }
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.row.cmp(&b.row)));
        hits.truncate(k);

        Ok(hits)
    }

    fn matrix(&self, dimension: usize) -> Result<ArrayView2<'_, f32>, VectorIndexError> {
        ArrayView2::from_shape((self.rows, dimension), &self.data)
            .map_err(|e| VectorIndexError::InvalidVector(e.to_string()))
    }

    /// Drop rows past `rows`; only used to undo a batch that failed to persist
    pub(crate) fn truncate(&mut self, rows: usize) {
        if rows >= self.rows {
            return;
        }
        let dimension = self.dimension.unwrap_or(0);
        self.data.truncate(rows * dimension);
        self.rows = rows;
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Fixed vector dimension, `None` until the first insert
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Raw row-major vector data
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}
