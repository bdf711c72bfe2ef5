//! Exact k-nearest-neighbour search under Euclidean distance.
//!
//! The index is a flat matrix scanned in full on every query. It is meant to
//! be rebuilt per request over a small, freshly filtered candidate set, so it
//! holds no state beyond the points themselves.

use ndarray::{Array2, ArrayView1};

use crate::error::IndexError;

/// One query hit: the caller-supplied tag of the indexed point and its
/// distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub tag: usize,
    pub distance: f64,
}

#[derive(Debug, Clone)]
pub struct NeighborIndex {
    points: Array2<f64>,
    tags: Vec<usize>,
}

impl NeighborIndex {
    /// Build an index over the rows of `points`; `tags[i]` is returned for
    /// row `i` (usually its position in the dataset).
    pub fn fit(points: Array2<f64>, tags: Vec<usize>) -> Result<Self, IndexError> {
        if points.nrows() != tags.len() {
            return Err(IndexError::TagMismatch {
                points: points.nrows(),
                tags: tags.len(),
            });
        }
        Ok(Self { points, tags })
    }

    /// Index rows tagged by their own row number.
    pub fn fit_untagged(points: Array2<f64>) -> Self {
        let tags = (0..points.nrows()).collect();
        Self { points, tags }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.points.ncols()
    }

    /// Return up to `k` indexed points nearest to `query`, closest first.
    ///
    /// Equal distances keep the order in which points were indexed. When
    /// fewer than `k` points are indexed, all of them are returned.
    pub fn query(&self, query: ArrayView1<f64>, k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dim() {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim(),
                actual: query.len(),
            });
        }

        let mut hits: Vec<Neighbor> = self
            .points
            .rows()
            .into_iter()
            .zip(&self.tags)
            .map(|(row, &tag)| Neighbor {
                tag,
                distance: euclidean(row, query),
            })
            .collect();

        // Stable sort: ties stay in index order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }
}

pub fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
