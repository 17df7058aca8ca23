//! Exact nearest-neighbor index
//!
//! Vectors are stored verbatim in one contiguous buffer and searched with a full linear scan
//! under squared Euclidean distance. No quantization, no approximate structure.

use crate::error::{IndexError, Result};

/// Sequential record identifier, equal to the 0-based append order
pub type RecordId = u64;

/// One search hit from [`VectorIndex::search`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: RecordId,
    /// Squared L2 distance to the query
    pub distance: f32,
}

/// Append-only flat L2 index
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vectors added so far
    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            return 0;
        }
        self.data.len() / self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Id the next `add` will assign
    pub fn next_id(&self) -> RecordId {
        self.len() as RecordId
    }

    /// Check a vector can be added without mutating anything
    pub fn validate(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension || self.dimension == 0 {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Append a vector, returning its id
    pub fn add(&mut self, vector: &[f32]) -> Result<RecordId> {
        self.validate(vector)?;
        let id = self.next_id();
        self.data.extend_from_slice(vector);
        Ok(id)
    }

    /// Stored vector for `id`
    pub fn vector(&self, id: RecordId) -> Option<&[f32]> {
        let start = usize::try_from(id).ok()?.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    /// The `k` nearest vectors, nearest first.
    ///
    /// `k` is clamped to the number of stored vectors; ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(i, stored)| Neighbor {
                id: i as RecordId,
                distance: squared_l2(query, stored),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

/// Squared Euclidean distance
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(vectors: &[[f32; 2]]) -> VectorIndex {
        let mut index = VectorIndex::new(2);
        for v in vectors {
            index.add(v).unwrap();
        }
        index
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut index = VectorIndex::new(3);
        let ids: Vec<RecordId> = [[9.0, 9.0, 9.0], [0.0, 0.0, 0.0], [9.0, 9.0, 9.0]]
            .iter()
            .map(|v| index.add(v).unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.vector(1), Some(&[0.0, 0.0, 0.0][..]));
        assert_eq!(index.vector(3), None);
    }

    #[test]
    fn test_wrong_dimension_does_not_mutate() {
        let mut index = VectorIndex::new(3);
        assert!(index.add(&[1.0, 2.0]).is_err());
        assert!(index.is_empty());
        assert_eq!(index.next_id(), 0);
    }

    #[test]
    fn test_search_returns_min_k_n_sorted() {
        let index = index_with(&[[3.0, 0.0], [1.0, 0.0], [2.0, 0.0], [0.0, 0.0]]);

        for k in 0..7 {
            let hits = index.search(&[0.0, 0.0], k).unwrap();
            assert_eq!(hits.len(), k.min(4));
            assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        }

        let hits = index.search(&[0.0, 0.0], 4).unwrap();
        let ids: Vec<RecordId> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![3, 1, 2, 0]);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[3].distance, 9.0);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = index_with(&[[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]]);
        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let ids: Vec<RecordId> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_index_search_is_empty() {
        let index = VectorIndex::new(2);
        assert!(index.search(&[0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_query_dimension_checked() {
        let index = index_with(&[[1.0, 0.0]]);
        assert!(index.search(&[0.0], 1).is_err());
    }
}
