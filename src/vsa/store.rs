//! Vector store: term-to-vector mapping with parallel overlap search.
//!
//! The store is the registry of term vectors built during indexing and
//! queried afterwards. It provides:
//! - Lazy allocation: `get_or_create(term)` generates a deterministic elemental vector on first access
//! - Exhaustive top-k overlap search, parallelized with rayon
//! - Concurrent access via DashMap, so a finished store can be searched from many threads
//! - Snapshots of the dense vectors via bincode

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult, VsaError, VsaResult};

use super::encode::encode_term;
use super::io::DenseVector;
use super::ops::VsaOps;
use super::{BinaryVector, Dimension};

/// Search result from the vector store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// The matching term.
    pub term: String,
    /// Overlap score (0.5 = unrelated, 1.0 = identical).
    pub overlap: f64,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    dimension: Dimension,
    entries: Vec<(String, DenseVector)>,
}

/// Concurrent registry of term vectors.
pub struct VectorStore {
    vectors: DashMap<String, BinaryVector>,
    dim: Dimension,
}

impl VectorStore {
    /// Create an empty store for vectors of the given dimension.
    pub fn new(dim: Dimension) -> Self {
        Self {
            vectors: DashMap::new(),
            dim,
        }
    }

    pub fn dim(&self) -> Dimension {
        self.dim
    }

    fn check(&self, vector: &BinaryVector) -> VsaResult<()> {
        if vector.dimension() != self.dim {
            return Err(VsaError::DimensionMismatch {
                expected: self.dim.get(),
                actual: vector.dimension().get(),
            });
        }
        Ok(())
    }

    /// Get the vector for a term, creating its elemental vector if absent.
    ///
    /// The vector is deterministically derived from the term, so this is
    /// idempotent.
    pub fn get_or_create(&self, ops: &VsaOps, term: &str) -> VsaResult<BinaryVector> {
        if let Some(entry) = self.vectors.get(term) {
            return Ok(entry.value().clone());
        }
        let vector = encode_term(ops, term);
        self.check(&vector)?;
        Ok(self
            .vectors
            .entry(term.to_string())
            .or_insert(vector)
            .value()
            .clone())
    }

    /// Insert or replace the vector for a term.
    pub fn insert(&self, term: impl Into<String>, vector: BinaryVector) -> VsaResult<()> {
        self.check(&vector)?;
        self.vectors.insert(term.into(), vector);
        Ok(())
    }

    /// Get a copy of the vector for a term, if present.
    pub fn get(&self, term: &str) -> Option<BinaryVector> {
        self.vectors.get(term).map(|v| v.value().clone())
    }

    /// Apply `f` to the stored vector for `term`, creating it with `init` if absent.
    ///
    /// The entry stays locked while `f` runs, so concurrent updates to the
    /// same term are serialized. A new vector is only stored once it has the
    /// store's dimension and `f` has succeeded on it.
    pub fn update<F>(&self, term: &str, init: impl FnOnce() -> BinaryVector, f: F) -> VsaResult<()>
    where
        F: FnOnce(&mut BinaryVector) -> VsaResult<()>,
    {
        match self.vectors.entry(term.to_string()) {
            Entry::Occupied(mut entry) => f(entry.get_mut()),
            Entry::Vacant(entry) => {
                let mut vector = init();
                self.check(&vector)?;
                f(&mut vector)?;
                entry.insert(vector);
                Ok(())
            }
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.vectors.contains_key(term)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Sorted list of stored terms.
    pub fn terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = self.vectors.iter().map(|e| e.key().clone()).collect();
        terms.sort();
        terms
    }

    /// Find the `k` stored vectors with the highest overlap to `query`.
    ///
    /// Results are sorted by descending overlap, ties broken by term.
    pub fn search(&self, query: &BinaryVector, k: usize) -> VsaResult<Vec<SearchResult>> {
        self.check(query)?;
        let mut results: Vec<SearchResult> = self
            .vectors
            .par_iter()
            .map(|entry| {
                Ok(SearchResult {
                    term: entry.key().clone(),
                    overlap: query.measure_overlap(entry.value())?,
                })
            })
            .collect::<VsaResult<_>>()?;

        results.sort_by(|a, b| {
            b.overlap
                .total_cmp(&a.overlap)
                .then_with(|| a.term.cmp(&b.term))
        });
        results.truncate(k);
        Ok(results)
    }

    /// Batch insert using rayon for parallel encoding.
    pub fn insert_batch(&self, ops: &VsaOps, terms: &[&str]) -> VsaResult<()> {
        terms.par_iter().try_for_each(|term| {
            self.get_or_create(ops, term).map(|_| ())
        })
    }

    /// Write the dense form of every vector to `path`.
    ///
    /// Pending votes are tallied by majority rule; voting records are not saved.
    pub fn save_snapshot(&self, path: &Path) -> StoreResult<()> {
        let mut entries: Vec<(String, DenseVector)> = self
            .vectors
            .iter()
            .map(|e| (e.key().clone(), DenseVector::from(e.value())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let snapshot = Snapshot {
            dimension: self.dim,
            entries,
        };

        let file = File::create(path).map_err(|source| StoreError::Io { source })?;
        bincode::serialize_into(BufWriter::new(file), &snapshot).map_err(|e| {
            StoreError::Serialization {
                message: e.to_string(),
            }
        })?;
        tracing::debug!(path = %path.display(), vectors = snapshot.entries.len(), "saved snapshot");
        Ok(())
    }

    /// Load a store from a snapshot written by [`save_snapshot`](Self::save_snapshot).
    ///
    /// Every vector comes back elemental.
    pub fn load_snapshot(path: &Path, dim: Dimension) -> StoreResult<Self> {
        let file = File::open(path).map_err(|source| StoreError::Io { source })?;
        let snapshot: Snapshot =
            bincode::deserialize_from(BufReader::new(file)).map_err(|e| {
                StoreError::Serialization {
                    message: e.to_string(),
                }
            })?;
        if snapshot.dimension != dim {
            return Err(StoreError::DimensionMismatch {
                expected: dim.get(),
                actual: snapshot.dimension.get(),
            });
        }

        let store = Self::new(dim);
        for (term, dense) in snapshot.entries {
            let vector =
                BinaryVector::try_from(dense).map_err(|e| StoreError::Serialization {
                    message: format!("vector for {term:?}: {e}"),
                })?;
            if vector.dimension() != dim {
                return Err(StoreError::DimensionMismatch {
                    expected: dim.get(),
                    actual: vector.dimension().get(),
                });
            }
            store.vectors.insert(term, vector);
        }
        tracing::debug!(path = %path.display(), vectors = store.len(), "loaded snapshot");
        Ok(store)
    }
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("dim", &self.dim)
            .field("len", &self.vectors.len())
            .finish()
    }
}
