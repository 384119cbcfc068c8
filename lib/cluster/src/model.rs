//! Trained cluster models and the labels derived from them
//!
//! A [`ClusterModel`] is an immutable set of centroids tied to the schema
//! version its training vectors were encoded with. Assigning a newcomer
//! never moves a centroid; the only way clusters change is a new fit, which
//! produces a new model with a new [`ModelVersion`].

use cohort_core::vector::squared_l2;
use cohort_core::{Error, FeatureVector, Result, SchemaVersion, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a cluster within one model version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterLabel(usize);

impl ClusterLabel {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic identifier of a fitted model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelVersion(u64);

impl ModelVersion {
    pub const fn new(version: u64) -> Self {
        Self(version)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A user's cluster under one model version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub user_id: UserId,
    pub cluster_label: ClusterLabel,
}

/// Index and squared distance of the closest centroid; lowest index wins ties.
pub(crate) fn nearest_centroid(point: &[f32], centroids: &[Vec<f32>]) -> (usize, f32) {
    let mut best_idx = 0;
    let mut best_dist = f32::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let dist = squared_l2(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best_idx = i;
        }
    }
    (best_idx, best_dist)
}

/// Versioned, read-only set of centroids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    version: ModelVersion,
    schema_version: SchemaVersion,
    centroids: Vec<Vec<f32>>,
    /// Within-cluster sum of squared distances at fit time
    inertia: f32,
    iterations: usize,
}

impl ClusterModel {
    pub(crate) fn new(
        version: ModelVersion,
        schema_version: SchemaVersion,
        centroids: Vec<Vec<f32>>,
        inertia: f32,
        iterations: usize,
    ) -> Self {
        Self {
            version,
            schema_version,
            centroids,
            inertia,
            iterations,
        }
    }

    #[inline]
    pub fn version(&self) -> ModelVersion {
        self.version
    }

    #[inline]
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    /// Number of clusters
    #[inline]
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    pub fn dim(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }

    pub fn centroids(&self) -> &[Vec<f32>] {
        &self.centroids
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Label of the centroid nearest to `vector`
    ///
    /// Fails with [`Error::SchemaMismatch`] if `vector` was encoded against a
    /// different schema than the model was fit on.
    pub fn assign(&self, vector: &FeatureVector) -> Result<ClusterLabel> {
        if vector.schema_version() != self.schema_version {
            return Err(Error::SchemaMismatch {
                expected: self.schema_version,
                actual: vector.schema_version(),
            });
        }
        let (idx, _) = nearest_centroid(vector.as_slice(), &self.centroids);
        Ok(ClusterLabel(idx))
    }

    pub fn assign_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<ClusterLabel>> {
        vectors.iter().map(|v| self.assign(v)).collect()
    }

    /// Member count per cluster for a set of labels from this model
    pub fn cluster_sizes(&self, labels: &[ClusterLabel]) -> Vec<usize> {
        let mut sizes = vec![0; self.k()];
        for label in labels {
            if let Some(size) = sizes.get_mut(label.0) {
                *size += 1;
            }
        }
        sizes
    }
}

/// Outcome of a batch fit: the model plus one label per input vector
#[derive(Debug, Clone)]
pub struct ClusterFit {
    pub model: ClusterModel,
    pub labels: Vec<ClusterLabel>,
}

impl ClusterFit {
    /// Input indices grouped by cluster, in label order
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.model.k()];
        for (i, label) in self.labels.iter().enumerate() {
            members[label.0].push(i);
        }
        members
    }

    /// Pair each label with the id of the profile at the same input position
    pub fn assignments<I>(&self, ids: I) -> Vec<ClusterAssignment>
    where
        I: IntoIterator<Item = UserId>,
    {
        ids.into_iter()
            .zip(&self.labels)
            .map(|(user_id, label)| ClusterAssignment {
                user_id,
                cluster_label: *label,
            })
            .collect()
    }
}
