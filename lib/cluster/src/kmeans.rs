//! Seeded k-means over encoded profiles
//!
//! Each run seeds centroids with k-means++, then alternates centroid
//! recomputation and nearest-centroid reassignment until no centroid moves
//! further than the configured tolerance. Labels are always recomputed
//! against the final centroids, so a member re-assigned through
//! [`ClusterModel::assign`] lands in the cluster it was fit into.
//!
//! `n_init` runs are seeded from `seed, seed + 1, ...` and evaluated in
//! parallel; the run with the lowest inertia wins, ties going to the lower
//! run index. Identical inputs and config therefore give identical models.

use crate::config::ClusterConfig;
use crate::model::{nearest_centroid, ClusterFit, ClusterLabel, ClusterModel, ModelVersion};
use cohort_core::vector::squared_l2;
use cohort_core::{Error, FeatureVector, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

/// Batch k-means trainer
#[derive(Debug, Clone, Default)]
pub struct KMeans {
    config: ClusterConfig,
}

/// One seeded run of Lloyd's algorithm
#[derive(Debug)]
struct Run {
    centroids: Vec<Vec<f32>>,
    labels: Vec<usize>,
    inertia: f32,
    iterations: usize,
}

impl KMeans {
    pub fn new(config: ClusterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Fit a model over `matrix`, publishing it under `version`
    ///
    /// All vectors must share one schema version. An empty matrix fails with
    /// [`Error::InsufficientData`]; `k` is derived from the population and
    /// never exceeds it.
    pub fn fit(&self, matrix: &[FeatureVector], version: ModelVersion) -> Result<ClusterFit> {
        let Some(first) = matrix.first() else {
            return Err(Error::InsufficientData(
                "cannot cluster an empty population".to_string(),
            ));
        };
        let schema_version = first.schema_version();
        if let Some(stray) = matrix.iter().find(|v| v.schema_version() != schema_version) {
            return Err(Error::SchemaMismatch {
                expected: schema_version,
                actual: stray.schema_version(),
            });
        }

        let points: Vec<&[f32]> = matrix.iter().map(FeatureVector::as_slice).collect();
        let k = self.config.cluster_count(points.len()).min(points.len());

        let runs: Vec<Run> = (0..self.config.n_init)
            .into_par_iter()
            .map(|run| self.run(&points, k, self.config.seed.wrapping_add(run as u64)))
            .collect();

        // Sequential pick keeps the lower run index on equal inertia
        let mut best: Option<Run> = None;
        for (idx, run) in runs.into_iter().enumerate() {
            debug!(run = idx, inertia = run.inertia, iterations = run.iterations, "k-means run finished");
            match &best {
                Some(b) if b.inertia <= run.inertia => {}
                _ => best = Some(run),
            }
        }
        let Some(best) = best else {
            return Err(Error::InvalidConfig("n_init must be at least 1".to_string()));
        };

        info!(
            %version,
            population = points.len(),
            k,
            inertia = best.inertia,
            iterations = best.iterations,
            "Fitted cluster model"
        );

        let labels = best.labels.into_iter().map(ClusterLabel::new).collect();
        let model = ClusterModel::new(
            version,
            schema_version,
            best.centroids,
            best.inertia,
            best.iterations,
        );
        Ok(ClusterFit { model, labels })
    }

    fn run(&self, points: &[&[f32]], k: usize, seed: u64) -> Run {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut centroids = init_plus_plus(points, k, &mut rng);
        let mut labels = vec![0usize; points.len()];
        let mut inertia = reassign(points, &centroids, &mut labels);
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            iterations += 1;
            let next = recompute_centroids(points, &labels, &centroids);
            let shift = centroids
                .iter()
                .zip(&next)
                .map(|(old, new)| squared_l2(old, new).sqrt())
                .fold(0.0f32, f32::max);
            centroids = next;
            inertia = reassign(points, &centroids, &mut labels);
            if shift <= self.config.tolerance {
                break;
            }
        }

        Run {
            centroids,
            labels,
            inertia,
            iterations,
        }
    }
}

/// k-means++ seeding: first centroid uniform, then proportional to D(x)^2.
fn init_plus_plus(points: &[&[f32]], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let n = points.len();
    let mut centroids: Vec<Vec<f32>> = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..n)].to_vec());

    let mut min_dist: Vec<f64> = points
        .iter()
        .map(|p| squared_l2(p, &centroids[0]) as f64)
        .collect();

    while centroids.len() < k {
        let total: f64 = min_dist.iter().sum();
        let chosen = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = None;
            let mut last_positive = 0;
            for (i, d) in min_dist.iter().enumerate() {
                if *d <= 0.0 {
                    continue;
                }
                last_positive = i;
                if target < *d {
                    chosen = Some(i);
                    break;
                }
                target -= d;
            }
            // rounding can leave a sliver of `target` past the last weight
            chosen.unwrap_or(last_positive)
        } else {
            // every point already sits on a centroid
            rng.random_range(0..n)
        };

        let centroid = points[chosen].to_vec();
        for (d, p) in min_dist.iter_mut().zip(points) {
            *d = d.min(squared_l2(p, &centroid) as f64);
        }
        centroids.push(centroid);
    }
    centroids
}

/// Label every point with its nearest centroid; returns the inertia.
fn reassign(points: &[&[f32]], centroids: &[Vec<f32>], labels: &mut [usize]) -> f32 {
    let mut inertia = 0.0f32;
    for (label, point) in labels.iter_mut().zip(points) {
        let (idx, dist) = nearest_centroid(point, centroids);
        *label = idx;
        inertia += dist;
    }
    inertia
}

/// Mean of each cluster's members.
///
/// An empty cluster is re-seeded on the point furthest from its current
/// centroid, skipping points already used for another empty cluster.
fn recompute_centroids(points: &[&[f32]], labels: &[usize], previous: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let k = previous.len();
    let dim = previous.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0f32; dim]; k];
    let mut counts = vec![0usize; k];

    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (s, x) in sums[label].iter_mut().zip(point.iter()) {
            *s += x;
        }
    }

    let mut centroids: Vec<Vec<f32>> = sums
        .into_iter()
        .zip(&counts)
        .map(|(sum, &count)| {
            if count == 0 {
                sum
            } else {
                sum.into_iter().map(|s| s / count as f32).collect()
            }
        })
        .collect();

    let mut taken = vec![false; points.len()];
    for cluster in 0..k {
        if counts[cluster] > 0 {
            continue;
        }
        let mut far_idx = None;
        let mut far_dist = f32::NEG_INFINITY;
        for (i, point) in points.iter().enumerate() {
            if taken[i] {
                continue;
            }
            let dist = squared_l2(point, &centroids[labels[i]]);
            if dist > far_dist {
                far_dist = dist;
                far_idx = Some(i);
            }
        }
        match far_idx {
            Some(i) => {
                taken[i] = true;
                centroids[cluster] = points[i].to_vec();
            }
            None => centroids[cluster] = previous[cluster].clone(),
        }
    }
    centroids
}
