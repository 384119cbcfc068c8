//! Engine service handle
//!
//! An [`Engine`] owns the loaded lookup tables (personality table, optional
//! hobby embeddings) and the currently published [`Snapshot`] of encoding
//! schema plus cluster model. It is constructed once with [`Engine::init`],
//! shared by reference or `Arc`, and released with [`Engine::shutdown`].
//!
//! Fitting happens outside any lock. The finished snapshot is swapped in under
//! a short write lock, so `rank` and `assign` callers never wait on a fit and
//! always see one complete (schema, model) pair.

use crate::config::EngineConfig;
use cohort_cluster::{ClusterAssignment, ClusterLabel, ClusterModel, KMeans, ModelVersion};
use cohort_core::{
    EncodingSchema, Error, FeatureEncoder, HobbyEmbeddings, HobbyMode, PersonalityTable, Result,
    UserId, UserProfile,
};
use cohort_similarity::{
    HobbySimilarity, MatchResponse, MatchStats, RankedMatch, Ranker, Scorer,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Schema and model published together by one fit
#[derive(Debug)]
pub struct Snapshot {
    schema: EncodingSchema,
    model: ClusterModel,
    assignments: Vec<ClusterAssignment>,
}

impl Snapshot {
    pub fn schema(&self) -> &EncodingSchema {
        &self.schema
    }

    pub fn model(&self) -> &ClusterModel {
        &self.model
    }

    pub fn version(&self) -> ModelVersion {
        self.model.version()
    }

    /// Labels produced by the fit, in input order
    pub fn assignments(&self) -> &[ClusterAssignment] {
        &self.assignments
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        let labels: Vec<ClusterLabel> = self.assignments.iter().map(|a| a.cluster_label).collect();
        self.model.cluster_sizes(&labels)
    }

    /// Users fitted into `label`
    pub fn members(&self, label: ClusterLabel) -> Vec<&UserId> {
        self.assignments
            .iter()
            .filter(|a| a.cluster_label == label)
            .map(|a| &a.user_id)
            .collect()
    }
}

/// Matching and clustering service
pub struct Engine {
    config: EngineConfig,
    encoder: FeatureEncoder,
    ranker: Ranker,
    kmeans: KMeans,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    next_version: AtomicU64,
    assigned_since_fit: AtomicU64,
}

impl Engine {
    /// Validate `config` and load the tables it points at
    pub fn init(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let personality = match &config.personality_table_path {
            Some(path) => {
                info!("Loading personality table from {:?}", path);
                PersonalityTable::from_file(path)?
            }
            None => PersonalityTable::default(),
        };

        let embeddings = match (&config.embeddings_path, config.encoder.hobby_mode) {
            (Some(path), HobbyMode::Embedding) => {
                info!("Loading hobby embeddings from {:?}", path);
                let table = HobbyEmbeddings::from_file(path)?;
                info!(tokens = table.len(), dim = table.dim(), "Hobby embeddings loaded");
                Some(Arc::new(table))
            }
            (Some(path), HobbyMode::MultiHot) => {
                warn!("Ignoring embeddings_path {:?} in multi_hot mode", path);
                None
            }
            (None, _) => None,
        };

        Self::with_tables(config, Arc::new(personality), embeddings)
    }

    /// Build an engine from tables already in memory
    pub fn with_tables(
        config: EngineConfig,
        personality: Arc<PersonalityTable>,
        embeddings: Option<Arc<HobbyEmbeddings>>,
    ) -> Result<Self> {
        config.validate()?;

        let mode = config.encoder.hobby_mode;
        let encoder = FeatureEncoder::new(mode, embeddings.clone())?;
        let hobbies = match (mode, embeddings) {
            (HobbyMode::Embedding, Some(table)) => HobbySimilarity::Embedding {
                table,
                normalization: config.scoring.embedding_normalization,
            },
            _ => HobbySimilarity::Containment,
        };
        let scorer = Scorer::new(personality, config.scoring.preference_weights()?, hobbies);
        let kmeans = KMeans::new(config.cluster.clone())?;

        debug!(?mode, "Engine initialized");

        Ok(Self {
            config,
            encoder,
            ranker: Ranker::new(scorer),
            kmeans,
            snapshot: RwLock::new(None),
            next_version: AtomicU64::new(1),
            assigned_since_fit: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    /// Best `top_k` candidates for `target` (configured default when `None`)
    pub fn rank(
        &self,
        target: &UserProfile,
        candidates: &[UserProfile],
        top_k: Option<usize>,
    ) -> Vec<RankedMatch> {
        let top_k = top_k.unwrap_or(self.config.scoring.top_k);
        self.ranker.rank(target, candidates, top_k)
    }

    /// Ranking in caller-facing shape, with summary statistics
    pub fn match_response(
        &self,
        target: &UserProfile,
        candidates: &[UserProfile],
        top_k: Option<usize>,
    ) -> MatchResponse {
        let ranked = self.rank(target, candidates, top_k);
        let considered = candidates.iter().filter(|c| c.id != target.id).count();
        let stats = MatchStats::compute(&ranked, considered);
        MatchResponse::from_ranked(target.id.clone(), &ranked).with_stats(stats)
    }

    /// Fit schema and clusters over the whole population and publish them
    ///
    /// Returns one assignment per input profile, in input order. A snapshot
    /// older than the one already published is returned to the caller but
    /// not published.
    pub fn fit_population(&self, profiles: &[UserProfile]) -> Result<Vec<ClusterAssignment>> {
        if profiles.is_empty() {
            return Err(Error::InsufficientData(
                "cannot cluster an empty population".to_string(),
            ));
        }

        let version = ModelVersion::new(self.next_version.fetch_add(1, Ordering::Relaxed));
        let schema = self.encoder.fit(profiles)?;
        let matrix = schema.encode_batch(profiles);
        let fit = self.kmeans.fit(&matrix, version)?;
        let assignments = fit.assignments(profiles.iter().map(|p| p.id.clone()));

        let snapshot = Arc::new(Snapshot {
            schema,
            model: fit.model,
            assignments: assignments.clone(),
        });
        self.publish(snapshot);
        Ok(assignments)
    }

    fn publish(&self, snapshot: Arc<Snapshot>) {
        let mut current = self.snapshot.write();
        if let Some(existing) = current.as_ref() {
            if existing.version() > snapshot.version() {
                warn!(
                    published = %existing.version(),
                    discarded = %snapshot.version(),
                    "Newer cluster model already published"
                );
                return;
            }
        }
        info!(
            version = %snapshot.version(),
            schema = %snapshot.schema.version(),
            k = snapshot.model.k(),
            "Published cluster model"
        );
        *current = Some(snapshot);
        self.assigned_since_fit.store(0, Ordering::Relaxed);
    }

    /// Currently published snapshot, if any
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().clone()
    }

    pub fn model_version(&self) -> Option<ModelVersion> {
        self.snapshot.read().as_ref().map(|s| s.version())
    }

    /// Place a profile into the published model without moving any centroid
    pub fn assign(&self, profile: &UserProfile) -> Result<ClusterAssignment> {
        let snapshot = self.snapshot().ok_or(Error::NotTrained)?;
        let vector = snapshot.schema.encode(profile);
        let cluster_label = snapshot.model.assign(&vector)?;
        self.assigned_since_fit.fetch_add(1, Ordering::Relaxed);
        Ok(ClusterAssignment {
            user_id: profile.id.clone(),
            cluster_label,
        })
    }

    pub fn assign_batch(&self, profiles: &[UserProfile]) -> Result<Vec<ClusterAssignment>> {
        let snapshot = self.snapshot().ok_or(Error::NotTrained)?;
        let vectors = snapshot.schema.encode_batch(profiles);
        let labels = snapshot.model.assign_batch(&vectors)?;
        self.assigned_since_fit
            .fetch_add(profiles.len() as u64, Ordering::Relaxed);
        Ok(profiles
            .iter()
            .zip(labels)
            .map(|(profile, cluster_label)| ClusterAssignment {
                user_id: profile.id.clone(),
                cluster_label,
            })
            .collect())
    }

    /// Profiles assigned incrementally since the last published fit
    pub fn population_drift(&self) -> u64 {
        self.assigned_since_fit.load(Ordering::Relaxed)
    }

    /// Release the published model and loaded tables
    pub fn shutdown(self) {
        let version = self.model_version();
        drop(self);
        info!(?version, "Engine shut down");
    }
}
