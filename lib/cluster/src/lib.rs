//! Cohort clustering
//!
//! Batch k-means over encoded profiles plus incremental assignment of
//! newcomers to the nearest centroid of a frozen model.
//!
//! ```
//! use cohort_cluster::{KMeans, ModelVersion};
//! use cohort_core::{FeatureEncoder, UserProfile};
//!
//! let profiles: Vec<UserProfile> = (0..6)
//!     .map(|i| UserProfile::new(format!("u{}", i)).with_role(if i < 3 { "SE" } else { "sales" }))
//!     .collect();
//! let schema = FeatureEncoder::default().fit(&profiles).unwrap();
//! let fit = KMeans::default()
//!     .fit(&schema.encode_batch(&profiles), ModelVersion::new(1))
//!     .unwrap();
//!
//! assert_eq!(fit.model.k(), 2);
//! let newcomer = schema.encode(&UserProfile::new("n").with_role("SE"));
//! assert_eq!(fit.model.assign(&newcomer).unwrap(), fit.labels[0]);
//! ```

pub mod config;
pub mod kmeans;
pub mod model;

pub use config::ClusterConfig;
pub use kmeans::KMeans;
pub use model::{ClusterAssignment, ClusterFit, ClusterLabel, ClusterModel, ModelVersion};
