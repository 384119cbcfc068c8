//! Pretrained hobby embedding table
//!
//! Maps known hobby tokens to fixed-length real vectors. The table is loaded
//! once by whoever wires the engine together and shared read-only behind an
//! `Arc`; dropping the last handle releases it.

use crate::{Error, Result};
use ahash::AHashMap;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io::BufRead;
use std::path::Path;

/// Upper bound on map capacity reserved from a word2vec header
const MAX_PREALLOCATED_TOKENS: usize = 1 << 16;

#[derive(Debug, Clone)]
pub struct HobbyEmbeddings {
    dim: usize,
    vectors: AHashMap<String, Vec<f32>>,
    fingerprint: u64,
}

impl HobbyEmbeddings {
    /// Build a table from token → vector pairs.
    ///
    /// All vectors must share one non-zero dimension and hold finite values.
    pub fn from_map(map: HashMap<String, Vec<f32>>) -> Result<Self> {
        let dim = match map.values().next() {
            Some(v) => v.len(),
            None => return Err(Error::InvalidConfig("embedding table is empty".to_string())),
        };
        if dim == 0 {
            return Err(Error::InvalidConfig(
                "embedding vectors cannot be empty".to_string(),
            ));
        }

        for (token, vector) in &map {
            if vector.len() != dim {
                return Err(Error::InvalidConfig(format!(
                    "embedding for '{}' has dimension {}, expected {}",
                    token,
                    vector.len(),
                    dim
                )));
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(Error::InvalidConfig(format!(
                    "embedding for '{}' contains non-finite values",
                    token
                )));
            }
        }

        let vectors: AHashMap<String, Vec<f32>> = map.into_iter().collect();
        let fingerprint = Self::compute_fingerprint(dim, &vectors);
        Ok(Self {
            dim,
            vectors,
            fingerprint,
        })
    }

    /// Parse the word2vec text format: a `count dim` header line followed by
    /// one `token v1 .. vdim` line per token.
    ///
    /// Lines with the wrong arity or unparsable numbers are skipped.
    pub fn from_word2vec_text<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(Error::InvalidConfig("embedding file is empty".to_string())),
        };
        let mut parts = header.split_whitespace();
        let (declared_count, dim) = match (
            parts.next().and_then(|c| c.parse::<usize>().ok()),
            parts.next().and_then(|d| d.parse::<usize>().ok()),
        ) {
            (Some(count), Some(dim)) if dim > 0 => (count, dim),
            _ => {
                return Err(Error::InvalidConfig(format!(
                    "invalid word2vec header '{}'",
                    header
                )))
            }
        };

        // header count is untrusted input
        let mut map = HashMap::with_capacity(declared_count.min(MAX_PREALLOCATED_TOKENS));
        for (line_no, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let token = match fields.next() {
                Some(t) => t.to_string(),
                None => continue,
            };
            let values: std::result::Result<Vec<f32>, _> = fields.map(str::parse::<f32>).collect();
            match values {
                Ok(values) if values.len() == dim => {
                    map.insert(token, values);
                }
                _ => {
                    tracing::warn!(line = line_no + 2, token = %token, "skipping malformed embedding line");
                }
            }
        }

        if map.len() != declared_count {
            tracing::warn!(
                declared = declared_count,
                loaded = map.len(),
                "embedding count differs from header"
            );
        }

        Self::from_map(map)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        let table = Self::from_word2vec_text(std::io::BufReader::new(file))?;
        tracing::info!(
            path = %path.as_ref().display(),
            tokens = table.len(),
            dim = table.dim(),
            "loaded hobby embeddings"
        );
        Ok(table)
    }

    fn compute_fingerprint(dim: usize, vectors: &AHashMap<String, Vec<f32>>) -> u64 {
        let mut tokens: Vec<&String> = vectors.keys().collect();
        tokens.sort();

        let mut hasher = DefaultHasher::new();
        dim.hash(&mut hasher);
        for token in tokens {
            token.hash(&mut hasher);
            for value in &vectors[token] {
                value.to_bits().hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Content hash of the table, stable for identical contents
    #[inline]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    #[inline]
    pub fn get(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(Vec::as_slice)
    }

    /// Average of the vectors of all known tokens; `None` if no token is known.
    pub fn mean_vector<'a, I>(&self, tokens: I) -> Option<Vec<f32>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sum = vec![0.0f32; self.dim];
        let mut count = 0usize;
        for vector in tokens.into_iter().filter_map(|t| self.get(t)) {
            for (acc, v) in sum.iter_mut().zip(vector) {
                *acc += v;
            }
            count += 1;
        }

        if count == 0 {
            return None;
        }
        let inv = 1.0 / count as f32;
        for v in &mut sum {
            *v *= inv;
        }
        Some(sum)
    }
}
