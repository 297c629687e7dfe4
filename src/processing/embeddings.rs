//! Text embeddings: Model2Vec static models and an offline hashing fallback

use crate::config::{Config, EmbeddingBackend};
use crate::error::{Result, RoleMatcherError};
use crate::processing::embedding_manager::resolve_model_path;
use crate::processing::text_processor::TextProcessor;
use anyhow::Context;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use lru::LruCache;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// Turns text into fixed-length vectors.
///
/// `embed_batch` returns exactly one vector per input, in input order.
pub trait Embedder: Send + Sync {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| RoleMatcherError::ComputeFailure("Embedder returned no vector".to_string()))
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

fn check_batch(expected: usize, vectors: &[Vec<f32>], dimension: usize) -> Result<()> {
    if vectors.len() != expected {
        return Err(RoleMatcherError::ComputeFailure(format!(
            "Embedder returned {} vectors for {} texts",
            vectors.len(),
            expected
        )));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(RoleMatcherError::ComputeFailure(format!(
            "Embedder returned a {}-dimensional vector, expected {}",
            bad.len(),
            dimension
        )));
    }
    Ok(())
}

/// Model2Vec static embedding model.
pub struct StaticEmbedder {
    model: StaticModel,
    model_name: String,
    dimension: usize,
    batch_size: usize,
}

impl StaticEmbedder {
    /// Load from a local model directory or a Hugging Face repo id.
    pub fn load(model: &str, batch_size: usize) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model: {}", model);

        let static_model = StaticModel::from_pretrained(
            model,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .with_context(|| format!("Failed to load model '{}'", model))?;

        let dimension = static_model.encode_single("dimension check").len();
        if dimension == 0 {
            return Err(RoleMatcherError::ModelError(format!(
                "Model '{}' produced empty embeddings",
                model
            )));
        }

        info!(
            "Model loaded in {:.2?} ({} dimensions)",
            start_time.elapsed(),
            dimension
        );

        Ok(Self {
            model: static_model,
            model_name: model.to_string(),
            dimension,
            batch_size: batch_size.max(1),
        })
    }
}

impl Embedder for StaticEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.model.encode(batch));
        }
        check_batch(texts.len(), &vectors, self.dimension)?;
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Feature-hashing bag of keywords, L2-normalized. Needs no model files.
pub struct HashingEmbedder {
    processor: TextProcessor,
    dimension: usize,
    model_name: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            processor: TextProcessor::new(),
            dimension,
            model_name: format!("hashing-{}", dimension),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let mut vector = vec![0.0f32; self.dimension];

        for token in self.processor.tokens(&lowered) {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            // high bit picks the sign so collisions tend to cancel
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

/// Memoizes vectors by input text, so a role description is embedded once
/// per process rather than once per request. Least recently used entries are
/// evicted once `capacity` texts are held.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub cache_size: usize,
    pub capacity: usize,
    pub model_name: String,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            RoleMatcherError::Configuration("embedding cache capacity must be greater than zero".to_string())
        })?;

        Ok(Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        let (cache_size, capacity) = self
            .cache
            .lock()
            .map(|c| (c.len(), c.cap().get()))
            .unwrap_or((0, 0));
        CacheStats {
            cache_size,
            capacity,
            model_name: self.inner.model_name().to_string(),
        }
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn lock_cache(&self) -> Result<MutexGuard<'_, LruCache<String, Vec<f32>>>> {
        self.cache
            .lock()
            .map_err(|_| RoleMatcherError::ComputeFailure("Embedding cache lock poisoned".to_string()))
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors: Vec<Option<Vec<f32>>> = {
            let mut cache = self.lock_cache()?;
            texts.iter().map(|text| cache.get(text).cloned()).collect()
        };

        let mut seen = HashSet::new();
        let mut misses = Vec::new();
        for (text, hit) in texts.iter().zip(&vectors) {
            if hit.is_none() && seen.insert(text.as_str()) {
                misses.push(text.clone());
            }
        }

        debug!(
            "Embedding batch of {}: {} cache hits, {} unique misses",
            texts.len(),
            vectors.iter().filter(|v| v.is_some()).count(),
            misses.len()
        );

        if !misses.is_empty() {
            let embedded = self.inner.embed_batch(&misses)?;
            check_batch(misses.len(), &embedded, self.inner.dimension())?;
            let fresh: HashMap<String, Vec<f32>> = misses.into_iter().zip(embedded).collect();

            for (text, slot) in texts.iter().zip(vectors.iter_mut()) {
                if slot.is_none() {
                    *slot = fresh.get(text).cloned();
                }
            }

            let mut cache = self.lock_cache()?;
            for (text, vector) in fresh {
                cache.put(text, vector);
            }
        }

        vectors
            .into_iter()
            .map(|vector| {
                vector.ok_or_else(|| RoleMatcherError::ComputeFailure("Embedding missing from batch".to_string()))
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Build the embedder selected by the configuration.
pub fn build_embedder(config: &Config, offline: bool) -> Result<Box<dyn Embedder>> {
    let base: Box<dyn Embedder> = if offline || config.embedding.backend == EmbeddingBackend::Hashing {
        info!(
            "Using offline hashing embedder ({} dimensions)",
            config.embedding.hashing_dimension
        );
        Box::new(HashingEmbedder::new(config.embedding.hashing_dimension))
    } else {
        let model_path = resolve_model_path(config);
        Box::new(StaticEmbedder::load(
            &model_path.to_string_lossy(),
            config.processing.batch_size,
        )?)
    };

    if config.processing.enable_caching {
        Ok(Box::new(CachedEmbedder::new(base, config.processing.cache_capacity)?))
    } else {
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::similarity::fit_score;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        inner: HashingEmbedder,
        calls: AtomicUsize,
        texts_seen: AtomicUsize,
    }

    impl Embedder for CountingEmbedder {
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts_seen.fetch_add(texts.len(), Ordering::SeqCst);
            self.inner.embed_batch(texts)
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    struct ShortEmbedder;

    impl Embedder for ShortEmbedder {
        fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0, 0.0]])
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "short"
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hashing_embedder_is_deterministic_and_ordered() {
        let embedder = HashingEmbedder::new(64);
        let batch = texts(&["python sql", "react frontend", "python sql"]);

        let vectors = embedder.embed_batch(&batch).unwrap();
        assert_eq!(vectors.len(), 3);
        assert!(vectors.iter().all(|v| v.len() == 64));
        assert_eq!(vectors[0], vectors[2]);
        assert_ne!(vectors[0], vectors[1]);
        assert_eq!(embedder.embed("python sql").unwrap(), vectors[0]);
    }

    #[test]
    fn test_hashing_embedder_ignores_case_and_stop_words() {
        let embedder = HashingEmbedder::new(128);
        let a = embedder.embed("Python and the SQL").unwrap();
        let b = embedder.embed("python sql").unwrap();
        assert_eq!(fit_score(&a, &b).unwrap(), 100.0);
    }

    #[test]
    fn test_related_text_scores_higher() {
        let embedder = HashingEmbedder::new(256);
        let role = embedder.embed("python sql machine learning statistics").unwrap();
        let close = embedder.embed("python machine learning").unwrap();
        let far = embedder.embed("carpentry plumbing welding").unwrap();

        assert!(fit_score(&role, &close).unwrap() > fit_score(&role, &far).unwrap());
    }

    #[test]
    fn test_empty_text_gives_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let vector = embedder.embed("a an to").unwrap();
        assert!(vector.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_cache_embeds_each_text_once() {
        let counting = CountingEmbedder {
            inner: HashingEmbedder::new(32),
            calls: AtomicUsize::new(0),
            texts_seen: AtomicUsize::new(0),
        };
        let cached = CachedEmbedder::new(counting, 16).unwrap();

        let first = cached.embed_batch(&texts(&["role text", "resume one", "role text"])).unwrap();
        let second = cached.embed_batch(&texts(&["resume two", "role text"])).unwrap();

        assert_eq!(first[0], first[2]);
        assert_eq!(first[0], second[1]);
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.inner.texts_seen.load(Ordering::SeqCst), 3);
        assert_eq!(cached.cache_stats().cache_size, 3);

        cached.clear_cache();
        assert_eq!(cached.cache_stats().cache_size, 0);
    }

    #[test]
    fn test_fully_cached_batch_skips_inner_embedder() {
        let counting = CountingEmbedder {
            inner: HashingEmbedder::new(32),
            calls: AtomicUsize::new(0),
            texts_seen: AtomicUsize::new(0),
        };
        let cached = CachedEmbedder::new(counting, 16).unwrap();

        cached.embed("data engineer").unwrap();
        cached.embed("data engineer").unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_stays_within_capacity_across_many_resumes() {
        let counting = CountingEmbedder {
            inner: HashingEmbedder::new(32),
            calls: AtomicUsize::new(0),
            texts_seen: AtomicUsize::new(0),
        };
        let cached = CachedEmbedder::new(counting, 8).unwrap();

        for i in 0..1000 {
            let batch = vec![format!("resume number {}", i), "role description".to_string()];
            cached.embed_batch(&batch).unwrap();
            assert!(cached.cache_stats().cache_size <= 8);
        }

        let stats = cached.cache_stats();
        assert_eq!(stats.cache_size, 8);
        assert_eq!(stats.capacity, 8);
        // the role text is reused every request, so it is never evicted
        assert_eq!(cached.inner.texts_seen.load(Ordering::SeqCst), 1001);
    }

    #[test]
    fn test_batch_larger_than_capacity_keeps_order() {
        let plain = HashingEmbedder::new(32);
        let cached = CachedEmbedder::new(HashingEmbedder::new(32), 2).unwrap();
        let batch = texts(&["python", "react", "docker", "python", "sql"]);

        let vectors = cached.embed_batch(&batch).unwrap();

        assert_eq!(vectors, plain.embed_batch(&batch).unwrap());
        assert_eq!(cached.cache_stats().cache_size, 2);
    }

    #[test]
    fn test_zero_capacity_is_configuration_error() {
        let result = CachedEmbedder::new(HashingEmbedder::new(32), 0);
        assert!(matches!(result, Err(RoleMatcherError::Configuration(_))));
    }

    #[test]
    fn test_short_batch_is_compute_failure() {
        let cached = CachedEmbedder::new(ShortEmbedder, 16).unwrap();
        let result = cached.embed_batch(&texts(&["one", "two"]));
        assert!(matches!(result, Err(RoleMatcherError::ComputeFailure(_))));
    }

    #[test]
    fn test_build_offline_embedder() {
        let config = Config::default();
        let embedder = build_embedder(&config, true).unwrap();
        assert_eq!(embedder.model_name(), "hashing-256");
        assert_eq!(embedder.dimension(), 256);
    }
}
