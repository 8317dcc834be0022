//! LRU cache of decoded rasters.
//!
//! Wraps another decoder so the same URI used several times in a document
//! (or across documents) decodes once and every replacement shares one
//! handle. Memory is bounded by total decoded pixel bytes; the least
//! recently used entries are evicted first.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use crate::raster::RasterHandle;

use super::ResourceDecoder;

/// LRU map from URI to decoded raster, bounded by pixel bytes.
#[derive(Debug)]
struct RasterLru {
    entries: HashMap<String, RasterHandle>,
    /// Front = most recently used, back = least recently used.
    order: VecDeque<String>,
    current_size: usize,
    max_size: usize,
}

impl RasterLru {
    fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            current_size: 0,
            max_size,
        }
    }

    fn get(&mut self, uri: &str) -> Option<RasterHandle> {
        let handle = self.entries.get(uri).map(Arc::clone)?;
        self.touch(uri);
        Some(handle)
    }

    fn touch(&mut self, uri: &str) {
        if let Some(pos) = self.order.iter().position(|u| u == uri) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_front(key);
            }
        }
    }

    fn insert(&mut self, uri: &str, handle: RasterHandle) {
        let size = handle.byte_len();
        if size > self.max_size {
            log::debug!("not caching {uri}: {size} bytes exceeds cache budget");
            return;
        }
        if let Some(old) = self.entries.remove(uri) {
            self.current_size -= old.byte_len();
            self.order.retain(|u| u != uri);
        }
        while self.current_size + size > self.max_size {
            let Some(evicted) = self.order.pop_back() else {
                break;
            };
            if let Some(old) = self.entries.remove(&evicted) {
                self.current_size -= old.byte_len();
                log::debug!("evicted {evicted} from raster cache");
            }
        }
        self.current_size += size;
        self.order.push_front(uri.to_string());
        self.entries.insert(uri.to_string(), handle);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.current_size = 0;
    }
}

/// A [`ResourceDecoder`] that memoizes successful decodes of an inner
/// decoder.
///
/// Failed decodes are not cached, so a resource that appears later is
/// picked up on the next request.
#[derive(Debug)]
pub struct CachingDecoder<D> {
    inner: D,
    cache: Mutex<RasterLru>,
}

impl<D: ResourceDecoder> CachingDecoder<D> {
    /// Cache up to `max_bytes` of decoded pixel data.
    pub fn new(inner: D, max_bytes: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(RasterLru::new(max_bytes)),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Whether `uri` is cached (without promoting it).
    pub fn contains(&self, uri: &str) -> bool {
        self.lock().entries.contains_key(uri)
    }

    /// Number of cached rasters.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total cached pixel bytes.
    pub fn size(&self) -> usize {
        self.lock().current_size
    }

    /// Drop every cached raster. Handles already given out stay valid.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RasterLru> {
        // Every LRU operation leaves the map consistent; ignore poisoning.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: ResourceDecoder> ResourceDecoder for CachingDecoder<D> {
    fn decode(&self, uri: &str) -> Option<RasterHandle> {
        if let Some(hit) = self.lock().get(uri) {
            log::trace!("raster cache hit: {uri}");
            return Some(hit);
        }
        // Decode outside the lock; two threads racing on the same URI both
        // decode and the later insert wins.
        let handle = self.inner.decode(uri)?;
        self.lock().insert(uri, Arc::clone(&handle));
        Some(handle)
    }
}
