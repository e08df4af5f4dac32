//! Preview thumbnails cached by region geometry and render settings.
//!
//! A key combines the region id with a fingerprint of its geometry and one
//! of the settings it was rendered with, so editing a region or changing
//! the extract options misses the cache. Stale entries are left to the
//! eviction policy (or [`ThumbnailCache::invalidate`]).

use std::collections::{HashMap, VecDeque};

use crate::error::EmojiCutError;
use crate::pixel::PixelBuffer;
use crate::segment::RegionId;
use crate::selection::SelectionRegion;

/// Cache key: region id, geometry fingerprint and settings fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ThumbnailKey {
    pub id: RegionId,
    pub fingerprint: u64,
    pub settings: u64,
}

impl ThumbnailKey {
    pub fn for_region(region: &SelectionRegion, settings: u64) -> Self {
        Self {
            id: region.id,
            fingerprint: region.geometry_fingerprint(),
            settings,
        }
    }
}

/// Decides which entries leave the cache.
pub trait EvictionPolicy {
    /// Called on every hit.
    fn touch(&mut self, key: ThumbnailKey);

    /// Called after an insert; returns keys that must now be evicted.
    fn admit(&mut self, key: ThumbnailKey) -> Vec<ThumbnailKey>;

    /// Called when an entry is removed for any other reason.
    fn forget(&mut self, key: &ThumbnailKey);
}

/// Keeps every entry until removed by hand.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbounded;

impl EvictionPolicy for Unbounded {
    fn touch(&mut self, _key: ThumbnailKey) {}

    fn admit(&mut self, _key: ThumbnailKey) -> Vec<ThumbnailKey> {
        Vec::new()
    }

    fn forget(&mut self, _key: &ThumbnailKey) {}
}

/// Least-recently-used eviction with a fixed capacity (minimum 1).
#[derive(Clone, Debug)]
pub struct Lru {
    capacity: usize,
    order: VecDeque<ThumbnailKey>,
}

impl Lru {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl EvictionPolicy for Lru {
    fn touch(&mut self, key: ThumbnailKey) {
        self.forget(&key);
        self.order.push_back(key);
    }

    fn admit(&mut self, key: ThumbnailKey) -> Vec<ThumbnailKey> {
        self.touch(key);
        let excess = self.order.len().saturating_sub(self.capacity);
        self.order.drain(..excess).collect()
    }

    fn forget(&mut self, key: &ThumbnailKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }
}

/// Thumbnail store owned by whoever renders previews.
#[derive(Debug)]
pub struct ThumbnailCache<P = Lru> {
    entries: HashMap<ThumbnailKey, PixelBuffer>,
    policy: P,
}

impl Default for ThumbnailCache<Lru> {
    fn default() -> Self {
        Self::new(Lru::new(64))
    }
}

impl<P: EvictionPolicy> ThumbnailCache<P> {
    pub fn new(policy: P) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &ThumbnailKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&mut self, key: &ThumbnailKey) -> Option<&PixelBuffer> {
        if self.entries.contains_key(key) {
            self.policy.touch(*key);
        }
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: ThumbnailKey, thumbnail: PixelBuffer) {
        self.entries.insert(key, thumbnail);
        for evicted in self.policy.admit(key) {
            self.entries.remove(&evicted);
        }
    }

    /// Returns the cached thumbnail for `region` rendered with `settings`,
    /// rendering it on a miss.
    pub fn get_or_render<F>(
        &mut self,
        region: &SelectionRegion,
        settings: u64,
        render: F,
    ) -> Result<PixelBuffer, EmojiCutError>
    where
        F: FnOnce() -> Result<PixelBuffer, EmojiCutError>,
    {
        let key = ThumbnailKey::for_region(region, settings);
        if let Some(hit) = self.entries.get(&key) {
            let hit = hit.clone();
            self.policy.touch(key);
            return Ok(hit);
        }
        let thumbnail = render()?;
        self.insert(key, thumbnail.clone());
        Ok(thumbnail)
    }

    /// Drops every entry belonging to `id`, whatever its geometry.
    pub fn invalidate(&mut self, id: RegionId) {
        let stale: Vec<ThumbnailKey> =
            self.entries.keys().filter(|k| k.id == id).copied().collect();
        for key in stale {
            self.entries.remove(&key);
            self.policy.forget(&key);
        }
    }

    pub fn clear(&mut self) {
        let keys: Vec<ThumbnailKey> = self.entries.keys().copied().collect();
        for key in &keys {
            self.policy.forget(key);
        }
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::pixel::RgbaColor;

    fn region(id: u64, x: f64) -> SelectionRegion {
        SelectionRegion::create_rectangle(
            id,
            Point::new(x, 0.0),
            Point::new(x + 10.0, 10.0),
            1000.0,
            1000.0,
        )
        .unwrap()
    }

    fn tile() -> Result<PixelBuffer, EmojiCutError> {
        Ok(PixelBuffer::filled(2, 2, RgbaColor::WHITE))
    }

    #[test]
    fn test_hit_skips_render() {
        let mut cache = ThumbnailCache::default();
        let r = region(1, 0.0);
        cache.get_or_render(&r, 0, tile).unwrap();
        let hit = cache.get_or_render(&r, 0, || panic!("should not render")).unwrap();
        assert_eq!(hit.width(), 2);
    }

    #[test]
    fn test_settings_change_misses() {
        let mut cache = ThumbnailCache::new(Unbounded);
        let r = region(1, 0.0);
        cache.get_or_render(&r, 1, tile).unwrap();
        assert!(!cache.contains(&ThumbnailKey::for_region(&r, 2)));
        let wide = cache
            .get_or_render(&r, 2, || Ok(PixelBuffer::filled(4, 2, RgbaColor::WHITE)))
            .unwrap();
        assert_eq!(wide.width(), 4);
        assert_eq!(cache.len(), 2);

        cache.invalidate(r.id);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_geometry_change_misses() {
        let mut cache = ThumbnailCache::new(Unbounded);
        let r = region(1, 0.0);
        cache.get_or_render(&r, 0, tile).unwrap();
        let moved = r.moved(5.0, 0.0, 1000.0, 1000.0);
        assert!(!cache.contains(&ThumbnailKey::for_region(&moved, 0)));
        cache.get_or_render(&moved, 0, tile).unwrap();
        assert_eq!(cache.len(), 2);

        cache.invalidate(r.id);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_evicts_least_recent() {
        let mut cache = ThumbnailCache::new(Lru::new(2));
        let (a, b, c) = (region(1, 0.0), region(2, 20.0), region(3, 40.0));
        cache.get_or_render(&a, 0, tile).unwrap();
        cache.get_or_render(&b, 0, tile).unwrap();
        // touch a so b becomes the oldest
        cache.get(&ThumbnailKey::for_region(&a, 0));
        cache.get_or_render(&c, 0, tile).unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&ThumbnailKey::for_region(&a, 0)));
        assert!(!cache.contains(&ThumbnailKey::for_region(&b, 0)));
        assert!(cache.contains(&ThumbnailKey::for_region(&c, 0)));
    }

    #[test]
    fn test_render_error_propagates() {
        let mut cache = ThumbnailCache::new(Unbounded);
        let r = region(1, 0.0);
        let err = cache
            .get_or_render(&r, 0, || Err(EmojiCutError::BackgroundRemovalFailed("boom".into())))
            .unwrap_err();
        assert!(matches!(err, EmojiCutError::BackgroundRemovalFailed(_)));
        assert!(cache.is_empty());
    }
}
