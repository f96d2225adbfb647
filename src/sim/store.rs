//! Bounded, insertion-ordered blob collection
//!
//! Oldest blob first. FIFO eviction and newest-first hit-testing both rely
//! on this order, so nothing here may reorder the backing vector.

use super::state::{Blob, BlobId, Category};

/// Default similarity above which two utterances count as duplicates
pub const DUPLICATE_THRESHOLD: f32 = 0.85;

#[derive(Debug, Clone)]
pub struct BlobStore {
    blobs: Vec<Blob>,
    capacity: usize,
    next_id: u32,
}

impl BlobStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            blobs: Vec::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Allocate a new blob ID. The counter wraps after `u32::MAX`, skipping
    /// any ID a live blob still holds.
    pub fn allocate_id(&mut self) -> BlobId {
        loop {
            let id = BlobId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if self.get(id).is_none() {
                return id;
            }
        }
    }

    /// Append a blob, evicting the oldest one first when full.
    /// Returns the inserted ID and the evicted blob, if any.
    pub fn insert(&mut self, blob: Blob) -> (BlobId, Option<Blob>) {
        let evicted = if self.blobs.len() >= self.capacity {
            Some(self.blobs.remove(0))
        } else {
            None
        };
        let id = blob.id;
        self.blobs.push(blob);
        (id, evicted)
    }

    pub fn remove(&mut self, id: BlobId) -> Option<Blob> {
        let idx = self.blobs.iter().position(|b| b.id == id)?;
        Some(self.blobs.remove(idx))
    }

    pub fn remove_by_category(&mut self, category: Category) -> usize {
        let before = self.blobs.len();
        self.blobs.retain(|b| b.category != category);
        before - self.blobs.len()
    }

    pub fn clear(&mut self) -> usize {
        let count = self.blobs.len();
        self.blobs.clear();
        count
    }

    pub fn get(&self, id: BlobId) -> Option<&Blob> {
        self.blobs.iter().find(|b| b.id == id)
    }

    pub fn get_mut(&mut self, id: BlobId) -> Option<&mut Blob> {
        self.blobs.iter_mut().find(|b| b.id == id)
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Blob> {
        self.blobs.iter()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Blob> {
        self.blobs.iter_mut()
    }

    pub fn as_slice(&self) -> &[Blob] {
        &self.blobs
    }

    pub fn as_mut_slice(&mut self) -> &mut [Blob] {
        &mut self.blobs
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every blob whose text is too similar to an earlier kept blob.
    /// Blobs with empty text are never treated as duplicates.
    pub fn remove_duplicates(&mut self, threshold: f32) -> Vec<BlobId> {
        let mut kept: Vec<String> = Vec::new();
        let mut removed = Vec::new();

        self.blobs.retain(|blob| {
            let text = normalize_text(&blob.text);
            if text.is_empty() {
                return true;
            }
            if kept.iter().any(|k| text_similarity(k, &text) > threshold) {
                removed.push(blob.id);
                return false;
            }
            kept.push(text);
            true
        });

        removed
    }
}

/// Lowercase, trim and collapse internal whitespace
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Position-wise character match ratio: matches / longer length
pub fn text_similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    let matches = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    matches as f32 / max_len as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::SpawnRequest;
    use glam::Vec2;

    fn make_blob(store: &mut BlobStore, category: Category, text: &str) -> Blob {
        let id = store.allocate_id();
        let req = SpawnRequest::new(category, 0.0).with_text(text);
        Blob::from_request(id, &req, Vec2::ZERO, Vec2::ZERO, 0.0)
    }

    #[test]
    fn test_fifo_eviction() {
        let mut store = BlobStore::new(80);
        let mut ids = Vec::new();
        for _ in 0..80 {
            let blob = make_blob(&mut store, Category::Hope, "");
            let (id, evicted) = store.insert(blob);
            assert!(evicted.is_none());
            ids.push(id);
        }
        assert_eq!(store.len(), 80);

        let blob = make_blob(&mut store, Category::Sorrow, "");
        let (newest, evicted) = store.insert(blob);
        assert_eq!(evicted.map(|b| b.id), Some(ids[0]));
        assert_eq!(store.len(), 80);
        assert_eq!(store.iter().next().map(|b| b.id), Some(ids[1]));
        assert_eq!(store.iter().last().map(|b| b.id), Some(newest));
    }

    #[test]
    fn test_eviction_skips_removed_blobs() {
        let mut store = BlobStore::new(3);
        let a = make_blob(&mut store, Category::Hope, "");
        let b = make_blob(&mut store, Category::Hope, "");
        let c = make_blob(&mut store, Category::Hope, "");
        let (a, _) = store.insert(a);
        let (b, _) = store.insert(b);
        store.insert(c);
        store.remove(a);

        let d = make_blob(&mut store, Category::Hope, "");
        assert!(store.insert(d).1.is_none());
        let e = make_blob(&mut store, Category::Hope, "");
        // Oldest surviving is b
        assert_eq!(store.insert(e).1.map(|x| x.id), Some(b));
    }

    #[test]
    fn test_id_counter_wraps_past_live_ids() {
        let mut store = BlobStore::new(10);
        let first = make_blob(&mut store, Category::Hope, "");
        let (first, _) = store.insert(first);
        assert_eq!(first, BlobId(1));

        store.next_id = u32::MAX;
        assert_eq!(store.allocate_id(), BlobId(u32::MAX));
        assert_eq!(store.allocate_id(), BlobId(0));
        // 1 is still live, so the counter steps over it
        assert_eq!(store.allocate_id(), BlobId(2));
    }

    #[test]
    fn test_remove_by_category() {
        let mut store = BlobStore::new(10);
        for c in [Category::Hope, Category::Sorrow, Category::Hope] {
            let blob = make_blob(&mut store, c, "");
            store.insert(blob);
        }
        assert_eq!(store.remove_by_category(Category::Hope), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.remove_by_category(Category::Hope), 0);
    }

    #[test]
    fn test_ids_not_reused() {
        let mut store = BlobStore::new(10);
        let blob = make_blob(&mut store, Category::Hope, "");
        let (first, _) = store.insert(blob);
        store.clear();
        let blob = make_blob(&mut store, Category::Hope, "");
        let (second, _) = store.insert(blob);
        assert_ne!(first, second);
    }

    #[test]
    fn test_similarity() {
        let a = normalize_text("I feel hopeful today");
        let b = normalize_text("I feel hopeful today!!");
        assert!(text_similarity(&a, &b) > 0.85);
        assert!(text_similarity("abc", "xyz") < 0.01);
        assert_eq!(normalize_text("  Hello   World "), "hello world");
    }

    #[test]
    fn test_remove_duplicates_keeps_earlier() {
        let mut store = BlobStore::new(10);
        let first = make_blob(&mut store, Category::Hope, "I feel hopeful today");
        let second = make_blob(&mut store, Category::Hope, "I feel hopeful today!!");
        let (first, _) = store.insert(first);
        store.insert(second);

        let removed = store.remove_duplicates(DUPLICATE_THRESHOLD);
        assert_eq!(removed.len(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().map(|b| b.id), Some(first));
    }

    #[test]
    fn test_remove_duplicates_ignores_empty_and_distinct() {
        let mut store = BlobStore::new(10);
        for text in ["", "", "the rain keeps falling", "tomorrow will be better"] {
            let blob = make_blob(&mut store, Category::Sorrow, text);
            store.insert(blob);
        }
        assert!(store.remove_duplicates(DUPLICATE_THRESHOLD).is_empty());
        assert_eq!(store.len(), 4);
    }
}
