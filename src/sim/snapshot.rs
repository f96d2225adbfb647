//! Read-side views handed to the renderer and UI each frame

use std::collections::BTreeMap;

use glam::Vec2;
use serde::Serialize;

use super::state::{BlobId, Category, World};

/// Per-frame render state for one blob
#[derive(Debug, Clone, Serialize)]
pub struct EntitySnapshot {
    pub id: BlobId,
    pub category: Category,
    pub position: Vec2,
    pub size: f32,
    pub opacity: f32,
    pub is_selected: bool,
    pub is_hovered: bool,
    pub is_new: bool,
}

/// Ripple state for the renderer
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RippleSnapshot {
    pub position: Vec2,
    pub opacity: f32,
}

impl World {
    /// Render state for every blob, oldest first
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.blobs
            .iter()
            .map(|b| EntitySnapshot {
                id: b.id,
                category: b.category,
                position: b.pos,
                size: b.size,
                opacity: b.opacity,
                is_selected: self.selected.contains(&b.id),
                is_hovered: self.hovered == Some(b.id),
                is_new: b.is_new,
            })
            .collect()
    }

    pub fn ripple_snapshot(&self) -> Vec<RippleSnapshot> {
        self.ripples
            .iter()
            .map(|r| RippleSnapshot {
                position: r.pos,
                opacity: r.opacity(self.time_ms, self.config.ripple_lifetime_ms),
            })
            .collect()
    }

    /// Blob count per category (every category present, zeros included)
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();
        for blob in self.blobs.iter() {
            *counts.entry(blob.category).or_default() += 1;
        }
        counts
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    /// Blobs added within the "new" window, oldest first
    pub fn newly_spawned(&self) -> Vec<BlobId> {
        let window = self.config.new_blob_window_ms;
        self.blobs
            .iter()
            .filter(|b| self.time_ms - b.added_time_ms < window)
            .map(|b| b.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::state::SpawnRequest;

    #[test]
    fn test_category_counts_include_zeros() {
        let mut world = World::new(SimConfig::default());
        world.spawn(&SpawnRequest::new(Category::Hope, 0.4));
        world.spawn(&SpawnRequest::new(Category::Hope, 0.6));
        world.spawn(&SpawnRequest::new(Category::Ambivalent, 0.0));

        let counts = world.category_counts();
        assert_eq!(counts.len(), 5);
        assert_eq!(counts[&Category::Hope], 2);
        assert_eq!(counts[&Category::Ambivalent], 1);
        assert_eq!(counts[&Category::Sorrow], 0);
        assert_eq!(world.blob_count(), 3);
    }

    #[test]
    fn test_newly_spawned_window() {
        let mut world = World::new(SimConfig::default());
        let old = world.spawn(&SpawnRequest::default());
        world.time_ms = 31_000.0;
        let fresh = world.spawn(&SpawnRequest::default());
        assert_eq!(world.newly_spawned(), vec![fresh]);
        assert!(world.blobs.get(old).is_some());
    }

    #[test]
    fn test_snapshot_flags() {
        let mut world = World::new(SimConfig::default());
        let a = world.spawn(&SpawnRequest::default());
        let b = world.spawn(&SpawnRequest::default());
        world.selected.push(a);
        world.hovered = Some(b);

        let snap = world.snapshot();
        assert_eq!(snap.len(), 2);
        assert!(snap[0].is_selected && !snap[0].is_hovered);
        assert!(!snap[1].is_selected && snap[1].is_hovered);
        assert!(snap.iter().all(|s| s.is_new));

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"category\":\"reflective_neutral\""));
    }

    #[test]
    fn test_ripple_snapshot_fades() {
        let mut world = World::new(SimConfig::default());
        world.handle_pointer(crate::sim::PointerEvent::down(300.0, 200.0));
        let snap = world.ripple_snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].position, Vec2::new(300.0, 200.0));
        assert!((snap[0].opacity - 1.0).abs() < 1e-6);

        world.time_ms += world.config.ripple_lifetime_ms * 0.5;
        let snap = world.ripple_snapshot();
        assert!((snap[0].opacity - 0.5).abs() < 1e-3);
    }
}
