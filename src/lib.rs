//! Emotion Blobs - physics simulation for classified emotional utterances
//!
//! Core modules:
//! - `sim`: Deterministic simulation (forces, collisions, interaction, world state)
//! - `config`: Data-driven physics tuning
//! - `feed`: Loading spawn requests produced by an external classifier

pub mod config;
pub mod feed;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use feed::{FeedError, load_feed};
pub use sim::{Category, EntitySnapshot, SpawnRequest, World, tick};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Target frame rate of the host loop
    pub const FRAME_RATE: f32 = 60.0;
    /// Milliseconds per simulation step at the target frame rate
    pub const FRAME_MS: f32 = 1000.0 / FRAME_RATE;

    /// Default canvas dimensions
    pub const WORLD_WIDTH: f32 = 1200.0;
    pub const WORLD_HEIGHT: f32 = 800.0;

    /// Population cap (oldest blob is evicted past this)
    pub const MAX_BLOBS: usize = 80;

    /// Blob size bounds (visual radius, pixels)
    pub const MIN_BLOB_SIZE: f32 = 8.0;
    pub const MAX_BLOB_SIZE: f32 = 30.0;
    /// Collision radius = size + padding
    pub const COLLISION_PADDING: f32 = 5.0;

    /// Below this opacity a blob is skipped by physics entirely
    pub const PHYSICS_OPACITY_CUTOFF: f32 = 0.01;
    /// Below this opacity a blob cannot be picked by the pointer
    pub const HIT_OPACITY_CUTOFF: f32 = 0.1;
}

/// Unit vector from `from` toward `to`, or `None` when the points coincide
#[inline]
pub fn direction_between(from: Vec2, to: Vec2) -> Option<(Vec2, f32)> {
    let delta = to - from;
    let dist = delta.length();
    if dist > 0.0 {
        Some((delta / dist, dist))
    } else {
        None
    }
}

/// Rescale `v` so its length does not exceed `max_len` (direction preserved)
#[inline]
pub fn clamp_length(v: Vec2, max_len: f32) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max_len * max_len {
        v * (max_len / len_sq.sqrt())
    } else {
        v
    }
}
