//! Physics tuning and world configuration
//!
//! Every constant the simulation reads lives here so hosts can retune the
//! feel of the visualization from a JSON file without recompiling.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors that can occur when loading a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing failed
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Canvas margins reserved for external chrome (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub side: f32,
    pub bottom: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 120.0,
            side: 80.0,
            bottom: 80.0,
        }
    }
}

/// Simulation tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the world RNG
    pub seed: u64,

    // === World ===
    pub width: f32,
    pub height: f32,
    pub max_blobs: usize,
    pub margins: Margins,

    // === Integration ===
    /// Global velocity multiplier per step
    pub friction: f32,
    pub max_speed: f32,
    /// Fraction of the remaining opacity gap closed per step
    pub opacity_easing: f32,

    // === Force model ===
    pub float_strength: f32,
    pub float_phase_rate: f32,
    pub gravity: f32,
    pub social_radius: f32,
    pub personal_space: f32,
    pub personal_space_strength: f32,
    pub social_strength: f32,

    // === Boundary ===
    pub boundary_strength: f32,
    pub top_edge_boost: f32,
    pub edge_exponent: f32,
    pub corner_radius: f32,
    pub corner_strength: f32,
    pub corner_damping: f32,
    pub recenter_radius: f32,
    pub recenter_strength: f32,

    // === Stuck recovery ===
    pub stuck_corner_radius: f32,
    pub stuck_speed: f32,
    /// Frames a blob may sit motionless in a corner before teleporting
    pub stuck_frames: u32,
    /// Safe zone as fractions of width (x) and height (y)
    pub safe_zone_x: (f32, f32),
    pub safe_zone_y: (f32, f32),

    // === Collisions ===
    pub collision_strength: f32,
    pub deep_overlap_ratio: f32,
    pub deep_overlap_multiplier: f32,
    pub collision_velocity_share: f32,
    pub collision_damping: f32,

    // === Interaction ===
    pub hit_size_multiplier: f32,
    pub min_hit_radius: f32,
    pub nudge_radius: f32,
    pub nudge_strength: f32,
    pub nudge_close_radius: f32,
    pub nudge_close_bonus: f32,
    pub nudge_velocity_share: f32,
    pub spawn_wave_radius: f32,
    pub spawn_wave_strength: f32,

    // === Timing (milliseconds on the simulation clock) ===
    pub ripple_lifetime_ms: f64,
    pub new_blob_window_ms: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_b10b,

            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            max_blobs: MAX_BLOBS,
            margins: Margins::default(),

            friction: 0.998,
            max_speed: 1.0,
            opacity_easing: 0.1,

            float_strength: 0.05,
            float_phase_rate: 0.01,
            gravity: 0.002,
            social_radius: 100.0,
            personal_space: 60.0,
            personal_space_strength: 0.02,
            social_strength: 0.008,

            boundary_strength: 0.25,
            top_edge_boost: 1.5,
            edge_exponent: 3.5,
            corner_radius: 250.0,
            corner_strength: 0.8,
            corner_damping: 0.85,
            recenter_radius: 350.0,
            recenter_strength: 0.003,

            stuck_corner_radius: 100.0,
            stuck_speed: 0.05,
            stuck_frames: 60,
            safe_zone_x: (0.25, 0.75),
            safe_zone_y: (0.30, 0.70),

            collision_strength: 0.08,
            deep_overlap_ratio: 0.8,
            deep_overlap_multiplier: 2.0,
            collision_velocity_share: 0.5,
            collision_damping: 0.995,

            hit_size_multiplier: 3.0,
            min_hit_radius: 40.0,
            nudge_radius: 200.0,
            nudge_strength: 8.0,
            nudge_close_radius: 50.0,
            nudge_close_bonus: 2.5,
            nudge_velocity_share: 0.6,
            spawn_wave_radius: 250.0,
            spawn_wave_strength: 0.8,

            ripple_lifetime_ms: 1000.0,
            new_blob_window_ms: 30_000.0,
        }
    }
}

impl SimConfig {
    /// Default config with a different world size
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
        .sanitized()
    }

    /// Parse a config from a JSON string (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load a config from a JSON file on disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load a config, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default config ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp values into ranges the simulation can run with
    pub fn sanitized(mut self) -> Self {
        self.width = self.width.max(1.0);
        self.height = self.height.max(1.0);
        self.max_blobs = self.max_blobs.max(1);
        self.max_speed = self.max_speed.max(0.0);
        self.friction = self.friction.clamp(0.0, 1.0);
        self.opacity_easing = self.opacity_easing.clamp(0.0, 1.0);
        self.corner_damping = self.corner_damping.clamp(0.0, 1.0);
        self.collision_damping = self.collision_damping.clamp(0.0, 1.0);
        self.margins.top = self.margins.top.max(1.0);
        self.margins.side = self.margins.side.max(1.0);
        self.margins.bottom = self.margins.bottom.max(1.0);
        self.safe_zone_x = ordered_fraction(self.safe_zone_x);
        self.safe_zone_y = ordered_fraction(self.safe_zone_y);
        self
    }

    /// Canvas center
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

fn ordered_fraction((a, b): (f32, f32)) -> (f32, f32) {
    let (lo, hi) = (a.clamp(0.0, 1.0), b.clamp(0.0, 1.0));
    if lo <= hi { (lo, hi) } else { (hi, lo) }
}
