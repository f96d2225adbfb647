//! World state and core simulation types
//!
//! The `World` is owned by the host loop and borrowed by `tick` each frame.
//! Cross-references (selection, hover) hold `BlobId`s, never handles, so an
//! evicted blob can't leave anything dangling.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::interaction;
use super::store::BlobStore;
use crate::config::SimConfig;
use crate::consts::*;

/// Emotion category assigned by the external classifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hope,
    Sorrow,
    Transformative,
    Ambivalent,
    #[default]
    ReflectiveNeutral,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Hope,
        Category::Sorrow,
        Category::Transformative,
        Category::Ambivalent,
        Category::ReflectiveNeutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hope => "hope",
            Category::Sorrow => "sorrow",
            Category::Transformative => "transformative",
            Category::Ambivalent => "ambivalent",
            Category::ReflectiveNeutral => "reflective_neutral",
        }
    }

    /// Lenient label parsing (case-insensitive, tolerates a few aliases)
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "hope" | "hopeful" => Some(Category::Hope),
            "sorrow" | "sad" => Some(Category::Sorrow),
            "transformative" => Some(Category::Transformative),
            "ambivalent" => Some(Category::Ambivalent),
            "reflective_neutral" | "reflective" | "neutral" => Some(Category::ReflectiveNeutral),
            _ => None,
        }
    }

    /// Attraction (+) or avoidance (-) toward other blobs
    pub fn social_tendency(&self) -> f32 {
        match self {
            Category::Hope => 0.6,
            Category::Sorrow => -0.3,
            Category::Transformative => 0.7,
            Category::Ambivalent => 0.1,
            Category::ReflectiveNeutral => 0.3,
        }
    }

    /// Suggested base color (0xRRGGBB) for renderers
    pub fn color_hint(&self) -> u32 {
        match self {
            Category::Hope => 0x4caf50,
            Category::Sorrow => 0xe53935,
            Category::Transformative => 0xfdd835,
            Category::Ambivalent => 0x1e88e5,
            Category::ReflectiveNeutral => 0x26c6da,
        }
    }
}

/// Stable blob identifier, never shared by two live blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlobId(pub u32);

/// Spawn request from the classification pipeline.
///
/// Every field is optional on the wire. Missing or out-of-range values are
/// defaulted and clamped by `Blob::from_request`, never rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnRequest {
    /// External identifier (passthrough)
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_category")]
    pub category: Option<Category>,
    #[serde(deserialize_with = "lenient_f32")]
    pub score: Option<f32>,
    #[serde(deserialize_with = "lenient_f32")]
    pub intensity: Option<f32>,
    #[serde(deserialize_with = "lenient_f32")]
    pub confidence: Option<f32>,
    #[serde(deserialize_with = "lenient_string")]
    pub text: Option<String>,
    #[serde(alias = "speakerName", deserialize_with = "lenient_string")]
    pub speaker_name: Option<String>,
    #[serde(alias = "createdAt", deserialize_with = "lenient_string")]
    pub created_at: Option<String>,
    /// Spawn point; a random point in the safe zone when absent
    #[serde(deserialize_with = "lenient_position")]
    pub position: Option<Vec2>,
}

impl SpawnRequest {
    pub fn new(category: Category, score: f32) -> Self {
        Self {
            category: Some(category),
            score: Some(score),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_levels(mut self, intensity: f32, confidence: f32) -> Self {
        self.intensity = Some(intensity);
        self.confidence = Some(confidence);
        self
    }

    pub fn at(mut self, pos: Vec2) -> Self {
        self.position = Some(pos);
        self
    }
}

// Wire fields never fail deserialization: a value of the wrong type is
// logged and treated as missing.

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(label) => {
            let parsed = Category::from_label(&label);
            if parsed.is_none() {
                log::warn!("Unknown category {:?}, treating as reflective_neutral", label);
            }
            parsed
        }
        other => {
            log::warn!("Category {} is not a label, treating as reflective_neutral", other);
            None
        }
    })
}

fn lenient_f32<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(text) => {
            let parsed = text.trim().parse::<f32>().ok();
            if parsed.is_none() {
                log::warn!("Non-numeric value {:?} ignored", text);
            }
            parsed
        }
        other => {
            log::warn!("Non-numeric value {} ignored", other);
            None
        }
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            log::warn!("Non-text value {} ignored", other);
            None
        }
    })
}

fn lenient_position<'de, D>(deserializer: D) -> Result<Option<Vec2>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => serde_json::from_value::<Vec2>(other.clone())
            .map_err(|_| log::warn!("Position {} is not [x, y], using a random spot", other))
            .ok(),
    })
}

/// Clamp an optional input into range, substituting `default` for missing/NaN
fn sanitize(value: Option<f32>, default: f32, lo: f32, hi: f32, field: &str) -> f32 {
    match value {
        Some(v) if v.is_nan() => {
            log::warn!("{} is NaN, using {}", field, default);
            default
        }
        Some(v) => {
            let clamped = v.clamp(lo, hi);
            if clamped != v {
                log::warn!("{} = {} out of range, clamped to {}", field, v, clamped);
            }
            clamped
        }
        None => default,
    }
}

/// A simulated emotion particle
#[derive(Debug, Clone, Serialize)]
pub struct Blob {
    pub id: BlobId,
    pub external_id: Option<String>,
    pub category: Category,
    /// Sentiment polarity in [-1, 1]
    pub score: f32,
    pub intensity: f32,
    pub confidence: f32,
    pub text: String,
    pub speaker_name: String,
    pub created_at: Option<String>,

    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,

    /// Visual radius, in [MIN_BLOB_SIZE, MAX_BLOB_SIZE]
    pub size: f32,
    pub mass: f32,
    pub opacity: f32,
    pub target_opacity: f32,
    pub social_tendency: f32,
    pub energy_level: f32,
    pub float_offset: f32,
    /// Consecutive frames spent motionless near a corner
    pub stuck_timer: u32,

    pub is_new: bool,
    /// Simulation clock (ms) at insertion
    pub added_time_ms: f64,
}

impl Blob {
    /// Build a blob from a spawn request, defaulting and clamping its inputs
    pub fn from_request(id: BlobId, req: &SpawnRequest, pos: Vec2, vel: Vec2, now_ms: f64) -> Self {
        let category = req.category.unwrap_or_default();
        let score = sanitize(req.score, 0.0, -1.0, 1.0, "score");
        let intensity = sanitize(req.intensity, 0.5, 0.0, 1.0, "intensity");
        let confidence = sanitize(req.confidence, 0.5, 0.0, 1.0, "confidence");

        let size = (MIN_BLOB_SIZE + 14.0 * intensity + 8.0 * confidence)
            .clamp(MIN_BLOB_SIZE, MAX_BLOB_SIZE);
        let mass = (size / 20.0) * (0.8 + 0.4 * intensity);

        Self {
            id,
            external_id: req.id.clone(),
            category,
            score,
            intensity,
            confidence,
            text: req.text.clone().unwrap_or_default(),
            speaker_name: req.speaker_name.clone().unwrap_or_default(),
            created_at: req.created_at.clone(),
            pos,
            vel,
            acc: Vec2::ZERO,
            size,
            mass,
            opacity: 0.0,
            target_opacity: 1.0,
            social_tendency: category.social_tendency(),
            energy_level: 0.5 + 1.5 * intensity,
            float_offset: 0.0,
            stuck_timer: 0,
            is_new: true,
            added_time_ms: now_ms,
        }
    }

    /// Collision boundary
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size + COLLISION_PADDING
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Whether physics runs for this blob this frame
    #[inline]
    pub fn is_physical(&self) -> bool {
        self.opacity > PHYSICS_OPACITY_CUTOFF
    }

    /// Accumulate a force (a += F / m)
    #[inline]
    pub fn apply_force(&mut self, force: Vec2) {
        self.acc += force / self.mass;
    }

    /// Ease opacity toward its target by a fixed fraction of the gap
    pub fn fade(&mut self, easing: f32) {
        self.opacity += (self.target_opacity - self.opacity) * easing;
        self.opacity = self.opacity.clamp(0.0, 1.0);
    }
}

/// Transient click ripple (visual only)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Ripple {
    pub pos: Vec2,
    pub born_ms: f64,
}

impl Ripple {
    /// Linear fade from 1 at birth to 0 at `lifetime_ms`
    pub fn opacity(&self, now_ms: f64, lifetime_ms: f64) -> f32 {
        if lifetime_ms <= 0.0 {
            return 0.0;
        }
        (1.0 - (now_ms - self.born_ms) / lifetime_ms).clamp(0.0, 1.0) as f32
    }

    pub fn is_expired(&self, now_ms: f64, lifetime_ms: f64) -> bool {
        now_ms - self.born_ms >= lifetime_ms
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub config: SimConfig,
    pub blobs: BlobStore,
    /// Categories currently filtered out of view
    pub hidden: BTreeSet<Category>,
    pub selected: Vec<BlobId>,
    pub hovered: Option<BlobId>,
    pub ripples: Vec<Ripple>,
    /// Simulation clock in milliseconds
    pub time_ms: f64,
    /// Steps executed so far
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
}

impl World {
    /// Create an empty world
    pub fn new(config: SimConfig) -> Self {
        let config = config.sanitized();
        Self {
            blobs: BlobStore::new(config.max_blobs),
            rng: Pcg32::seed_from_u64(config.seed),
            config,
            hidden: BTreeSet::new(),
            selected: Vec::new(),
            hovered: None,
            ripples: Vec::new(),
            time_ms: 0.0,
            time_ticks: 0,
        }
    }

    /// Uniform random point inside the central safe zone
    pub(crate) fn random_safe_point(&mut self) -> Vec2 {
        let (x0, x1) = self.config.safe_zone_x;
        let (y0, y1) = self.config.safe_zone_y;
        Vec2::new(
            self.config.width * self.rng.random_range(x0..=x1),
            self.config.height * self.rng.random_range(y0..=y1),
        )
    }

    /// Insert a blob for a spawn request. Evicts the oldest blob at capacity
    /// and pushes nearby blobs aside.
    pub fn spawn(&mut self, req: &SpawnRequest) -> BlobId {
        let bounds = Vec2::new(self.config.width, self.config.height);
        let pos = match req.position {
            Some(p) if p.is_finite() => p.clamp(Vec2::ZERO, bounds),
            _ => self.random_safe_point(),
        };
        let vel = Vec2::new(
            self.rng.random_range(-0.25..=0.25),
            self.rng.random_range(-0.25..=0.25),
        );

        let id = self.blobs.allocate_id();
        let mut blob = Blob::from_request(id, req, pos, vel, self.time_ms);
        if self.hidden.contains(&blob.category) {
            blob.target_opacity = 0.0;
        }

        interaction::spawn_wave(self.blobs.as_mut_slice(), &self.config, pos);

        log::info!(
            "Spawned blob {:?} ({}, score {:.2}, size {:.1})",
            id,
            blob.category.as_str(),
            blob.score,
            blob.size
        );
        let (id, evicted) = self.blobs.insert(blob);
        if let Some(old) = evicted {
            log::info!("Evicted oldest blob {:?} at capacity", old.id);
            self.prune_references();
        }
        id
    }

    /// Spawn a whole feed in order
    pub fn spawn_batch<'a>(&mut self, reqs: impl IntoIterator<Item = &'a SpawnRequest>) -> Vec<BlobId> {
        reqs.into_iter().map(|r| self.spawn(r)).collect()
    }

    pub fn remove(&mut self, id: BlobId) -> bool {
        let removed = self.blobs.remove(id).is_some();
        if removed {
            self.prune_references();
        }
        removed
    }

    /// Remove everything, or one category when given
    pub fn clear(&mut self, category: Option<Category>) -> usize {
        let count = match category {
            Some(c) => self.blobs.remove_by_category(c),
            None => self.blobs.clear(),
        };
        log::info!(
            "Cleared {} blobs ({})",
            count,
            category.map(|c| c.as_str()).unwrap_or("all")
        );
        self.prune_references();
        count
    }

    /// Show or hide a category; hidden blobs fade out and stop simulating
    pub fn set_category_visible(&mut self, category: Category, visible: bool) {
        if visible {
            self.hidden.remove(&category);
        } else {
            self.hidden.insert(category);
        }
        let target = if visible { 1.0 } else { 0.0 };
        for blob in self.blobs.iter_mut().filter(|b| b.category == category) {
            blob.target_opacity = target;
        }
        log::debug!("Category {} visible = {}", category.as_str(), visible);
    }

    pub fn is_category_visible(&self, category: Category) -> bool {
        !self.hidden.contains(&category)
    }

    /// Collapse near-identical utterances, keeping the earlier blob
    pub fn remove_duplicates(&mut self, threshold: f32) -> usize {
        let removed = self.blobs.remove_duplicates(threshold);
        if !removed.is_empty() {
            log::info!("Removed {} duplicate blobs", removed.len());
            self.prune_references();
        }
        removed.len()
    }

    /// Drop selection/hover IDs that no longer resolve
    fn prune_references(&mut self) {
        let blobs = &self.blobs;
        self.selected.retain(|id| blobs.get(*id).is_some());
        if self.hovered.is_some_and(|id| blobs.get(id).is_none()) {
            self.hovered = None;
        }
    }
}
