//! Pointer interaction: hit-testing, click nudges, spawn waves, ripples

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::forces::is_cornered;
use super::state::{Blob, BlobId, Ripple, World};
use crate::config::SimConfig;
use crate::consts::HIT_OPACITY_CUTOFF;
use crate::direction_between;

/// Pointer event kinds the core reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
}

/// Pointer event in canvas coordinates (already filtered of UI clicks)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pos: Vec2,
    pub kind: PointerKind,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self { pos: Vec2::new(x, y), kind: PointerKind::Down }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self { pos: Vec2::new(x, y), kind: PointerKind::Move }
    }
}

/// Pick radius: much larger than the drawn blob so small targets stay clickable
#[inline]
pub fn hit_radius(size: f32, config: &SimConfig) -> f32 {
    (size * config.hit_size_multiplier).max(config.min_hit_radius)
}

/// Topmost (newest) visible blob under the pointer
pub fn hit_test(blobs: &[Blob], config: &SimConfig, pos: Vec2) -> Option<BlobId> {
    blobs
        .iter()
        .rev()
        .filter(|b| b.opacity > HIT_OPACITY_CUTOFF)
        .find(|b| b.pos.distance(pos) <= hit_radius(b.size, config))
        .map(|b| b.id)
}

fn random_unit(rng: &mut Pcg32) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::new(angle.cos(), angle.sin())
}

/// Scatter blobs around a click. Returns how many blobs were pushed.
pub fn nudge(blobs: &mut [Blob], config: &SimConfig, rng: &mut Pcg32, click: Vec2) -> usize {
    let center = config.center();
    let mut affected = 0;

    for blob in blobs.iter_mut().filter(|b| b.is_physical()) {
        let d = blob.pos.distance(click);
        if d >= config.nudge_radius {
            continue;
        }
        let away = direction_between(click, blob.pos)
            .map(|(n, _)| n)
            .unwrap_or_else(|| random_unit(rng));

        let proximity = (config.nudge_radius - d) / config.nudge_radius;
        let size_multiplier = 2.5 / (blob.size / 20.0 + 0.3);
        let close_bonus = if d < config.nudge_close_radius {
            config.nudge_close_bonus
        } else {
            1.0
        };
        let jitter = Vec2::new(rng.random_range(-0.5..=0.5), rng.random_range(-0.5..=0.5));
        let force =
            away * (proximity * config.nudge_strength * size_multiplier * close_bonus) + jitter;
        // Rescue eligibility is judged on the speed the blob had before the click
        let was_slow = blob.speed() < 0.1;

        blob.apply_force(force);
        blob.vel += force * config.nudge_velocity_share;

        // Cornered blobs also get hauled back toward the middle
        if blob.stuck_timer > 0 || is_cornered(blob.pos, config) {
            if let Some((to_center, _)) = direction_between(blob.pos, center) {
                let pull = to_center * config.nudge_strength * 0.5;
                blob.apply_force(pull);
                blob.vel += pull * config.nudge_velocity_share;
            }
        }

        // Stuck-blob rescue
        if was_slow {
            blob.vel += Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0));
        }
        affected += 1;
    }

    if affected > 0 {
        log::debug!("Nudge at ({:.0}, {:.0}) moved {} blobs", click.x, click.y, affected);
    }
    affected
}

/// Push existing blobs away from a newly spawned one
pub fn spawn_wave(blobs: &mut [Blob], config: &SimConfig, origin: Vec2) {
    for blob in blobs.iter_mut().filter(|b| b.is_physical()) {
        let Some((n, d)) = direction_between(origin, blob.pos) else {
            continue;
        };
        if d < config.spawn_wave_radius {
            let magnitude =
                (config.spawn_wave_radius - d) / config.spawn_wave_radius * config.spawn_wave_strength;
            blob.apply_force(n * magnitude);
        }
    }
}

impl World {
    /// Topmost blob under the pointer, if any
    pub fn hit_at(&self, x: f32, y: f32) -> Option<BlobId> {
        hit_test(self.blobs.as_slice(), &self.config, Vec2::new(x, y))
    }

    /// Apply a pointer event between steps
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event.kind {
            PointerKind::Move => {
                self.hovered = hit_test(self.blobs.as_slice(), &self.config, event.pos);
            }
            PointerKind::Down => {
                if let Some(id) = hit_test(self.blobs.as_slice(), &self.config, event.pos) {
                    if let Some(idx) = self.selected.iter().position(|s| *s == id) {
                        self.selected.remove(idx);
                    } else {
                        self.selected.push(id);
                    }
                }
                self.ripples.push(Ripple {
                    pos: event.pos,
                    born_ms: self.time_ms,
                });
                nudge(self.blobs.as_mut_slice(), &self.config, &mut self.rng, event.pos);
            }
        }
    }

    /// Drop ripples past their lifetime
    pub fn expire_ripples(&mut self) {
        let (now, lifetime) = (self.time_ms, self.config.ripple_lifetime_ms);
        self.ripples.retain(|r| !r.is_expired(now, lifetime));
    }
}
