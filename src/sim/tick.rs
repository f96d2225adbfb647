//! Fixed-step simulation tick
//!
//! One call advances the world by one render frame. Queued input events are
//! applied first, so the force, collision and integration passes all see a
//! single consistent population.

use glam::Vec2;

use super::collision::resolve_collisions;
use super::forces::apply_forces;
use super::interaction::PointerEvent;
use super::state::{Category, SpawnRequest, World};
use super::store::DUPLICATE_THRESHOLD;
use crate::clamp_length;
use crate::config::SimConfig;

/// Mutation requested by the host, applied at the next step boundary
#[derive(Debug, Clone)]
pub enum InputEvent {
    Spawn(SpawnRequest),
    Pointer(PointerEvent),
    Visibility { category: Category, visible: bool },
    /// Clear one category, or everything when `None`
    Clear { category: Option<Category> },
    RemoveDuplicates { threshold: f32 },
}

impl InputEvent {
    pub fn remove_duplicates() -> Self {
        InputEvent::RemoveDuplicates {
            threshold: DUPLICATE_THRESHOLD,
        }
    }
}

/// Events collected since the last step
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub events: Vec<InputEvent>,
}

impl TickInput {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl World {
    /// Apply one host event immediately (call only between steps)
    pub fn apply_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Spawn(req) => {
                self.spawn(req);
            }
            InputEvent::Pointer(pointer) => self.handle_pointer(*pointer),
            InputEvent::Visibility { category, visible } => {
                self.set_category_visible(*category, *visible)
            }
            InputEvent::Clear { category } => {
                self.clear(*category);
            }
            InputEvent::RemoveDuplicates { threshold } => {
                self.remove_duplicates(*threshold);
            }
        }
    }
}

/// Damp, accelerate, clamp speed, move, clamp to the canvas.
/// Acceleration is cleared afterwards so impulses added between steps
/// (nudges, spawn waves) carry into the next frame.
fn integrate(world: &mut World) {
    let config: &SimConfig = &world.config;
    let bounds = Vec2::new(config.width, config.height);

    for blob in world.blobs.iter_mut() {
        if blob.is_physical() {
            blob.vel *= config.friction;
            blob.vel += blob.acc;
            blob.vel = clamp_length(blob.vel, config.max_speed);
            blob.pos += blob.vel;
            blob.pos = blob.pos.clamp(Vec2::ZERO, bounds);
        } else {
            blob.vel = clamp_length(blob.vel, config.max_speed);
        }
        blob.acc = Vec2::ZERO;
    }
}

/// Advance the world by one frame of `dt_ms` milliseconds
pub fn tick(world: &mut World, input: &TickInput, dt_ms: f32) {
    for event in &input.events {
        world.apply_event(event);
    }

    let easing = world.config.opacity_easing;
    for blob in world.blobs.iter_mut() {
        blob.fade(easing);
    }

    apply_forces(world.blobs.as_mut_slice(), &world.config, &mut world.rng);
    resolve_collisions(world.blobs.as_mut_slice(), &world.config);
    integrate(world);

    world.time_ticks += 1;
    world.time_ms += dt_ms as f64;
    world.expire_ripples();

    let (now, window) = (world.time_ms, world.config.new_blob_window_ms);
    for blob in world.blobs.iter_mut() {
        blob.is_new = now - blob.added_time_ms < window;
    }
}
