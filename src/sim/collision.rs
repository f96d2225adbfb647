//! Pairwise blob collision detection and response
//!
//! Soft, mass-weighted separation: overlapping pairs get a separation force
//! plus an immediate velocity nudge, then both are lightly damped. Each pair
//! is resolved once per step (i < j), with no global iterative solve.

use glam::Vec2;

use super::state::Blob;
use crate::config::SimConfig;
use crate::direction_between;

/// Overlap between two blobs
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit normal pointing from the first blob toward the second
    pub normal: Vec2,
    pub distance: f32,
    /// Sum of collision radii
    pub reach: f32,
    /// Penetration depth (reach - distance)
    pub overlap: f32,
}

/// Detect overlap between two blobs. Coincident centres have no usable
/// normal and report no contact.
pub fn detect_contact(a: &Blob, b: &Blob) -> Option<Contact> {
    let reach = a.radius() + b.radius();
    let (normal, distance) = direction_between(a.pos, b.pos)?;
    if distance >= reach {
        return None;
    }
    Some(Contact {
        normal,
        distance,
        reach,
        overlap: reach - distance,
    })
}

/// Separation force magnitude for a blob of `mass` in `contact`
pub fn separation_magnitude(contact: &Contact, mass: f32, config: &SimConfig) -> f32 {
    let proximity = if contact.distance < config.deep_overlap_ratio * contact.reach {
        config.deep_overlap_multiplier
    } else {
        1.0
    };
    contact.overlap * config.collision_strength * proximity / mass
}

fn push(blob: &mut Blob, force: Vec2, config: &SimConfig) {
    blob.apply_force(force);
    blob.vel += force * config.collision_velocity_share;
    blob.vel *= config.collision_damping;
}

/// Resolve every overlapping visible pair. Returns the number of contacts.
pub fn resolve_collisions(blobs: &mut [Blob], config: &SimConfig) -> usize {
    let mut contacts = 0;
    for i in 0..blobs.len() {
        let (head, tail) = blobs.split_at_mut(i + 1);
        let a = &mut head[i];
        if !a.is_physical() {
            continue;
        }
        for b in tail.iter_mut() {
            if !b.is_physical() {
                continue;
            }
            let Some(contact) = detect_contact(a, b) else {
                continue;
            };
            let force_a = -contact.normal * separation_magnitude(&contact, a.mass, config);
            let force_b = contact.normal * separation_magnitude(&contact, b.mass, config);
            push(a, force_a, config);
            push(b, force_b, config);
            contacts += 1;
        }
    }
    contacts
}
