//! Per-blob force model
//!
//! Forces accumulate into `Blob::acc` in a fixed order: organic float,
//! sentiment gravity, social attraction/repulsion, then boundary containment
//! (corners, edges, re-centering) and stuck recovery. Positions are read
//! from a snapshot taken before the pass, so every blob sees the same frame.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::Blob;
use crate::config::SimConfig;
use crate::direction_between;

/// Read-only view of a neighbour for the social pass
#[derive(Debug, Clone, Copy)]
struct Neighbor {
    pos: Vec2,
    tendency: f32,
    physical: bool,
}

/// Accumulate every non-collision force for all visible blobs
pub fn apply_forces(blobs: &mut [Blob], config: &SimConfig, rng: &mut Pcg32) {
    let snapshot: Vec<Neighbor> = blobs
        .iter()
        .map(|b| Neighbor {
            pos: b.pos,
            tendency: b.social_tendency,
            physical: b.is_physical(),
        })
        .collect();

    for (i, blob) in blobs.iter_mut().enumerate() {
        if !blob.is_physical() {
            continue;
        }
        floating_force(blob, config);
        gravity_force(blob, config);
        social_force(blob, i, &snapshot, config);
        boundary_force(blob, config);
        recenter_force(blob, config);
        stuck_recovery(blob, config, rng);
    }
}

/// Slow Lissajous drift; energetic blobs wander faster
pub fn floating_force(blob: &mut Blob, config: &SimConfig) {
    blob.float_offset += config.float_phase_rate * blob.energy_level;
    let force = Vec2::new(
        blob.float_offset.sin() * config.float_strength,
        (blob.float_offset * 1.3).cos() * config.float_strength,
    );
    blob.apply_force(force);
}

/// Positive sentiment rises, negative sinks (screen y grows downward)
pub fn gravity_force(blob: &mut Blob, config: &SimConfig) {
    let force = Vec2::new(0.0, -blob.score * config.gravity * blob.mass * 0.5);
    blob.apply_force(force);
}

fn social_force(blob: &mut Blob, index: usize, others: &[Neighbor], config: &SimConfig) {
    let mut total = Vec2::ZERO;
    for (j, other) in others.iter().enumerate() {
        if j == index || !other.physical {
            continue;
        }
        let Some((n, d)) = direction_between(blob.pos, other.pos) else {
            continue;
        };
        if d >= config.social_radius {
            continue;
        }
        total += pair_social_force(n, d, blob.social_tendency, other.tendency, config);
    }
    blob.apply_force(total);
}

/// Social force on a blob from one neighbour at distance `d` along unit `n`.
/// Inside personal space the pair always repels.
pub fn pair_social_force(n: Vec2, d: f32, own: f32, other: f32, config: &SimConfig) -> Vec2 {
    if d < config.personal_space {
        let magnitude = (config.personal_space - d) / config.personal_space
            * config.personal_space_strength;
        -n * magnitude
    } else {
        let magnitude = (own + other) * config.social_strength / (d * d + 1.0);
        n * magnitude
    }
}

/// Margin-adjusted canvas corners: top-left, top-right, bottom-left, bottom-right
pub fn corners(config: &SimConfig) -> [Vec2; 4] {
    let m = &config.margins;
    let (left, right) = (m.side, config.width - m.side);
    let (top, bottom) = (m.top, config.height - m.bottom);
    [
        Vec2::new(left, top),
        Vec2::new(right, top),
        Vec2::new(left, bottom),
        Vec2::new(right, bottom),
    ]
}

/// Closest margin-adjusted corner and the distance to it
pub fn nearest_corner(pos: Vec2, config: &SimConfig) -> (Vec2, f32) {
    corners(config)
        .into_iter()
        .map(|c| (c, pos.distance(c)))
        .fold((Vec2::ZERO, f32::INFINITY), |best, cand| {
            if cand.1 < best.1 { cand } else { best }
        })
}

/// Small blobs get disproportionately strong containment
#[inline]
pub fn small_blob_multiplier(size: f32) -> f32 {
    let size_ratio = size / 20.0;
    (3.0 / (size_ratio + 0.1)).max(1.0)
}

/// Corner repulsion (applied first, with extra damping) then edge repulsion
pub fn boundary_force(blob: &mut Blob, config: &SimConfig) {
    let multiplier = small_blob_multiplier(blob.size);
    let strength = config.boundary_strength * multiplier;

    let (corner, dist) = nearest_corner(blob.pos, config);
    if dist < config.corner_radius {
        let away = direction_between(corner, blob.pos)
            .map(|(n, _)| n)
            .unwrap_or_else(|| (config.center() - corner).normalize_or_zero());
        let magnitude =
            (config.corner_radius - dist) / config.corner_radius * config.corner_strength * multiplier;
        blob.apply_force(away * magnitude);
        blob.vel *= config.corner_damping;
    }

    let m = &config.margins;
    let exp = config.edge_exponent;
    let mut force = Vec2::ZERO;
    let (x, y) = (blob.pos.x, blob.pos.y);

    if x < m.side {
        let penetration = (m.side - x) / m.side;
        force.x += penetration.powf(exp) * strength * m.side;
    } else if x > config.width - m.side {
        let penetration = (x - (config.width - m.side)) / m.side;
        force.x -= penetration.powf(exp) * strength * m.side;
    }

    if y < m.top {
        let penetration = (m.top - y) / m.top;
        force.y += penetration.powf(exp) * strength * m.top * config.top_edge_boost;
    } else if y > config.height - m.bottom {
        let penetration = (y - (config.height - m.bottom)) / m.bottom;
        force.y -= penetration.powf(exp) * strength * m.bottom;
    }

    if force != Vec2::ZERO {
        blob.apply_force(force);
    }
}

/// Weak pull back toward the middle for blobs that wander far out
pub fn recenter_force(blob: &mut Blob, config: &SimConfig) {
    if let Some((n, d)) = direction_between(blob.pos, config.center()) {
        if d > config.recenter_radius {
            blob.apply_force(n * config.recenter_strength);
        }
    }
}

/// Whether a blob sits close enough to a corner to count as cornered
#[inline]
pub fn is_cornered(pos: Vec2, config: &SimConfig) -> bool {
    nearest_corner(pos, config).1 < config.stuck_corner_radius
}

/// Count frames spent motionless in a corner and teleport the blob to the
/// safe zone once the count passes `stuck_frames`. Returns true on teleport.
pub fn stuck_recovery(blob: &mut Blob, config: &SimConfig, rng: &mut Pcg32) -> bool {
    if is_cornered(blob.pos, config) && blob.speed() < config.stuck_speed {
        blob.stuck_timer += 1;
    } else {
        blob.stuck_timer = 0;
    }

    if blob.stuck_timer <= config.stuck_frames {
        return false;
    }

    let (x0, x1) = config.safe_zone_x;
    let (y0, y1) = config.safe_zone_y;
    let from = blob.pos;
    blob.pos = Vec2::new(
        config.width * rng.random_range(x0..=x1),
        config.height * rng.random_range(y0..=y1),
    );
    blob.vel = Vec2::new(rng.random_range(-0.25..=0.25), rng.random_range(-0.25..=0.25));
    // Forces gathered at the old position no longer apply
    blob.acc = Vec2::ZERO;
    blob.stuck_timer = 0;
    log::debug!(
        "Blob {:?} stuck at ({:.0}, {:.0}), teleported to ({:.0}, {:.0})",
        blob.id,
        from.x,
        from.y,
        blob.pos.x,
        blob.pos.y
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BlobId, Category, SpawnRequest};
    use rand::SeedableRng;

    fn blob_at(pos: Vec2, category: Category, score: f32) -> Blob {
        let req = SpawnRequest::new(category, score).with_levels(0.5, 0.5);
        let mut blob = Blob::from_request(BlobId(1), &req, pos, Vec2::ZERO, 0.0);
        blob.opacity = 1.0;
        blob
    }

    #[test]
    fn test_gravity_direction() {
        let config = SimConfig::default();
        let mut sad = blob_at(Vec2::ZERO, Category::Sorrow, -0.9);
        let mut glad = blob_at(Vec2::ZERO, Category::Hope, 0.9);
        gravity_force(&mut sad, &config);
        gravity_force(&mut glad, &config);
        assert!(sad.acc.y > 0.0, "sorrow sinks");
        assert!(glad.acc.y < 0.0, "hope rises");
        assert!((sad.acc.y - 0.9 * 0.002 * 0.5).abs() < 1e-7);
    }

    #[test]
    fn test_personal_space_always_repels() {
        let config = SimConfig::default();
        let n = Vec2::X;
        let f = pair_social_force(n, 30.0, 0.7, 0.7, &config);
        assert!(f.x < 0.0);
        assert!((f.x + 0.5 * 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_social_sign_follows_tendency() {
        let config = SimConfig::default();
        let n = Vec2::X;
        assert!(pair_social_force(n, 80.0, 0.6, 0.7, &config).x > 0.0);
        assert!(pair_social_force(n, 80.0, -0.3, -0.3, &config).x < 0.0);
    }

    #[test]
    fn test_coincident_neighbours_contribute_nothing() {
        let config = SimConfig::default();
        let mut blobs = vec![
            blob_at(Vec2::new(600.0, 400.0), Category::Hope, 0.0),
            blob_at(Vec2::new(600.0, 400.0), Category::Hope, 0.0),
        ];
        let snapshot: Vec<Neighbor> = blobs
            .iter()
            .map(|b| Neighbor { pos: b.pos, tendency: b.social_tendency, physical: true })
            .collect();
        social_force(&mut blobs[0], 0, &snapshot, &config);
        assert_eq!(blobs[0].acc, Vec2::ZERO);
    }

    #[test]
    fn test_small_blob_multiplier() {
        assert!((small_blob_multiplier(8.0) - 6.0).abs() < 1e-5);
        assert!(small_blob_multiplier(30.0) > 1.0);
        assert!(small_blob_multiplier(8.0) > small_blob_multiplier(30.0));
    }

    #[test]
    fn test_corner_pushes_inward_and_damps() {
        let config = SimConfig::default();
        let mut blob = blob_at(Vec2::new(100.0, 140.0), Category::Hope, 0.0);
        blob.vel = Vec2::new(1.0, 0.0);
        boundary_force(&mut blob, &config);
        assert!(blob.acc.x > 0.0 && blob.acc.y > 0.0);
        assert!((blob.vel.x - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_edges_push_inward() {
        let config = SimConfig::default();
        // Left edge, mid height, far from any corner
        let mut blob = blob_at(Vec2::new(20.0, 400.0), Category::Hope, 0.0);
        boundary_force(&mut blob, &config);
        assert!(blob.acc.x > 0.0);
        assert_eq!(blob.acc.y, 0.0);

        let mut blob = blob_at(Vec2::new(600.0, 790.0), Category::Hope, 0.0);
        boundary_force(&mut blob, &config);
        assert!(blob.acc.y < 0.0);
    }

    #[test]
    fn test_recenter_only_far_out() {
        let config = SimConfig::default();
        let mut near = blob_at(Vec2::new(700.0, 400.0), Category::Hope, 0.0);
        recenter_force(&mut near, &config);
        assert_eq!(near.acc, Vec2::ZERO);

        let mut far = blob_at(Vec2::new(1000.0, 400.0), Category::Hope, 0.0);
        recenter_force(&mut far, &config);
        assert!(far.acc.x < 0.0);
    }

    #[test]
    fn test_stuck_timer_resets_when_moving() {
        let config = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut blob = blob_at(Vec2::new(90.0, 130.0), Category::Hope, 0.0);
        for _ in 0..10 {
            stuck_recovery(&mut blob, &config, &mut rng);
        }
        assert_eq!(blob.stuck_timer, 10);
        blob.vel = Vec2::new(0.5, 0.0);
        stuck_recovery(&mut blob, &config, &mut rng);
        assert_eq!(blob.stuck_timer, 0);
    }

    #[test]
    fn test_stuck_teleport_lands_in_safe_zone() {
        let config = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut blob = blob_at(Vec2::new(90.0, 130.0), Category::Hope, 0.0);
        for _ in 0..config.stuck_frames {
            assert!(!stuck_recovery(&mut blob, &config, &mut rng));
        }
        assert!(stuck_recovery(&mut blob, &config, &mut rng));
        assert_eq!(blob.stuck_timer, 0);
        assert!((300.0..=900.0).contains(&blob.pos.x));
        assert!((240.0..=560.0).contains(&blob.pos.y));
    }
}
