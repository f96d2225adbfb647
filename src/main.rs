//! Emotion Blobs entry point
//!
//! Headless native driver: loads a feed, runs the simulation at a fixed
//! frame rate and prints the final frame as JSON.
//!
//! Usage: `emotion-blobs [feed.json] [config.json]`

use std::path::Path;

use emotion_blobs::consts::*;
use emotion_blobs::sim::{Category, InputEvent, PointerEvent, SpawnRequest, TickInput, World, tick};
use emotion_blobs::{SimConfig, load_feed};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Seconds of simulated time the driver runs for
const RUN_SECONDS: f32 = 10.0;

/// Host loop holding the world and the pending input queue
struct Host {
    world: World,
    input: TickInput,
    accumulator: f32,
}

impl Host {
    fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(config),
            input: TickInput::default(),
            accumulator: 0.0,
        }
    }

    /// Run whole frames for `elapsed_ms`; events queue up until the next frame
    fn update(&mut self, elapsed_ms: f32) {
        self.accumulator += elapsed_ms;
        while self.accumulator >= FRAME_MS {
            let input = std::mem::take(&mut self.input);
            tick(&mut self.world, &input, FRAME_MS);
            self.accumulator -= FRAME_MS;
        }
    }
}

/// Synthetic population when no feed is given
fn demo_feed(seed: u64, count: usize) -> Vec<SpawnRequest> {
    let mut rng = Pcg32::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let category = Category::ALL[rng.random_range(0..Category::ALL.len())];
            let score = match category {
                Category::Hope | Category::Transformative => rng.random_range(0.2..1.0),
                Category::Sorrow => rng.random_range(-1.0..-0.1),
                _ => rng.random_range(-0.3..0.3),
            };
            SpawnRequest::new(category, score)
                .with_levels(rng.random_range(0.0..1.0), rng.random_range(0.3..1.0))
                .with_text(format!("utterance {}", i + 1))
        })
        .collect()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Emotion Blobs (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.get(1) {
        Some(path) => SimConfig::load_or_default(Path::new(path)),
        None => SimConfig::default(),
    };
    let seed = config.seed;

    let feed = match args.first() {
        Some(path) => match load_feed(Path::new(path)) {
            Ok(reqs) => reqs,
            Err(e) => {
                log::error!("Failed to load feed {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => demo_feed(seed, 40),
    };

    let mut host = Host::new(config);
    for req in feed {
        host.input.push(InputEvent::Spawn(req));
    }
    host.input.push(InputEvent::remove_duplicates());

    // One second in, click the middle of the canvas to scatter the crowd
    let center = host.world.config.center();
    let frames = (RUN_SECONDS * FRAME_RATE) as u32;
    for frame in 0..frames {
        if frame == FRAME_RATE as u32 {
            host.input.push(InputEvent::Pointer(PointerEvent::down(center.x, center.y)));
        }
        host.update(FRAME_MS);
    }

    for (category, count) in host.world.category_counts() {
        log::info!("{:>20}: {}", category.as_str(), count);
    }
    log::info!(
        "{} blobs after {} frames ({} still new)",
        host.world.blob_count(),
        host.world.time_ticks,
        host.world.newly_spawned().len()
    );

    match serde_json::to_string_pretty(&host.world.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser host in this crate
}
