//! Deterministic blob simulation
//!
//! All physics lives here. This module must stay pure and deterministic:
//! - One step per render frame
//! - Seeded RNG only
//! - Stable iteration order (insertion order, by blob ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod forces;
pub mod interaction;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod tick;

pub use collision::{Contact, detect_contact, resolve_collisions};
pub use interaction::{PointerEvent, PointerKind, hit_test};
pub use snapshot::{EntitySnapshot, RippleSnapshot};
pub use state::{Blob, BlobId, Category, Ripple, SpawnRequest, World};
pub use store::{BlobStore, DUPLICATE_THRESHOLD};
pub use tick::{InputEvent, TickInput, tick};
