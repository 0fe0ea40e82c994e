//! Trainer companion engine.
//!
//! This crate provides:
//! - Trainer and creature records with clamped HP/PP pools
//! - Status effects with per-turn durations
//! - A team registry and trainer inventory
//! - An Intent/Effect rules system: `(state, intent) -> state'`
//! - Snapshot persistence over a key-value store
//!
//! # Quick Start
//!
//! ```ignore
//! use trainer_core::{FileStore, Intent, Session, SessionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileStore::open("trainer-data")?;
//!     let mut session = Session::restore(SessionConfig::new(), store)?;
//!
//!     let response = session.dispatch(Intent::SetCurrency { amount: 1200 });
//!     println!("{}", response.narrative);
//!     Ok(())
//! }
//! ```

pub mod dice;
pub mod persist;
pub mod rules;
pub mod session;
pub mod status;
pub mod team;
pub mod testing;
pub mod view;
pub mod world;

// Primary public API
pub use persist::{FileStore, KeyValueStore, MemoryStore, PersistError, SavedState};
pub use rules::{apply_effects, reduce, Effect, Intent, Resolution, RulesEngine};
pub use session::{Response, Session, SessionConfig, SessionError};
pub use status::{Condition, StatusEffect, StatusSlot};
pub use team::TeamRegistry;
pub use testing::TestHarness;
pub use world::{AppState, Attack, Creature, CreatureId, ItemId, ResourcePool, Trainer};
