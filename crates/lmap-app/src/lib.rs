//! lmap-app - Host state and orchestration for Light Maps
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the host
//! side of the map bridge: the Engine event loop, the persistent preference
//! store, the debounced search pipeline and the location flow.

pub mod actions;
pub mod config;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod location;
pub mod message;
pub mod process;
pub mod search;
pub mod state;
pub mod store;

// Re-export primary types
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{PreferenceUpdate, UpdateAction, UpdateResult};
pub use location::{LocalLocationProvider, LocationPhase, LocationProvider, StaticLocationProvider};
pub use message::Message;
pub use search::{SearchHistory, SearchState, SearchView};
pub use state::AppState;
pub use store::{FileStore, MemoryStore, Persistence, PreferenceStore, StoredState};
