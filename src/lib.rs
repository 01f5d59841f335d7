// Tab Deck Library Entry Point
// Exposes all modules so they can be used by main.rs and tested independently.

// Shared state
pub mod error;
pub mod settings;
pub mod state;

// Browser-facing seams
pub mod channel;
pub mod service;
pub mod tab_groups;

// Pure logic modules (no service calls except the commit/close sagas)
pub mod modules;

pub mod manager;

pub use error::{DragError, ServiceError};
pub use manager::TabManager;
pub use service::{InMemoryTabService, TabService};
pub use settings::Settings;
pub use state::{DropPosition, HitTarget, MoveIndex, MoveProperties, Tab, TabId, WindowGroup, WindowId};
