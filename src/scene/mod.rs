//! World assembly: configuration, decorations and the frame driver

pub mod config;
pub mod decoration;
pub mod manager;
pub mod view;

pub use config::WorldConfig;
pub use decoration::{DecorationConfig, DecorationSet, Visibility, WorldAnchoredObject};
pub use manager::{SceneManager, SceneStats};
pub use view::{DecorationKind, EntityKind, EntityView};
