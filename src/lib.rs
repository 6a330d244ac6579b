// Headless practice core for alphabet drills: adaptive session queues,
// tiered letter audio and hand-drawn letter checks. The host application
// owns rendering, pointer capture and the playback device.

pub mod audio;
pub mod config;
pub mod drawing;
pub mod error;
pub mod inventory;
pub mod queue;
pub mod remote;
pub mod session;
pub mod store;

pub use config::Settings;
pub use inventory::{Inventory, Symbol};
