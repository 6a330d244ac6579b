pub mod json_store;
pub mod schema;

pub use json_store::{JsonStore, SETTINGS_KEY, merge_over_defaults};
