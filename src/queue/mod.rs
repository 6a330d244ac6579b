pub mod builder;
pub mod options;

pub use builder::{PRIORITY_REPLICATION, SessionQueue, build_queue, recall_order};
pub use options::{OptionSet, build_option_set};
