pub mod buffer;
pub mod cache;
pub mod local_asset;
pub mod on_device;
pub mod remote_synthesis;
pub mod resolver;
pub mod sink;
pub mod strategy;

pub use buffer::AudioBuffer;
pub use cache::AudioCache;
pub use resolver::{AudioResolver, Outcome};
pub use sink::{AudioSink, NullSink};
pub use strategy::{AudioStrategy, Rendition, Tier};
