pub mod canvas;
pub mod verifier;

pub use canvas::{encode_png, flatten_on_white};
pub use verifier::{DrawingClassifier, DrawingVerifier, RemoteClassifier, parse_verdict};
