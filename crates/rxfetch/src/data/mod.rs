//! Data layer: immutable values exchanged with executors and configuration.

pub mod options;
pub mod progress;
pub mod response;
pub mod target;

pub use options::ExecutorOptions;
pub use progress::Progress;
pub use response::Response;
pub use target::{Method, TargetType};
