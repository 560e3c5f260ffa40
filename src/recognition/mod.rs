//! Speech recognition adapter
//!
//! Wraps an event-driven speech-to-text capability behind start/stop and a
//! stream of lifecycle events. Knows nothing about networking or rendering.

pub mod adapter;
pub mod backend;
pub mod command;
pub mod scripted;

pub use adapter::RecognitionAdapter;
pub use backend::{
    RecognitionBackend, RecognitionBackendConfig, RecognitionBackendFactory, RecognitionEvent,
    RecognitionSource, DEFAULT_LANGUAGE,
};
pub use command::CommandBackend;
pub use scripted::ScriptedBackend;
