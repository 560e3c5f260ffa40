pub mod answer;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod recognition;
pub mod session;

pub use answer::{AnswerRequest, AnswerResponse, AnswerService, HttpAnswerClient};
pub use config::Config;
pub use controller::{ControllerHandle, InteractionController};
pub use error::{AnswerError, VoiceError};
pub use http::{create_router, AppState};
pub use recognition::{
    RecognitionAdapter, RecognitionBackend, RecognitionBackendConfig, RecognitionBackendFactory,
    RecognitionEvent, RecognitionSource,
};
pub use session::{
    Effect, Input, Phase, RecognitionErrorPolicy, Session, SessionConfig, SessionSnapshot,
    StatusLabels,
};
