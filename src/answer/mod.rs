pub mod client;
pub mod messages;

pub use client::{AnswerService, HttpAnswerClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use messages::{AnswerRequest, AnswerResponse};
