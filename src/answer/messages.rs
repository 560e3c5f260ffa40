use serde::{Deserialize, Serialize};

use crate::error::AnswerError;

/// Request body posted to the answer endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub text: String,
}

/// Response body returned by the answer endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// Echo of the transcript; not used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnswerResponse {
    /// Classify the body: a non-empty `error` wins, then a non-empty `answer`
    pub fn into_outcome(self) -> Result<String, AnswerError> {
        if let Some(error) = self.error.filter(|e| !e.trim().is_empty()) {
            return Err(AnswerError::Service(error));
        }
        match self.answer.filter(|a| !a.trim().is_empty()) {
            Some(answer) => Ok(answer),
            None => Err(AnswerError::MalformedResponse(
                "response has neither answer nor error".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_wins_over_answer() {
        let resp = AnswerResponse {
            answer: Some("3 PM".into()),
            error: Some("rate limited".into()),
            ..Default::default()
        };
        assert_eq!(resp.into_outcome(), Err(AnswerError::Service("rate limited".into())));
    }

    #[test]
    fn empty_error_falls_through_to_answer() {
        let resp = AnswerResponse {
            answer: Some("3 PM".into()),
            error: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(resp.into_outcome(), Ok("3 PM".to_string()));
    }

    #[test]
    fn echo_only_is_malformed() {
        let resp = AnswerResponse {
            transcript: Some("hello".into()),
            ..Default::default()
        };
        assert!(matches!(resp.into_outcome(), Err(AnswerError::MalformedResponse(_))));
    }
}
