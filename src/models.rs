use serde::{Deserialize, Serialize};

use crate::catalog::{Attraction, Itinerary, ItineraryStop};

/// Request payload for the question endpoint.
/// Absent fields decode as empty strings and are rejected by validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct QuestionRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub context: String,
}

impl QuestionRequest {
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
        }
    }
}

/// Response payload for a successful answer
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AnswerResponse {
    pub answer: String,
}

impl AnswerResponse {
    pub fn new(answer: String) -> Self {
        Self { answer }
    }
}

/// Error envelope shared by every failing endpoint
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}

/// Itinerary page payload: the course plus its stops in visiting order.
#[derive(Debug, Serialize)]
pub struct ItineraryDetail<'a> {
    pub itinerary: &'a Itinerary,
    pub stops: Vec<ItineraryStop<'a>>,
}

/// One attraction with the grounding context sent along with questions
/// and the courses that visit it.
#[derive(Debug, Serialize)]
pub struct AttractionDetail<'a> {
    pub attraction: &'a Attraction,
    pub context: String,
    pub itineraries: Vec<&'a Itinerary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_decode_as_empty() {
        let request: QuestionRequest = serde_json::from_str(r#"{"question":"언제?"}"#).unwrap();
        assert_eq!(request.question, "언제?");
        assert!(request.context.is_empty());
    }

    #[test]
    fn test_answer_response_shape() {
        let json = serde_json::to_value(AnswerResponse::new("아침".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "answer": "아침" }));
    }
}
