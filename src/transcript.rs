//! Caller-side conversation state for one attraction's assistant panel.
//!
//! A [`ChatSession`] lives as long as one view of one attraction. Dropping it
//! is the reset; nothing is persisted or shared between sessions.

use std::collections::VecDeque;
use std::fmt;

use tracing::{error, info};

use crate::models::{AnswerResponse, ErrorResponse, QuestionRequest};

/// Shown to the visitor in place of any failure. The raw error goes to the log.
pub const FRIENDLY_ERROR: &str =
    "죄송합니다, 답변을 가져오는 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Append-only log holding at most `capacity` entries; the oldest entry is
/// dropped once it is full.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    entries: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ChatTranscript {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ChatMessage {
            role,
            content: content.into(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    EmptyQuestion,
    /// A previous question has not been answered yet.
    AnswerPending,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyQuestion => write!(f, "question is empty"),
            SessionError::AnswerPending => write!(f, "an answer is still pending"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Where and how to reach the question proxy.
#[derive(Debug, Clone)]
pub struct ProxyEndpoint {
    pub url: String,
    /// Hosting platform key, sent as both `apikey` and bearer token.
    pub auth_key: Option<String>,
}

/// One attraction's conversation with the proxy.
pub struct ChatSession {
    http: reqwest::Client,
    endpoint: ProxyEndpoint,
    context: String,
    transcript: ChatTranscript,
    awaiting: bool,
}

impl ChatSession {
    pub fn new(http: reqwest::Client, endpoint: ProxyEndpoint, context: String) -> Self {
        Self {
            http,
            endpoint,
            context,
            transcript: ChatTranscript::default(),
            awaiting: false,
        }
    }

    pub fn transcript(&self) -> &ChatTranscript {
        &self.transcript
    }

    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    /// Records the visitor's question and blocks further input until
    /// [`ChatSession::finish`] is called.
    pub fn begin(&mut self, question: &str) -> Result<QuestionRequest, SessionError> {
        if self.awaiting {
            return Err(SessionError::AnswerPending);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        self.transcript.push(Role::User, question);
        self.awaiting = true;
        Ok(QuestionRequest::new(question, self.context.clone()))
    }

    /// Appends the answer, or the friendly message on failure, and reopens input.
    pub fn finish(&mut self, outcome: Result<String, String>) -> ChatMessage {
        let content = match outcome {
            Ok(answer) => answer,
            Err(e) => {
                error!("Failed to get an answer from the proxy: {}", e);
                FRIENDLY_ERROR.to_string()
            }
        };
        self.transcript.push(Role::Assistant, content.clone());
        self.awaiting = false;
        ChatMessage {
            role: Role::Assistant,
            content,
        }
    }

    /// Asks one question and waits for the reply. No retry on failure.
    pub async fn ask(&mut self, question: &str) -> Result<ChatMessage, SessionError> {
        let request = self.begin(question)?;
        let outcome = self.send(&request).await;
        Ok(self.finish(outcome))
    }

    async fn send(&self, request: &QuestionRequest) -> Result<String, String> {
        let mut builder = self.http.post(&self.endpoint.url).json(request);
        if let Some(key) = &self.endpoint.auth_key {
            builder = builder.header("apikey", key).bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read response: {}", e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(format!("HTTP {}: {}", status, message));
        }

        let answer: AnswerResponse =
            serde_json::from_str(&body).map_err(|e| format!("unexpected response: {}", e))?;
        info!("Received answer ({} chars)", answer.answer.chars().count());
        Ok(answer.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    fn session(url: String, context: &str) -> ChatSession {
        ChatSession::new(
            reqwest::Client::new(),
            ProxyEndpoint {
                url,
                auth_key: Some("anon".into()),
            },
            context.to_string(),
        )
    }

    fn roles(transcript: &ChatTranscript) -> Vec<Role> {
        transcript.entries().map(|m| m.role).collect()
    }

    #[test]
    fn test_transcript_is_bounded() {
        let mut transcript = ChatTranscript::with_capacity(4);
        for i in 0..6 {
            transcript.push(Role::User, format!("m{i}"));
        }
        let contents: Vec<&str> = transcript.entries().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4", "m5"]);
    }

    #[test]
    fn test_begin_gates_resubmission() {
        let mut session = session("http://127.0.0.1:9".into(), "ctx");
        assert_eq!(session.begin("  "), Err(SessionError::EmptyQuestion));
        assert!(session.transcript().is_empty());

        let request = session.begin("첫 질문").unwrap();
        assert_eq!(request, QuestionRequest::new("첫 질문", "ctx"));
        assert!(session.is_awaiting());
        assert_eq!(session.begin("두 번째"), Err(SessionError::AnswerPending));
        assert_eq!(session.transcript().len(), 1);

        session.finish(Ok("답".into()));
        assert!(!session.is_awaiting());
        assert_eq!(roles(session.transcript()), vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_ask_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("apikey", "anon"))
            .and(header("authorization", "Bearer anon"))
            .and(body_json(json!({ "question": "몇 시에 열어요?", "context": "ctx" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "10시입니다." })))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = session(format!("{}/", server.uri()), "ctx");
        let reply = session.ask("몇 시에 열어요?").await.unwrap();
        assert_eq!(reply.content, "10시입니다.");
        assert_eq!(roles(session.transcript()), vec![Role::User, Role::Assistant]);
        assert!(!session.is_awaiting());
    }

    #[tokio::test]
    async fn test_ask_failure_shows_friendly_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "X" })))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = session(server.uri(), "ctx");
        let reply = session.ask("질문").await.unwrap();
        assert_eq!(reply.content, FRIENDLY_ERROR);
        assert!(!session.is_awaiting());

        // the visitor can resend by hand
        let reply = session.ask("질문").await.unwrap();
        assert_eq!(reply.content, FRIENDLY_ERROR);
        assert_eq!(session.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_ask_network_failure_shows_friendly_message() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let mut session = session(url, "ctx");
        let reply = session.ask("질문").await.unwrap();
        assert_eq!(reply.content, FRIENDLY_ERROR);
    }

    #[tokio::test]
    async fn test_end_to_end_with_real_proxy() {
        use crate::app::{AppState, build_proxy, build_router};
        use crate::catalog;
        use crate::config::Config;

        let gemini = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "아침 일찍 방문하는 것이 가장 좋아요." }] } }]
            })))
            .expect(1)
            .mount(&gemini)
            .await;

        let gemini_uri = gemini.uri();
        let config = Config::from_lookup(|key| match key {
            "GEMINI_API_KEY" => Some("test-key".to_string()),
            "GEMINI_BASE_URL" => Some(gemini_uri.clone()),
            _ => None,
        })
        .unwrap();
        let catalog = catalog::catalog().unwrap();
        let router = build_router(AppState {
            proxy: build_proxy(&config).unwrap(),
            catalog,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let context = catalog
            .attraction("oslo", "vigeland-park")
            .unwrap()
            .context_string();
        assert!(context.contains("추천 시간대: 아침"));

        let mut session = session(format!("http://{addr}/"), &context);
        let reply = session
            .ask("이 명소는 언제 방문하는 게 좋아요?")
            .await
            .unwrap();
        assert!(!reply.content.is_empty());
        assert_ne!(reply.content, FRIENDLY_ERROR);

        let entries: Vec<&ChatMessage> = session.transcript().entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].role, Role::User);
        assert_eq!(entries[0].content, "이 명소는 언제 방문하는 게 좋아요?");
        assert_eq!(entries[1].role, Role::Assistant);
    }
}
