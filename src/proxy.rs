use std::sync::Arc;

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::gemini::AnswerModel;
use crate::models::{AnswerResponse, QuestionRequest};
use crate::prompt::Prompt;

pub const MISSING_QUESTION: &str = "질문이 필요합니다.";
pub const MISSING_CONTEXT: &str = "문맥 정보가 필요합니다.";
pub const MISSING_API_KEY: &str = "GEMINI_API_KEY가 환경 변수에 설정되지 않았습니다.";

/// Stateless broker between visitor questions and the answer model.
///
/// `model` is `None` when the deployment has no credential; every request
/// then fails with a configuration error after input validation.
#[derive(Clone)]
pub struct QuestionProxy {
    model: Option<Arc<dyn AnswerModel>>,
}

impl QuestionProxy {
    pub fn new(model: Option<Arc<dyn AnswerModel>>) -> Self {
        Self { model }
    }

    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Answers one question. At most one model call is made, and none when
    /// the input or the configuration is invalid.
    pub async fn answer(&self, request: &QuestionRequest) -> AppResult<AnswerResponse> {
        validate(request)?;

        let model = self
            .model
            .as_ref()
            .ok_or_else(|| AppError::Configuration(MISSING_API_KEY.to_string()))?;

        let prompt = Prompt::for_question(&request.context, &request.question);
        let answer = model
            .generate(&prompt)
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        info!("Answered question ({} chars)", answer.chars().count());
        Ok(AnswerResponse::new(answer))
    }
}

fn validate(request: &QuestionRequest) -> AppResult<()> {
    if request.question.trim().is_empty() {
        return Err(AppError::InvalidInput(MISSING_QUESTION.to_string()));
    }
    if request.context.trim().is_empty() {
        return Err(AppError::InvalidInput(MISSING_CONTEXT.to_string()));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::gemini::{AnswerModel, UpstreamError};
    use crate::prompt::Prompt;

    /// Records every prompt; answers by echoing the prompt text or failing.
    pub struct RecordingModel {
        pub prompts: Mutex<Vec<Prompt>>,
        pub failure: Option<String>,
    }

    impl RecordingModel {
        pub fn echo() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                failure: None,
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                failure: Some(message.to_string()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AnswerModel for RecordingModel {
        async fn generate(&self, prompt: &Prompt) -> Result<String, UpstreamError> {
            self.prompts.lock().unwrap().push(prompt.clone());
            tokio::task::yield_now().await;
            match &self.failure {
                Some(message) => Err(UpstreamError(message.clone())),
                None => Ok(format!("echo: {}", prompt.text)),
            }
        }
    }
}
