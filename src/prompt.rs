/// Framing for every answer: a cheerful, well-informed guide replying in Korean.
pub const GUIDE_SYSTEM_INSTRUCTION: &str = r#"당신은 명랑하고 지식이 풍부한 여행 가이드입니다.
제공된 관광 명소에 대한 문맥 정보를 바탕으로 사용자의 질문에 한국어로 답변해주세요.
친절하고 도움이 되는 방식으로, 웹을 꼼꼼히 탐색하여 매우 자세하고 정확한 답변을 제공해야 합니다.
답변은 문장 단위로 줄바꿈을 포함하여 가독성 좋게 작성해주세요."#;

/// Everything the model receives for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system_instruction: String,
    pub text: String,
    /// Ask the model to ground its answer with web search.
    pub web_search: bool,
}

impl Prompt {
    /// Embeds the context and the question verbatim.
    pub fn for_question(context: &str, question: &str) -> Self {
        let text = format!(
            "명소에 대한 문맥 정보:\n---\n{context}\n---\n\n사용자의 질문:\n---\n{question}\n---\n"
        );
        Self {
            system_instruction: GUIDE_SYSTEM_INSTRUCTION.to_string(),
            text,
            web_search: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_inputs_verbatim() {
        let context = "명소: 바사 박물관\n추천 시간대: 개관 직후  ";
        let question = "  사진 촬영이 가능한가요?\n";
        let prompt = Prompt::for_question(context, question);

        assert!(prompt.text.contains(context));
        assert!(prompt.text.contains(question));
        assert!(prompt.text.find(context) < prompt.text.find(question));
        assert!(prompt.web_search);
        assert!(prompt.system_instruction.contains("여행 가이드"));
        assert!(prompt.system_instruction.contains("한국어"));
    }
}
