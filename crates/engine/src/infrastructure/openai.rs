//! OpenAI chat-completions client (streaming).

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmStream, MessageRole};

/// Client for the OpenAI chat-completions API.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// Default API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Default model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        // Use 120 second timeout for LLM requests (they can be slow)
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl LlmPort for OpenAiClient {
    async fn stream_chat(&self, request: LlmRequest) -> Result<LlmStream, LlmError> {
        let api_request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: build_messages(&request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: true,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| LlmError::RequestFailed(e.to_string()))?;
            return Err(LlmError::RequestFailed(error_text));
        }

        Ok(sse_delta_stream(response))
    }
}

fn build_messages(request: &LlmRequest) -> Vec<ApiMessage> {
    let mut messages = Vec::new();

    if let Some(system) = &request.system_prompt {
        messages.push(ApiMessage {
            role: "system".to_string(),
            content: system.clone(),
        });
    }

    for msg in &request.messages {
        messages.push(ApiMessage {
            role: match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
                MessageRole::System => "system",
            }
            .to_string(),
            content: msg.content.clone(),
        });
    }

    messages
}

/// State threaded through the SSE parsing stream.
struct SseState {
    bytes: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buffer: String,
    ready: VecDeque<Result<String, LlmError>>,
    done: bool,
}

/// Convert the raw SSE byte stream into a stream of content deltas.
///
/// Chunks arrive as `data: {json}` lines; `data: [DONE]` terminates the
/// stream. Lines may be split across network reads, so bytes are buffered
/// until a full line is available.
fn sse_delta_stream(response: reqwest::Response) -> LlmStream {
    let state = SseState {
        bytes: Box::pin(response.bytes_stream()),
        buffer: String::new(),
        ready: VecDeque::new(),
        done: false,
    };

    Box::pin(stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.ready.pop_front() {
                return Some((item, st));
            }
            if st.done {
                return None;
            }

            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    st.buffer.push_str(&String::from_utf8_lossy(&chunk));
                    while let Some(pos) = st.buffer.find('\n') {
                        let line = st.buffer[..pos].trim_end_matches('\r').to_string();
                        st.buffer.drain(..=pos);
                        match parse_sse_line(&line) {
                            SseLine::Delta(text) if !text.is_empty() => {
                                st.ready.push_back(Ok(text));
                            }
                            SseLine::Delta(_) => {}
                            SseLine::Done => {
                                st.done = true;
                                break;
                            }
                            SseLine::Invalid(message) => {
                                st.ready.push_back(Err(LlmError::InvalidResponse(message)));
                                st.done = true;
                                break;
                            }
                            SseLine::Ignore => {}
                        }
                    }
                }
                Some(Err(e)) => {
                    st.done = true;
                    return Some((Err(LlmError::RequestFailed(e.to_string())), st));
                }
                None => {
                    // Server closed the stream without [DONE]; whatever was
                    // parsed so far is the reply.
                    st.done = true;
                }
            }
        }
    }))
}

enum SseLine {
    /// A content delta (possibly empty, e.g. the role-only first chunk).
    Delta(String),
    Done,
    Ignore,
    Invalid(String),
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(payload) = line.strip_prefix("data:") else {
        // Comments, event names, and blank separator lines.
        return SseLine::Ignore;
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return SseLine::Ignore;
    }
    if payload == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(payload) {
        Ok(chunk) => SseLine::Delta(
            chunk
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.delta.content)
                .unwrap_or_default(),
        ),
        Err(e) => SseLine::Invalid(e.to_string()),
    }
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::ChatMessage;

    #[test]
    fn test_parse_sse_delta_line() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#;
        match parse_sse_line(line) {
            SseLine::Delta(text) => assert_eq!(text, "Hello"),
            _ => panic!("expected delta"),
        }
    }

    #[test]
    fn test_parse_sse_role_only_chunk_is_empty_delta() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        match parse_sse_line(line) {
            SseLine::Delta(text) => assert_eq!(text, ""),
            _ => panic!("expected delta"),
        }
    }

    #[test]
    fn test_parse_sse_done_marker() {
        assert!(matches!(parse_sse_line("data: [DONE]"), SseLine::Done));
    }

    #[test]
    fn test_parse_sse_ignores_comments_and_blank_lines() {
        assert!(matches!(parse_sse_line(""), SseLine::Ignore));
        assert!(matches!(parse_sse_line(": keep-alive"), SseLine::Ignore));
        assert!(matches!(parse_sse_line("event: message"), SseLine::Ignore));
    }

    #[test]
    fn test_parse_sse_invalid_json_is_flagged() {
        assert!(matches!(
            parse_sse_line("data: {not json"),
            SseLine::Invalid(_)
        ));
    }

    #[test]
    fn test_build_messages_puts_system_prompt_first() {
        let request = LlmRequest::new(vec![
            ChatMessage::user("Alice"),
            ChatMessage::assistant("Welcome, Alice!"),
        ])
        .with_system_prompt("You are the host.");

        let messages = build_messages(&request);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "You are the host.");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
    }
}
