// Chat-completions client using reqwest and reqwest-eventsource.
//
// Posts `{ model, messages, ... }` to an OpenAI-compatible endpoint. Replies
// are either read whole or streamed as server-sent events, and reported as
// `ChatEvent`s over an mpsc channel for the app loop to consume.

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{ChatConfig, Config};
use crate::protocol::ChatEvent;

use super::{ChatError, ChatMessage};

const DONE_SENTINEL: &str = "[DONE]";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
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

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// HttpChatClient
// ---------------------------------------------------------------------------

/// Low-level client for one configured endpoint.
pub struct HttpChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    stream: bool,
}

impl HttpChatClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
            model: model.into(),
            max_tokens: None,
            temperature: None,
            stream: false,
        }
    }

    /// Build from the `[chat]` section. The caller has already checked that
    /// an endpoint is set.
    fn from_chat_config(endpoint: &str, chat: &ChatConfig, api_key: Option<String>) -> Self {
        let mut client = Self::new(endpoint, chat.model.clone()).with_streaming(chat.stream);
        client.api_key = api_key.filter(|k| !k.is_empty());
        client.max_tokens = chat.max_tokens;
        client.temperature = chat.temperature;
        client
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn streaming(&self) -> bool {
        self.stream
    }

    fn request(&self, messages: &[ChatMessage], stream: bool) -> reqwest::RequestBuilder {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream,
        };
        let mut request = self
            .http
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        request
    }

    /// Send `messages` and wait for the whole reply.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        debug!("POST {} ({} messages)", self.endpoint, messages.len());
        let response = self.request(messages, false).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(map_http_error(status, &body));
        }
        parse_completion(&body)
    }

    /// Send `messages` with `stream: true` and forward the reply as
    /// `ChatEvent`s over `tx`.
    ///
    /// Emits any number of `Token`s followed by exactly one `Complete` or
    /// `Error`. Returns early if the receiver is dropped.
    pub async fn stream_reply(
        &self,
        messages: &[ChatMessage],
        tx: mpsc::Sender<ChatEvent>,
        request_id: u64,
    ) -> anyhow::Result<()> {
        let mut es = match self.request(messages, true).eventsource() {
            Ok(es) => es,
            Err(e) => {
                let _ = tx
                    .send(ChatEvent::Error {
                        message: format!("Failed to create event source: {e}"),
                        request_id,
                    })
                    .await;
                return Ok(());
            }
        };

        let mut full_text = String::new();

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!(request_id, "SSE connection opened");
                }
                Ok(Event::Message(msg)) => {
                    if msg.data.trim() == DONE_SENTINEL {
                        debug!(request_id, "stream complete");
                        es.close();
                        break;
                    }
                    match parse_delta_content(&msg.data) {
                        Some(text) if !text.is_empty() => {
                            full_text.push_str(&text);
                            if tx.send(ChatEvent::Token { text, request_id }).await.is_err() {
                                es.close();
                                return Ok(());
                            }
                        }
                        Some(_) => {}
                        None => debug!(request_id, "ignoring SSE chunk without content"),
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    debug!(request_id, "stream ended without [DONE]");
                    es.close();
                    break;
                }
                Err(err) => {
                    warn!(?err, "SSE stream error");
                    es.close();
                    let message = describe_stream_error(err).await;
                    let _ = tx.send(ChatEvent::Error { message, request_id }).await;
                    return Ok(());
                }
            }
        }

        let event = if full_text.trim().is_empty() {
            ChatEvent::Error {
                message: ChatError::EmptyReply.to_string(),
                request_id,
            }
        } else {
            ChatEvent::Complete {
                full_text,
                request_id,
            }
        };
        let _ = tx.send(event).await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ChatClient wrapper
// ---------------------------------------------------------------------------

/// Either a configured endpoint or a disabled bridge.
pub enum ChatClient {
    Active(HttpChatClient),
    /// No endpoint configured. Every request fails immediately.
    Disabled,
}

impl ChatClient {
    /// `Active` if `[chat] endpoint` is set, otherwise `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match &config.chat.endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => {
                info!("Chat enabled: {} ({})", endpoint, config.chat.model);
                ChatClient::Active(HttpChatClient::from_chat_config(
                    endpoint,
                    &config.chat,
                    config.credentials.api_key.clone(),
                ))
            }
            _ => {
                info!("Chat disabled: no endpoint configured");
                ChatClient::Disabled
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ChatClient::Active(_))
    }

    /// Send one turn and report the outcome over `tx`, streamed or whole
    /// depending on the client's configuration.
    pub async fn send_turn(
        &self,
        messages: Vec<ChatMessage>,
        tx: mpsc::Sender<ChatEvent>,
        request_id: u64,
    ) -> anyhow::Result<()> {
        match self {
            ChatClient::Active(client) if client.streaming() => {
                client.stream_reply(&messages, tx, request_id).await
            }
            ChatClient::Active(client) => {
                let event = match client.complete(&messages).await {
                    Ok(full_text) => ChatEvent::Complete {
                        full_text,
                        request_id,
                    },
                    Err(e) => {
                        warn!(request_id, "chat request failed: {}", e);
                        ChatEvent::Error {
                            message: e.to_string(),
                            request_id,
                        }
                    }
                };
                let _ = tx.send(event).await;
                Ok(())
            }
            ChatClient::Disabled => {
                let _ = tx
                    .send(ChatEvent::Error {
                        message: ChatError::NotConfigured.to_string(),
                        request_id,
                    })
                    .await;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response parsing helpers
// ---------------------------------------------------------------------------

/// Extract `choices[0].message.content` from a plain completion body.
pub(crate) fn parse_completion(body: &str) -> Result<String, ChatError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| ChatError::Malformed(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(ChatError::EmptyReply)
}

/// Extract `choices[0].delta.content` from a streamed chunk.
///
/// Expected shape: `{ "choices": [{ "delta": { "content": "..." } }] }`
pub(crate) fn parse_delta_content(data: &str) -> Option<String> {
    let chunk: ChatCompletionChunk = serde_json::from_str(data).ok()?;
    chunk.choices.into_iter().next()?.delta.content
}

/// Turn a non-2xx response into a `ChatError`, preferring the endpoint's
/// `{ "error": { "message" } }` text over the raw body.
pub(crate) fn map_http_error(status: StatusCode, body: &str) -> ChatError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        message
    };
    ChatError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Human-readable text for an SSE failure.
async fn describe_stream_error(err: reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, response) => {
            let body = response.text().await.unwrap_or_default();
            map_http_error(status, &body).to_string()
        }
        reqwest_eventsource::Error::Transport(e) => ChatError::Transport(e).to_string(),
        other => format!("stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
