//! [`GeminiClient`] — reqwest client for the hosted generation API.
//!
//! Without an API key the client degrades the way the original deployment
//! did: canned tips, a mock meter value, and an unavailable chat.

use std::time::Duration;

use futures_util::{StreamExt as _, stream::BoxStream};
use serde_json::{Value, json};

use crate::{Advisor, ChatMessage, ChatRole, Error, Result, tips::FALLBACK_TIPS};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const TIPS_PROMPT: &str =
  "Generate a list of 5 unique, concise, actionable water-saving tips for \
   households. Respond with a JSON object of the form {\"tips\": [\"...\"]}.";

const METER_PROMPT: &str =
  "Analyze the image of a water meter. Extract the main numerical reading. \
   Return only the final number, including decimals if present. For example, \
   if you see '00123.456 m3', return '123.456'. If you cannot determine a \
   number, return an empty string.";

const CHAT_SYSTEM_INSTRUCTION: &str =
  "You are Aqua, a friendly and knowledgeable assistant for a household \
   water-conservation app. Give practical, actionable advice on reducing \
   water consumption, identifying leaks, and adopting water-saving habits. \
   When asked for advice for someone else, keep the suggestions simple and \
   easy to follow. Keep responses concise and encouraging. Do not go \
   off-topic.";

/// Meter value reported when running keyless, mirroring the original mock.
const MOCK_METER_READING: &str = "123.45";

/// Client for the hosted generation API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiClient {
  client:  reqwest::Client,
  api_key: Option<String>,
  model:   String,
}

impl GeminiClient {
  pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self> {
    if api_key.is_none() {
      tracing::warn!("no generation API key configured; using canned fallbacks");
    }
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, api_key, model: model.into() })
  }

  fn url(&self, verb: &str) -> String {
    format!("{API_BASE}/models/{}:{verb}", self.model)
  }

  /// POST `body` to the given verb and return the parsed JSON response.
  async fn generate(&self, verb: &str, body: &Value) -> Result<reqwest::Response> {
    let key = self.api_key.as_deref().ok_or(Error::MissingApiKey)?;
    let resp = self
      .client
      .post(self.url(verb))
      .header("x-goog-api-key", key)
      .json(body)
      .send()
      .await?;

    if !resp.status().is_success() {
      let status = resp.status();
      let detail = resp.text().await.unwrap_or_default();
      return Err(Error::Api(format!("{status}: {detail}")));
    }
    Ok(resp)
  }
}

/// Concatenated text of the first candidate's parts, if any.
fn response_text(value: &Value) -> Option<String> {
  let parts = value
    .get("candidates")?
    .get(0)?
    .get("content")?
    .get("parts")?
    .as_array()?;
  let text: String = parts
    .iter()
    .filter_map(|p| p.get("text").and_then(Value::as_str))
    .collect();
  if text.is_empty() { None } else { Some(text) }
}

/// The first run of decimal digits (with embedded dots) in the model's
/// reply, used to strip any surrounding prose.
fn first_decimal_run(text: &str) -> Option<&str> {
  let bytes = text.as_bytes();
  let start = bytes.iter().position(|b| b.is_ascii_digit())?;
  let mut end = start;
  while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
    end += 1;
  }
  while end > start && bytes[end - 1] == b'.' {
    end -= 1;
  }
  Some(&text[start..end])
}

/// What one line of the event stream contributes.
#[derive(Debug, PartialEq)]
enum SseLine {
  /// A `data:` payload carrying candidate text.
  Text(String),
  /// Nothing to emit: blank line, comment, or a payload without text.
  Skip,
  /// The stream terminator.
  Done,
}

fn parse_sse_line(line: &str) -> SseLine {
  let Some(payload) = line.trim().strip_prefix("data: ") else {
    return SseLine::Skip;
  };
  if payload == "[DONE]" {
    return SseLine::Done;
  }
  match serde_json::from_str::<Value>(payload)
    .ok()
    .as_ref()
    .and_then(response_text)
  {
    Some(text) => SseLine::Text(text),
    None => SseLine::Skip,
  }
}

impl Advisor for GeminiClient {
  async fn generate_tips(&self) -> Result<Vec<String>> {
    if self.api_key.is_none() {
      return Ok(FALLBACK_TIPS.iter().map(|&t| t.to_owned()).collect());
    }

    let body = json!({
      "contents": [{ "parts": [{ "text": TIPS_PROMPT }] }],
      "generationConfig": { "responseMimeType": "application/json" },
    });

    let resp = self.generate("generateContent", &body).await?;
    let value: Value = resp.json().await?;
    let text = response_text(&value).ok_or(Error::EmptyResponse)?;

    let payload: Value = serde_json::from_str(text.trim())?;
    let tips: Vec<String> = payload
      .get("tips")
      .and_then(Value::as_array)
      .map(|arr| {
        arr
          .iter()
          .filter_map(Value::as_str)
          .map(str::to_owned)
          .collect()
      })
      .unwrap_or_default();

    if tips.is_empty() {
      return Err(Error::EmptyResponse);
    }
    Ok(tips)
  }

  async fn read_meter(&self, image_base64: &str, mime_type: &str) -> Result<String> {
    if self.api_key.is_none() {
      return Ok(MOCK_METER_READING.to_owned());
    }

    let body = json!({
      "contents": [{
        "parts": [
          { "inline_data": { "mime_type": mime_type, "data": image_base64 } },
          { "text": METER_PROMPT },
        ],
      }],
    });

    let resp = self.generate("generateContent", &body).await?;
    let value: Value = resp.json().await?;
    let text = response_text(&value).unwrap_or_default();

    // Empty means "no reading extractable", which the caller surfaces as an
    // input error rather than a failure.
    Ok(first_decimal_run(&text).unwrap_or_default().to_owned())
  }

  async fn chat(&self, messages: Vec<ChatMessage>) -> Result<BoxStream<'static, String>> {
    let contents: Vec<Value> = messages
      .iter()
      .map(|m| {
        json!({
          "role": match m.role {
            ChatRole::User => "user",
            ChatRole::Model => "model",
          },
          "parts": [{ "text": m.text }],
        })
      })
      .collect();

    let body = json!({
      "system_instruction": { "parts": [{ "text": CHAT_SYSTEM_INSTRUCTION }] },
      "contents": contents,
    });

    let key = self.api_key.as_deref().ok_or(Error::MissingApiKey)?;
    let resp = self
      .client
      .post(format!("{}?alt=sse", self.url("streamGenerateContent")))
      .header("x-goog-api-key", key)
      .json(&body)
      .send()
      .await?;

    if !resp.status().is_success() {
      let status = resp.status();
      let detail = resp.text().await.unwrap_or_default();
      return Err(Error::Api(format!("{status}: {detail}")));
    }

    // Server-sent events: one `data: <json>` line per chunk. Buffer bytes
    // until a full line is available, then pull the chunk text out of it.
    let stream = futures_util::stream::unfold(
      (resp.bytes_stream(), String::new()),
      |(mut bytes, mut buffer)| async move {
        loop {
          if let Some(newline) = buffer.find('\n') {
            let line: String = buffer.drain(..=newline).collect();
            match parse_sse_line(&line) {
              SseLine::Text(text) => return Some((text, (bytes, buffer))),
              SseLine::Done => return None,
              SseLine::Skip => continue,
            }
          }

          match bytes.next().await {
            Some(Ok(chunk)) => buffer.push_str(&String::from_utf8_lossy(&chunk)),
            Some(Err(e)) => {
              tracing::warn!("chat stream ended early: {e}");
              return None;
            }
            None => return None,
          }
        }
      },
    );

    Ok(stream.boxed())
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
