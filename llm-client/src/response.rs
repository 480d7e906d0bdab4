//! Parses the two response shapes Bedrock returns (§4.E).

use serde_json::Value;

use crate::errors::{LlmError, LlmResult};

/// A parsed model reply: the assistant's text plus any reasoning trace the
/// converse surface returned alongside it.
#[derive(Debug, Clone, Default)]
pub struct ParsedReply {
    pub text: String,
    pub reasoning: Option<String>,
}

/// `content[0].text` from the standard invoke surface.
pub fn parse_invoke_response(body: &Value) -> LlmResult<ParsedReply> {
    let content = body
        .get("content")
        .and_then(Value::as_array)
        .ok_or(LlmError::EmptyContent)?;
    let first = content.first().ok_or(LlmError::EmptyContent)?;
    let text = first
        .get("text")
        .and_then(Value::as_str)
        .ok_or_else(|| LlmError::Parse("invoke response missing content[0].text".into()))?
        .to_string();
    Ok(ParsedReply { text, reasoning: None })
}

/// Iterates `output.message.content` blocks from the converse surface,
/// concatenating any `text` blocks and capturing `reasoningContent.text`
/// separately.
pub fn parse_converse_response(body: &Value) -> LlmResult<ParsedReply> {
    let blocks = body
        .pointer("/output/message/content")
        .and_then(Value::as_array)
        .ok_or(LlmError::EmptyContent)?;

    let mut text = String::new();
    let mut reasoning = None;
    for block in blocks {
        if let Some(reasoning_content) = block.get("reasoningContent") {
            let r = reasoning_content
                .get("text")
                .or_else(|| reasoning_content.get("reasoningText"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            reasoning = Some(r.to_string());
        } else if let Some(t) = block.get("text").and_then(Value::as_str) {
            text.push_str(t);
        }
    }

    Ok(ParsedReply { text, reasoning })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_invoke_response() {
        let body = json!({ "content": [{ "type": "text", "text": "hello" }] });
        let reply = parse_invoke_response(&body).unwrap();
        assert_eq!(reply.text, "hello");
        assert!(reply.reasoning.is_none());
    }

    #[test]
    fn parses_converse_response_with_reasoning() {
        let body = json!({
            "output": { "message": { "content": [
                { "reasoningContent": { "text": "thinking..." } },
                { "text": "final answer" }
            ]}}
        });
        let reply = parse_converse_response(&body).unwrap();
        assert_eq!(reply.text, "final answer");
        assert_eq!(reply.reasoning.as_deref(), Some("thinking..."));
    }

    #[test]
    fn empty_invoke_content_is_error() {
        let body = json!({ "content": [] });
        assert!(parse_invoke_response(&body).is_err());
    }
}
