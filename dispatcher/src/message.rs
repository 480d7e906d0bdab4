//! Queue wire encoding: base64(JSON(`TaskMessage`)), so the message survives
//! transports that mangle raw JSON bytes (§4.D, §6).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use orchestrator_core::model::TaskMessage;

use crate::errors::{DispatchError, DispatchResult};

pub fn encode_task_message(message: &TaskMessage) -> DispatchResult<String> {
    let json = serde_json::to_vec(message).map_err(|e| DispatchError::Encoding(e.to_string()))?;
    Ok(STANDARD.encode(json))
}

pub fn decode_task_message(encoded: &str) -> DispatchResult<TaskMessage> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| DispatchError::Encoding(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| DispatchError::Encoding(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_through_base64_json() {
        let msg = TaskMessage {
            context: json!({"a": 1}),
            commit_id: "c1".into(),
            request_id: "r1".into(),
            number: 1,
            mode: "diff".into(),
            model: "claude3-sonnet".into(),
            identity: TaskMessage::build_identity("diff", "claude3-sonnet", 1, "rule", "a.py"),
            filepath: "a.py".into(),
            rule_name: "rule".into(),
            prompt_system: "sys".into(),
            prompt_user: "usr".into(),
            confirm_prompt: None,
            enable_reasoning: false,
        };
        let encoded = encode_task_message(&msg).unwrap();
        let decoded = decode_task_message(&encoded).unwrap();
        assert_eq!(decoded.identity, msg.identity);
        assert_eq!(decoded.commit_id, "c1");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_task_message("not base64!!").is_err());
    }
}
