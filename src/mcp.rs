use crate::error::Error;
use serde_json::Value;

// Build an MCP-compliant result envelope for tools/call outputs.
// - content: always a single text block so clients can render something.
// - structuredContent: the reshaped result for clients that parse JSON.
pub fn wrap(structured: Value) -> Value {
    let text = serde_json::to_string(&structured).unwrap_or_else(|_| "{}".to_string());
    serde_json::json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": structured,
    })
}

// Error envelope: a single text block carrying the formatted taxonomy
// message, flagged with isError so hosts surface it to their caller.
pub fn wrap_error(err: &Error) -> Value {
    serde_json::json!({
        "content": [{ "type": "text", "text": err.to_string() }],
        "structuredContent": { "error": { "code": err.code(), "message": err.to_string() } },
        "isError": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_has_single_text_block() {
        let v = wrap(serde_json::json!({"ok": true}));
        let content = v.get("content").and_then(|c| c.as_array()).unwrap();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0]["type"], "text");
        assert!(v.get("isError").is_none());
    }

    #[test]
    fn error_envelope_is_flagged() {
        let v = wrap_error(&Error::NotFound("Issue not found".into()));
        assert_eq!(v["isError"], true);
        assert_eq!(v["structuredContent"]["error"]["code"], "not_found");
        assert!(v["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Issue not found"));
    }
}
