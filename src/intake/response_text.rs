use serde_json::Value;

type TextStrategy = fn(&Value) -> Option<String>;

/// Tried in order; the first strategy that finds text wins.
const STRATEGIES: [TextStrategy; 3] = [
    flat_output_text,
    nested_output_content,
    chat_completion_content,
];

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn flat_output_text(json: &Value) -> Option<String> {
    json.get("output_text")
        .and_then(Value::as_str)
        .and_then(non_empty)
}

fn nested_output_content(json: &Value) -> Option<String> {
    let output = json.get("output").and_then(Value::as_array)?;
    let mut chunks = Vec::new();
    for item in output {
        let Some(content) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in content {
            let kind = part.get("type").and_then(Value::as_str).unwrap_or("");
            if kind != "output_text" && kind != "text" {
                continue;
            }
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                chunks.push(text.to_string());
            }
        }
    }

    non_empty(&chunks.join("\n"))
}

fn chat_completion_content(json: &Value) -> Option<String> {
    let choices = json.get("choices").and_then(Value::as_array)?;
    let content = choices.first()?.get("message")?.get("content")?;
    match content {
        Value::String(s) => non_empty(s),
        Value::Array(parts) => {
            let chunks = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>();
            non_empty(&chunks.join("\n"))
        }
        _ => None,
    }
}

/// Pull the generated text out of a completion-service response, whichever
/// shape the endpoint used.
pub fn extract_response_text(json: &Value) -> Option<String> {
    STRATEGIES.iter().find_map(|strategy| strategy(json))
}

/// Unwrap a ```` ```json ```` (or bare ```` ``` ````) fence around model output,
/// falling back to the outermost `{ … }` span.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        let body = match after_fence.find('\n') {
            Some(newline) if !after_fence[..newline].trim().contains('{') => {
                &after_fence[newline + 1..]
            }
            _ => after_fence,
        };
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }

    if let Some(start) = trimmed.find('{')
        && let Some(end) = trimmed.rfind('}')
        && end > start
    {
        return &trimmed[start..=end];
    }

    trimmed
}
