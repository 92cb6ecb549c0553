use serde_json::{Value, json};

pub const API_TOKEN_ENV: &str = "HF_API_TOKEN";
pub const DEFAULT_MODEL: &str = "google/flan-t5-large";
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

pub fn endpoint(base_url: &str, model: &str) -> String {
    format!("{}/models/{}", base_url.trim_end_matches('/'), model)
}

pub fn request_body(prompt: &str) -> Value {
    json!({ "inputs": prompt })
}

// The inference API answers with a list, one entry per generated sequence.
// Only the first entry is read.
pub fn extract_answer(body: &Value) -> Option<String> {
    body.as_array()?
        .first()?
        .get("generated_text")?
        .as_str()
        .map(str::to_string)
}
