//! Adaptador para la API DashScope de Qwen.
//!
//! Qwen no habla chat-completions: la petición viaja en un sobre
//! `input.messages` / `parameters` y el texto vuelve en `output.text`.

use serde::Deserialize;
use serde_json::json;

use super::{blocking_client, read_success_body, ChatCall, CompletionCall, ProviderAdapter, ProviderReply};
use crate::error::AdapterError;

const PROVIDER: &str = "Qwen";

const GENERATION_PATH: &str = "/services/aigc/text-generation/generation";

#[derive(Debug, Deserialize, Default)]
struct QwenResponse {
    #[serde(default)]
    output: Option<QwenOutput>,
}

#[derive(Debug, Deserialize, Default)]
struct QwenOutput {
    #[serde(default)]
    text: String,
}

pub struct QwenAdapter;

impl QwenAdapter {
    pub fn new() -> Self {
        QwenAdapter
    }

    fn require_key<'a>(api_key: Option<&'a str>) -> Result<&'a str, AdapterError> {
        match api_key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => Ok(key),
            None => Err(AdapterError::MissingApiKey(PROVIDER)),
        }
    }

    fn post_generation(
        &self,
        endpoint_base: &str,
        api_key: &str,
        payload: serde_json::Value,
    ) -> Result<ProviderReply, AdapterError> {
        let client = blocking_client(PROVIDER)?;
        let response = client
            .post(format!("{}{}", endpoint_base, GENERATION_PATH))
            .bearer_auth(api_key)
            .json(&payload)
            .send()?;

        let body = read_success_body(PROVIDER, response)?;
        let raw: serde_json::Value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        let parsed: QwenResponse = serde_json::from_str(&body).unwrap_or_default();

        let text = match parsed.output {
            Some(output) => output.text,
            None => {
                log::warn!("Respuesta de Qwen sin output.text; se devuelve vacío");
                String::new()
            }
        };

        Ok(ProviderReply::new(text, raw))
    }
}

impl ProviderAdapter for QwenAdapter {
    fn execute_chat(&self, call: &ChatCall<'_>) -> Result<ProviderReply, AdapterError> {
        let key = Self::require_key(call.api_key)?;
        let payload = json!({
            "model": call.model,
            "input": { "messages": call.messages },
            "parameters": {
                "temperature": call.temperature,
                "max_tokens": call.max_tokens,
            },
        });
        self.post_generation(call.endpoint_base, key, payload)
    }

    fn execute_completion(&self, call: &CompletionCall<'_>) -> Result<ProviderReply, AdapterError> {
        // Qwen solo define chat: el prompt crudo se envuelve en un turno único.
        let key = Self::require_key(call.api_key)?;
        let messages = call.as_synthesized_chat();
        let payload = json!({
            "model": call.model,
            "input": { "messages": messages },
            "parameters": {
                "temperature": call.temperature,
                "max_tokens": call.max_tokens,
            },
        });
        let reply = self.post_generation(call.endpoint_base, key, payload)?;
        let raw = json!({ "choices": [{ "text": reply.text }] });
        Ok(ProviderReply::new(reply.text, raw))
    }
}
