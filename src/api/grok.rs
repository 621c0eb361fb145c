//! Adaptador para la API de Grok (compatible con chat-completions).

use serde::Deserialize;
use serde_json::json;

use super::{blocking_client, read_success_body, ChatCall, CompletionCall, ProviderAdapter, ProviderReply};
use crate::error::AdapterError;

const PROVIDER: &str = "Grok";

#[derive(Debug, Deserialize)]
struct GrokMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct GrokChoice {
    #[serde(default)]
    message: Option<GrokMessage>,
}

#[derive(Debug, Deserialize, Default)]
struct GrokResponse {
    #[serde(default)]
    choices: Vec<GrokChoice>,
}

pub struct GrokAdapter;

impl GrokAdapter {
    pub fn new() -> Self {
        GrokAdapter
    }

    fn require_key<'a>(api_key: Option<&'a str>) -> Result<&'a str, AdapterError> {
        match api_key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => Ok(key),
            None => Err(AdapterError::MissingApiKey(PROVIDER)),
        }
    }

    fn post_chat(
        &self,
        endpoint_base: &str,
        api_key: &str,
        payload: serde_json::Value,
    ) -> Result<ProviderReply, AdapterError> {
        let client = blocking_client(PROVIDER)?;
        let response = client
            .post(format!("{}/chat/completions", endpoint_base))
            .bearer_auth(api_key)
            .json(&payload)
            .send()?;

        let body = read_success_body(PROVIDER, response)?;
        let raw: serde_json::Value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        let parsed: GrokResponse = serde_json::from_str(&body).unwrap_or_default();

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content)
            .unwrap_or_else(|| {
                log::warn!("Respuesta de Grok sin choices[0].message.content; se devuelve vacío");
                String::new()
            });

        Ok(ProviderReply::new(text, raw))
    }
}

impl ProviderAdapter for GrokAdapter {
    fn execute_chat(&self, call: &ChatCall<'_>) -> Result<ProviderReply, AdapterError> {
        let key = Self::require_key(call.api_key)?;
        let payload = json!({
            "model": call.model,
            "messages": call.messages,
            "temperature": call.temperature,
            "max_tokens": call.max_tokens,
        });
        self.post_chat(call.endpoint_base, key, payload)
    }

    fn execute_completion(&self, call: &CompletionCall<'_>) -> Result<ProviderReply, AdapterError> {
        // Grok solo expone chat-completions; el prompt crudo viaja como chat
        // sintetizado y la respuesta vuelve en forma `{ choices: [{ text }] }`.
        let key = Self::require_key(call.api_key)?;
        let messages = call.as_synthesized_chat();
        let payload = json!({
            "model": call.model,
            "messages": messages,
            "temperature": call.temperature,
            "max_tokens": call.max_tokens,
        });
        let reply = self.post_chat(call.endpoint_base, key, payload)?;
        let raw = json!({ "choices": [{ "text": reply.text }] });
        Ok(ProviderReply::new(reply.text, raw))
    }
}
