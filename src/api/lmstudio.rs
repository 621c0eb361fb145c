//! Adaptador para LM Studio: servidor local compatible con chat-completions,
//! sin autenticación. El endpoint puede sobreescribirse desde la configuración.

use serde::Deserialize;
use serde_json::json;

use super::{blocking_client, read_success_body, ChatCall, CompletionCall, ProviderAdapter, ProviderReply};
use crate::error::AdapterError;

const PROVIDER: &str = "LM Studio";

/// LM Studio ignora el nombre de modelo pero el campo es obligatorio.
const PLACEHOLDER_MODEL: &str = "local-model";

#[derive(Debug, Deserialize)]
struct LmMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct LmChoice {
    #[serde(default)]
    message: Option<LmMessage>,
}

#[derive(Debug, Deserialize, Default)]
struct LmResponse {
    #[serde(default)]
    choices: Vec<LmChoice>,
}

pub struct LmStudioAdapter;

impl LmStudioAdapter {
    pub fn new() -> Self {
        LmStudioAdapter
    }

    fn post_chat(
        &self,
        endpoint_base: &str,
        payload: serde_json::Value,
    ) -> Result<ProviderReply, AdapterError> {
        let client = blocking_client(PROVIDER)?;
        let response = client
            .post(format!("{}/chat/completions", endpoint_base))
            .json(&payload)
            .send()?;

        let body = read_success_body(PROVIDER, response)?;
        let raw: serde_json::Value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        let parsed: LmResponse = serde_json::from_str(&body).unwrap_or_default();

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .map(|message| message.content)
            .unwrap_or_else(|| {
                log::warn!("Respuesta de LM Studio sin choices[0].message.content; se devuelve vacío");
                String::new()
            });

        Ok(ProviderReply::new(text, raw))
    }

    fn model_or_placeholder(model: &str) -> &str {
        if model.trim().is_empty() {
            PLACEHOLDER_MODEL
        } else {
            model
        }
    }
}

impl ProviderAdapter for LmStudioAdapter {
    fn execute_chat(&self, call: &ChatCall<'_>) -> Result<ProviderReply, AdapterError> {
        let payload = json!({
            "model": Self::model_or_placeholder(call.model),
            "messages": call.messages,
            "temperature": call.temperature,
            "max_tokens": call.max_tokens,
        });
        self.post_chat(call.endpoint_base, payload)
    }

    fn execute_completion(&self, call: &CompletionCall<'_>) -> Result<ProviderReply, AdapterError> {
        let messages = call.as_synthesized_chat();
        let payload = json!({
            "model": Self::model_or_placeholder(call.model),
            "messages": messages,
            "temperature": call.temperature,
            "max_tokens": call.max_tokens,
        });
        let reply = self.post_chat(call.endpoint_base, payload)?;
        let raw = json!({ "choices": [{ "text": reply.text }] });
        Ok(ProviderReply::new(reply.text, raw))
    }
}
