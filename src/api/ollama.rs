//! Adaptador para el daemon local de Ollama.
//!
//! Ollama es el único backend con par de endpoints propio: `POST {base}/chat`
//! para chat y `POST {base}/generate` para completion crudo. Sin cabecera de
//! autenticación; `stream: false` para recibir la respuesta completa.

use serde::Deserialize;
use serde_json::json;

use super::{blocking_client, read_success_body, ChatCall, CompletionCall, ProviderAdapter, ProviderReply};
use crate::error::AdapterError;

const PROVIDER: &str = "Ollama";

#[derive(Debug, Deserialize, Default)]
struct OllamaChatResponse {
    #[serde(default)]
    message: Option<OllamaChatMessage>,
}

#[derive(Debug, Deserialize, Default)]
struct OllamaChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize, Default)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaAdapter;

impl OllamaAdapter {
    pub fn new() -> Self {
        OllamaAdapter
    }
}

impl ProviderAdapter for OllamaAdapter {
    fn execute_chat(&self, call: &ChatCall<'_>) -> Result<ProviderReply, AdapterError> {
        let payload = json!({
            "model": call.model,
            "messages": call.messages,
            "temperature": call.temperature,
            "stream": false,
        });

        let client = blocking_client(PROVIDER)?;
        let response = client
            .post(format!("{}/chat", call.endpoint_base))
            .json(&payload)
            .send()?;

        let body = read_success_body(PROVIDER, response)?;
        let raw: serde_json::Value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        let parsed: OllamaChatResponse = serde_json::from_str(&body).unwrap_or_default();

        let text = match parsed.message {
            Some(message) => message.content,
            None => {
                log::warn!("Respuesta de Ollama sin message.content; se devuelve vacío");
                String::new()
            }
        };

        Ok(ProviderReply::new(text, raw))
    }

    fn execute_completion(&self, call: &CompletionCall<'_>) -> Result<ProviderReply, AdapterError> {
        let payload = json!({
            "model": call.model,
            "prompt": call.prompt,
            "temperature": call.temperature,
            "stream": false,
        });

        let client = blocking_client(PROVIDER)?;
        let response = client
            .post(format!("{}/generate", call.endpoint_base))
            .json(&payload)
            .send()?;

        let body = read_success_body(PROVIDER, response)?;
        let raw: serde_json::Value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        let parsed: OllamaGenerateResponse = serde_json::from_str(&body).unwrap_or_else(|_| {
            log::warn!("Respuesta de Ollama sin campo response; se devuelve vacío");
            OllamaGenerateResponse::default()
        });

        Ok(ProviderReply::new(parsed.response, raw))
    }
}
