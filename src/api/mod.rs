//! Capa de red: un adaptador por backend.
//!
//! Cada adaptador traduce la petición normalizada al formato de su proveedor
//! y normaliza la respuesta de vuelta. Un intento por llamada, sin reintentos;
//! la degradación a offline la decide el router, no el adaptador.

pub mod grok;
pub mod lmstudio;
pub mod mistral;
pub mod ollama;
pub mod qwen;
pub mod streaming;

use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

/// Mensaje de chat en formato de cable (`role` + `content`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

impl WireMessage {
    pub fn system(content: impl Into<String>) -> Self {
        WireMessage {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        WireMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Parámetros de una llamada de chat ya normalizada.
pub struct ChatCall<'a> {
    pub messages: &'a [WireMessage],
    pub temperature: f32,
    pub max_tokens: u32,
    pub model: &'a str,
    pub api_key: Option<&'a str>,
    pub endpoint_base: &'a str,
}

/// Parámetros de una llamada de completion (prompt crudo).
pub struct CompletionCall<'a> {
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub model: &'a str,
    pub api_key: Option<&'a str>,
    pub endpoint_base: &'a str,
}

impl<'a> CompletionCall<'a> {
    /// Muchos backends no tienen endpoint de completion: se sintetiza como un
    /// chat de un solo turno con el system prompt fijo del asistente.
    pub fn as_synthesized_chat(&self) -> Vec<WireMessage> {
        vec![
            WireMessage::system("You are a helpful coding assistant."),
            WireMessage::user(self.prompt),
        ]
    }
}

/// Respuesta normalizada: texto siempre presente (posiblemente vacío) y el
/// payload crudo del proveedor para diagnóstico.
#[derive(Clone, Debug)]
pub struct ProviderReply {
    pub text: String,
    pub raw: serde_json::Value,
}

impl ProviderReply {
    pub fn new(text: impl Into<String>, raw: serde_json::Value) -> Self {
        ProviderReply {
            text: text.into(),
            raw,
        }
    }
}

/// Contrato común de los adaptadores. Un payload malformado degrada a texto
/// vacío (se registra, no se lanza); un estado HTTP no exitoso sí falla.
pub trait ProviderAdapter: Send {
    fn execute_chat(&self, call: &ChatCall<'_>) -> Result<ProviderReply, AdapterError>;

    fn execute_completion(&self, call: &CompletionCall<'_>) -> Result<ProviderReply, AdapterError>;
}

pub(crate) const HTTP_TIMEOUT_SECS: u64 = 45;
pub(crate) const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Cliente HTTP con los timeouts estándar de los adaptadores.
pub(crate) fn blocking_client(
    provider: &'static str,
) -> Result<reqwest::blocking::Client, AdapterError> {
    let client = reqwest::blocking::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent("code-assistant-rs/0.1")
        .build()?;
    log::debug!("Cliente HTTP creado para {provider}");
    Ok(client)
}

/// Comprueba el estado HTTP y devuelve el cuerpo; los no-2xx se convierten en
/// `AdapterError::Http` con el cuerpo como diagnóstico.
pub(crate) fn read_success_body(
    provider: &'static str,
    response: reqwest::blocking::Response,
) -> Result<String, AdapterError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(AdapterError::Http {
            provider,
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
