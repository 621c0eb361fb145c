//! Streaming SSE sobre endpoints estilo chat-completions.
//!
//! Ruta de edición en vivo del editor: agrega los deltas del stream y entrega
//! cada fragmento a un callback para refrescar la vista previa. Las líneas
//! JSON malformadas se descartan con un aviso y la agregación continúa; el
//! stream completo tiene un presupuesto de 30 segundos.

use std::io::{BufRead, BufReader};
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::json;

use super::WireMessage;
use crate::error::AdapterError;

const PROVIDER: &str = "stream";

/// Presupuesto total del stream, igual que el timeout del editor original.
pub const STREAM_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize, Default)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Petición de edición en vivo contra un endpoint chat-completions.
pub struct StreamRequest<'a> {
    pub endpoint_base: &'a str,
    pub api_key: Option<&'a str>,
    pub model: &'a str,
    pub messages: &'a [WireMessage],
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Lanza la petición con `stream: true` y agrega los deltas de contenido.
///
/// `on_delta` recibe cada fragmento según llega; el valor devuelto es el
/// texto completo agregado. Un 401 se reporta con el mensaje de credenciales
/// del editor; cualquier otro estado no exitoso conserva su código.
pub fn stream_chat_completions(
    request: &StreamRequest<'_>,
    mut on_delta: impl FnMut(&str),
) -> Result<String, AdapterError> {
    let payload = json!({
        "model": request.model,
        "messages": request.messages,
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
        "stream": true,
    });

    let client = reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_secs(super::CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(STREAM_TIMEOUT_SECS))
        .user_agent("code-assistant-rs/0.1")
        .build()?;

    let mut builder = client
        .post(format!("{}/chat/completions", request.endpoint_base))
        .json(&payload);
    if let Some(key) = request.api_key.map(str::trim).filter(|key| !key.is_empty()) {
        builder = builder.bearer_auth(key);
    }

    let response = builder.send()?;
    let status = response.status();
    if !status.is_success() {
        let body = if status.as_u16() == 401 {
            "Unauthorized: Check your API key.".to_string()
        } else {
            format!("API Error: {}", status.canonical_reason().unwrap_or("unknown"))
        };
        return Err(AdapterError::Http {
            provider: PROVIDER,
            status: status.as_u16(),
            body,
        });
    }

    let deadline = Instant::now() + Duration::from_secs(STREAM_TIMEOUT_SECS);
    aggregate_sse(BufReader::new(response), deadline, &mut on_delta)
}

/// Agrega las líneas `data:` de un stream SSE hasta `[DONE]`, fin de lectura
/// o el vencimiento de `deadline`. Separado del transporte para poder probar
/// el parseo sobre cualquier `BufRead`.
fn aggregate_sse(
    mut reader: impl BufRead,
    deadline: Instant,
    on_delta: &mut impl FnMut(&str),
) -> Result<String, AdapterError> {
    let mut line = String::new();
    let mut aggregated = String::new();

    loop {
        if Instant::now() >= deadline {
            return Err(AdapterError::StreamTimeout);
        }

        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }

        let trimmed = line.trim_start();
        if !trimmed.starts_with("data:") {
            continue;
        }
        let data = trimmed.trim_start_matches("data:").trim();
        if data == "[DONE]" {
            break;
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => {
                let content = chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta)
                    .and_then(|delta| delta.content);
                if let Some(content) = content {
                    aggregated.push_str(&content);
                    on_delta(&content);
                }
            }
            Err(err) => {
                // Resiliencia heredada del editor: el chunk malformado se
                // descarta y la agregación sigue con el siguiente.
                log::warn!("Chunk de stream malformado, se ignora: {err}");
            }
        }
    }

    Ok(aggregated)
}
