//! Enrutado de peticiones hacia el adaptador activo, con degradación a
//! offline ante cualquier fallo de proveedor.
//!
//! Política deliberada de disponibilidad sobre fidelidad: el llamador nunca
//! ve un fallo duro de proveedor. El único error que se propaga es `Busy`.

use std::collections::BTreeMap;

use serde_json::json;

use crate::api::streaming::{stream_chat_completions, StreamRequest};
use crate::api::{ChatCall, CompletionCall, ProviderAdapter, ProviderReply, WireMessage};
use crate::capability::Capability;
use crate::error::{AdapterError, AssistantError};
use crate::notify::{AssistantEvent, EventSender, OFFLINE_DEFAULT_MESSAGE};
use crate::offline::OfflineResponder;
use crate::providers::{catalog_entry, ProviderKind};
use crate::session::AssistantSession;

/// Carga útil ya normalizada: chat (mensajes) o completion (prompt crudo).
#[derive(Clone, Debug)]
pub enum RequestPayload {
    Chat { messages: Vec<WireMessage> },
    Completion { prompt: String },
}

/// Petición normalizada, construida fresca en cada llamada.
#[derive(Clone, Debug)]
pub struct NormalizedRequest {
    pub capability: Capability,
    pub payload: RequestPayload,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl NormalizedRequest {
    /// Construye la petición para una capacidad: `Completion` viaja como
    /// prompt crudo, el resto como array de dos mensajes.
    pub fn build(
        capability: Capability,
        code: &str,
        instructions: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        let payload = if capability.uses_completion_endpoint() {
            RequestPayload::Completion {
                prompt: code.to_string(),
            }
        } else {
            RequestPayload::Chat {
                messages: capability.build_messages(code, instructions),
            }
        };
        NormalizedRequest {
            capability,
            payload,
            temperature,
            max_tokens,
        }
    }
}

/// System prompt fijo de la ruta de edición en vivo.
pub const STREAM_EDIT_SYSTEM_PROMPT: &str =
    "Return only the modified code without explanations.";

/// Base de streaming de Mistral: Codestral vive en su propio host, separado
/// del endpoint de chat del catálogo.
const STREAM_EDIT_MISTRAL_BASE: &str = "https://codestral.mistral.ai/v1";

/// Modelo usado por la edición en vivo según el proveedor.
fn stream_edit_model(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Mistral => "codestral-latest",
        _ => "gpt-3.5-turbo",
    }
}

/// Mensajes de la edición en vivo: código etiquetado primero, instrucciones
/// después.
fn stream_edit_messages(code: &str, instructions: &str) -> Vec<WireMessage> {
    vec![
        WireMessage::system(STREAM_EDIT_SYSTEM_PROMPT),
        WireMessage::user(format!(
            "Original code:\n{code}\n\nInstructions:\n{instructions}"
        )),
    ]
}

/// Base del endpoint de streaming: Codestral para Mistral, la sobrescritura
/// configurada para LM Studio, la base del catálogo para el resto.
fn stream_edit_base<'a>(
    provider: ProviderKind,
    custom_endpoint: Option<&'a str>,
    catalog_base: &'a str,
) -> &'a str {
    match (provider, custom_endpoint) {
        (ProviderKind::Mistral, _) => STREAM_EDIT_MISTRAL_BASE,
        (ProviderKind::LmStudio, Some(custom)) => custom,
        _ => catalog_base,
    }
}

/// Fábrica de adaptadores: permite construcción perezosa e inyección en tests.
pub type AdapterFactory = Box<dyn Fn() -> Box<dyn ProviderAdapter> + Send>;

pub struct RequestRouter {
    factories: BTreeMap<ProviderKind, AdapterFactory>,
    adapters: BTreeMap<ProviderKind, Box<dyn ProviderAdapter>>,
    offline: OfflineResponder,
    events: EventSender,
}

impl RequestRouter {
    /// Router con el registro de fábricas por defecto (todos los backends en
    /// red del catálogo).
    pub fn new(events: EventSender) -> Self {
        let mut router = RequestRouter {
            factories: BTreeMap::new(),
            adapters: BTreeMap::new(),
            offline: OfflineResponder::new(),
            events,
        };
        router.register_adapter_factory(ProviderKind::Mistral, || {
            Box::new(crate::api::mistral::MistralAdapter::new())
        });
        router.register_adapter_factory(ProviderKind::LmStudio, || {
            Box::new(crate::api::lmstudio::LmStudioAdapter::new())
        });
        router.register_adapter_factory(ProviderKind::Ollama, || {
            Box::new(crate::api::ollama::OllamaAdapter::new())
        });
        router.register_adapter_factory(ProviderKind::Grok, || {
            Box::new(crate::api::grok::GrokAdapter::new())
        });
        router.register_adapter_factory(ProviderKind::Qwen, || {
            Box::new(crate::api::qwen::QwenAdapter::new())
        });
        router
    }

    /// Sustituye el responder offline (tests: variante determinista).
    pub fn with_offline_responder(mut self, offline: OfflineResponder) -> Self {
        self.offline = offline;
        self
    }

    /// Registra (o sustituye) la fábrica de un proveedor. El adaptador se
    /// construye perezosamente en el primer uso.
    pub fn register_adapter_factory<F>(&mut self, kind: ProviderKind, factory: F)
    where
        F: Fn() -> Box<dyn ProviderAdapter> + Send + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
        // Un registro nuevo invalida la instancia cacheada.
        self.adapters.remove(&kind);
    }

    /// Ejecuta la petición contra el proveedor activo de la sesión.
    ///
    /// Algoritmo del contrato: rechazo inmediato si hay una llamada en vuelo;
    /// un único intento contra el adaptador; ante cualquier fallo, aviso no
    /// fatal y delegación al responder offline con la misma petición.
    pub fn execute(
        &mut self,
        session: &AssistantSession,
        request: &NormalizedRequest,
    ) -> Result<ProviderReply, AssistantError> {
        let _guard = session.begin_request()?;

        let provider = session.provider;
        let config = catalog_entry(provider);

        if !config.endpoint.is_offline() {
            match self.attempt_provider(session, request) {
                Ok(reply) => return Ok(reply),
                Err(err) => {
                    log::warn!("Fallo del proveedor {}: {err}", provider.key());
                    self.events.send(AssistantEvent::offline_notice(
                        Some(provider),
                        format!(
                            "{} connection failed. Falling back to offline mode.",
                            provider.short_name()
                        ),
                    ));
                }
            }
        } else {
            self.events
                .send(AssistantEvent::offline_notice(None, OFFLINE_DEFAULT_MESSAGE));
        }

        Ok(self.offline_reply(request))
    }

    /// Sugerencias inline: ruta rápida, siempre offline. Respeta la
    /// serialización de llamadas igual que el ciclo completo.
    pub fn suggest(
        &mut self,
        session: &AssistantSession,
        prompt: &str,
    ) -> Result<Vec<String>, AssistantError> {
        let _guard = session.begin_request()?;
        Ok(self.offline.suggest(prompt))
    }

    /// Edición en vivo: stream de deltas contra el endpoint chat-completions
    /// del proveedor activo, con la misma degradación a offline que `execute`.
    ///
    /// `on_delta` recibe cada fragmento según llega; el retorno es el texto
    /// completo. En la ruta offline el texto llega en una sola entrega.
    pub fn stream_edit(
        &mut self,
        session: &AssistantSession,
        code: &str,
        instructions: &str,
        mut on_delta: impl FnMut(&str),
    ) -> Result<String, AssistantError> {
        let _guard = session.begin_request()?;

        let provider = session.provider;
        let config = catalog_entry(provider);
        let messages = stream_edit_messages(code, instructions);

        if !config.endpoint.is_offline() {
            let endpoint_base = stream_edit_base(
                provider,
                session.custom_endpoint.as_deref(),
                config.endpoint.base().unwrap_or_default(),
            );
            let model = stream_edit_model(provider);
            let request = StreamRequest {
                endpoint_base,
                api_key: session.api_key(),
                model,
                messages: &messages,
                temperature: session.temperature(),
                max_tokens: session.max_tokens(),
            };
            match stream_chat_completions(&request, &mut on_delta) {
                Ok(text) => return Ok(text),
                Err(err) => {
                    log::warn!("Fallo del stream con {}: {err}", provider.key());
                    self.events.send(AssistantEvent::offline_notice(
                        Some(provider),
                        format!(
                            "{} connection failed. Falling back to offline mode.",
                            provider.short_name()
                        ),
                    ));
                }
            }
        } else {
            self.events
                .send(AssistantEvent::offline_notice(None, OFFLINE_DEFAULT_MESSAGE));
        }

        let text = self.offline.chat(&messages);
        on_delta(&text);
        Ok(text)
    }

    fn attempt_provider(
        &mut self,
        session: &AssistantSession,
        request: &NormalizedRequest,
    ) -> Result<ProviderReply, AdapterError> {
        let provider = session.provider;
        let config = catalog_entry(provider);

        // Capacidad no soportada: se rechaza antes de cualquier I/O.
        if !config.supports(request.capability) {
            return Err(AdapterError::Unsupported {
                provider: provider.short_name(),
                capability: request.capability,
            });
        }

        let endpoint_base = match (provider, session.custom_endpoint.as_deref()) {
            // El endpoint configurable solo aplica al servidor local.
            (ProviderKind::LmStudio, Some(custom)) => custom,
            _ => config.endpoint.base().unwrap_or_default(),
        };
        let model = config.default_model.unwrap_or_default();

        let adapter = self.adapter_for(provider)?;
        log::info!(
            "Consultando '{}' en {} ({})",
            model,
            provider.key(),
            request.capability
        );

        match &request.payload {
            RequestPayload::Chat { messages } => adapter.execute_chat(&ChatCall {
                messages,
                temperature: request.temperature,
                max_tokens: request.max_tokens,
                model,
                api_key: session.api_key(),
                endpoint_base,
            }),
            RequestPayload::Completion { prompt } => {
                adapter.execute_completion(&CompletionCall {
                    prompt,
                    temperature: request.temperature,
                    max_tokens: request.max_tokens,
                    model,
                    api_key: session.api_key(),
                    endpoint_base,
                })
            }
        }
    }

    /// Construcción perezosa del adaptador; la instancia queda cacheada.
    fn adapter_for(&mut self, provider: ProviderKind) -> Result<&dyn ProviderAdapter, AdapterError> {
        if !self.adapters.contains_key(&provider) {
            let factory = self.factories.get(&provider).ok_or(AdapterError::Unsupported {
                provider: provider.short_name(),
                capability: Capability::Chat,
            })?;
            let adapter = factory();
            self.adapters.insert(provider, adapter);
        }
        Ok(self
            .adapters
            .get(&provider)
            .map(|adapter| adapter.as_ref())
            .expect("recién insertado"))
    }

    /// Misma petición, respondida por el generador offline. El `raw` imita la
    /// forma de cable del proveedor para que el diagnóstico sea uniforme.
    fn offline_reply(&mut self, request: &NormalizedRequest) -> ProviderReply {
        match &request.payload {
            RequestPayload::Chat { messages } => {
                let text = self.offline.chat(messages);
                let raw = json!({
                    "choices": [{ "message": { "role": "assistant", "content": text } }]
                });
                ProviderReply::new(text, raw)
            }
            RequestPayload::Completion { prompt } => {
                let text = self.offline.completion(prompt);
                let raw = json!({ "choices": [{ "text": text }] });
                ProviderReply::new(text, raw)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::event_channel;

    fn deterministic_router(events: EventSender) -> RequestRouter {
        RequestRouter::new(events).with_offline_responder(OfflineResponder::deterministic())
    }

    #[test]
    fn busy_session_rejects_and_preserves_flag() {
        let (events, _rx) = event_channel();
        let mut router = deterministic_router(events);
        let session = AssistantSession::new(ProviderKind::Local);
        let request = NormalizedRequest::build(Capability::Chat, "", "hola", 0.3, 64);

        let guard = session.begin_request().unwrap();
        match router.execute(&session, &request) {
            Err(AssistantError::Busy) => {}
            other => panic!("esperaba Busy, llegó {other:?}"),
        }
        assert!(session.is_request_in_flight());
        drop(guard);
        assert!(!session.is_request_in_flight());
    }

    #[test]
    fn missing_api_key_degrades_to_offline_without_network() {
        // Mistral exige credenciales: el adaptador corta antes de tocar la
        // red y el router debe servir el resultado offline equivalente.
        let (events, rx) = event_channel();
        let mut router = deterministic_router(events);
        let mut session = AssistantSession::new(ProviderKind::Mistral);
        session.set_api_key(String::new());

        let request = NormalizedRequest::build(Capability::Chat, "", "explain", 0.3, 64);
        let reply = router.execute(&session, &request).unwrap();

        let mut offline = OfflineResponder::deterministic();
        let expected = match &request.payload {
            RequestPayload::Chat { messages } => offline.chat(messages),
            RequestPayload::Completion { .. } => unreachable!(),
        };
        assert_eq!(reply.text, expected);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].message,
            "Mistral connection failed. Falling back to offline mode."
        );
    }

    #[test]
    fn offline_provider_emits_default_notice() {
        let (events, rx) = event_channel();
        let mut router = deterministic_router(events);
        let session = AssistantSession::new(ProviderKind::OpenAi);

        let request = NormalizedRequest::build(Capability::Completion, "function sum", "", 0.3, 64);
        let reply = router.execute(&session, &request).unwrap();
        assert_eq!(reply.text, "function sum(a, b) {\n  return a + b;\n}");
        assert_eq!(reply.raw["choices"][0]["text"], reply.text);

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, OFFLINE_DEFAULT_MESSAGE);
        assert_eq!(events[0].provider, None);
    }

    #[test]
    fn stream_edit_offline_delivers_single_delta() {
        let (events, rx) = event_channel();
        let mut router = deterministic_router(events);
        let session = AssistantSession::new(ProviderKind::Local);

        let mut deltas: Vec<String> = Vec::new();
        let text = router
            .stream_edit(&session, "let x = 1;", "refactor this", |chunk| {
                deltas.push(chunk.to_string())
            })
            .unwrap();
        assert_eq!(deltas, vec![text.clone()]);
        assert!(text.starts_with("Here's your code refactored for better readability"));

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, OFFLINE_DEFAULT_MESSAGE);
    }

    #[test]
    fn stream_edit_wire_selection_follows_provider() {
        let messages = stream_edit_messages("let x;", "rename x to total");
        assert_eq!(messages[0].content, STREAM_EDIT_SYSTEM_PROMPT);
        assert_eq!(
            messages[1].content,
            "Original code:\nlet x;\n\nInstructions:\nrename x to total"
        );

        assert_eq!(stream_edit_model(ProviderKind::Mistral), "codestral-latest");
        assert_eq!(stream_edit_model(ProviderKind::Grok), "gpt-3.5-turbo");

        // Mistral streamea contra Codestral aunque el catálogo apunte al chat.
        assert_eq!(
            stream_edit_base(ProviderKind::Mistral, None, "https://api.mistral.ai/v1"),
            "https://codestral.mistral.ai/v1"
        );
        assert_eq!(
            stream_edit_base(
                ProviderKind::LmStudio,
                Some("http://localhost:9999/v1"),
                "http://localhost:1234/v1"
            ),
            "http://localhost:9999/v1"
        );
        assert_eq!(
            stream_edit_base(ProviderKind::Grok, None, "https://api.grok.x/v1"),
            "https://api.grok.x/v1"
        );
    }

    #[test]
    fn suggest_respects_in_flight_serialization() {
        let (events, _rx) = event_channel();
        let mut router = deterministic_router(events);
        let session = AssistantSession::new(ProviderKind::Local);

        let guard = session.begin_request().unwrap();
        assert!(matches!(
            router.suggest(&session, "function "),
            Err(AssistantError::Busy)
        ));
        drop(guard);

        let suggestions = router.suggest(&session, "function ").unwrap();
        assert_eq!(
            suggestions,
            vec!["(param1, param2) {\n  return param1 + param2;\n}".to_string()]
        );
    }

    #[test]
    fn in_flight_flag_clears_after_successful_call() {
        let (events, _rx) = event_channel();
        let mut router = deterministic_router(events);
        let session = AssistantSession::new(ProviderKind::Local);
        let request = NormalizedRequest::build(Capability::Chat, "", "hello there", 0.3, 64);

        let reply = router.execute(&session, &request).unwrap();
        assert!(!reply.text.is_empty());
        assert!(!session.is_request_in_flight());
    }
}
