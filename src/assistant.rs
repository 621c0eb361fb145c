//! Fachada del asistente: ejecuta capacidades, mantiene la sesión y persiste
//! los ajustes.
//!
//! Es el punto de entrada que consume el editor. Cada capacidad se despacha
//! como una petición normalizada al router; el resultado vuelve empaquetado
//! en el sobre específico de la capacidad.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use crate::capability::{Capability, CapabilityOutcome};
use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::notify::{event_channel, AssistantEvent};
use crate::providers::ProviderKind;
use crate::router::{NormalizedRequest, RequestRouter};
use crate::session::AssistantSession;

pub struct Assistant {
    session: AssistantSession,
    router: RequestRouter,
    config_path: PathBuf,
}

impl Assistant {
    /// Asistente con los ajustes persistidos en la ruta estándar.
    ///
    /// Devuelve además el receptor de eventos no fatales (avisos de modo
    /// offline); el editor los pinta en su línea de estado.
    pub fn new() -> (Self, Receiver<AssistantEvent>) {
        Self::with_config_path(AssistantConfig::default_path())
    }

    /// Igual que `new`, con una ruta de configuración explícita.
    pub fn with_config_path(config_path: PathBuf) -> (Self, Receiver<AssistantEvent>) {
        let config = AssistantConfig::load(&config_path);
        let session = AssistantSession::from_config(&config);
        let (events, receiver) = event_channel();
        let router = RequestRouter::new(events);
        (
            Assistant {
                session,
                router,
                config_path,
            },
            receiver,
        )
    }

    /// Construcción desde piezas ya montadas (tests y embebidos).
    pub fn from_parts(
        session: AssistantSession,
        router: RequestRouter,
        config_path: PathBuf,
    ) -> Self {
        Assistant {
            session,
            router,
            config_path,
        }
    }

    pub fn session(&self) -> &AssistantSession {
        &self.session
    }

    /// Acceso al router para registrar fábricas de adaptadores alternativas.
    pub fn router_mut(&mut self) -> &mut RequestRouter {
        &mut self.router
    }

    /// Ejecuta una capacidad contra el proveedor activo.
    ///
    /// `instructions` es el mensaje del usuario en `Chat` y las instrucciones
    /// de edición en el resto (en blanco, se usa la frase por defecto de la
    /// capacidad). El único error posible es `Busy`; los fallos de proveedor
    /// degradan a offline dentro del router.
    pub fn run(
        &mut self,
        capability: Capability,
        code: &str,
        instructions: &str,
    ) -> Result<CapabilityOutcome, AssistantError> {
        let request = NormalizedRequest::build(
            capability,
            code,
            instructions,
            self.session.temperature(),
            self.session.max_tokens(),
        );
        let reply = self.router.execute(&self.session, &request)?;
        let outcome = CapabilityOutcome::wrap(capability, code, reply.text);
        self.session
            .record_interaction(capability, outcome.message());
        Ok(outcome)
    }

    /// Sugerencias inline para la posición actual del cursor (ruta rápida).
    pub fn get_suggestions(&mut self, prompt: &str) -> Result<Vec<String>, AssistantError> {
        self.router.suggest(&self.session, prompt)
    }

    /// Edición en vivo: entrega cada fragmento del stream a `on_delta` y
    /// devuelve el código editado completo.
    pub fn stream_edit(
        &mut self,
        code: &str,
        instructions: &str,
        on_delta: impl FnMut(&str),
    ) -> Result<String, AssistantError> {
        let edited = self
            .router
            .stream_edit(&self.session, code, instructions, on_delta)?;
        self.session
            .record_interaction(Capability::Edit, "Code edited according to instructions");
        Ok(edited)
    }

    // --- Ajustes. Cada mutación se persiste como mejor esfuerzo; un disco
    // --- que falla no debe tumbar la sesión en curso.

    pub fn set_provider(&mut self, provider: ProviderKind) {
        self.session.provider = provider;
        self.persist();
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.session.set_api_key(api_key);
        self.persist();
    }

    pub fn set_temperature(&mut self, temperature: f32) {
        self.session.set_temperature(temperature);
        self.persist();
    }

    pub fn set_max_tokens(&mut self, max_tokens: u32) {
        self.session.set_max_tokens(max_tokens);
        self.persist();
    }

    pub fn set_custom_endpoint(&mut self, endpoint: Option<String>) {
        self.session.custom_endpoint = endpoint.filter(|value| !value.trim().is_empty());
        self.persist();
    }

    /// Persistencia explícita de los ajustes actuales.
    pub fn save_settings(&self) -> Result<(), AssistantError> {
        self.session
            .to_config()
            .save(&self.config_path)
            .map_err(|err| AssistantError::Config(err.to_string()))
    }

    fn persist(&self) {
        if let Err(err) = self.save_settings() {
            log::warn!(
                "No se pudieron guardar los ajustes en {}: {err}",
                self.config_path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::OfflineResponder;
    use crate::router::RequestRouter;

    fn offline_assistant(dir: &tempfile::TempDir) -> (Assistant, Receiver<AssistantEvent>) {
        let (events, receiver) = event_channel();
        let router =
            RequestRouter::new(events).with_offline_responder(OfflineResponder::deterministic());
        let session = AssistantSession::new(ProviderKind::Local);
        let assistant =
            Assistant::from_parts(session, router, dir.path().join("assistant.json"));
        (assistant, receiver)
    }

    #[test]
    fn run_wraps_reply_in_capability_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let (mut assistant, _events) = offline_assistant(&dir);

        let outcome = assistant
            .run(Capability::Explain, "fn f() {}", "explain")
            .unwrap();
        match &outcome {
            CapabilityOutcome::Explain { explanation, message } => {
                assert!(explanation
                    .starts_with("This function implements a binary search algorithm."));
                assert_eq!(*message, "Code explanation generated");
            }
            other => panic!("sobre inesperado: {other:?}"),
        }
    }

    #[test]
    fn run_records_interaction_history() {
        let dir = tempfile::tempdir().unwrap();
        let (mut assistant, _events) = offline_assistant(&dir);

        assistant.run(Capability::Chat, "", "hello").unwrap();
        assistant
            .run(Capability::Completion, "function sum", "")
            .unwrap();

        let history: Vec<_> = assistant.session().history().collect();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].capability, Capability::Chat);
        assert_eq!(history[1].capability, Capability::Completion);
        assert_eq!(history[1].summary, "Code completion generated");
    }

    #[test]
    fn settings_mutations_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let (mut assistant, _events) = offline_assistant(&dir);

        assistant.set_provider(ProviderKind::Mistral);
        assistant.set_api_key("sk-test".to_string());
        assistant.set_temperature(0.9);

        let loaded = AssistantConfig::load(&dir.path().join("assistant.json"));
        assert_eq!(loaded.provider, "mistral");
        assert_eq!(loaded.api_key, "sk-test");
        assert_eq!(loaded.temperature, 0.9);
    }

    #[test]
    fn unwritable_settings_path_reports_config_error() {
        // La ruta cuelga de un archivo regular: crear el directorio falla.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let (events, _receiver) = event_channel();
        let router = RequestRouter::new(events);
        let session = AssistantSession::new(ProviderKind::Local);
        let assistant =
            Assistant::from_parts(session, router, blocker.join("assistant.json"));

        match assistant.save_settings() {
            Err(AssistantError::Config(reason)) => assert!(!reason.is_empty()),
            other => panic!("esperaba Config, llegó {other:?}"),
        }
    }

    #[test]
    fn blank_custom_endpoint_is_treated_as_unset() {
        let dir = tempfile::tempdir().unwrap();
        let (mut assistant, _events) = offline_assistant(&dir);

        assistant.set_custom_endpoint(Some("   ".to_string()));
        assert_eq!(assistant.session().custom_endpoint, None);

        assistant.set_custom_endpoint(Some("http://localhost:1234/v1".to_string()));
        assert_eq!(
            assistant.session().custom_endpoint.as_deref(),
            Some("http://localhost:1234/v1")
        );
    }
}
