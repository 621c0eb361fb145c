//! Estado mutable de una sesión del asistente.
//!
//! Una sesión pertenece a una instancia del editor. Las llamadas se
//! serializan estrictamente: la segunda petición mientras hay una en vuelo se
//! rechaza, no se encola. Mutar ajustes (proveedor, key) solo es seguro entre
//! llamadas, garantizado por esa serialización.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;

use crate::capability::Capability;
use crate::config::AssistantConfig;
use crate::error::AssistantError;
use crate::providers::ProviderKind;

/// Interacciones recordadas por defecto (ventana de contexto del editor).
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// Registro de una interacción completada.
#[derive(Clone, Debug)]
pub struct InteractionRecord {
    pub capability: Capability,
    pub summary: String,
    pub timestamp: String,
}

pub struct AssistantSession {
    pub provider: ProviderKind,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    pub custom_endpoint: Option<String>,
    context_window: usize,
    history: VecDeque<InteractionRecord>,
    in_flight: Arc<AtomicBool>,
}

impl AssistantSession {
    pub fn new(provider: ProviderKind) -> Self {
        AssistantSession {
            provider,
            api_key: String::new(),
            temperature: 0.3,
            max_tokens: 4096,
            custom_endpoint: None,
            context_window: DEFAULT_CONTEXT_WINDOW,
            history: VecDeque::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Crea la sesión desde los ajustes persistidos, al arrancar el editor.
    pub fn from_config(config: &AssistantConfig) -> Self {
        let mut session = AssistantSession::new(
            ProviderKind::parse(&config.provider).unwrap_or(ProviderKind::Local),
        );
        session.set_api_key(config.api_key.clone());
        session.set_temperature(config.temperature);
        session.set_max_tokens(config.max_tokens);
        session.custom_endpoint = config
            .custom_endpoint
            .clone()
            .filter(|endpoint| !endpoint.trim().is_empty());
        session
    }

    pub fn api_key(&self) -> Option<&str> {
        let trimmed = self.api_key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = api_key;
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Recorta al rango válido [0, 2].
    pub fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature.clamp(0.0, 2.0);
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Ignora valores no positivos.
    pub fn set_max_tokens(&mut self, max_tokens: u32) {
        if max_tokens > 0 {
            self.max_tokens = max_tokens;
        }
    }

    pub fn set_context_window(&mut self, window: usize) {
        self.context_window = window.max(1);
        while self.history.len() > self.context_window {
            self.history.pop_front();
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &InteractionRecord> {
        self.history.iter()
    }

    /// Registra una interacción completada, descartando las más antiguas.
    pub fn record_interaction(&mut self, capability: Capability, summary: impl Into<String>) {
        self.history.push_back(InteractionRecord {
            capability,
            summary: summary.into(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        });
        while self.history.len() > self.context_window {
            self.history.pop_front();
        }
    }

    pub fn is_request_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Marca la sesión como ocupada durante la vida del guard devuelto.
    ///
    /// El guard limpia la marca en `Drop`, en cualquier ruta de salida. Si ya
    /// hay una petición en vuelo devuelve `Busy` sin tocar la marca.
    pub fn begin_request(&self) -> Result<InFlightGuard, AssistantError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AssistantError::Busy);
        }
        Ok(InFlightGuard {
            flag: Arc::clone(&self.in_flight),
        })
    }

    /// Vuelca los ajustes actuales al formato persistido.
    pub fn to_config(&self) -> AssistantConfig {
        AssistantConfig {
            provider: self.provider.key().to_string(),
            api_key: self.api_key.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            custom_endpoint: self.custom_endpoint.clone(),
        }
    }
}

// La API key es un secreto opaco: jamás aparece en logs ni volcados de depuración.
impl fmt::Debug for AssistantSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantSession")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("custom_endpoint", &self.custom_endpoint)
            .field("history_len", &self.history.len())
            .field("in_flight", &self.is_request_in_flight())
            .finish()
    }
}

/// Guard RAII de la marca en-vuelo.
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
