//! Canal de notificaciones hacia el colaborador externo (línea de estado del
//! editor). El router publica avisos no bloqueantes; el consumidor decide
//! cómo pintarlos.

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Local;

use crate::providers::ProviderKind;

/// Mensaje por defecto cuando el asistente trabaja en modo offline.
pub const OFFLINE_DEFAULT_MESSAGE: &str =
    "Running in offline mode. Some AI features may be limited.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogStatus {
    Ok,
    Warning,
    Error,
    Running,
}

/// Evento emitido por el router. Nunca es fatal: informa, no interrumpe.
#[derive(Clone, Debug)]
pub struct AssistantEvent {
    pub status: LogStatus,
    /// Proveedor que originó el evento, si lo hay.
    pub provider: Option<ProviderKind>,
    pub message: String,
    pub timestamp: String,
}

impl AssistantEvent {
    pub fn offline_notice(provider: Option<ProviderKind>, message: impl Into<String>) -> Self {
        AssistantEvent {
            status: LogStatus::Warning,
            provider,
            message: message.into(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Emisor de eventos del asistente. Clonable; si nadie escucha, el envío se
/// descarta en silencio.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<AssistantEvent>,
}

impl EventSender {
    pub fn send(&self, event: AssistantEvent) {
        // Receptor caído = nadie mira la línea de estado; no es un error.
        let _ = self.tx.send(event);
    }
}

/// Crea el par (emisor, receptor) de eventos, al estilo de los canales de
/// respuesta de proveedor del editor.
pub fn event_channel() -> (EventSender, Receiver<AssistantEvent>) {
    let (tx, rx) = mpsc::channel();
    (EventSender { tx }, rx)
}
