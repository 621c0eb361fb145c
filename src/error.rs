//! Taxonomía de errores del asistente.
//!
//! Los fallos de adaptador nunca llegan al llamador: el router los captura y
//! degrada a la respuesta offline. Solo `AssistantError::Busy` se propaga.

use crate::capability::Capability;

/// Fallo de un adaptador concreto durante una única llamada.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// El proveedor exige credenciales y no hay API key configurada.
    /// Se comprueba antes de tocar la red.
    #[error("Falta la API key para {0}")]
    MissingApiKey(&'static str),

    /// El backend respondió con un estado HTTP no exitoso.
    #[error("{provider} devolvió un estado {status}: {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// Capacidad no soportada por el proveedor; se lanza antes de cualquier I/O.
    #[error("{provider} no soporta la capacidad '{capability}'")]
    Unsupported {
        provider: &'static str,
        capability: Capability,
    },

    /// Fallo de transporte (conexión rechazada, timeout, DNS...).
    #[error("Error de red hablando con el proveedor: {0}")]
    Network(#[from] reqwest::Error),

    /// El stream superó el límite de 30 segundos.
    #[error("Request timed out after 30 seconds")]
    StreamTimeout,

    /// Fallo de lectura sobre el cuerpo del stream SSE.
    #[error("Error leyendo el stream: {0}")]
    StreamRead(#[from] std::io::Error),
}

/// Errores visibles para el llamador del router.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Ya hay una petición en vuelo para esta sesión. No se encola: el
    /// llamador debe reintentar cuando la anterior termine.
    #[error("Ya hay una petición del asistente en curso")]
    Busy,

    /// Fallo de configuración local (persistencia, parámetros inválidos).
    #[error("{0}")]
    Config(String),
}
