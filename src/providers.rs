//! Catálogo de proveedores soportados por el asistente.
//!
//! El catálogo es inmutable tras la carga: una entrada por backend con su
//! endpoint, si exige credenciales y el modelo por defecto. Las entradas con
//! endpoint offline nunca exigen autenticación.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::capability::Capability;

/// Backends que el router sabe enrutar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Local,
    Mistral,
    /// Entrada heredada: se anuncia como GPT-4 pero enruta al responder offline.
    OpenAi,
    LmStudio,
    Ollama,
    Grok,
    Qwen,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 7] = [
        ProviderKind::Local,
        ProviderKind::Mistral,
        ProviderKind::OpenAi,
        ProviderKind::LmStudio,
        ProviderKind::Ollama,
        ProviderKind::Grok,
        ProviderKind::Qwen,
    ];

    /// Identificador estable utilizado para persistir el proveedor activo.
    pub fn key(self) -> &'static str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::Mistral => "mistral",
            ProviderKind::OpenAi => "openai",
            ProviderKind::LmStudio => "lmstudio",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Grok => "grok",
            ProviderKind::Qwen => "qwen",
        }
    }

    /// Nombre amigable mostrado en notificaciones y logs.
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::Local => "Local Model (Offline)",
            ProviderKind::Mistral => "Mistral AI",
            ProviderKind::OpenAi => "OpenAI GPT-4 (Offline)",
            ProviderKind::LmStudio => "LM Studio (Local)",
            ProviderKind::Ollama => "Ollama (Local)",
            ProviderKind::Grok => "Grok AI",
            ProviderKind::Qwen => "Qwen AI",
        }
    }

    /// Nombre corto usado en los avisos de degradación a offline.
    pub fn short_name(self) -> &'static str {
        match self {
            ProviderKind::Local => "Local",
            ProviderKind::Mistral => "Mistral",
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::LmStudio => "LM Studio",
            ProviderKind::Ollama => "Ollama",
            ProviderKind::Grok => "Grok",
            ProviderKind::Qwen => "Qwen",
        }
    }

    pub fn parse(value: &str) -> Option<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.key() == value.trim())
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Dónde vive el backend: en red o en el responder offline integrado.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    Offline,
    Base(String),
}

impl Endpoint {
    pub fn is_offline(&self) -> bool {
        matches!(self, Endpoint::Offline)
    }

    pub fn base(&self) -> Option<&str> {
        match self {
            Endpoint::Offline => None,
            Endpoint::Base(url) => Some(url.as_str()),
        }
    }
}

/// Entrada inmutable del catálogo de proveedores.
#[derive(Clone, Debug, Serialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub display_name: &'static str,
    pub endpoint: Endpoint,
    pub requires_auth: bool,
    pub default_model: Option<&'static str>,
    pub capabilities: Vec<Capability>,
}

impl ProviderConfig {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

fn entry(
    kind: ProviderKind,
    endpoint: Endpoint,
    requires_auth: bool,
    default_model: Option<&'static str>,
) -> ProviderConfig {
    ProviderConfig {
        kind,
        display_name: kind.display_name(),
        endpoint,
        requires_auth,
        default_model,
        capabilities: Capability::ALL.to_vec(),
    }
}

static CATALOG: Lazy<BTreeMap<ProviderKind, ProviderConfig>> = Lazy::new(|| {
    let entries = [
        entry(ProviderKind::Local, Endpoint::Offline, false, None),
        entry(
            ProviderKind::Mistral,
            Endpoint::Base("https://api.mistral.ai/v1".to_string()),
            true,
            Some("mistral-large-latest"),
        ),
        entry(ProviderKind::OpenAi, Endpoint::Offline, false, None),
        entry(
            ProviderKind::LmStudio,
            Endpoint::Base("http://localhost:1234/v1".to_string()),
            false,
            None,
        ),
        entry(
            ProviderKind::Ollama,
            Endpoint::Base("http://localhost:11434/api".to_string()),
            false,
            Some("codellama"),
        ),
        entry(
            ProviderKind::Grok,
            Endpoint::Base("https://api.grok.x/v1".to_string()),
            true,
            Some("grok-1"),
        ),
        entry(
            ProviderKind::Qwen,
            Endpoint::Base("https://dashscope.aliyuncs.com/api/v1".to_string()),
            true,
            Some("qwen-max"),
        ),
    ];

    entries
        .into_iter()
        .map(|config| (config.kind, config))
        .collect()
});

/// Devuelve la entrada del catálogo para un proveedor.
pub fn catalog_entry(kind: ProviderKind) -> &'static ProviderConfig {
    CATALOG
        .get(&kind)
        .expect("el catálogo cubre todos los ProviderKind")
}

/// Catálogo completo, en orden estable.
pub fn catalog() -> impl Iterator<Item = &'static ProviderConfig> {
    CATALOG.values()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_kind() {
        for kind in ProviderKind::ALL {
            let config = catalog_entry(kind);
            assert_eq!(config.kind, kind);
            assert_eq!(config.capabilities.len(), Capability::ALL.len());
        }
    }

    #[test]
    fn offline_entries_never_require_auth() {
        for config in catalog() {
            if config.endpoint.is_offline() {
                assert!(
                    !config.requires_auth,
                    "{} es offline pero exige credenciales",
                    config.kind
                );
            }
        }
    }

    #[test]
    fn keys_are_unique_and_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::parse(kind.key()), Some(kind));
        }
        assert_eq!(ProviderKind::parse("no-such-provider"), None);
    }
}
