//! Ajustes persistidos del asistente.
//!
//! Mismo contrato que el resto de configuraciones del editor: `load` nunca
//! falla (cae a valores por defecto ante archivo ausente o corrupto) y `save`
//! escribe JSON legible.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AssistantConfig {
    /// Identificador del proveedor activo (`local`, `mistral`, ...).
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Sobrescritura del endpoint para servidores locales (LM Studio).
    #[serde(default)]
    pub custom_endpoint: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            api_key: String::new(),
            temperature: 0.3,
            max_tokens: 4096,
            custom_endpoint: None,
        }
    }
}

impl AssistantConfig {
    /// Ruta estándar bajo el directorio de configuración de la plataforma.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("code-assistant")
            .join("assistant.json")
    }

    pub fn load(path: &PathBuf) -> Self {
        if let Ok(text) = fs::read_to_string(path) {
            if let Ok(config) = serde_json::from_str(&text) {
                return config;
            }
            log::warn!("Configuración corrupta en {}; se usan valores por defecto", path.display());
        }
        Self::default()
    }

    pub fn save(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("No se pudo crear {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)
            .with_context(|| format!("No se pudo escribir {}", path.display()))?;
        Ok(())
    }
}
