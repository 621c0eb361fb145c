//! Capacidades del asistente y sus plantillas de prompt.
//!
//! Conjunto cerrado: el despacho dinámico por nombre del original se modela
//! como enum exhaustivo. Cada capacidad de chat produce exactamente dos
//! mensajes (system + user); `Completion` viaja por la ruta de prompt crudo.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::WireMessage;

/// Las diez operaciones soportadas. Las claves serializadas conservan los
/// identificadores camelCase del editor para no romper configs persistidas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "completion")]
    Completion,
    #[serde(rename = "chat")]
    Chat,
    #[serde(rename = "edit")]
    Edit,
    #[serde(rename = "refactor")]
    Refactor,
    #[serde(rename = "explain")]
    Explain,
    #[serde(rename = "optimize")]
    Optimize,
    #[serde(rename = "generateTests")]
    GenerateTests,
    #[serde(rename = "fixBugs")]
    FixBugs,
    #[serde(rename = "documentCode")]
    DocumentCode,
    #[serde(rename = "suggestPatterns")]
    SuggestPatterns,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::Completion,
        Capability::Chat,
        Capability::Edit,
        Capability::Refactor,
        Capability::Explain,
        Capability::Optimize,
        Capability::GenerateTests,
        Capability::FixBugs,
        Capability::DocumentCode,
        Capability::SuggestPatterns,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Capability::Completion => "completion",
            Capability::Chat => "chat",
            Capability::Edit => "edit",
            Capability::Refactor => "refactor",
            Capability::Explain => "explain",
            Capability::Optimize => "optimize",
            Capability::GenerateTests => "generateTests",
            Capability::FixBugs => "fixBugs",
            Capability::DocumentCode => "documentCode",
            Capability::SuggestPatterns => "suggestPatterns",
        }
    }

    /// `true` para la única capacidad que usa el endpoint de completion crudo.
    pub fn uses_completion_endpoint(self) -> bool {
        matches!(self, Capability::Completion)
    }

    fn system_prompt(self) -> &'static str {
        match self {
            Capability::Completion | Capability::Chat => "You are a helpful coding assistant.",
            Capability::Edit => {
                "You are a helpful coding assistant. Edit the provided code according to the instructions."
            }
            Capability::Refactor => {
                "You are a helpful coding assistant. Refactor the provided code to improve its quality."
            }
            Capability::Explain => {
                "You are a helpful coding assistant. Explain the provided code in detail."
            }
            Capability::Optimize => {
                "You are a helpful coding assistant. Optimize the provided code for better performance."
            }
            Capability::GenerateTests => {
                "You are a helpful coding assistant. Generate tests for the provided code."
            }
            Capability::FixBugs => {
                "You are a helpful coding assistant. Fix bugs in the provided code."
            }
            Capability::DocumentCode => {
                "You are a helpful coding assistant. Add documentation to the provided code."
            }
            Capability::SuggestPatterns => {
                "You are a helpful coding assistant. Suggest design patterns for the provided code context."
            }
        }
    }

    /// Frase por defecto cuando el usuario no escribe instrucciones.
    fn default_instructions(self) -> &'static str {
        match self {
            Capability::Completion | Capability::Chat | Capability::Edit => "",
            Capability::Refactor => "Refactor this code to improve readability and maintainability.",
            Capability::Explain => "Explain this code in detail.",
            Capability::Optimize => "Optimize this code for better performance.",
            Capability::GenerateTests => "Generate unit tests for this code.",
            Capability::FixBugs => "Fix bugs in this code.",
            Capability::DocumentCode => "Add documentation to this code.",
            Capability::SuggestPatterns => "Suggest design patterns for this code context.",
        }
    }

    fn code_label(self) -> &'static str {
        match self {
            Capability::Completion => "Code",
            Capability::Chat | Capability::SuggestPatterns => "Code context",
            Capability::Edit => "Code to edit",
            Capability::Refactor => "Code to refactor",
            Capability::Explain => "Code to explain",
            Capability::Optimize => "Code to optimize",
            Capability::GenerateTests => "Code to test",
            Capability::FixBugs => "Code to fix",
            Capability::DocumentCode => "Code to document",
        }
    }

    /// Construye el array de dos mensajes para esta capacidad.
    ///
    /// `instructions` es el mensaje del usuario en `Chat` y las instrucciones
    /// de edición en el resto; si viene en blanco se usa la frase por defecto.
    pub fn build_messages(self, code: &str, instructions: &str) -> Vec<WireMessage> {
        let user = match self {
            Capability::Completion => code.to_string(),
            Capability::Chat => format!(
                "{}\n\nCode context:\n```\n{}\n```",
                instructions, code
            ),
            _ => {
                let effective = if instructions.trim().is_empty() {
                    self.default_instructions()
                } else {
                    instructions
                };
                format!(
                    "Instructions: {}\n\n{}:\n```\n{}\n```",
                    effective,
                    self.code_label(),
                    code
                )
            }
        };

        vec![
            WireMessage::system(self.system_prompt()),
            WireMessage::user(user),
        ]
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sobre de resultado específico por capacidad.
///
/// Los nombres de campo difieren a propósito (`edited`, `refactored`,
/// `explanation`...) porque los consumidores del editor indexan por esos
/// nombres; la serialización los conserva tal cual.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum CapabilityOutcome {
    Completion {
        original: String,
        completion: String,
        message: &'static str,
    },
    Chat {
        response: String,
        message: &'static str,
    },
    Edit {
        original: String,
        edited: String,
        message: &'static str,
    },
    Refactor {
        original: String,
        refactored: String,
        message: &'static str,
    },
    Explain {
        explanation: String,
        message: &'static str,
    },
    Optimize {
        original: String,
        optimized: String,
        message: &'static str,
    },
    GenerateTests {
        tests: String,
        message: &'static str,
    },
    FixBugs {
        original: String,
        fixed: String,
        message: &'static str,
    },
    DocumentCode {
        original: String,
        documented: String,
        message: &'static str,
    },
    SuggestPatterns {
        suggestions: String,
        message: &'static str,
    },
}

impl CapabilityOutcome {
    /// Empaqueta el texto producido en el sobre de la capacidad.
    pub fn wrap(capability: Capability, code: &str, text: String) -> Self {
        let original = code.to_string();
        match capability {
            Capability::Completion => CapabilityOutcome::Completion {
                original,
                completion: text,
                message: "Code completion generated",
            },
            Capability::Chat => CapabilityOutcome::Chat {
                response: text,
                message: "Chat response generated",
            },
            Capability::Edit => CapabilityOutcome::Edit {
                original,
                edited: text,
                message: "Code edited according to instructions",
            },
            Capability::Refactor => CapabilityOutcome::Refactor {
                original,
                refactored: text,
                message: "Code refactored",
            },
            Capability::Explain => CapabilityOutcome::Explain {
                explanation: text,
                message: "Code explanation generated",
            },
            Capability::Optimize => CapabilityOutcome::Optimize {
                original,
                optimized: text,
                message: "Code optimized",
            },
            Capability::GenerateTests => CapabilityOutcome::GenerateTests {
                tests: text,
                message: "Tests generated",
            },
            Capability::FixBugs => CapabilityOutcome::FixBugs {
                original,
                fixed: text,
                message: "Bugs fixed",
            },
            Capability::DocumentCode => CapabilityOutcome::DocumentCode {
                original,
                documented: text,
                message: "Code documented",
            },
            Capability::SuggestPatterns => CapabilityOutcome::SuggestPatterns {
                suggestions: text,
                message: "Pattern suggestions generated",
            },
        }
    }

    /// Texto producido, sea cual sea el sobre.
    pub fn text(&self) -> &str {
        match self {
            CapabilityOutcome::Completion { completion, .. } => completion,
            CapabilityOutcome::Chat { response, .. } => response,
            CapabilityOutcome::Edit { edited, .. } => edited,
            CapabilityOutcome::Refactor { refactored, .. } => refactored,
            CapabilityOutcome::Explain { explanation, .. } => explanation,
            CapabilityOutcome::Optimize { optimized, .. } => optimized,
            CapabilityOutcome::GenerateTests { tests, .. } => tests,
            CapabilityOutcome::FixBugs { fixed, .. } => fixed,
            CapabilityOutcome::DocumentCode { documented, .. } => documented,
            CapabilityOutcome::SuggestPatterns { suggestions, .. } => suggestions,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            CapabilityOutcome::Completion { message, .. }
            | CapabilityOutcome::Chat { message, .. }
            | CapabilityOutcome::Edit { message, .. }
            | CapabilityOutcome::Refactor { message, .. }
            | CapabilityOutcome::Explain { message, .. }
            | CapabilityOutcome::Optimize { message, .. }
            | CapabilityOutcome::GenerateTests { message, .. }
            | CapabilityOutcome::FixBugs { message, .. }
            | CapabilityOutcome::DocumentCode { message, .. }
            | CapabilityOutcome::SuggestPatterns { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_capability_builds_two_messages_with_system_first() {
        for capability in Capability::ALL {
            let messages = capability.build_messages("let x = 1;", "do something");
            assert_eq!(messages.len(), 2, "{}", capability);
            assert_eq!(messages[0].role, "system");
            assert_eq!(messages[1].role, "user");
        }
    }

    #[test]
    fn blank_instructions_fall_back_to_capability_default() {
        let messages = Capability::Refactor.build_messages("fn f() {}", "   ");
        assert!(messages[1].content.starts_with(
            "Instructions: Refactor this code to improve readability and maintainability."
        ));
        assert!(messages[1].content.contains("Code to refactor:\n```\nfn f() {}\n```"));
    }

    #[test]
    fn chat_interpolates_message_and_code_fence() {
        let messages = Capability::Chat.build_messages("let x = 1;", "explain this");
        assert_eq!(
            messages[1].content,
            "explain this\n\nCode context:\n```\nlet x = 1;\n```"
        );
    }

    #[test]
    fn outcome_field_names_survive_serialization() {
        let outcome =
            CapabilityOutcome::wrap(Capability::Refactor, "old", "new".to_string());
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["refactored"], "new");
        assert_eq!(value["original"], "old");
        assert_eq!(value["message"], "Code refactored");

        let outcome = CapabilityOutcome::wrap(Capability::Explain, "", "why".to_string());
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["explanation"], "why");
        assert!(value.get("original").is_none());
    }
}
