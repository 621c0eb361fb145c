//! Capa de abstracción de proveedores de IA para un editor de código.
//!
//! Expone un conjunto cerrado de capacidades (completion, chat, edición,
//! refactorización...) sobre un catálogo de backends intercambiables, con un
//! responder offline determinista como último recurso: cualquier fallo de
//! proveedor degrada a una respuesta enlatada en vez de a un error.
//!
//! Punto de entrada habitual:
//!
//! ```no_run
//! use code_assistant::assistant::Assistant;
//! use code_assistant::capability::Capability;
//!
//! let (mut assistant, _events) = Assistant::new();
//! let outcome = assistant
//!     .run(Capability::Explain, "fn main() {}", "")
//!     .unwrap();
//! println!("{}", outcome.text());
//! ```

pub mod api;
pub mod assistant;
pub mod capability;
pub mod config;
pub mod error;
pub mod notify;
pub mod offline;
pub mod providers;
pub mod router;
pub mod session;

pub use assistant::Assistant;
pub use capability::{Capability, CapabilityOutcome};
pub use config::AssistantConfig;
pub use error::{AdapterError, AssistantError};
pub use notify::{AssistantEvent, LogStatus, OFFLINE_DEFAULT_MESSAGE};
pub use providers::{Endpoint, ProviderKind};
pub use session::AssistantSession;
