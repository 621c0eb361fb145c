//! Pruebas de extremo a extremo del ciclo de petición: proveedor activo,
//! rechazo por ocupado y degradación a offline con su aviso único.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;

use code_assistant::api::{
    ChatCall, CompletionCall, ProviderAdapter, ProviderReply,
};
use code_assistant::assistant::Assistant;
use code_assistant::capability::{Capability, CapabilityOutcome};
use code_assistant::error::{AdapterError, AssistantError};
use code_assistant::notify::{event_channel, OFFLINE_DEFAULT_MESSAGE};
use code_assistant::offline::OfflineResponder;
use code_assistant::providers::ProviderKind;
use code_assistant::router::RequestRouter;
use code_assistant::session::AssistantSession;

/// Adaptador que siempre responde 401, contando las llamadas recibidas.
struct UnauthorizedAdapter {
    calls: Arc<AtomicUsize>,
}

impl ProviderAdapter for UnauthorizedAdapter {
    fn execute_chat(&self, _call: &ChatCall<'_>) -> Result<ProviderReply, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AdapterError::Http {
            provider: "mistral",
            status: 401,
            body: "Unauthorized: Check your API key.".to_string(),
        })
    }

    fn execute_completion(
        &self,
        _call: &CompletionCall<'_>,
    ) -> Result<ProviderReply, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AdapterError::Http {
            provider: "mistral",
            status: 401,
            body: "Unauthorized: Check your API key.".to_string(),
        })
    }
}

/// Adaptador que responde siempre con un texto fijo.
struct CannedAdapter {
    text: &'static str,
}

impl ProviderAdapter for CannedAdapter {
    fn execute_chat(&self, _call: &ChatCall<'_>) -> Result<ProviderReply, AdapterError> {
        Ok(ProviderReply::new(
            self.text,
            json!({ "choices": [{ "message": { "content": self.text } }] }),
        ))
    }

    fn execute_completion(
        &self,
        _call: &CompletionCall<'_>,
    ) -> Result<ProviderReply, AdapterError> {
        Ok(ProviderReply::new(
            self.text,
            json!({ "choices": [{ "text": self.text }] }),
        ))
    }
}

fn assistant_with_router(
    provider: ProviderKind,
    router: RequestRouter,
    dir: &tempfile::TempDir,
) -> Assistant {
    let session = AssistantSession::new(provider);
    Assistant::from_parts(session, router, dir.path().join("assistant.json"))
}

#[test]
fn invalid_key_falls_back_to_offline_with_single_notification() {
    let dir = tempfile::tempdir().unwrap();
    let (events, receiver) = event_channel();
    let mut router =
        RequestRouter::new(events).with_offline_responder(OfflineResponder::deterministic());

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_factory = Arc::clone(&calls);
    router.register_adapter_factory(ProviderKind::Mistral, move || {
        Box::new(UnauthorizedAdapter {
            calls: Arc::clone(&calls_in_factory),
        })
    });

    let mut assistant = assistant_with_router(ProviderKind::Mistral, router, &dir);
    assistant.set_api_key("sk-invalid".to_string());

    let outcome = assistant
        .run(Capability::Chat, "", "explain this function")
        .unwrap();
    assert!(outcome
        .text()
        .starts_with("This function implements a binary search algorithm."));

    // Un único intento contra el proveedor, un único aviso de degradación.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let events: Vec<_> = receiver.try_iter().collect();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].message,
        "Mistral connection failed. Falling back to offline mode."
    );
    assert_eq!(events[0].provider, Some(ProviderKind::Mistral));
}

#[test]
fn healthy_provider_reply_is_used_without_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let (events, receiver) = event_channel();
    let mut router = RequestRouter::new(events);
    router.register_adapter_factory(ProviderKind::Ollama, || {
        Box::new(CannedAdapter {
            text: "fn sum(a: i32, b: i32) -> i32 { a + b }",
        })
    });

    let mut assistant = assistant_with_router(ProviderKind::Ollama, router, &dir);
    let outcome = assistant
        .run(Capability::Edit, "fn sum() {}", "add the parameters")
        .unwrap();

    match &outcome {
        CapabilityOutcome::Edit {
            original,
            edited,
            message,
        } => {
            assert_eq!(original, "fn sum() {}");
            assert_eq!(edited, "fn sum(a: i32, b: i32) -> i32 { a + b }");
            assert_eq!(*message, "Code edited according to instructions");
        }
        other => panic!("sobre inesperado: {other:?}"),
    }
    assert!(receiver.try_iter().next().is_none());
}

#[test]
fn offline_provider_serves_canned_completion() {
    let dir = tempfile::tempdir().unwrap();
    let (events, receiver) = event_channel();
    let router =
        RequestRouter::new(events).with_offline_responder(OfflineResponder::deterministic());

    let mut assistant = assistant_with_router(ProviderKind::Local, router, &dir);
    let outcome = assistant
        .run(Capability::Completion, "function sum", "")
        .unwrap();

    assert_eq!(outcome.text(), "function sum(a, b) {\n  return a + b;\n}");
    assert_eq!(outcome.message(), "Code completion generated");

    let events: Vec<_> = receiver.try_iter().collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].message, OFFLINE_DEFAULT_MESSAGE);
}

#[test]
fn busy_session_rejects_via_the_facade() {
    let dir = tempfile::tempdir().unwrap();
    let (events, _receiver) = event_channel();
    let router =
        RequestRouter::new(events).with_offline_responder(OfflineResponder::deterministic());

    let mut assistant = assistant_with_router(ProviderKind::Local, router, &dir);
    let guard = assistant.session().begin_request().unwrap();

    assert!(matches!(
        assistant.run(Capability::Chat, "", "hello"),
        Err(AssistantError::Busy)
    ));
    assert!(matches!(
        assistant.get_suggestions("function "),
        Err(AssistantError::Busy)
    ));

    drop(guard);
    assert!(assistant.run(Capability::Chat, "", "hello").is_ok());
}

#[test]
fn fallback_keyword_priority_matches_offline_responder() {
    // El resultado tras degradar debe ser idéntico al del responder offline
    // aplicado a la misma petición.
    let dir = tempfile::tempdir().unwrap();
    let (events, _receiver) = event_channel();
    let mut router =
        RequestRouter::new(events).with_offline_responder(OfflineResponder::deterministic());
    router.register_adapter_factory(ProviderKind::Grok, || {
        Box::new(UnauthorizedAdapter {
            calls: Arc::new(AtomicUsize::new(0)),
        })
    });

    let mut assistant = assistant_with_router(ProviderKind::Grok, router, &dir);
    let degraded = assistant
        .run(Capability::Chat, "let x;", "please fix this bug")
        .unwrap();

    let mut offline = OfflineResponder::deterministic();
    let messages = Capability::Chat.build_messages("let x;", "please fix this bug");
    assert_eq!(degraded.text(), offline.chat(&messages));
    assert!(degraded.text().starts_with("The bug in your code is caused by"));
}
