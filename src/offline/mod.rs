//! Responder offline: respuestas enlatadas deterministas, sin red.
//!
//! Única fuente de no-determinismo: cuando un cubo tiene varias frases
//! equivalentes se elige una al azar para no sonar robótico. La fuente de
//! azar es inyectable para que los tests fijen la elección.

mod examples;

use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::api::WireMessage;

/// Lenguajes que el detector sabe distinguir.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Python,
    Html,
    Css,
    Javascript,
}

impl Language {
    pub fn key(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Html => "html",
            Language::Css => "css",
            Language::Javascript => "javascript",
        }
    }
}

/// Fuente de azar inyectable para la selección de frases y el jitter.
pub trait RandomSource: Send {
    /// Índice uniforme en `0..len` (len > 0).
    fn pick(&mut self, len: usize) -> usize;
}

/// Fuente por defecto sobre el RNG del sistema.
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Fuente fija para tests: siempre el mismo índice (recortado al rango).
pub struct FixedChoice(pub usize);

impl RandomSource for FixedChoice {
    fn pick(&mut self, len: usize) -> usize {
        self.0.min(len.saturating_sub(1))
    }
}

pub struct OfflineResponder {
    rng: Box<dyn RandomSource>,
    simulate_latency: bool,
}

impl Default for OfflineResponder {
    fn default() -> Self {
        OfflineResponder::new()
    }
}

impl OfflineResponder {
    /// Responder de producción: latencia artificial activada para que la
    /// experiencia sea coherente con las llamadas de red reales.
    pub fn new() -> Self {
        OfflineResponder {
            rng: Box::new(ThreadRandom),
            simulate_latency: true,
        }
    }

    /// Responder determinista sin latencia, para tests.
    pub fn deterministic() -> Self {
        OfflineResponder {
            rng: Box::new(FixedChoice(0)),
            simulate_latency: false,
        }
    }

    pub fn with_random_source(rng: Box<dyn RandomSource>, simulate_latency: bool) -> Self {
        OfflineResponder {
            rng,
            simulate_latency,
        }
    }

    /// Detección barata por palabras clave; el orden de comprobación importa
    /// y la primera coincidencia gana.
    pub fn detect_language(code: &str) -> Language {
        if code.contains("def ")
            || code.contains("import ")
            || (code.contains("class ") && code.contains(':'))
        {
            Language::Python
        } else if code.contains("<html") || code.contains("<div") || code.contains("<body") {
            Language::Html
        } else if code.contains('{')
            && (code.contains('.') || code.contains('#'))
            && code.contains(':')
        {
            Language::Css
        } else {
            Language::Javascript
        }
    }

    /// Completion enlatada: primer snippet cuya keyword sea subcadena del
    /// prompt; si ninguna casa, un snippet genérico del lenguaje detectado.
    /// Determinista para un mismo prompt.
    pub fn completion(&mut self, prompt: &str) -> String {
        self.artificial_delay(500, 1000);

        let language = Self::detect_language(prompt);
        for (keyword, snippet) in completion_examples(language) {
            if prompt.contains(keyword) {
                return (*snippet).to_string();
            }
        }

        generic_completion(language, prompt).to_string()
    }

    /// Chat enlatado: pertenencia de keywords sobre el primer mensaje de
    /// usuario, en orden fijo de prioridad.
    pub fn chat(&mut self, messages: &[WireMessage]) -> String {
        self.artificial_delay(500, 1000);

        let user_message = messages
            .iter()
            .find(|message| message.role == "user")
            .map(|message| message.content.to_lowercase())
            .unwrap_or_default();

        if user_message.contains("explain") {
            examples::lookup(examples::CHAT_EXAMPLES, "Explain this function")
                .unwrap_or_default()
                .to_string()
        } else if user_message.contains("optimize") {
            examples::lookup(examples::CHAT_EXAMPLES, "How to optimize this code")
                .unwrap_or_default()
                .to_string()
        } else if user_message.contains("fix") || user_message.contains("bug") {
            examples::lookup(examples::CHAT_EXAMPLES, "How to fix this bug")
                .unwrap_or_default()
                .to_string()
        } else if user_message.contains("refactor") {
            examples::lookup(examples::REFACTOR_EXAMPLES, "Refactor for readability")
                .unwrap_or_default()
                .to_string()
        } else if user_message.contains("help") {
            self.pick_phrase(examples::GENERAL_HELP)
        } else if user_message.contains("hello") || user_message.contains("hi") {
            self.pick_phrase(examples::GENERAL_HELLO)
        } else if user_message.contains("feature") || user_message.contains("what can you do") {
            self.pick_phrase(examples::GENERAL_FEATURES)
        } else if user_message.contains("code") {
            self.pick_phrase(examples::GENERAL_CODE)
        } else {
            self.pick_phrase(examples::GENERAL_DEFAULT)
        }
    }

    /// Sugerencias inline (ruta corta del editor): fragmentos por lenguaje,
    /// con una latencia menor que la del ciclo de petición completo.
    pub fn suggest(&mut self, prompt: &str) -> Vec<String> {
        self.artificial_delay(200, 300);

        let language = Self::detect_language(prompt);
        let mut suggestions: Vec<String> = Vec::new();

        match language {
            Language::Javascript => {
                if prompt.contains("function") {
                    suggestions.push("(param1, param2) {\n  return param1 + param2;\n}".into());
                } else if prompt.contains("const") {
                    suggestions.push(" value = 42;".into());
                } else if prompt.contains("class") {
                    suggestions
                        .push(" Example {\n  constructor() {\n    this.value = 0;\n  }\n}".into());
                }
            }
            Language::Html => {
                if prompt.contains("<div") {
                    suggestions.push(
                        " class=\"container\">\n  <h1>Title</h1>\n  <p>Content</p>\n</div>".into(),
                    );
                } else if prompt.contains("<form") {
                    suggestions.push(
                        " action=\"/submit\" method=\"post\">\n  <input type=\"text\" name=\"name\">\n  <button type=\"submit\">Submit</button>\n</form>"
                            .into(),
                    );
                }
            }
            Language::Css => {
                if prompt.contains(".container") {
                    suggestions.push(
                        " {\n  max-width: 1200px;\n  margin: 0 auto;\n  padding: 20px;\n}".into(),
                    );
                } else if prompt.contains("@media") {
                    suggestions.push(
                        " (max-width: 768px) {\n  .container {\n    padding: 10px;\n  }\n}".into(),
                    );
                }
            }
            Language::Python => {
                if prompt.contains("def") {
                    suggestions.push(" example(param):\n    return param".into());
                } else if prompt.contains("class") {
                    suggestions
                        .push(" Example:\n    def __init__(self):\n        self.value = 0".into());
                }
            }
        }

        if suggestions.is_empty() {
            suggestions.push("// Suggestion".into());
        }
        suggestions
    }

    fn pick_phrase(&mut self, bucket: &[&str]) -> String {
        let index = self.rng.pick(bucket.len());
        bucket[index].to_string()
    }

    fn artificial_delay(&mut self, base_ms: u64, jitter_ms: u64) {
        if !self.simulate_latency {
            return;
        }
        let jitter = self.rng.pick(jitter_ms as usize) as u64;
        thread::sleep(Duration::from_millis(base_ms + jitter));
    }
}

fn completion_examples(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::Javascript => examples::JAVASCRIPT_COMPLETIONS,
        Language::Html => examples::HTML_COMPLETIONS,
        Language::Css => examples::CSS_COMPLETIONS,
        Language::Python => examples::PYTHON_COMPLETIONS,
    }
}

/// Snippet genérico cuando la tabla no tiene coincidencias.
fn generic_completion(language: Language, prompt: &str) -> &'static str {
    match language {
        Language::Javascript => {
            if prompt.contains("function") {
                "function example(param) {\n  return param;\n}"
            } else if prompt.contains("class") {
                "class Example {\n  constructor() {\n    this.value = 0;\n  }\n  \n  getValue() {\n    return this.value;\n  }\n}"
            } else if prompt.contains("const") {
                "const value = 42;"
            } else {
                "// JavaScript code example"
            }
        }
        Language::Html => {
            if prompt.contains("div") {
                "<div class=\"container\">\n  <h1>Title</h1>\n  <p>Content</p>\n</div>"
            } else if prompt.contains("form") {
                "<form>\n  <input type=\"text\" name=\"name\">\n  <button type=\"submit\">Submit</button>\n</form>"
            } else {
                "<!-- HTML code example -->"
            }
        }
        Language::Css => {
            if prompt.contains('.') {
                "{\n  margin: 0;\n  padding: 0;\n  box-sizing: border-box;\n}"
            } else {
                "/* CSS code example */"
            }
        }
        Language::Python => {
            if prompt.contains("def") {
                "def example(param):\n    return param"
            } else if prompt.contains("class") {
                "class Example:\n    def __init__(self):\n        self.value = 0\n    \n    def get_value(self):\n        return self.value"
            } else {
                "# Python code example"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_detection_order_is_significant() {
        assert_eq!(
            OfflineResponder::detect_language("def foo(): pass"),
            Language::Python
        );
        assert_eq!(
            OfflineResponder::detect_language("<div>hi</div>"),
            Language::Html
        );
        assert_eq!(
            OfflineResponder::detect_language(".a { color: red; }"),
            Language::Css
        );
        assert_eq!(
            OfflineResponder::detect_language("let x = 1;"),
            Language::Javascript
        );
        // "class" + ":" dentro de CSS-oide gana python por orden de chequeo
        assert_eq!(
            OfflineResponder::detect_language("import os"),
            Language::Python
        );
    }

    #[test]
    fn completion_returns_exact_canned_snippet() {
        let mut responder = OfflineResponder::deterministic();
        assert_eq!(
            responder.completion("function sum"),
            "function sum(a, b) {\n  return a + b;\n}"
        );
    }

    #[test]
    fn completion_is_idempotent_for_same_prompt() {
        let mut responder = OfflineResponder::deterministic();
        let first = responder.completion("const array of values");
        let second = responder.completion("const array of values");
        assert_eq!(first, second);
    }

    #[test]
    fn completion_falls_back_to_generic_snippet() {
        let mut responder = OfflineResponder::deterministic();
        assert_eq!(responder.completion("let y = 2;"), "// JavaScript code example");
        assert_eq!(responder.completion("const thing"), "const value = 42;");
    }

    #[test]
    fn chat_keyword_priority_explain_wins() {
        let mut responder = OfflineResponder::deterministic();
        let messages = vec![
            WireMessage::system("You are a helpful coding assistant."),
            WireMessage::user("explain and optimize please"),
        ];
        let reply = responder.chat(&messages);
        assert!(reply.starts_with("This function implements a binary search algorithm."));
    }

    #[test]
    fn chat_bucket_choice_follows_injected_random_source() {
        let mut responder =
            OfflineResponder::with_random_source(Box::new(FixedChoice(1)), false);
        let messages = vec![WireMessage::user("help")];
        let reply = responder.chat(&messages);
        assert!(reply.starts_with("I'm here to assist with your coding tasks."));
    }

    #[test]
    fn suggestions_default_when_nothing_matches() {
        let mut responder = OfflineResponder::deterministic();
        assert_eq!(responder.suggest("let z = 9;"), vec!["// Suggestion".to_string()]);
    }
}
