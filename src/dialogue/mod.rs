//! Dialogue orchestration: mention cleaning, channel context, completion.

pub mod persona;

pub use persona::APOLOGY;

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::llm::{CompletionBackend, CompletionError};
use crate::memory::ContextStore;

/// Default completion timeout.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// How users refer to the bot in message text.
#[derive(Clone, Debug)]
pub struct Addressing {
    bot_user_id: u64,
    mention_pattern: Regex,
}

impl Addressing {
    /// Build addressing info for a bot identity.
    ///
    /// # Errors
    /// Returns an error if the mention pattern cannot be compiled.
    pub fn new(bot_user_id: u64, bot_name: &str) -> Result<Self, regex::Error> {
        let mut pattern = format!(r"<@!?{bot_user_id}>");
        if !bot_name.is_empty() {
            pattern.push_str(&format!("|@{}", regex::escape(bot_name)));
        }

        Ok(Self {
            bot_user_id,
            mention_pattern: Regex::new(&pattern)?,
        })
    }

    /// The bot's user id.
    #[must_use]
    pub const fn bot_user_id(&self) -> u64 {
        self.bot_user_id
    }
}

/// Strip every mention of the bot and trim.
#[must_use]
pub fn clean_message(text: &str, addressing: &Addressing) -> String {
    addressing
        .mention_pattern
        .replace_all(text, "")
        .trim()
        .to_string()
}

/// Turns an addressed message into Mika's reply.
pub struct DialogueOrchestrator {
    backend: Arc<dyn CompletionBackend>,
    store: Arc<ContextStore>,
    timeout: Duration,
}

impl DialogueOrchestrator {
    /// Create an orchestrator with the default timeout.
    #[must_use]
    pub fn new(backend: Arc<dyn CompletionBackend>, store: Arc<ContextStore>) -> Self {
        Self {
            backend,
            store,
            timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }

    /// Set the completion timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The shared context store.
    #[must_use]
    pub fn store(&self) -> Arc<ContextStore> {
        Arc::clone(&self.store)
    }

    /// Reply to `text` posted in `channel_id`.
    ///
    /// `None` when nothing is left after removing mentions. A failed or slow
    /// completion yields [`APOLOGY`] and leaves the history untouched.
    pub async fn respond(
        &self,
        text: &str,
        channel_id: u64,
        addressing: &Addressing,
    ) -> Option<String> {
        let cleaned = clean_message(text, addressing);
        if cleaned.is_empty() {
            debug!(channel_id, "Message empty after removing mentions");
            return None;
        }

        let key = channel_id.to_string();
        let _guard = self.store.lock(&key).await;
        let history = self.store.get(&key);
        let prompt = persona::compose_prompt(channel_id, &cleaned);

        let outcome = match tokio::time::timeout(
            self.timeout,
            self.backend.complete(&history, &prompt),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(reply) => {
                self.store.append(&key, &cleaned, &reply);
                self.store.save();
                info!(channel_id, chars = reply.chars().count(), "Mika replied");
                Some(reply)
            }
            Err(err) => {
                warn!(channel_id, %err, "Completion failed, sending apology");
                Some(APOLOGY.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionFuture, CompletionResult};
    use crate::memory::ConversationTurn;
    use std::sync::Mutex;

    enum Script {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct MockBackend {
        script: Script,
        calls: Mutex<Vec<(Vec<ConversationTurn>, String)>>,
    }

    impl MockBackend {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(Vec<ConversationTurn>, String)> {
            self.calls.lock().expect("calls").clone()
        }
    }

    impl CompletionBackend for MockBackend {
        fn complete<'a>(
            &'a self,
            history: &'a [ConversationTurn],
            prompt: &'a str,
        ) -> CompletionFuture<'a, CompletionResult<String>> {
            self.calls
                .lock()
                .expect("calls")
                .push((history.to_vec(), prompt.to_string()));
            Box::pin(async move {
                match self.script {
                    Script::Reply(text) => Ok(text.to_string()),
                    Script::Fail => Err(CompletionError::EmptyResponse),
                    Script::Hang => {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok("too late".to_string())
                    }
                }
            })
        }
    }

    fn mika() -> Addressing {
        Addressing::new(42, "Mika").expect("addressing")
    }

    fn orchestrator(backend: Arc<MockBackend>) -> DialogueOrchestrator {
        DialogueOrchestrator::new(backend, Arc::new(ContextStore::new(6)))
    }

    #[test]
    fn test_clean_message_variants() {
        let addressing = mika();
        assert_eq!(clean_message("<@42> hello", &addressing), "hello");
        assert_eq!(clean_message("<@!42> hello <@42>", &addressing), "hello");
        assert_eq!(clean_message("hey @Mika, sup?", &addressing), "hey , sup?");
        assert_eq!(clean_message("<@7> hi", &addressing), "<@7> hi");
        assert_eq!(clean_message("  <@42>  ", &addressing), "");
    }

    #[test]
    fn test_bot_name_is_matched_literally() {
        let addressing = Addressing::new(1, "M.ka").expect("addressing");
        assert_eq!(clean_message("@Mika hi", &addressing), "@Mika hi");
        assert_eq!(clean_message("@M.ka hi", &addressing), "hi");
        assert_eq!(addressing.bot_user_id(), 1);
    }

    #[tokio::test]
    async fn test_mention_only_message_gets_no_reply() {
        let backend = MockBackend::new(Script::Reply("unused"));
        let dialogue = orchestrator(Arc::clone(&backend));

        assert_eq!(dialogue.respond("<@42>", 5, &mika()).await, None);
        assert!(backend.calls().is_empty());
        assert!(dialogue.store().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_success_appends_pair() {
        let backend = MockBackend::new(Script::Reply("Hehe! Hi there! 💖"));
        let dialogue = orchestrator(Arc::clone(&backend));

        let reply = dialogue.respond("<@42> hello", 5, &mika()).await;
        assert_eq!(reply.as_deref(), Some("Hehe! Hi there! 💖"));

        let history = dialogue.store().get("5");
        assert_eq!(
            history,
            vec![
                ConversationTurn::user("hello"),
                ConversationTurn::assistant("Hehe! Hi there! 💖"),
            ]
        );

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.is_empty());
        assert!(calls[0].1.contains("Current context from channel 5"));
        assert!(calls[0].1.ends_with("\nUser: hello"));
    }

    #[tokio::test]
    async fn test_history_passed_on_next_call() {
        let backend = MockBackend::new(Script::Reply("ok"));
        let dialogue = orchestrator(Arc::clone(&backend));

        dialogue.respond("first", 5, &mika()).await;
        dialogue.respond("second", 5, &mika()).await;

        let calls = backend.calls();
        assert_eq!(calls[1].0.len(), 2);
        assert_eq!(calls[1].0[0], ConversationTurn::user("first"));
    }

    #[tokio::test]
    async fn test_failure_returns_apology_and_keeps_history() {
        let backend = MockBackend::new(Script::Fail);
        let dialogue = orchestrator(backend);
        dialogue.store().append("5", "earlier", "reply");

        let reply = dialogue.respond("hello", 5, &mika()).await;
        assert_eq!(reply.as_deref(), Some(APOLOGY));
        assert_eq!(dialogue.store().get("5").len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_returns_apology() {
        let backend = MockBackend::new(Script::Hang);
        let dialogue = orchestrator(backend).with_timeout(Duration::from_millis(50));

        let reply = dialogue.respond("hello", 5, &mika()).await;
        assert_eq!(reply.as_deref(), Some(APOLOGY));
        assert!(dialogue.store().get("5").is_empty());
    }
}
