use anyhow::Result;

use crate::prompt::{InputType, Prompt};

use vinod::agent::Agent;
use vinod::errors::AgentResult;
use vinod::keyword::KeywordAgent;
use vinod::models::transcript::Transcript;

pub enum Backend {
    Agent(Agent),
    Keyword(KeywordAgent),
}

impl Backend {
    async fn respond(&self, transcript: &mut Transcript, message: &str) -> AgentResult<String> {
        match self {
            Backend::Agent(agent) => agent.reply(transcript, message).await,
            Backend::Keyword(agent) => Ok(agent.reply(transcript, message).await),
        }
    }
}

/// How a single question ended
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Answer(String),
    /// The turn failed; carries the apology to show
    Failed(&'static str),
    Interrupted,
}

/// One conversation, kept for the lifetime of the process
pub struct Session<'a> {
    backend: Backend,
    prompt: Box<dyn Prompt + 'a>,
    transcript: Transcript,
}

impl<'a> Session<'a> {
    pub fn new(backend: Backend, prompt: Box<dyn Prompt + 'a>) -> Self {
        Session {
            backend,
            prompt,
            transcript: Transcript::new(),
        }
    }

    #[cfg(test)]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub async fn start(&mut self) -> Result<()> {
        self.prompt.ready();

        loop {
            let input = self.prompt.get_input()?;
            let content = match input.input_type {
                InputType::Exit => break,
                InputType::AskAgain => continue,
                InputType::Message => match input.content {
                    Some(content) => content,
                    None => continue,
                },
            };

            self.prompt.show_busy();
            let outcome = self.ask(&content).await;
            self.prompt.hide_busy();

            match outcome {
                Outcome::Answer(text) => self.prompt.render(&text),
                Outcome::Failed(apology) => self.prompt.render(apology),
                Outcome::Interrupted => {
                    self.prompt.render("Interrupted. That question was dropped.")
                }
            }
        }
        self.prompt.close();
        Ok(())
    }

    /// Answer one message. The transcript only changes if the turn completes,
    /// so a failed or interrupted turn can simply be asked again.
    pub async fn ask(&mut self, message: &str) -> Outcome {
        let mut draft = self.transcript.clone();

        let outcome = tokio::select! {
            outcome = self.backend.respond(&mut draft, message) => Some(outcome),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            Some(Ok(text)) => {
                self.transcript = draft;
                Outcome::Answer(text)
            }
            Some(Err(err)) => {
                tracing::warn!("Turn failed: {}", err);
                Outcome::Failed(err.user_message())
            }
            None => Outcome::Interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Input;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use vinod::errors::{ProviderError, ToolResult};
    use vinod::models::message::Turn;
    use vinod::models::tool::{ToolCall, ToolSpec};
    use vinod::providers::base::{ModelReply, Provider};
    use vinod::tools::crypto::{CryptoQuote, PriceSource};
    use vinod::tools::ToolRegistry;

    struct MockPrompt {
        inputs: VecDeque<Input>,
        rendered: Arc<Mutex<Vec<String>>>,
    }

    impl Prompt for MockPrompt {
        fn render(&mut self, text: &str) {
            self.rendered.lock().unwrap().push(text.to_string());
        }

        fn get_input(&mut self) -> Result<Input> {
            Ok(self.inputs.pop_front().unwrap_or_else(Input::exit))
        }

        fn show_busy(&mut self) {}

        fn hide_busy(&mut self) {}

        fn close(&self) {}

        fn ready(&self) {}
    }

    struct FixedPrices;

    #[async_trait]
    impl PriceSource for FixedPrices {
        async fn quote(&self, _coin_id: &str) -> ToolResult<CryptoQuote> {
            Ok(CryptoQuote {
                name: "Ethereum".to_string(),
                symbol: "ETH".to_string(),
                price: 3120.0,
                change_24h: Some(-0.5),
            })
        }
    }

    /// Answers once with a tool call, then fails
    struct FlakyProvider;

    #[async_trait]
    impl Provider for FlakyProvider {
        async fn complete(
            &self,
            _system: &str,
            turns: &[Turn],
            _tools: &[ToolSpec],
        ) -> Result<ModelReply, ProviderError> {
            if turns.len() == 1 {
                Ok(ModelReply::ToolCalls(vec![ToolCall::new(
                    "isPrime",
                    json!({"n": 7}),
                )]))
            } else {
                Err(ProviderError::Timeout(30))
            }
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::with_builtins(Arc::new(FixedPrices)).unwrap()
    }

    #[tokio::test]
    async fn test_interactive_keyword_session() {
        let rendered = Arc::new(Mutex::new(Vec::new()));
        let prompt = MockPrompt {
            inputs: VecDeque::from(vec![
                Input::message("eth price"),
                Input::ask_again(),
                Input::message("Is 17 prime?"),
                Input::exit(),
                Input::message("never read"),
            ]),
            rendered: rendered.clone(),
        };

        let backend = Backend::Keyword(KeywordAgent::new(registry()));
        let mut session = Session::new(backend, Box::new(prompt));
        session.start().await.unwrap();

        assert_eq!(
            *rendered.lock().unwrap(),
            vec![
                "💰 Ethereum (ETH): $3,120 (-0.50% 24h)".to_string(),
                "17 is a prime number.".to_string(),
            ]
        );
        assert_eq!(session.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_turn_keeps_transcript() {
        let prompt = MockPrompt {
            inputs: VecDeque::new(),
            rendered: Arc::new(Mutex::new(Vec::new())),
        };
        let backend = Backend::Agent(Agent::new(Box::new(FlakyProvider), registry()));
        let mut session = Session::new(backend, Box::new(prompt));

        let outcome = session.ask("Is 7 prime?").await;
        assert!(matches!(outcome, Outcome::Failed(text) if text.starts_with("Sorry")));
        assert!(session.transcript().is_empty());
    }
}
