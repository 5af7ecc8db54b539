use std::io::{self, Write};

use anyhow::Result;
use cliclack::{input, spinner, ProgressBar};
use console::style;

use super::{Input, Prompt};

pub struct CliclackPrompt {
    spinner: Option<ProgressBar>,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt { spinner: None }
    }
}

impl Default for CliclackPrompt {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a raw line to a command or a message
pub fn parse_input(text: &str) -> Input {
    let text = text.trim();
    if text.is_empty() {
        return Input::ask_again();
    }

    match text.to_lowercase().as_str() {
        "exit" | "quit" | "/exit" | "/quit" => Input::exit(),
        "/?" => {
            println!("Commands:");
            println!("/exit - Exit the session");
            println!("/? - Display this help message");
            println!("Ctrl+C - Interrupt a reply (the question is dropped from the conversation)");
            Input::ask_again()
        }
        _ => Input::message(text),
    }
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, text: &str) {
        println!("{} {}", style("AgentVinod:").cyan().bold(), text);
        println!();
        io::stdout().flush().ok();
    }

    fn get_input(&mut self) -> Result<Input> {
        let message_text: String = input("Ask me anything").placeholder("").interact()?;
        Ok(parse_input(&message_text))
    }

    fn show_busy(&mut self) {
        let spin = spinner();
        spin.start("Thinking...");
        self.spinner = Some(spin);
    }

    fn hide_busy(&mut self) {
        if let Some(spin) = self.spinner.take() {
            spin.stop("");
        }
    }

    fn close(&self) {
        println!("{}", style("Goodbye!").dim());
    }
}
