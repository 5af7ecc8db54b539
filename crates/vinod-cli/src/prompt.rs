use anyhow::Result;

pub mod cliclack;

pub trait Prompt {
    fn render(&mut self, text: &str);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self);
    fn ready(&self) {
        println!("\n");
        println!("AgentVinod is running! Ask about sums, primes or crypto prices, or anything else.");
        println!("\n");
    }
}

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Only set for messages; commands carry no content
}

pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Exit,     // User wants to exit the session
}

impl Input {
    pub fn message<S: Into<String>>(content: S) -> Self {
        Self {
            input_type: InputType::Message,
            content: Some(content.into()),
        }
    }

    pub fn exit() -> Self {
        Self {
            input_type: InputType::Exit,
            content: None,
        }
    }

    pub fn ask_again() -> Self {
        Self {
            input_type: InputType::AskAgain,
            content: None,
        }
    }
}
