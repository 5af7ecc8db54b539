use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::message::Turn;
use super::role::Role;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranscriptError {
    #[error("turn {index}: tool results must answer the model turn right before them")]
    OrphanToolResult { index: usize },

    #[error("turn {index}: tool calls must be answered by the next user turn")]
    UnansweredToolCall { index: usize },

    #[error("turn {index}: tool results do not match the preceding tool calls")]
    MismatchedToolResults { index: usize },

    #[error("turn {index}: a {role:?} turn cannot carry {part}")]
    MisplacedPart {
        index: usize,
        role: Role,
        part: &'static str,
    },

    #[error("turn {index}: turns must not be empty")]
    EmptyTurn { index: usize },
}

/// Ordered, append-only record of one conversation.
///
/// Serializes as a bare JSON array of turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn push_user_text<S: Into<String>>(&mut self, text: S) {
        self.push(Turn::user().with_text(text));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Text of the most recent turn that has any.
    pub fn last_text(&self) -> Option<String> {
        self.turns.iter().rev().find_map(Turn::text)
    }

    /// Drop every turn appended after the transcript had `len` turns.
    pub(crate) fn truncate_to(&mut self, len: usize) {
        self.turns.truncate(len);
    }

    /// Check the tool-call protocol: every model turn with tool calls is answered by
    /// the very next user turn, one result per call, in the same order and with the
    /// same names; and no tool result appears anywhere else.
    pub fn validate(&self) -> Result<(), TranscriptError> {
        for (index, turn) in self.turns.iter().enumerate() {
            if turn.parts.is_empty() {
                return Err(TranscriptError::EmptyTurn { index });
            }

            let calls = turn.tool_calls();
            let results = turn.tool_results();

            match turn.role {
                Role::Model if !results.is_empty() => {
                    return Err(TranscriptError::MisplacedPart {
                        index,
                        role: Role::Model,
                        part: "tool results",
                    });
                }
                Role::User if !calls.is_empty() => {
                    return Err(TranscriptError::MisplacedPart {
                        index,
                        role: Role::User,
                        part: "tool calls",
                    });
                }
                _ => {}
            }

            if !calls.is_empty() {
                let answer = self
                    .turns
                    .get(index + 1)
                    .filter(|next| next.role == Role::User && !next.tool_results().is_empty())
                    .ok_or(TranscriptError::UnansweredToolCall { index })?;

                let answered: Vec<&str> = answer
                    .tool_results()
                    .iter()
                    .map(|r| r.name.as_str())
                    .collect();
                let requested: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
                if answered != requested {
                    return Err(TranscriptError::MismatchedToolResults { index: index + 1 });
                }
            }

            if !results.is_empty() {
                let follows_calls = index
                    .checked_sub(1)
                    .and_then(|prev| self.turns.get(prev))
                    .is_some_and(|prev| !prev.tool_calls().is_empty());
                if !follows_calls {
                    return Err(TranscriptError::OrphanToolResult { index });
                }
            }
        }
        Ok(())
    }
}

impl From<Vec<Turn>> for Transcript {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tool::{ToolCall, ToolResponse};
    use serde_json::json;

    fn tool_cycle() -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push_user_text("What is 2 plus 3?");
        transcript.push(Turn::model().with_tool_call(ToolCall::new("sum", json!({"a": 2, "b": 3}))));
        transcript.push(Turn::user().with_tool_result(ToolResponse::success("sum", json!(5))));
        transcript.push(Turn::model().with_text("2 plus 3 is 5."));
        transcript
    }

    #[test]
    fn test_round_trip_preserves_turns() {
        let transcript = tool_cycle();
        let serialized = serde_json::to_string(&transcript).unwrap();
        let parsed: Transcript = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, transcript);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), serialized);
    }

    #[test]
    fn test_serializes_as_array() {
        let value = serde_json::to_value(tool_cycle()).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_valid_cycle() {
        assert_eq!(tool_cycle().validate(), Ok(()));
        assert_eq!(Transcript::new().validate(), Ok(()));
        assert_eq!(tool_cycle().last_text().as_deref(), Some("2 plus 3 is 5."));
    }

    #[test]
    fn test_unanswered_tool_call() {
        let mut transcript = Transcript::new();
        transcript.push_user_text("Is 9 prime?");
        transcript.push(Turn::model().with_tool_call(ToolCall::new("isPrime", json!({"n": 9}))));
        assert_eq!(
            transcript.validate(),
            Err(TranscriptError::UnansweredToolCall { index: 1 })
        );

        transcript.push_user_text("hello?");
        assert_eq!(
            transcript.validate(),
            Err(TranscriptError::UnansweredToolCall { index: 1 })
        );
    }

    #[test]
    fn test_orphan_tool_result() {
        let mut transcript = Transcript::new();
        transcript.push_user_text("hi");
        transcript.push(Turn::user().with_tool_result(ToolResponse::success("sum", json!(1))));
        assert_eq!(
            transcript.validate(),
            Err(TranscriptError::OrphanToolResult { index: 1 })
        );
    }

    #[test]
    fn test_mismatched_results() {
        let mut transcript = Transcript::new();
        transcript.push_user_text("two things");
        transcript.push(
            Turn::model()
                .with_tool_call(ToolCall::new("sum", json!({"a": 1, "b": 1})))
                .with_tool_call(ToolCall::new("isPrime", json!({"n": 2}))),
        );
        transcript.push(Turn::user().with_tool_result(ToolResponse::success("sum", json!(2))));
        assert_eq!(
            transcript.validate(),
            Err(TranscriptError::MismatchedToolResults { index: 2 })
        );
    }

    #[test]
    fn test_misplaced_and_empty_parts() {
        let transcript = Transcript::from(vec![
            Turn::user().with_tool_call(ToolCall::new("sum", json!({}))),
        ]);
        assert!(matches!(
            transcript.validate(),
            Err(TranscriptError::MisplacedPart { index: 0, .. })
        ));

        let transcript = Transcript::from(vec![Turn::model()]);
        assert_eq!(
            transcript.validate(),
            Err(TranscriptError::EmptyTurn { index: 0 })
        );
    }
}
