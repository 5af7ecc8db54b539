//! These models represent the objects passed around by the agent
//!
//! The transcript is stored in the same shape the model gateway speaks: a list of
//! role-tagged turns, each holding `text`, `functionCall` or `functionResponse` parts.
//! The browser widget keeps the serialized transcript and hands it back on every
//! request, so this shape is also the HTTP history format.
pub mod message;
pub mod role;
pub mod tool;
pub mod transcript;
