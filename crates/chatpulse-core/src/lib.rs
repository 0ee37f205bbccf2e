//! Shared error taxonomy and text helpers for ChatPulse.

pub mod error;
pub mod text;
