//! Storage and reporting domain for ChatPulse.

pub mod db;
pub mod report;
