//! Process-level bootstrap shared by the ChatPulse binaries.

pub mod logging;
