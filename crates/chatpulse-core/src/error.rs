use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatPulseError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Telegram error: {0}")]
    Telegram(String),

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let e = ChatPulseError::Config("missing key".into());
        assert_eq!(e.to_string(), "Config error: missing key");

        let e = ChatPulseError::Telegram("bad token".into());
        assert_eq!(e.to_string(), "Telegram error: bad token");

        let e = ChatPulseError::TaskJoin("cancelled".into());
        assert_eq!(e.to_string(), "Task join error: cancelled");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let e: ChatPulseError = io_err.into();
        assert!(e.to_string().starts_with("IO error"));
        assert!(e.to_string().contains("not found"));
    }

    #[test]
    fn test_error_from_sqlite() {
        let e: ChatPulseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(e, ChatPulseError::Database(_)));
        assert!(e.to_string().contains("Database error"));
    }
}
