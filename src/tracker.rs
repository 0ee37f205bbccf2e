use std::sync::Arc;

use tracing::{debug, error};

use crate::channel::InboundEvent;
use crate::db::{call_blocking, Database};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTarget {
    pub chat_id: i64,
    pub user_id: i64,
    pub user_name: String,
}

/// A message counts when it is plain text (not a command) from a known
/// sender in a group or supergroup.
pub fn qualifying_record(event: &InboundEvent) -> Option<CountTarget> {
    if !event.chat_kind.is_group_context() || event.text.is_none() || event.is_command() {
        return None;
    }
    let sender = event.sender.as_ref()?;
    Some(CountTarget {
        chat_id: event.chat_id,
        user_id: sender.id,
        user_name: sender.display_name.clone(),
    })
}

/// Count the event if it qualifies. Returns the new count; storage failures
/// are logged and swallowed.
pub async fn track_message(db: Arc<Database>, event: &InboundEvent) -> Option<i64> {
    let Some(target) = qualifying_record(event) else {
        debug!(
            "Ignoring update in {} chat {}",
            event.chat_kind.as_str(),
            event.chat_id
        );
        return None;
    };

    let CountTarget {
        chat_id,
        user_id,
        user_name,
    } = target;
    match call_blocking(db, move |d| d.increment_count(chat_id, user_id, &user_name)).await {
        Ok(count) => {
            debug!("chat={} user={} count={}", chat_id, user_id, count);
            Some(count)
        }
        Err(e) => {
            error!(
                "Failed to update engagement for chat {} user {}: {}",
                chat_id, user_id, e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChatKind, Sender};

    fn event(kind: ChatKind, text: Option<&str>) -> InboundEvent {
        InboundEvent {
            chat_id: -200,
            chat_kind: kind,
            message_id: Some(5),
            sender: Some(Sender {
                id: 77,
                display_name: "Ivan Petrov".into(),
            }),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_group_text_qualifies() {
        let target = qualifying_record(&event(ChatKind::Group, Some("hello"))).unwrap();
        assert_eq!(
            target,
            CountTarget {
                chat_id: -200,
                user_id: 77,
                user_name: "Ivan Petrov".into(),
            }
        );
        assert!(qualifying_record(&event(ChatKind::Supergroup, Some("hi"))).is_some());
    }

    #[test]
    fn test_non_qualifying_events() {
        assert!(qualifying_record(&event(ChatKind::Private, Some("hello"))).is_none());
        assert!(qualifying_record(&event(ChatKind::Channel, Some("post"))).is_none());
        assert!(qualifying_record(&event(ChatKind::Group, Some("/stats"))).is_none());
        assert!(qualifying_record(&event(ChatKind::Group, None)).is_none());

        let mut anonymous = event(ChatKind::Group, Some("hello"));
        anonymous.sender = None;
        assert!(qualifying_record(&anonymous).is_none());
    }

    #[tokio::test]
    async fn test_track_message_counts_group_text() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let msg = event(ChatKind::Group, Some("hello"));
        assert_eq!(track_message(db.clone(), &msg).await, Some(1));
        assert_eq!(track_message(db.clone(), &msg).await, Some(2));
        assert_eq!(db.get_record(-200, 77).unwrap().unwrap().message_count, 2);
    }

    #[tokio::test]
    async fn test_track_message_skips_private_chat() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let msg = event(ChatKind::Private, Some("hello"));
        assert_eq!(track_message(db.clone(), &msg).await, None);
        assert!(db.chat_totals().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_track_message_swallows_storage_failure() {
        let (db, dir) = crate::test_support::broken_db();
        let msg = event(ChatKind::Group, Some("hello"));
        assert_eq!(track_message(db.clone(), &msg).await, None);
        assert!(db.chat_totals().is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
