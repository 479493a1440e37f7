//! crates/docqa_core/src/transcript.rs
//!
//! Derives the conversation transcript from the flat, role-tagged chat history.

use crate::domain::{HistoryMessage, MessageRole, Transcript, Turn};

/// Pairs each `user` message with the message right after it when that
/// message is an `assistant` reply.
///
/// `pending` markers are dropped before pairing. A `user` message followed by
/// another `user` message, or by nothing, yields no turn; a `user` message is
/// never paired with a reply that precedes it.
pub fn build_transcript(history: &[HistoryMessage]) -> Transcript {
    let resolved: Vec<&HistoryMessage> = history
        .iter()
        .filter(|m| m.role != MessageRole::Pending)
        .collect();

    resolved
        .windows(2)
        .filter_map(|pair| match (pair[0].role, pair[1].role) {
            (MessageRole::User, MessageRole::Assistant) => Some(Turn {
                question: pair[0].content.clone(),
                answer: pair[1].content.clone(),
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(q: &str, a: &str) -> Turn {
        Turn { question: q.to_string(), answer: a.to_string() }
    }

    #[test]
    fn test_empty_history() {
        assert!(build_transcript(&[]).is_empty());
    }

    #[test]
    fn test_summary_then_pairs() {
        let history = vec![
            HistoryMessage::assistant("summary"),
            HistoryMessage::user("Q1"),
            HistoryMessage::assistant("A1"),
            HistoryMessage::user("Q2"),
            HistoryMessage::assistant("A2"),
        ];
        assert_eq!(build_transcript(&history), vec![turn("Q1", "A1"), turn("Q2", "A2")]);
    }

    #[test]
    fn test_trailing_question_is_excluded() {
        let history = vec![
            HistoryMessage::user("Q1"),
            HistoryMessage::assistant("A1"),
            HistoryMessage::user("Q2"),
            HistoryMessage::pending(),
        ];
        assert_eq!(build_transcript(&history), vec![turn("Q1", "A1")]);
    }

    #[test]
    fn test_unanswered_question_before_another_question() {
        let history = vec![
            HistoryMessage::user("Q1"),
            HistoryMessage::user("Q2"),
            HistoryMessage::assistant("A2"),
        ];
        assert_eq!(build_transcript(&history), vec![turn("Q2", "A2")]);
    }

    #[test]
    fn test_never_pairs_with_earlier_reply() {
        let history = vec![HistoryMessage::assistant("A0"), HistoryMessage::user("Q1")];
        assert!(build_transcript(&history).is_empty());
    }

    #[test]
    fn test_length_bounded_by_user_count() {
        let history = vec![
            HistoryMessage::assistant("s"),
            HistoryMessage::user("a"),
            HistoryMessage::user("b"),
            HistoryMessage::assistant("B"),
            HistoryMessage::assistant("extra"),
            HistoryMessage::user("c"),
            HistoryMessage::pending(),
        ];
        let users = history.iter().filter(|m| m.role == MessageRole::User).count();
        let transcript = build_transcript(&history);
        assert!(transcript.len() <= users);
        assert_eq!(transcript, vec![turn("b", "B")]);
    }
}
