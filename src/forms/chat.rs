use serde::Deserialize;
use uuid::Uuid;

/// Inbound chat request, decided once at the boundary. A body carrying
/// both `message_id` and a boolean `feedback` is a feedback submission and
/// short-circuits normal processing; everything else is a chat turn.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ChatRequest {
    Feedback(FeedbackSubmission),
    Turn(ChatTurn),
}

#[derive(Debug, Deserialize)]
pub struct FeedbackSubmission {
    pub message_id: Uuid,
    /// true = positive, false = negative
    pub feedback: bool,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatTurn {
    /// Missing and empty messages both get the validation canned reply.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_with_feedback_fields_is_a_feedback_submission() {
        let body = r#"{"message_id":"4fc3b1ea-17a8-43f8-8e21-0bb25ff2e383","feedback":false,"session_id":"s1"}"#;
        match serde_json::from_str::<ChatRequest>(body).expect("must parse") {
            ChatRequest::Feedback(submission) => {
                assert!(!submission.feedback);
                assert_eq!(submission.session_id.as_deref(), Some("s1"));
            }
            ChatRequest::Turn(_) => panic!("expected feedback variant"),
        }
    }

    #[test]
    fn plain_message_is_a_chat_turn() {
        let body = r#"{"message":"Hola","session_id":"s1"}"#;
        match serde_json::from_str::<ChatRequest>(body).expect("must parse") {
            ChatRequest::Turn(turn) => {
                assert_eq!(turn.message, "Hola");
                assert_eq!(turn.session_id.as_deref(), Some("s1"));
            }
            ChatRequest::Feedback(_) => panic!("expected turn variant"),
        }
    }

    #[test]
    fn null_feedback_is_not_a_feedback_submission() {
        // tri-state feedback: null means "no feedback", so this is a turn
        let body = r#"{"message":"Hola","message_id":"4fc3b1ea-17a8-43f8-8e21-0bb25ff2e383","feedback":null}"#;
        assert!(matches!(
            serde_json::from_str::<ChatRequest>(body).expect("must parse"),
            ChatRequest::Turn(_)
        ));
    }

    #[test]
    fn empty_body_is_a_turn_with_empty_message() {
        match serde_json::from_str::<ChatRequest>("{}").expect("must parse") {
            ChatRequest::Turn(turn) => {
                assert!(turn.message.is_empty());
                assert!(turn.session_id.is_none());
            }
            ChatRequest::Feedback(_) => panic!("expected turn variant"),
        }
    }
}
