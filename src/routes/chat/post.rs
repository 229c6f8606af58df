use crate::chatbot::{EntityExtractor, IntentClassifier, ResponseRouter};
use crate::db;
use crate::forms::{ChatRequest, ChatTurn, FeedbackSubmission};
use crate::models::user::MaybeUser;
use crate::models::{ClientMeta, Conversation, MessageSource, NewMessage};
use actix_web::{web, HttpRequest, HttpResponse, Responder, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::time::Instant;
use uuid::Uuid;

const VALIDATION_TEXT: &str = "Por favor, envía un mensaje para que pueda ayudarte. 😊";

const NEGATIVE_FEEDBACK_NOTES: &str = "Retroalimentación negativa del usuario";

/// History window pulled from the store for generation context.
const HISTORY_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
struct ChatTurnResponse {
    response: String,
    source: MessageSource,
    suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entities: Option<crate::chatbot::EntitySet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id: Option<Uuid>,
    session_id: String,
    processing_time: f64,
}

/// POST /api/chat/ handles both chat turns and feedback submissions.
#[tracing::instrument(
    name = "Chat endpoint.",
    skip(request, body, pg_pool, classifier, extractor, router)
)]
pub async fn handler(
    request: HttpRequest,
    body: web::Json<ChatRequest>,
    user: MaybeUser,
    pg_pool: web::Data<PgPool>,
    classifier: web::Data<IntentClassifier>,
    extractor: web::Data<EntityExtractor>,
    router: web::Data<ResponseRouter>,
) -> Result<impl Responder> {
    match body.into_inner() {
        ChatRequest::Feedback(submission) => process_feedback(pg_pool.get_ref(), submission).await,
        ChatRequest::Turn(turn) => {
            process_turn(
                &request,
                turn,
                user,
                pg_pool.get_ref(),
                classifier.get_ref(),
                extractor.get_ref(),
                router.get_ref(),
            )
            .await
        }
    }
}

pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(json!({ "error": "Método no permitido" }))
}

/// Best effort: feedback recording never fails the acknowledgment. Negative
/// feedback additionally raises a review flag (one per call).
async fn process_feedback(pool: &PgPool, submission: FeedbackSubmission) -> Result<HttpResponse> {
    match db::message::fetch_bot_message(pool, submission.message_id).await {
        Ok(Some(message)) => {
            if let Err(err) =
                db::message::set_feedback(pool, message.id, submission.feedback).await
            {
                tracing::error!("Failed to record feedback: {:?}", err);
            } else {
                tracing::info!(
                    message_id = %message.id,
                    positive = submission.feedback,
                    "Feedback recorded"
                );
                if !submission.feedback {
                    if let Err(err) =
                        db::review::create(pool, message.id, NEGATIVE_FEEDBACK_NOTES).await
                    {
                        tracing::error!("Failed to create review flag: {:?}", err);
                    }
                }
            }
        }
        Ok(None) => {
            tracing::warn!(
                message_id = %submission.message_id,
                "Feedback for unknown bot message"
            );
        }
        Err(err) => {
            tracing::error!("Failed to record feedback: {:?}", err);
        }
    }

    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

fn client_meta(request: &HttpRequest) -> ClientMeta {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
    };

    ClientMeta {
        user_location: header("x-forwarded-for"),
        source_page: header("referer"),
        browser_info: header("user-agent"),
    }
}

async fn process_turn(
    request: &HttpRequest,
    turn: ChatTurn,
    user: MaybeUser,
    pool: &PgPool,
    classifier: &IntentClassifier,
    extractor: &EntityExtractor,
    router: &ResponseRouter,
) -> Result<HttpResponse> {
    let started = Instant::now();

    let message = turn.message.trim().to_string();
    if message.is_empty() {
        return Ok(HttpResponse::Ok().json(json!({
            "response": VALIDATION_TEXT,
            "source": MessageSource::Validation.as_str(),
        })));
    }

    let session_id = match turn.session_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => id,
        None => {
            tracing::warn!("Chat request without session_id");
            format!("temp_{}", Uuid::new_v4())
        }
    };

    tracing::info!(
        session_id = %session_id,
        preview = %message.chars().take(50).collect::<String>(),
        "Chat message received"
    );

    let intent_result = classifier.classify(&message);
    let entities = extractor.extract(&message);
    let entities_json = if entities.is_empty() {
        None
    } else {
        serde_json::to_value(&entities).ok()
    };

    // Conversation lookup degrades to a detached one so the turn can still
    // be answered when the store is down.
    let meta = client_meta(request);
    let conversation = match db::conversation::get_or_create(
        pool,
        &session_id,
        user.as_ref().map(|u| u.id.as_str()),
        &meta,
    )
    .await
    {
        Ok((conversation, _created)) => conversation,
        Err(err) => {
            tracing::error!("Failed to get or create conversation: {:?}", err);
            Conversation::detached(&session_id)
        }
    };

    let user_fields = NewMessage {
        content: message.clone(),
        is_bot: false,
        source: MessageSource::User,
        detected_intent: Some(intent_result.primary.as_str().to_string()),
        detected_entities: entities_json.clone(),
        processing_time: None,
    };
    if let Err(err) = db::message::append(pool, conversation.id, &user_fields).await {
        tracing::error!("Failed to store user message: {:?}", err);
    }

    let history = match db::message::recent(pool, conversation.id, HISTORY_LIMIT).await {
        Ok(history) => history,
        Err(err) => {
            tracing::error!("Failed to load conversation history: {:?}", err);
            Vec::new()
        }
    };

    let mut rng = StdRng::from_entropy();
    let payload = router
        .route(
            &message,
            &intent_result,
            &entities,
            &history,
            user.as_ref(),
            &mut rng,
        )
        .await;

    let elapsed = started.elapsed().as_secs_f64();
    let bot_fields = NewMessage {
        content: payload.response.clone(),
        is_bot: true,
        source: payload.source,
        detected_intent: Some(intent_result.primary.as_str().to_string()),
        detected_entities: entities_json,
        processing_time: Some(elapsed),
    };
    let message_id = match db::message::append(pool, conversation.id, &bot_fields).await {
        Ok(stored) => Some(stored.id),
        Err(err) => {
            tracing::error!("Failed to store bot message: {:?}", err);
            None
        }
    };

    Ok(HttpResponse::Ok().json(ChatTurnResponse {
        response: payload.response,
        source: payload.source,
        suggestions: payload.suggestions,
        intent: payload.intent,
        entities: payload.entities,
        message_id,
        session_id,
        processing_time: (started.elapsed().as_secs_f64() * 100.0).round() / 100.0,
    }))
}
