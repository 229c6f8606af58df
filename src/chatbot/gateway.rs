use crate::connectors::{ConnectorError, OllamaConnector};
use crate::models::{ChatMessage, MessageSource, Product, User};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;

/// Persona preamble for every generation request.
const STORE_CONTEXT: &str = "Eres el asistente virtual oficial de PulseBeat Tech, una tienda especializada \
en tecnología de audio de alta calidad. Tu nombre es PulseBeat Assistant. \
La tienda vende principalmente: auriculares (headphones), altavoces (speakers) \
y dispositivos de streaming de audio.";

const RESPONSE_GUIDELINES: &str = "\nPautas para tus respuestas:\
\n1. Sé conciso pero informativo.\
\n2. Responde siempre en español a menos que te pregunten en otro idioma.\
\n3. Incluye un emoji relevante al final de tu respuesta.\
\n4. Nunca inventes especificaciones de productos que no conoces.\
\n5. Si no estás seguro de algo, ofrece contactar con servicio al cliente.\
\n6. Mantén un tono amigable y profesional.\
\n7. Si te preguntan por un producto específico, proporciona detalles precisos.";

const UNAVAILABLE_TEXT: &str = "Lo siento, nuestro sistema de asistencia inteligente no está disponible en este momento. ¿Puedo ayudarte con alguna consulta básica sobre nuestros productos? 🤔";

const UPSTREAM_ERROR_TEXT: &str = "Lo siento, estoy teniendo problemas para procesar tu consulta. ¿Puedes intentarlo con otras palabras o preguntarme sobre nuestros productos destacados? 🔄";

const TRANSPORT_ERROR_TEXT: &str = "Disculpa, no puedo responder en este momento. ¿Puedo ayudarte con información básica sobre nuestros productos o servicios? 🙇";

// Emoji handling for generated text; slightly wider append pool than the
// recognition set.
const EMOJIS_ESPERADOS: &[&str] = &["😊", "🎧", "🔊", "💰", "📦"];
const EMOJIS_DISPONIBLES: &[&str] = &["😊", "🎧", "🔊", "📱", "💻", "🎵", "🎚️", "📦", "💰"];

/// How many history turns make it into the prompt.
const HISTORY_WINDOW: usize = 3;

/// Outcome of one gateway call. Every branch carries wall-clock latency and
/// a source tag; the text is always usable as a reply.
#[derive(Debug, Clone)]
pub struct GeneratedReply {
    pub text: String,
    pub source: MessageSource,
    pub latency: f64,
}

fn product_context(products: &[Product]) -> String {
    let mut context = String::new();

    if !products.is_empty() {
        context.push_str("\nInformación de productos relevantes:\n");
        for (i, product) in products.iter().enumerate() {
            context.push_str(&format!("{}. {}: ${:.2}\n", i + 1, product.name, product.price));
            if let Some(description) = &product.description {
                let preview: String = description.chars().take(100).collect();
                context.push_str(&format!("   Descripción: {}...\n", preview));
            }
            context.push_str(&format!("   Categoría: {}\n", product.category));
        }
    }

    context
}

/// Single enriched prompt: persona + user line + catalog context + recent
/// turns + guidelines + the literal question.
pub fn build_prompt(
    user_message: &str,
    products: &[Product],
    history: &[ChatMessage],
    user: Option<&User>,
) -> String {
    let user_context = match user {
        Some(user) => format!(
            "\nEstás hablando con {}, un cliente registrado.",
            user.username
        ),
        None => String::new(),
    };

    let products_context = product_context(products);

    let mut conversation_context = String::new();
    if !history.is_empty() {
        conversation_context.push_str("\nHistorial de conversación reciente:\n");
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        for message in &history[start..] {
            let sender = if message.is_bot { "Tú" } else { "Usuario" };
            conversation_context.push_str(&format!("{}: {}\n", sender, message.content));
        }
    }

    format!(
        "{}\n{}\n{}\n{}\n{}\n\nPregunta del usuario: {}",
        STORE_CONTEXT,
        user_context,
        products_context,
        conversation_context,
        RESPONSE_GUIDELINES,
        user_message
    )
}

/// Fallback responder backed by the generation service. Availability is
/// probed before every request; failures of any kind degrade to canned
/// text and are never propagated to the caller.
pub struct LlmGateway {
    connector: Arc<dyn OllamaConnector>,
}

impl LlmGateway {
    pub fn new(connector: Arc<dyn OllamaConnector>) -> Self {
        Self { connector }
    }

    pub async fn generate<R: Rng>(
        &self,
        user_message: &str,
        products: &[Product],
        history: &[ChatMessage],
        user: Option<&User>,
        rng: &mut R,
    ) -> GeneratedReply {
        let started = Instant::now();

        if !self.connector.is_available().await {
            tracing::warn!("Generation service is not available");
            return GeneratedReply {
                text: UNAVAILABLE_TEXT.to_string(),
                source: MessageSource::Fallback,
                latency: started.elapsed().as_secs_f64(),
            };
        }

        let prompt = build_prompt(user_message, products, history, user);
        tracing::info!(
            preview = %user_message.chars().take(50).collect::<String>(),
            "Sending prompt to generation service"
        );

        match self.connector.generate(&prompt).await {
            Ok(text) => {
                let mut reply = text.trim().to_string();
                if !EMOJIS_ESPERADOS.iter().any(|emoji| reply.contains(emoji)) {
                    if let Some(emoji) = EMOJIS_DISPONIBLES.choose(rng) {
                        reply.push_str(&format!(" {}", emoji));
                    }
                }

                GeneratedReply {
                    text: reply,
                    source: MessageSource::Ollama,
                    latency: started.elapsed().as_secs_f64(),
                }
            }
            Err(err) => {
                tracing::error!("Generation request failed: {:?}", err);
                let text = match err {
                    ConnectorError::ServiceUnavailable(_) => TRANSPORT_ERROR_TEXT,
                    _ => UPSTREAM_ERROR_TEXT,
                };

                GeneratedReply {
                    text: text.to_string(),
                    source: MessageSource::Error,
                    latency: started.elapsed().as_secs_f64(),
                }
            }
        }
    }
}
