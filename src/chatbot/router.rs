use crate::chatbot::entities::{EntityExtractor, EntitySet};
use crate::chatbot::gateway::LlmGateway;
use crate::chatbot::intent::{Intent, IntentResult};
use crate::chatbot::responses;
use crate::chatbot::responses::CannedKind;
use crate::models::{ChatMessage, MessageSource, User};
use crate::services::Catalog;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;

/// High-confidence direct resolution only kicks in above this threshold;
/// everything below escalates to the generation service.
const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Search/recommendation list size for catalog-backed replies.
const CATALOG_LIMIT: i64 = 5;

const CLARIFY_PRICE_TEXT: &str = "¿De qué producto específico te gustaría saber el precio? Puedo ayudarte a encontrar la información que necesitas. 🔍";

const STATIC_FALLBACK_TEXT: &str = "Lo siento, no pude entender completamente tu consulta. ¿Podrías reformularla o ser más específico? Estoy aquí para ayudarte con información sobre nuestros productos de audio. 🎧";

const GREETING_WORDS: &[&str] = &["hola", "hey", "saludos", "buenos"];
const THANKS_WORDS: &[&str] = &["gracias", "agradezco", "thanks"];
const FAREWELL_WORDS: &[&str] = &["adiós", "adios", "chao", "hasta luego"];

/// Structured reply handed back to the HTTP layer. Persistence happens in
/// the orchestrating caller, not here.
#[derive(Debug, Clone, Serialize)]
pub struct ChatPayload {
    pub response: String,
    pub source: MessageSource,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<EntitySet>,
}

/// Decides which response source answers a turn: canned template,
/// catalog-backed template, or a language-model completion.
pub struct ResponseRouter {
    catalog: Arc<dyn Catalog>,
    gateway: LlmGateway,
    extractor: Arc<EntityExtractor>,
}

impl ResponseRouter {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        gateway: LlmGateway,
        extractor: Arc<EntityExtractor>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            extractor,
        }
    }

    pub async fn route<R: Rng>(
        &self,
        message: &str,
        intent_result: &IntentResult,
        entities: &EntitySet,
        history: &[ChatMessage],
        user: Option<&User>,
        rng: &mut R,
    ) -> ChatPayload {
        let intent = intent_result.primary;
        let lower = message.to_lowercase();

        // 1. Direct resolution for recognized categories at high confidence.
        if intent_result.confidence > CONFIDENCE_THRESHOLD {
            match intent {
                Intent::General => {
                    // Best-effort refinement: "general" is also the default
                    // fallback intent, so sniff the raw text for the flavor.
                    let flavor = if GREETING_WORDS.iter().any(|word| lower.contains(word)) {
                        Some(CannedKind::Saludo)
                    } else if THANKS_WORDS.iter().any(|word| lower.contains(word)) {
                        Some(CannedKind::Agradecimiento)
                    } else if FAREWELL_WORDS.iter().any(|word| lower.contains(word)) {
                        Some(CannedKind::Despedida)
                    } else {
                        None
                    };

                    if let Some(flavor) = flavor {
                        let text = responses::predefined_response(flavor, rng).to_string();
                        return self.finish(text, MessageSource::Predefined, intent, entities, rng);
                    }
                }
                Intent::BusquedaProducto => {
                    if let Some(name) = self.extractor.extract_product_name(message) {
                        let products = self.catalog.search(&name, CATALOG_LIMIT).await;
                        if !products.is_empty() {
                            let text = responses::format_product_recommendations(
                                &products,
                                Some(&name),
                                rng,
                            );
                            return self.finish(
                                text,
                                MessageSource::Products,
                                intent,
                                entities,
                                rng,
                            );
                        }
                    }

                    // No candidate name or no hits: featured still answers.
                    let featured = self.catalog.featured(CATALOG_LIMIT).await;
                    let text = responses::format_product_recommendations(&featured, None, rng);
                    return self.finish(text, MessageSource::Products, intent, entities, rng);
                }
                Intent::PrecioProducto => {
                    if let Some(name) = self.extractor.extract_product_name(message) {
                        if let Some(product) = self.catalog.details(&name).await {
                            let text = format!(
                                "El precio de **{}** es ${:.2}. ¿Te gustaría más información sobre este producto o añadirlo al carrito? 💰",
                                product.name, product.price
                            );
                            return self.finish(
                                text,
                                MessageSource::Price,
                                intent,
                                entities,
                                rng,
                            );
                        }
                    }

                    return self.finish(
                        CLARIFY_PRICE_TEXT.to_string(),
                        MessageSource::Assistance,
                        intent,
                        entities,
                        rng,
                    );
                }
                Intent::InfoProducto => {
                    if let Some(name) = self.extractor.extract_product_name(message) {
                        if let Some(product) = self.catalog.details(&name).await {
                            let text = responses::format_single_product_details(&product, rng);
                            return self.finish(
                                text,
                                MessageSource::ProductDetails,
                                intent,
                                entities,
                                rng,
                            );
                        }
                    }
                    // No catalog hit: continue to the generation service.
                }
                _ => {}
            }
        }

        // 2. Escalate to the generation service with catalog context.
        let related_products = match self.extractor.extract_product_name(message) {
            Some(name) => self.catalog.search(&name, CATALOG_LIMIT).await,
            None => Vec::new(),
        };

        let reply = self
            .gateway
            .generate(message, &related_products, history, user, rng)
            .await;
        tracing::info!(
            latency = reply.latency,
            source = reply.source.as_str(),
            "Generation turn finished"
        );

        // 3. Defensive only: the gateway always yields text, so this branch
        // fires solely on an empty completion.
        if reply.text.trim().is_empty() {
            return self.finish(
                STATIC_FALLBACK_TEXT.to_string(),
                MessageSource::Fallback,
                intent,
                entities,
                rng,
            );
        }

        self.finish(reply.text, reply.source, intent, entities, rng)
    }

    fn finish<R: Rng>(
        &self,
        text: String,
        source: MessageSource,
        intent: Intent,
        entities: &EntitySet,
        rng: &mut R,
    ) -> ChatPayload {
        let response = if source == MessageSource::Ollama {
            responses::ensure_emoji(text, rng)
        } else {
            text
        };

        ChatPayload {
            response,
            source,
            suggestions: responses::contextual_suggestions(intent, rng),
            intent: Some(intent.as_str().to_string()),
            entities: if entities.is_empty() {
                None
            } else {
                Some(entities.clone())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::intent::IntentClassifier;
    use crate::connectors::ollama_service::mock::MockOllamaConnector;
    use crate::services::catalog::mock::MockCatalog;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn product(name: &str, price: f64) -> crate::models::Product {
        crate::models::Product {
            id: 1,
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: Some("Audio de alta fidelidad.".to_string()),
            price,
            category: "Headphones".to_string(),
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn router_with(catalog: MockCatalog, ollama: MockOllamaConnector) -> ResponseRouter {
        ResponseRouter::new(
            Arc::new(catalog),
            LlmGateway::new(Arc::new(ollama)),
            Arc::new(EntityExtractor::new().expect("patterns must compile")),
        )
    }

    async fn run(router: &ResponseRouter, message: &str) -> ChatPayload {
        let classifier = IntentClassifier::new().expect("patterns must compile");
        let extractor = EntityExtractor::new().expect("patterns must compile");
        let intent_result = classifier.classify(message);
        let entities = extractor.extract(message);
        let mut rng = StdRng::seed_from_u64(11);
        router
            .route(message, &intent_result, &entities, &[], None, &mut rng)
            .await
    }

    #[tokio::test]
    async fn greeting_routes_to_predefined_pool() {
        let router = router_with(MockCatalog::default(), MockOllamaConnector::default());

        let payload = run(&router, "Hola").await;

        assert_eq!(payload.source, MessageSource::Predefined);
        assert!(responses::SALUDOS.contains(&payload.response.as_str()));
        assert_eq!(payload.intent.as_deref(), Some("general"));
    }

    #[tokio::test]
    async fn price_question_embeds_catalog_price() {
        let catalog = MockCatalog::with_products(vec![product("SoundWave X3", 199.99)]);
        let router = router_with(catalog, MockOllamaConnector::default());

        let payload = run(&router, "cuánto cuesta el SoundWave X3").await;

        assert_eq!(payload.source, MessageSource::Price);
        assert!(payload.response.contains("SoundWave X3"));
        assert!(payload.response.contains("$199.99"));
    }

    #[tokio::test]
    async fn price_question_without_candidate_asks_for_clarification() {
        let router = router_with(MockCatalog::default(), MockOllamaConnector::default());

        let payload = run(&router, "cuánto cuesta").await;

        assert_eq!(payload.source, MessageSource::Assistance);
        assert!(!payload.response.is_empty());
    }

    #[tokio::test]
    async fn product_search_with_empty_catalog_still_answers() {
        let router = router_with(MockCatalog::default(), MockOllamaConnector::default());

        let payload = run(&router, "estoy buscando altavoces potentes").await;

        assert_eq!(payload.source, MessageSource::Products);
        assert!(responses::PRODUCTOS_NO_ENCONTRADOS.contains(&payload.response.as_str()));
    }

    #[tokio::test]
    async fn product_search_recommends_catalog_hits() {
        let catalog = MockCatalog::with_products(vec![
            product("SoundTower", 349.0),
            product("RoomFill", 279.0),
        ]);
        let router = router_with(catalog, MockOllamaConnector::default());

        let payload = run(&router, "estoy buscando altavoces potentes").await;

        assert_eq!(payload.source, MessageSource::Products);
        assert!(payload.response.contains("SoundTower"));
        assert!(payload.response.contains("RoomFill"));
    }

    #[tokio::test]
    async fn unknown_intent_with_service_down_degrades_gracefully() {
        let router = router_with(MockCatalog::default(), MockOllamaConnector::unavailable());

        let payload = run(&router, "háblame de la historia de la marca").await;

        assert_eq!(payload.source, MessageSource::Fallback);
        assert!(!payload.response.is_empty());
    }

    #[tokio::test]
    async fn low_confidence_goes_to_generation_service() {
        let router = router_with(
            MockCatalog::default(),
            MockOllamaConnector::with_reply("Tenemos envíos a todo el país."),
        );

        // envio + comparacion keywords mixed: confidence below threshold.
        let payload = run(&router, "envío mejor o peor que la entrega normal").await;

        assert_eq!(payload.source, MessageSource::Ollama);
        assert!(payload.response.contains("Tenemos envíos"));
    }

    #[tokio::test]
    async fn suggestions_never_exceed_three() {
        let router = router_with(MockCatalog::default(), MockOllamaConnector::default());
        let payload = run(&router, "Hola").await;
        assert!(payload.suggestions.len() <= 3);
        assert!(!payload.suggestions.is_empty());
    }
}
