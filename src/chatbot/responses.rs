use crate::chatbot::intent::Intent;
use crate::models::Product;
use rand::seq::SliceRandom;
use rand::Rng;

// Canned pools for the social flavors and the degraded paths. One entry is
// picked uniformly at random per reply; tests pin the RNG seed.

pub const SALUDOS: &[&str] = &[
    "¡Hola! Soy el asistente virtual de PulseBeat Tech. ¿En qué puedo ayudarte hoy? 😊",
    "¡Bienvenido a PulseBeat Tech! Estoy aquí para ayudarte con nuestros productos de audio. ¿Qué estás buscando? 🎧",
    "¡Hola! Encantado de atenderte. ¿Cómo puedo asistirte con nuestros productos? 👋",
];

pub const DESPEDIDAS: &[&str] = &[
    "¡Gracias por contactarnos! Si necesitas algo más, estaré aquí para ayudarte. ¡Hasta pronto! 👋",
    "Ha sido un placer ayudarte. ¡Vuelve pronto! 😊",
    "¡Que tengas un excelente día! Estamos para servirte cuando lo necesites. 🎵",
];

pub const AGRADECIMIENTOS: &[&str] = &[
    "¡De nada! Estoy aquí para ayudarte. ¿Hay algo más en lo que pueda asistirte? 😊",
    "Es un placer poder ayudarte. ¿Necesitas algo más? 🎧",
    "No hay de qué. ¿Puedo ayudarte con algo más sobre nuestros productos? 👍",
];

pub const PRODUCTOS_NO_ENCONTRADOS: &[&str] = &[
    "Lo siento, no encontré productos que coincidan con tu búsqueda. ¿Puedes ser más específico o quieres ver nuestras categorías disponibles? 🔍",
    "No tenemos productos que coincidan exactamente con esa descripción. ¿Te gustaría ver alternativas similares o explorar nuestro catálogo? 📋",
    "No encontré resultados para esa consulta. ¿Quieres que te muestre nuestros productos más populares? 🎧",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedKind {
    Saludo,
    Despedida,
    Agradecimiento,
    ProductosNoEncontrados,
}

pub fn predefined_response<R: Rng + ?Sized>(kind: CannedKind, rng: &mut R) -> &'static str {
    let pool = match kind {
        CannedKind::Saludo => SALUDOS,
        CannedKind::Despedida => DESPEDIDAS,
        CannedKind::Agradecimiento => AGRADECIMIENTOS,
        CannedKind::ProductosNoEncontrados => PRODUCTOS_NO_ENCONTRADOS,
    };

    pool.choose(rng).copied().unwrap_or(pool[0])
}

const SUGERENCIAS_BUSQUEDA: &[&str] = &[
    "Ver más detalles",
    "Comparar modelos",
    "Ver precio",
    "Añadir al carrito",
];

const SUGERENCIAS_PRECIO: &[&str] = &[
    "Ver especificaciones",
    "Comparar con otros modelos",
    "Ver opiniones",
    "Añadir al carrito",
];

const SUGERENCIAS_INFO: &[&str] = &[
    "Ver precio",
    "Ver productos similares",
    "Conocer disponibilidad",
    "Añadir al carrito",
];

const SUGERENCIAS_SOPORTE: &[&str] = &[
    "Contactar soporte",
    "Ver garantía",
    "Preguntar por reembolso",
    "Buscar solución",
];

const SUGERENCIAS_DEFECTO: &[&str] = &["Ver productos", "Preguntar precio", "Contactar soporte"];

/// Up to three follow-up suggestions for the detected intent; intents
/// without a pool get the default trio.
pub fn contextual_suggestions<R: Rng + ?Sized>(intent: Intent, rng: &mut R) -> Vec<String> {
    let pool = match intent {
        Intent::BusquedaProducto => SUGERENCIAS_BUSQUEDA,
        Intent::PrecioProducto => SUGERENCIAS_PRECIO,
        Intent::InfoProducto => SUGERENCIAS_INFO,
        Intent::SoporteProblema => SUGERENCIAS_SOPORTE,
        _ => return SUGERENCIAS_DEFECTO.iter().map(|s| s.to_string()).collect(),
    };

    if pool.len() > 3 {
        pool.choose_multiple(rng, 3).map(|s| s.to_string()).collect()
    } else {
        pool.iter().map(|s| s.to_string()).collect()
    }
}

// Emoji sets checked/appended on model-generated replies.
pub const EMOJIS_RECONOCIDOS: &[&str] = &["😊", "👍", "🎧", "💰", "📦"];
pub const EMOJIS_COMUNES: &[&str] = &["😊", "👍", "🎧", "🎵", "🔊", "💰", "📦", "🎚️", "🎛️"];

/// Appends a random emoji unless the text already carries a recognized one.
pub fn ensure_emoji<R: Rng + ?Sized>(text: String, rng: &mut R) -> String {
    if EMOJIS_RECONOCIDOS.iter().any(|emoji| text.contains(emoji)) {
        return text;
    }

    match EMOJIS_COMUNES.choose(rng) {
        Some(emoji) => format!("{} {}", text, emoji),
        None => text,
    }
}

fn truncated(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let cut: String = text.chars().take(limit).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Numbered recommendation list with a follow-up question. Never fails:
/// an empty product list yields a "not found" canned message instead.
pub fn format_product_recommendations<R: Rng + ?Sized>(
    products: &[Product],
    query: Option<&str>,
    rng: &mut R,
) -> String {
    if products.is_empty() {
        return predefined_response(CannedKind::ProductosNoEncontrados, rng).to_string();
    }

    let intro_phrases = [
        format!(
            "He encontrado {} productos que podrían interesarte:",
            products.len()
        ),
        format!(
            "Aquí tienes {} recomendaciones basadas en tu búsqueda:",
            products.len()
        ),
        match query {
            Some(query) => format!("Estos son los productos que coinciden con '{}':", query),
            None => "Estos productos podrían interesarte:".to_string(),
        },
    ];

    let mut response = format!(
        "{}\n\n",
        intro_phrases.choose(rng).unwrap_or(&intro_phrases[0])
    );

    for (i, product) in products.iter().enumerate() {
        response.push_str(&format!(
            "{}. **{}** - ${:.2}\n",
            i + 1,
            product.name,
            product.price
        ));
        if let Some(description) = &product.description {
            response.push_str(&format!("   {}\n", truncated(description, 100)));
        }
        response.push_str(&format!("   Categoría: {}\n", product.category));
        if i + 1 < products.len() {
            response.push('\n');
        }
    }

    let followup_questions = [
        "¿Te gustaría más información sobre alguno de estos productos? 🎧",
        "¿Hay algún producto específico que te interese conocer más? 🔍",
        "¿Puedo ayudarte a decidir cuál se adapta mejor a tus necesidades? 🤔",
    ];

    response.push_str(&format!(
        "\n{}",
        followup_questions.choose(rng).copied().unwrap_or(followup_questions[0])
    ));

    response
}

/// Full single-product card with a call to action.
pub fn format_single_product_details<R: Rng + ?Sized>(product: &Product, rng: &mut R) -> String {
    let mut response = format!("**{}**\n\n", product.name);
    response.push_str(&format!("💰 **Precio:** ${:.2}\n", product.price));
    response.push_str(&format!("🏷️ **Categoría:** {}\n", product.category));

    if let Some(description) = &product.description {
        response.push_str(&format!("\n📝 **Descripción:**\n{}\n", description));
    }

    let cta_options = [
        "¿Te gustaría añadir este producto al carrito? 🛒",
        "¿Quieres ver productos similares o tienes alguna pregunta específica? 🔍",
        "Si estás interesado, puedo ayudarte con el proceso de compra. ¿Qué te parece? 💳",
    ];

    response.push_str(&format!(
        "\n{}",
        cta_options.choose(rng).copied().unwrap_or(cta_options[0])
    ));

    response
}
