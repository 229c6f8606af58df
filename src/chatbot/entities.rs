use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of structured span extracted from a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    ProductoAudio,
    ProductoAltavoz,
    ProductoStreaming,
    Precio,
    Tiempo,
    ProductoEspecifico,
}

/// Entity-type → matched substrings. A kind with no matches is absent
/// rather than present with an empty list.
pub type EntitySet = BTreeMap<EntityKind, Vec<String>>;

/// Catalog names recognized verbatim in user text.
const KNOWN_PRODUCTS: &[&str] = &[
    "pulsebeat pro",
    "soundwave x3",
    "bassboost elite",
    "soundtower",
    "pulsebox",
    "roomfill",
];

/// Tokens skipped when guessing a product name from free text.
const STOP_WORDS: &[&str] = &[
    "producto", "productos", "el", "la", "los", "las", "un", "una", "unos", "unas",
    "vender", "venden", "tiene", "tienen", "quiero", "busco", "precio", "precios",
    "cuanto", "cuánto", "cuesta", "cuestan", "sobre", "acerca", "para", "como", "cómo",
];

/// Pattern-based entity extractor over normalized text. All passes are
/// independent and additive into one result mapping.
pub struct EntityExtractor {
    product_patterns: Vec<(EntityKind, Regex)>,
    price: Regex,
    time: Regex,
}

impl EntityExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        let product_patterns = vec![
            (
                EntityKind::ProductoAudio,
                Regex::new(r"(?:auriculares|audífonos|headphones)(?:\s\w+){0,3}")?,
            ),
            (
                EntityKind::ProductoAltavoz,
                Regex::new(r"(?:altavoces|bocinas|speakers|parlantes)(?:\s\w+){0,3}")?,
            ),
            (
                EntityKind::ProductoStreaming,
                Regex::new(r"(?:streaming|streamer|reproductor)(?:\s\w+){0,3}")?,
            ),
        ];

        Ok(Self {
            product_patterns,
            price: Regex::new(
                r"\$\s*\d+(?:[.,]\d+)?|\d+(?:[.,]\d+)?\s*(?:dólares|dolares|pesos)",
            )?,
            time: Regex::new(r"(?:hoy|mañana|pasado mañana|ayer|próxima semana|proximo mes)")?,
        })
    }

    pub fn extract(&self, text: &str) -> EntitySet {
        let message = text.to_lowercase();
        let message = message.trim();
        let mut entities = EntitySet::new();

        for (kind, pattern) in &self.product_patterns {
            let matches: Vec<String> = pattern
                .find_iter(message)
                .map(|m| m.as_str().to_string())
                .collect();
            if !matches.is_empty() {
                entities.insert(*kind, matches);
            }
        }

        let prices: Vec<String> = self
            .price
            .find_iter(message)
            .map(|m| m.as_str().to_string())
            .collect();
        if !prices.is_empty() {
            entities.insert(EntityKind::Precio, prices);
        }

        let times: Vec<String> = self
            .time
            .find_iter(message)
            .map(|m| m.as_str().to_string())
            .collect();
        if !times.is_empty() {
            entities.insert(EntityKind::Tiempo, times);
        }

        for product in KNOWN_PRODUCTS {
            if message.contains(product) {
                entities
                    .entry(EntityKind::ProductoEspecifico)
                    .or_default()
                    .push(product.to_string());
            }
        }

        entities
    }

    /// Best-effort product name from free text. A recognized catalog name
    /// always wins; otherwise the longest token that is neither short nor a
    /// stop word, with ties going to the earliest occurrence.
    pub fn extract_product_name(&self, text: &str) -> Option<String> {
        let entities = self.extract(text);
        if let Some(specific) = entities.get(&EntityKind::ProductoEspecifico) {
            if let Some(first) = specific.first() {
                return Some(first.clone());
            }
        }

        let message = text.to_lowercase();
        let mut best: Option<&str> = None;
        for word in message.split_whitespace() {
            if word.chars().count() <= 3 || STOP_WORDS.contains(&word) {
                continue;
            }
            if best.map_or(true, |current| word.chars().count() > current.chars().count()) {
                best = Some(word);
            }
        }

        best.map(|word| word.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> EntityExtractor {
        EntityExtractor::new().expect("patterns must compile")
    }

    #[test]
    fn product_type_mentions_are_tagged() {
        let entities = extractor().extract("busco auriculares inalámbricos y altavoces");
        assert!(entities.contains_key(&EntityKind::ProductoAudio));
        assert!(entities.contains_key(&EntityKind::ProductoAltavoz));
        assert!(!entities.contains_key(&EntityKind::ProductoStreaming));
    }

    #[test]
    fn price_tokens_are_extracted() {
        let entities = extractor().extract("tengo $ 200 o unos 150 dólares");
        let prices = entities.get(&EntityKind::Precio).expect("price entity");
        assert!(prices.iter().any(|p| p.contains("200")));
        assert!(prices.iter().any(|p| p.contains("150")));
    }

    #[test]
    fn temporal_words_are_extracted() {
        let entities = extractor().extract("¿puede llegar mañana o pasado mañana?");
        assert!(entities.contains_key(&EntityKind::Tiempo));
    }

    #[test]
    fn absent_categories_are_omitted() {
        let entities = extractor().extract("hola");
        assert!(entities.is_empty());
    }

    #[test]
    fn known_product_name_beats_longer_tokens() {
        // "inalámbricos" is longer than any token of the catalog name, but
        // the literal "soundwave x3" must win.
        let name = extractor()
            .extract_product_name("busco el soundwave x3 para auriculares inalámbricos")
            .expect("product name");
        assert_eq!(name, "soundwave x3");
    }

    #[test]
    fn stop_words_and_short_tokens_yield_none() {
        assert_eq!(extractor().extract_product_name("el la los un"), None);
        assert_eq!(extractor().extract_product_name("cuánto cuesta para los unas"), None);
    }

    #[test]
    fn longest_token_is_picked_with_first_occurrence_tiebreak() {
        let name = extractor()
            .extract_product_name("quiero unos parlantes buenos")
            .expect("product name");
        assert_eq!(name, "parlantes");
    }
}
