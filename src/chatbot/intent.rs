use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Coarse category of the user's goal, inferred from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    BusquedaProducto,
    InfoProducto,
    PrecioProducto,
    ComparacionProductos,
    CompraCarrito,
    EnvioEntrega,
    SoporteProblema,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusquedaProducto => "busqueda_producto",
            Self::InfoProducto => "info_producto",
            Self::PrecioProducto => "precio_producto",
            Self::ComparacionProductos => "comparacion_productos",
            Self::CompraCarrito => "compra_carrito",
            Self::EnvioEntrega => "envio_entrega",
            Self::SoporteProblema => "soporte_problema",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one message. `confidence` is the winning
/// category's rule-match count over the total match count, so it is always
/// in (0, 1] and exactly 1.0 when a single category matched.
#[derive(Debug, Clone)]
pub struct IntentResult {
    pub primary: Intent,
    pub confidence: f64,
    pub matches: BTreeMap<Intent, usize>,
}

/// Rule tables per category, in declaration order. The order matters: ties
/// on match count resolve to the earliest declared category, which keeps
/// the classifier deterministic.
const INTENT_PATTERNS: &[(Intent, &[&str])] = &[
    (
        Intent::BusquedaProducto,
        &[
            r"(?:busco|quiero|necesito|tienen|venden|hay)(?:.*)(?:auriculares|audífonos|altavoces|speakers|dispositivos)",
            r"(?:me interesan?|me gustan?)(?:.*)(?:productos|auriculares|altavoces)",
            r"(?:cuáles|que)(?:.*)(?:productos|modelos|opciones)(?:.*)(?:tienen|ofrecen)",
            r"(?:estoy buscando)(?:.*)",
            r"(?:muestrame|muéstrame|muestra|ver)(?:.*)(?:productos|catálogo|ofertas)",
        ],
    ),
    (
        Intent::InfoProducto,
        &[
            r"(?:cómo|como)(?:.*)\b(?:funciona|es)\b(?:.*)",
            r"(?:características|caracteristicas|specs|especificaciones)(?:.*)",
            r"(?:detalles|información|informacion)(?:.*)(?:sobre|de|del)(?:.*)",
            r"(?:me puedes contar|explícame|explicame)(?:.*)(?:sobre|acerca)",
            r"(?:color|tamaño|peso|dimensiones|material)",
        ],
    ),
    (
        Intent::PrecioProducto,
        &[
            r"(?:cuánto|cuanto)(?:.*)(?:cuesta|vale|es el precio|es el costo)",
            r"(?:precio|costo|valor)(?:.*)(?:de|del|de los|sobre)",
            r"(?:qué|que)(?:.*)(?:precio|costo)",
            r"(?:es caro|es barato|económico|economico)",
            r"(?:ofertas|descuentos|promociones)",
        ],
    ),
    (
        Intent::ComparacionProductos,
        &[
            r"(?:comparar|comparación|comparacion)(?:.*)",
            r"(?:diferencias|diferencia)(?:.*)(?:entre|con)",
            r"(?:qué|que|cual|cuál)(?:.*)(?:mejor|peor|recomendable)",
            r"(?:ventajas|desventajas)(?:.*)",
            r"\b(?:versus|vs|o)\b(?:.*)",
        ],
    ),
    (
        Intent::CompraCarrito,
        &[
            r"(?:comprar|adquirir|conseguir)(?:.*)",
            r"(?:añadir|anadir|agregar|poner)(?:.*)(?:carrito|cesta|carro)",
            r"(?:cómo|como)(?:.*)(?:compro|comprar|adquiero|puedo comprar)",
            r"(?:proceso de compra|checkout)",
            r"(?:pasarela de pago|pagar)",
        ],
    ),
    (
        Intent::EnvioEntrega,
        &[
            r"(?:envío|envio|enviar|envían|envian|mandan)(?:.*)",
            r"(?:entrega|recibir|recibo|llega)(?:.*)",
            r"(?:cuánto|cuanto)(?:.*)(?:tarda|demora|toma|tiempo)",
            r"(?:a domicilio|shipping|seguimiento|tracking)",
            r"(?:internacional|fuera del país|fuera del pais)",
        ],
    ),
    (
        Intent::SoporteProblema,
        &[
            r"(?:problema|issue|error|falla|no funciona)(?:.*)",
            r"(?:ayuda|soporte|asistencia)(?:.*)(?:con|sobre|para)",
            r"(?:garantía|garantia|servicio|reparación|reparacion)",
            r"(?:no puedo|tengo problemas|dificultad)",
            r"(?:se dañó|se daño|roto|descompuesto)",
        ],
    ),
    (
        Intent::General,
        &[
            r"(?:hola|hey|saludos|buenos días|buenas tardes|buenas noches)",
            r"(?:gracias|muchas gracias|te agradezco|agradecido)",
            r"(?:adiós|adios|chao|hasta luego|hasta pronto)",
            r"(?:cómo estás|como estas|qué tal|que tal)",
            r"(?:quién eres|quien eres|qué eres|que eres|tu nombre)",
        ],
    ),
];

/// Regex-based intent classifier. Patterns are compiled once at startup
/// and the table is read-only afterwards.
pub struct IntentClassifier {
    rules: Vec<(Intent, Vec<Regex>)>,
}

impl IntentClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        let mut rules = Vec::with_capacity(INTENT_PATTERNS.len());
        for (intent, patterns) in INTENT_PATTERNS {
            let compiled = patterns
                .iter()
                .map(|pattern| Regex::new(pattern))
                .collect::<Result<Vec<_>, _>>()?;
            rules.push((*intent, compiled));
        }

        Ok(Self { rules })
    }

    /// Always yields a result; text that matches nothing is "general" with
    /// full confidence. A rule matching several times still counts once.
    pub fn classify(&self, text: &str) -> IntentResult {
        let message = text.to_lowercase();
        let message = message.trim();

        let mut matches: BTreeMap<Intent, usize> = BTreeMap::new();
        for (intent, rules) in &self.rules {
            let count = rules.iter().filter(|rule| rule.is_match(message)).count();
            if count > 0 {
                matches.insert(*intent, count);
            }
        }

        if matches.is_empty() {
            let mut matches = BTreeMap::new();
            matches.insert(Intent::General, 1);
            return IntentResult {
                primary: Intent::General,
                confidence: 1.0,
                matches,
            };
        }

        let total: usize = matches.values().sum();

        // First category reaching the maximum, in declaration order.
        let mut primary = Intent::General;
        let mut best = 0usize;
        for (intent, _) in &self.rules {
            if let Some(&count) = matches.get(intent) {
                if count > best {
                    best = count;
                    primary = *intent;
                }
            }
        }

        IntentResult {
            primary,
            confidence: best as f64 / total as f64,
            matches,
        }
    }
}
