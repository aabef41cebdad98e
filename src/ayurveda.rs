//! Tablas de reglas ayurvédicas: consejos por dosha, guías de alimentos,
//! recomendaciones estacionales y propiedades de alimentos reconocidos.

use serde::Serialize;

use crate::models::NutrientSummary;

/// Constitución ayurvédica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dosha {
    Vata,
    Pitta,
    Kapha,
}

impl Dosha {
    /// Interpreta el texto tras pasarlo a mayúsculas; `None` si no es un dosha conocido.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "VATA" => Some(Self::Vata),
            "PITTA" => Some(Self::Pitta),
            "KAPHA" => Some(Self::Kapha),
            _ => None,
        }
    }
}

/// Consejos ayurvédicos según el dosha y los nutrientes de la comida.
pub fn suggest_ayurvedic_modifications(dosha: &str, nutrients: &NutrientSummary) -> Vec<String> {
    let base: &[&str] = match Dosha::parse(dosha) {
        Some(Dosha::Vata) => &[
            "Favor warm, cooked foods over raw foods",
            "Add ghee and warming spices like ginger and cinnamon",
            "Eat regular meals at consistent times",
            "Include sweet, sour, and salty tastes",
            "Avoid excessive cold or dry foods",
        ],
        Some(Dosha::Pitta) => &[
            "Favor cooling foods like cucumber and mint",
            "Reduce spicy, oily, and acidic foods",
            "Include sweet, bitter, and astringent tastes",
            "Eat moderate portions at regular times",
            "Avoid excessive heat-generating foods",
        ],
        Some(Dosha::Kapha) => &[
            "Favor light, dry, and warm foods",
            "Include pungent, bitter, and astringent tastes",
            "Reduce heavy, oily, and sweet foods",
            "Eat smaller portions and avoid overeating",
            "Include stimulating spices like black pepper and turmeric",
        ],
        None => &["Follow a balanced approach suitable for your constitution"],
    };

    let mut suggestions: Vec<String> = base.iter().map(|s| s.to_string()).collect();

    if nutrients.iron < 10.0 {
        suggestions.push("Include iron-rich foods like sesame seeds and dark leafy greens".to_string());
    }
    if nutrients.vitamin_c < 30.0 {
        suggestions.push("Add amla (Indian gooseberry) for natural vitamin C".to_string());
    }

    suggestions
}

/// Alimentos a favorecer, a evitar y especias recomendadas.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DoshaFoodGuide {
    pub favor: Vec<&'static str>,
    pub avoid: Vec<&'static str>,
    pub spices: Vec<&'static str>,
}

/// Guía de alimentos por dosha; un dosha desconocido recibe la tabla VATA.
pub fn dosha_food_recommendations(dosha: &str) -> DoshaFoodGuide {
    match Dosha::parse(dosha).unwrap_or(Dosha::Vata) {
        Dosha::Vata => DoshaFoodGuide {
            favor: vec!["Warm cooked grains", "Root vegetables", "Nuts and seeds", "Ghee", "Warm milk"],
            avoid: vec!["Raw vegetables", "Cold foods", "Dry foods", "Excessive beans", "Caffeine"],
            spices: vec!["Ginger", "Cinnamon", "Cardamom", "Fennel", "Cumin"],
        },
        Dosha::Pitta => DoshaFoodGuide {
            favor: vec!["Sweet fruits", "Leafy greens", "Coconut", "Cooling herbs", "Basmati rice"],
            avoid: vec!["Spicy foods", "Sour foods", "Tomatoes", "Excessive salt", "Red meat"],
            spices: vec!["Coriander", "Fennel", "Mint", "Dill", "Turmeric (small amounts)"],
        },
        Dosha::Kapha => DoshaFoodGuide {
            favor: vec!["Light fruits", "Leafy greens", "Legumes", "Quinoa", "Herbal teas"],
            avoid: vec!["Heavy foods", "Dairy", "Sweet foods", "Oily foods", "Cold foods"],
            spices: vec!["Black pepper", "Ginger", "Turmeric", "Mustard seeds", "Chili"],
        },
    }
}

struct SeasonalAdvice {
    general: &'static str,
    vata: &'static str,
    pitta: &'static str,
    kapha: &'static str,
}

fn seasonal_table(season: &str) -> Option<SeasonalAdvice> {
    let advice = match season {
        "spring" => SeasonalAdvice {
            general: "Light, detoxifying foods to cleanse winter accumulation",
            vata: "Gentle detox with warm, light foods",
            pitta: "Bitter greens and cooling foods",
            kapha: "Spicy, light foods to reduce excess kapha",
        },
        "summer" => SeasonalAdvice {
            general: "Cool, hydrating foods to balance heat",
            vata: "Sweet, cooling foods but not too cold",
            pitta: "Very cooling foods, avoid heating spices",
            kapha: "Light, cooling foods with some warming spices",
        },
        "fall" => SeasonalAdvice {
            general: "Warm, grounding foods to prepare for winter",
            vata: "Warm, oily, grounding foods",
            pitta: "Sweet, grounding foods, reduce heating foods",
            kapha: "Warm, light foods with stimulating spices",
        },
        "winter" => SeasonalAdvice {
            general: "Nourishing, warming foods for strength",
            vata: "Heavy, warm, oily foods",
            pitta: "Warm but not overly heating foods",
            kapha: "Warm, light, spicy foods",
        },
        _ => return None,
    };
    Some(advice)
}

/// Consejo estacional: primero el específico del dosha, luego el general de
/// la estación y por último un mensaje genérico.
pub fn seasonal_recommendations(season: &str, dosha: &str) -> &'static str {
    let Some(advice) = seasonal_table(&season.to_lowercase()) else {
        return "Follow seasonal eating principles";
    };

    match Dosha::parse(dosha) {
        Some(Dosha::Vata) => advice.vata,
        Some(Dosha::Pitta) => advice.pitta,
        Some(Dosha::Kapha) => advice.kapha,
        None => advice.general,
    }
}

/// Sabor, energía y efecto post-digestivo de un alimento reconocido.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AyurvedicProperties {
    pub taste: &'static str,
    pub energy: &'static str,
    pub effect: &'static str,
}

pub fn ayurvedic_properties(food_name: &str) -> AyurvedicProperties {
    let (taste, energy, effect) = match food_name.to_lowercase().as_str() {
        "rice" => ("sweet", "cooling", "sweet"),
        "spinach" => ("bitter", "cooling", "pungent"),
        "chicken" => ("sweet", "heating", "sweet"),
        _ => ("unknown", "neutral", "unknown"),
    };
    AyurvedicProperties { taste, energy, effect }
}
