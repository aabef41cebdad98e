//! Modelos de dominio (perfiles de usuario, nutrientes y predicciones del servicio ML).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Perfil de usuario tal y como lo guarda el `UserStore`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub height: f64,
    pub weight: f64,
    pub activity_level: String,
    pub dosha: String,
    pub health_goals: Vec<String>,
    pub health_concerns: Vec<String>,
    pub dietary_restrictions: Vec<String>,
}

/// Actualización parcial de un perfil: sólo se aplican los campos presentes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub activity_level: Option<String>,
    pub dosha: Option<String>,
    pub health_goals: Option<Vec<String>>,
    pub health_concerns: Option<Vec<String>>,
    pub dietary_restrictions: Option<Vec<String>>,
}

impl UserProfile {
    pub fn apply(&mut self, update: UserProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(level) = update.activity_level {
            self.activity_level = level;
        }
        if let Some(dosha) = update.dosha {
            self.dosha = dosha;
        }
        if let Some(goals) = update.health_goals {
            self.health_goals = goals;
        }
        if let Some(concerns) = update.health_concerns {
            self.health_concerns = concerns;
        }
        if let Some(restrictions) = update.dietary_restrictions {
            self.dietary_restrictions = restrictions;
        }
    }
}

/// Codifica el género textual como lo espera el modelo: 1 hombre, 0 resto.
pub fn gender_code(gender: &str) -> u8 {
    if gender == "male" {
        1
    } else {
        0
    }
}

/// Totales de nutrientes acumulados por suma simple.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutrientSummary {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub iron: f64,
    pub vitamin_c: f64,
    pub calcium: f64,
    pub magnesium: f64,
}

/// Registro plano que se envía a `POST /predict`.
///
/// Los campos demográficos ausentes no se serializan, de modo que el
/// servicio ML aplica sus propios valores por defecto.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MlPayload {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub iron: f64,
    #[serde(default)]
    pub vitamin_c: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosha: Option<String>,
}

impl MlPayload {
    pub fn from_summary(summary: &NutrientSummary) -> Self {
        Self {
            calories: summary.calories,
            protein: summary.protein,
            carbs: summary.carbs,
            fat: summary.fat,
            iron: summary.iron,
            vitamin_c: summary.vitamin_c,
            ..Default::default()
        }
    }

    pub fn with_profile(mut self, age: Option<u32>, gender: Option<u8>, dosha: Option<String>) -> Self {
        self.age = age;
        self.gender = gender;
        self.dosha = dosha;
        self
    }
}

/// Probabilidades de deficiencia (0–1) devueltas por el modelo.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct DeficiencyProbabilities {
    #[serde(default)]
    pub iron_def: f64,
    #[serde(default)]
    pub vitc_def: f64,
    #[serde(default)]
    pub protein_def: f64,
}

/// Respuesta de `POST /predict`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MlPrediction {
    pub probabilities: DeficiencyProbabilities,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_scores: Option<HashMap<String, serde_json::Value>>,
}

impl MlPrediction {
    /// Predicción estática usada cuando el servicio ML no responde.
    pub fn fallback() -> Self {
        Self {
            probabilities: DeficiencyProbabilities {
                iron_def: 0.3,
                vitc_def: 0.2,
                protein_def: 0.1,
            },
            suggestions: vec![
                "ML service unavailable - using fallback recommendations".to_string(),
            ],
            risk_assessment: None,
            confidence_scores: None,
        }
    }
}

/// Perfil nutricional estático por 100 g.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodNutrient {
    pub name: &'static str,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub iron: f64,
    pub vitamin_c: f64,
    pub calcium: f64,
    pub magnesium: f64,
}
