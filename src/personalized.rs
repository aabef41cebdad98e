//! Recomendaciones personalizadas: una predicción ML y, encima, reglas por
//! objetivos de salud, dosha y umbrales de probabilidad.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    ayurveda::Dosha,
    ml_client::MlClient,
    models::{gender_code, MlPayload, MlPrediction},
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalProfile {
    pub age: Option<u32>,
    pub gender: String,
    pub dosha: Option<String>,
    pub health_goals: Vec<String>,
    pub health_concerns: Vec<String>,
}

/// Los macronutrientes ausentes cuentan como 0.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentNutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub iron: Option<f64>,
    pub vitamin_c: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MealPreferences {
    pub cuisine_types: Vec<String>,
    pub meal_complexity: Option<String>,
    pub cooking_time: Option<u32>,
    pub budget: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub category: &'static str,
    pub priority: Priority,
    pub recommendation: &'static str,
    pub action: &'static str,
}

impl Recommendation {
    const fn new(
        category: &'static str,
        priority: Priority,
        recommendation: &'static str,
        action: &'static str,
    ) -> Self {
        Self {
            category,
            priority,
            recommendation,
            action,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealSuggestion {
    pub name: &'static str,
    pub calories: f64,
    pub protein: f64,
    pub cooking_time: u32,
    pub dosha_rating: &'static str,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct MealPlan {
    pub breakfast: Vec<MealSuggestion>,
    pub lunch: Vec<MealSuggestion>,
    pub dinner: Vec<MealSuggestion>,
    pub snacks: Vec<MealSuggestion>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupplementSuggestion {
    pub name: &'static str,
    pub dosage: &'static str,
    pub timing: &'static str,
    pub duration: &'static str,
    pub ayurvedic_alternative: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedReport {
    pub recommendations: Vec<Recommendation>,
    pub ml_insights: Option<MlPrediction>,
    pub personalized_meals: MealPlan,
    pub supplement_suggestions: Vec<SupplementSuggestion>,
}

pub fn personalized_recommendations(
    profile: &PersonalProfile,
    prediction: Option<&MlPrediction>,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if profile.health_goals.iter().any(|g| g == "Weight Loss") {
        recommendations.push(Recommendation::new(
            "Weight Management",
            Priority::High,
            "Create a moderate calorie deficit while maintaining protein intake",
            "Reduce daily calories by 300-500 while keeping protein at 1.2g per kg body weight",
        ));
    }

    if profile.health_goals.iter().any(|g| g == "Muscle Building") {
        recommendations.push(Recommendation::new(
            "Muscle Building",
            Priority::High,
            "Increase protein intake and ensure adequate calories",
            "Aim for 1.6-2.2g protein per kg body weight with slight calorie surplus",
        ));
    }

    if let Some(p) = prediction.map(|p| p.probabilities) {
        if p.iron_def > 0.5 {
            recommendations.push(Recommendation::new(
                "Nutrient Deficiency",
                Priority::High,
                "Address potential iron deficiency",
                "Include iron-rich foods with vitamin C sources for better absorption",
            ));
        }
        if p.vitc_def > 0.5 {
            recommendations.push(Recommendation::new(
                "Nutrient Deficiency",
                Priority::Medium,
                "Increase vitamin C intake",
                "Add citrus fruits, bell peppers, or amla to daily diet",
            ));
        }
    }

    recommendations.extend(dosha_recommendations(
        profile.dosha.as_deref().unwrap_or_default(),
        &profile.health_concerns,
    ));

    recommendations
}

fn dosha_recommendations(dosha: &str, health_concerns: &[String]) -> Vec<Recommendation> {
    match Dosha::parse(dosha) {
        Some(Dosha::Vata) => {
            let mut recs = vec![Recommendation::new(
                "Dosha Balance",
                Priority::Medium,
                "Focus on grounding and warming foods",
                "Include warm, cooked meals with healthy fats and regular meal timing",
            )];
            if health_concerns.iter().any(|c| c == "Anxiety" || c == "Insomnia") {
                recs.push(Recommendation::new(
                    "Mental Health",
                    Priority::High,
                    "Use calming foods to balance Vata",
                    "Include warm milk with nutmeg, dates, and calming herbal teas",
                ));
            }
            recs
        }
        Some(Dosha::Pitta) => vec![Recommendation::new(
            "Dosha Balance",
            Priority::Medium,
            "Emphasize cooling and calming foods",
            "Include sweet, bitter tastes and avoid excessive spicy or acidic foods",
        )],
        Some(Dosha::Kapha) => vec![Recommendation::new(
            "Dosha Balance",
            Priority::Medium,
            "Choose light, stimulating foods",
            "Include pungent, bitter tastes and reduce heavy, oily foods",
        )],
        None => Vec::new(),
    }
}

pub fn meal_suggestions(profile: &PersonalProfile) -> MealPlan {
    let mut plan = MealPlan::default();

    if profile.dosha.as_deref().and_then(Dosha::parse) == Some(Dosha::Vata) {
        plan.breakfast.push(MealSuggestion {
            name: "Warm Oatmeal with Nuts and Dates",
            calories: 350.0,
            protein: 12.0,
            cooking_time: 10,
            dosha_rating: "excellent",
        });
    }

    plan
}

pub fn supplement_suggestions(prediction: Option<&MlPrediction>) -> Vec<SupplementSuggestion> {
    let mut supplements = Vec::new();
    let Some(p) = prediction.map(|p| p.probabilities) else {
        return supplements;
    };

    if p.iron_def > 0.6 {
        supplements.push(SupplementSuggestion {
            name: "Iron Supplement",
            dosage: "18mg daily",
            timing: "With vitamin C source",
            duration: "3 months, then retest",
            ayurvedic_alternative: "Lauha Bhasma (Ayurvedic iron preparation)",
        });
    }

    if p.vitc_def > 0.5 {
        supplements.push(SupplementSuggestion {
            name: "Vitamin C",
            dosage: "500mg daily",
            timing: "With meals",
            duration: "Ongoing",
            ayurvedic_alternative: "Fresh Amla juice daily",
        });
    }

    supplements
}

pub async fn personalize(
    ml: &MlClient,
    profile: &PersonalProfile,
    nutrition: &CurrentNutrition,
    preferences: &MealPreferences,
) -> PersonalizedReport {
    debug!(
        "Preferencias: cocinas {:?}, complejidad {:?}, tiempo {:?}, presupuesto {:?}",
        preferences.cuisine_types,
        preferences.meal_complexity,
        preferences.cooking_time,
        preferences.budget
    );

    let payload = MlPayload {
        calories: nutrition.calories,
        protein: nutrition.protein,
        carbs: nutrition.carbs,
        fat: nutrition.fat,
        iron: nutrition.iron.unwrap_or(0.0),
        vitamin_c: nutrition.vitamin_c.unwrap_or(0.0),
        ..Default::default()
    }
    .with_profile(profile.age, Some(gender_code(&profile.gender)), profile.dosha.clone());

    let ml_insights = match ml.predict(&payload).await {
        Ok(prediction) => Some(prediction),
        Err(e) => {
            error!("Error del servicio ML en recomendaciones personalizadas: {}", e);
            None
        }
    };

    PersonalizedReport {
        recommendations: personalized_recommendations(profile, ml_insights.as_ref()),
        personalized_meals: meal_suggestions(profile),
        supplement_suggestions: supplement_suggestions(ml_insights.as_ref()),
        ml_insights,
    }
}
