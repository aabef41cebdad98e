//! Análisis semanal: promedios diarios, una predicción ML sobre ellos y
//! reglas fijas de consistencia y proteína.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::{
    ayurveda::Dosha,
    batch::NumericProfile,
    ml_client::MlClient,
    models::{MlPayload, MlPrediction},
};

/// Divisor fijo de los promedios. No depende de cuántos días lleguen.
pub const DAYS_PER_WEEK: f64 = 7.0;

const CALORIE_VARIATION_LIMIT: f64 = 500.0;
const MIN_DAILY_PROTEIN: f64 = 50.0;
const IRON_DEFICIENCY_ALERT: f64 = 0.6;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMeal {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub iron: Option<f64>,
    #[serde(default)]
    pub vitamin_c: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DayMeals {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub meals: Vec<WeeklyMeal>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAverages {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub iron: f64,
    pub vitamin_c: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Consistency,
    Protein,
    Deficiency,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub message: &'static str,
    pub recommendation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub weekly_averages: WeeklyAverages,
    pub ml_prediction: Option<MlPrediction>,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<&'static str>,
}

/// Suma todas las comidas y divide entre 7.
pub fn weekly_averages(week: &[DayMeals]) -> WeeklyAverages {
    let mut total = WeeklyAverages::default();
    for meal in week.iter().flat_map(|day| day.meals.iter()) {
        total.calories += meal.calories;
        total.protein += meal.protein;
        total.carbs += meal.carbs;
        total.fat += meal.fat;
        total.iron += meal.iron.unwrap_or(0.0);
        total.vitamin_c += meal.vitamin_c.unwrap_or(0.0);
    }

    WeeklyAverages {
        calories: total.calories / DAYS_PER_WEEK,
        protein: total.protein / DAYS_PER_WEEK,
        carbs: total.carbs / DAYS_PER_WEEK,
        fat: total.fat / DAYS_PER_WEEK,
        iron: total.iron / DAYS_PER_WEEK,
        vitamin_c: total.vitamin_c / DAYS_PER_WEEK,
    }
}

pub fn weekly_insights(
    week: &[DayMeals],
    averages: &WeeklyAverages,
    prediction: Option<&MlPrediction>,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    let daily_calories: Vec<f64> = week
        .iter()
        .map(|day| day.meals.iter().map(|m| m.calories).sum())
        .collect();
    let max = daily_calories.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = daily_calories.iter().copied().fold(f64::INFINITY, f64::min);

    if max - min > CALORIE_VARIATION_LIMIT {
        insights.push(Insight {
            kind: InsightKind::Consistency,
            message: "High calorie variation between days detected",
            recommendation: "Try to maintain more consistent daily calorie intake",
        });
    }

    if averages.protein < MIN_DAILY_PROTEIN {
        insights.push(Insight {
            kind: InsightKind::Protein,
            message: "Weekly protein intake is below recommended levels",
            recommendation: "Include more protein-rich foods like legumes, nuts, or lean meats",
        });
    }

    if prediction.is_some_and(|p| p.probabilities.iron_def > IRON_DEFICIENCY_ALERT) {
        insights.push(Insight {
            kind: InsightKind::Deficiency,
            message: "High probability of iron deficiency detected",
            recommendation: "Focus on iron-rich foods and vitamin C for better absorption",
        });
    }

    insights
}

pub fn weekly_recommendations(profile: &NumericProfile) -> Vec<&'static str> {
    let mut recommendations = match profile.dosha.as_deref().and_then(Dosha::parse) {
        Some(Dosha::Vata) => vec![
            "Plan regular meal times throughout the week",
            "Include warm, cooked foods in your weekly meal prep",
        ],
        Some(Dosha::Pitta) => vec![
            "Balance intense flavors throughout the week",
            "Include cooling foods during warmer days",
        ],
        Some(Dosha::Kapha) => vec![
            "Vary your meals to avoid monotony",
            "Include lighter meals and stimulating spices",
        ],
        None => Vec::new(),
    };

    if matches!(profile.activity_level.as_str(), "very" | "extra") {
        recommendations.push("Increase protein intake on workout days");
        recommendations.push("Ensure adequate carbohydrate replenishment post-exercise");
    }

    recommendations
}

pub async fn analyze_week(ml: &MlClient, week: &[DayMeals], profile: &NumericProfile) -> WeeklyReport {
    if week.len() != 7 {
        let days: Vec<&str> = week.iter().map(|d| d.day.as_str()).collect();
        warn!(
            "Se recibieron {} días ({}); los promedios se calculan igualmente sobre 7",
            week.len(),
            days.join(", ")
        );
    }

    let averages = weekly_averages(week);

    let payload = profile.payload_for(MlPayload {
        calories: averages.calories,
        protein: averages.protein,
        carbs: averages.carbs,
        fat: averages.fat,
        iron: averages.iron,
        vitamin_c: averages.vitamin_c,
        ..Default::default()
    });

    let ml_prediction = match ml.predict(&payload).await {
        Ok(prediction) => Some(prediction),
        Err(e) => {
            error!("Error del servicio ML en el análisis semanal: {}", e);
            None
        }
    };

    WeeklyReport {
        weekly_averages: averages,
        insights: weekly_insights(week, &averages, ml_prediction.as_ref()),
        recommendations: weekly_recommendations(profile),
        ml_prediction,
    }
}
