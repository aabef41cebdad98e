//! Predicción por lotes: una llamada independiente al servicio ML por comida,
//! todas en paralelo. Un fallo sólo marca su propia comida.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    ml_client::{MlClient, MlError},
    models::{MlPayload, MlPrediction},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMeal {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub iron: Option<f64>,
    #[serde(default)]
    pub vitamin_c: Option<f64>,
}

/// Perfil numérico: `gender` ya viene codificado (0 mujer, 1 hombre).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumericProfile {
    pub age: Option<u32>,
    pub gender: Option<u8>,
    pub dosha: Option<String>,
    pub activity_level: String,
}

impl NumericProfile {
    pub fn payload_for(&self, base: MlPayload) -> MlPayload {
        base.with_profile(self.age, self.gender, self.dosha.clone())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MealOutcome {
    Success { prediction: MlPrediction },
    Error { error: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealResult {
    pub meal_id: String,
    pub meal_name: String,
    #[serde(flatten)]
    pub outcome: MealOutcome,
}

/// Resumen de un lote: `successful + failed == total`.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} comidas analizadas: {} correctas, {} con error",
            self.total, self.successful, self.failed
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub results: Vec<MealResult>,
    pub summary: BatchSummary,
}

fn meal_payload(meal: &BatchMeal, profile: &NumericProfile) -> MlPayload {
    profile.payload_for(MlPayload {
        calories: meal.calories,
        protein: meal.protein,
        carbs: meal.carbs,
        fat: meal.fat,
        iron: meal.iron.unwrap_or(0.0),
        vitamin_c: meal.vitamin_c.unwrap_or(0.0),
        ..Default::default()
    })
}

async fn predict_meal(ml: &MlClient, meal: &BatchMeal, profile: &NumericProfile) -> MealResult {
    let outcome = match ml.predict(&meal_payload(meal, profile)).await {
        Ok(prediction) => MealOutcome::Success { prediction },
        Err(MlError::Upstream { status, .. }) => {
            warn!("Comida {}: el servicio ML respondió {}", meal.id, status);
            MealOutcome::Error {
                error: "ML service error".to_string(),
            }
        }
        Err(e) => {
            warn!("Comida {}: {}", meal.id, e);
            MealOutcome::Error {
                error: "Network error".to_string(),
            }
        }
    };

    MealResult {
        meal_id: meal.id.clone(),
        meal_name: meal.name.clone(),
        outcome,
    }
}

/// Lanza una predicción por comida y agrega los resultados en el orden de entrada.
pub async fn predict_batch(ml: &MlClient, meals: &[BatchMeal], profile: &NumericProfile) -> BatchResponse {
    let results = join_all(meals.iter().map(|meal| predict_meal(ml, meal, profile))).await;

    let successful = results
        .iter()
        .filter(|r| matches!(r.outcome, MealOutcome::Success { .. }))
        .count();
    let summary = BatchSummary {
        total: meals.len(),
        successful,
        failed: results.len() - successful,
    };
    info!("Lote completado. {}", summary);

    BatchResponse { results, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn meal(id: &str, calories: f64) -> BatchMeal {
        BatchMeal {
            id: id.to_string(),
            name: format!("Meal {id}"),
            calories,
            protein: 20.0,
            carbs: 40.0,
            fat: 10.0,
            iron: None,
            vitamin_c: Some(12.0),
        }
    }

    fn profile() -> NumericProfile {
        NumericProfile {
            age: Some(35),
            gender: Some(1),
            dosha: Some("PITTA".into()),
            activity_level: "moderate".into(),
        }
    }

    #[test]
    fn payload_defaults_missing_micronutrients_to_zero() {
        let payload = meal_payload(&meal("m1", 300.0), &profile());
        assert_eq!(payload.iron, 0.0);
        assert_eq!(payload.vitamin_c, 12.0);
        assert_eq!(payload.gender, Some(1));
        assert_eq!(payload.dosha.as_deref(), Some("PITTA"));
    }

    #[tokio::test]
    async fn failures_are_tagged_per_meal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(json!({"calories": 900.0})))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "probabilities": {"iron_def": 0.1, "vitc_def": 0.1, "protein_def": 0.1},
                "suggestions": []
            })))
            .mount(&server)
            .await;

        let ml = MlClient::new(&server.uri());
        let meals = vec![meal("a", 300.0), meal("b", 900.0), meal("c", 450.0)];
        let response = predict_batch(&ml, &meals, &profile()).await;

        assert_eq!(response.summary, BatchSummary { total: 3, successful: 2, failed: 1 });
        assert_eq!(response.results[1].meal_id, "b");
        assert_eq!(
            response.results[1].outcome,
            MealOutcome::Error { error: "ML service error".into() }
        );
    }

    #[tokio::test]
    async fn network_failures_count_as_failed() {
        let ml = MlClient::new("http://127.0.0.1:1");
        let meals = vec![meal("a", 300.0), meal("b", 500.0)];
        let response = predict_batch(&ml, &meals, &profile()).await;

        let summary = response.summary;
        assert_eq!(summary.total, meals.len());
        assert_eq!(summary.successful + summary.failed, summary.total);
        assert_eq!(summary.failed, 2);

        let first = serde_json::to_value(&response.results[0]).unwrap();
        assert_eq!(
            first,
            json!({"mealId": "a", "mealName": "Meal a", "status": "error", "error": "Network error"})
        );
    }

    #[tokio::test]
    async fn meals_are_predicted_concurrently() {
        let delay = Duration::from_millis(300);
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "probabilities": {"iron_def": 0.1, "vitc_def": 0.1, "protein_def": 0.1},
                        "suggestions": []
                    }))
                    .set_delay(delay),
            )
            .expect(3)
            .mount(&server)
            .await;

        let ml = MlClient::new(&server.uri());
        let meals = vec![meal("a", 300.0), meal("b", 400.0), meal("c", 500.0)];

        let started = Instant::now();
        let response = predict_batch(&ml, &meals, &profile()).await;
        let elapsed = started.elapsed();

        assert_eq!(response.summary.successful, 3);
        // En serie serían al menos 900 ms.
        assert!(elapsed < delay * 2, "el lote tardó {elapsed:?}");
    }
}
