//! Análisis de una comida a partir de nombres de alimentos.
//!
//! Flujo:
//!   1. Perfil: el recibido en la petición o, si no hay, el del `UserStore`.
//!   2. Suma de nutrientes con la base de datos estática.
//!   3. Consejos ayurvédicos según el dosha.
//!   4. Predicción ML; si falla se usa una predicción estática de respaldo.
//!   5. Recomendaciones = sugerencias ML seguidas de los consejos ayurvédicos.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    ayurveda::suggest_ayurvedic_modifications,
    ml_client::MlClient,
    models::{gender_code, MlPayload, MlPrediction, NutrientSummary, UserProfile},
    nutrient_db::calculate_nutrients,
    user_store::UserStore,
};

/// Los campos del perfil que intervienen en el análisis.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileSnapshot {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub dosha: Option<String>,
}

impl From<&UserProfile> for ProfileSnapshot {
    fn from(profile: &UserProfile) -> Self {
        Self {
            age: Some(profile.age),
            gender: Some(profile.gender.clone()),
            dosha: Some(profile.dosha.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAnalysis {
    pub nutrient_summary: NutrientSummary,
    pub dosha_advice: Vec<String>,
    pub ml_predictions: MlPrediction,
    pub recommendations: Vec<String>,
}

pub struct MealRequest<'a> {
    pub foods: &'a [String],
    pub portions: &'a [Option<f64>],
    pub user_id: &'a str,
    pub profile: Option<ProfileSnapshot>,
}

pub async fn analyze_meal(
    ml: &MlClient,
    users: &UserStore,
    request: MealRequest<'_>,
) -> Result<MealAnalysis> {
    let profile = match request.profile {
        Some(profile) => profile,
        None => users
            .get(request.user_id)
            .await
            .map(|user| ProfileSnapshot::from(&user))
            .ok_or_else(|| anyhow!("Usuario no encontrado: {}", request.user_id))?,
    };

    let nutrient_summary = calculate_nutrients(request.foods, request.portions);

    let dosha = profile.dosha.clone().unwrap_or_default();
    let dosha_advice = suggest_ayurvedic_modifications(&dosha, &nutrient_summary);

    let payload = MlPayload::from_summary(&nutrient_summary).with_profile(
        profile.age,
        Some(gender_code(profile.gender.as_deref().unwrap_or_default())),
        profile.dosha,
    );
    let ml_predictions = predict_or_fallback(ml, &payload).await;

    let recommendations = merge_recommendations(&ml_predictions, &dosha_advice);

    Ok(MealAnalysis {
        nutrient_summary,
        dosha_advice,
        ml_predictions,
        recommendations,
    })
}

/// Única ruta con respaldo estático cuando el servicio ML no está disponible.
async fn predict_or_fallback(ml: &MlClient, payload: &MlPayload) -> MlPrediction {
    match ml.predict(payload).await {
        Ok(prediction) => prediction,
        Err(e) => {
            warn!("Predicción ML no disponible, usando valores de respaldo: {}", e);
            MlPrediction::fallback()
        }
    }
}

fn merge_recommendations(prediction: &MlPrediction, advice: &[String]) -> Vec<String> {
    prediction
        .suggestions
        .iter()
        .chain(advice.iter())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn spinach() -> Vec<String> {
        vec!["spinach".to_string()]
    }

    #[tokio::test]
    async fn unreachable_ml_uses_fallback_and_ayurvedic_advice() {
        let ml = MlClient::new("http://127.0.0.1:1");
        let users = UserStore::seeded();
        let foods = spinach();

        let analysis = analyze_meal(
            &ml,
            &users,
            MealRequest {
                foods: &foods,
                portions: &[],
                user_id: "user-1",
                profile: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(analysis.nutrient_summary.iron, 2.7);
        assert_eq!(analysis.ml_predictions, MlPrediction::fallback());
        assert_eq!(
            analysis.recommendations[0],
            "ML service unavailable - using fallback recommendations"
        );
        // 1 sugerencia de respaldo + 5 VATA + hierro bajo + vitamina C baja
        assert_eq!(analysis.recommendations.len(), 8);
        assert_eq!(analysis.recommendations[1..], analysis.dosha_advice[..]);
    }

    #[tokio::test]
    async fn inline_profile_overrides_store_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(json!({"age": 52, "gender": 0, "dosha": "kapha"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "probabilities": {"iron_def": 0.2, "vitc_def": 0.7, "protein_def": 0.1},
                "suggestions": ["Add citrus"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ml = MlClient::new(&server.uri());
        let foods = spinach();
        let analysis = analyze_meal(
            &ml,
            &UserStore::default(),
            MealRequest {
                foods: &foods,
                portions: &[Some(200.0)],
                user_id: "anonymous",
                profile: Some(ProfileSnapshot {
                    age: Some(52),
                    gender: Some("female".into()),
                    dosha: Some("kapha".into()),
                }),
            },
        )
        .await
        .unwrap();

        assert_eq!(analysis.nutrient_summary.iron, 5.4);
        assert_eq!(analysis.recommendations[0], "Add citrus");
        assert_eq!(analysis.recommendations[1], "Favor light, dry, and warm foods");
    }

    #[tokio::test]
    async fn unknown_user_without_profile_fails() {
        let ml = MlClient::new("http://127.0.0.1:1");
        let foods = spinach();
        let result = analyze_meal(
            &ml,
            &UserStore::seeded(),
            MealRequest {
                foods: &foods,
                portions: &[],
                user_id: "user-404",
                profile: None,
            },
        )
        .await;
        assert!(result.is_err());
    }
}
