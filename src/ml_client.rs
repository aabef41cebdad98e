//! Cliente HTTP del microservicio ML (predicción de deficiencias y
//! reconocimiento de alimentos).

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    config::AppConfig,
    models::{MlPayload, MlPrediction},
};

#[derive(Error, Debug)]
pub enum MlError {
    /// Fallo de red: conexión rechazada, DNS, cuerpo truncado...
    #[error("Error de red hacia el servicio ML: {0}")]
    Network(#[source] reqwest::Error),

    #[error("El servicio ML respondió {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Respuesta del servicio ML no válida: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Cuerpo de `POST /recognize-food`.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionRequest {
    /// Imagen codificada en base64.
    pub image: String,
    /// Tipo MIME de la imagen.
    pub format: String,
}

/// Alimento detectado por el servicio. Se conservan todos los campos recibidos.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedFood {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_fat: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionResult {
    pub foods: Vec<RecognizedFood>,
    #[serde(default)]
    pub confidence: Value,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

/// Cliente del servicio ML. Clonarlo es barato: `reqwest::Client` comparte el pool.
#[derive(Debug, Clone)]
pub struct MlClient {
    http: Client,
    base_url: String,
}

impl MlClient {
    /// Construye el cliente a partir de la configuración.
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(&cfg.ml_service_url)
    }

    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /predict` con un registro plano de nutrientes y datos demográficos.
    pub async fn predict(&self, payload: &MlPayload) -> Result<MlPrediction, MlError> {
        self.post_json("/predict", payload).await
    }

    /// `POST /recognize-food` con la imagen en base64.
    pub async fn recognize_food(&self, request: &RecognitionRequest) -> Result<RecognitionResult, MlError> {
        self.post_json("/recognize-food", request).await
    }

    /// `GET /health` del servicio ML; se devuelve el JSON tal cual.
    pub async fn health(&self) -> Result<Value, MlError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(MlError::Network)?;

        Self::decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, MlError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(MlError::Network)?;

        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, MlError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::Upstream { status, body });
        }

        response.json::<T>().await.map_err(MlError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> MlPayload {
        MlPayload {
            calories: 420.0,
            protein: 18.0,
            carbs: 55.0,
            fat: 12.0,
            iron: 2.0,
            vitamin_c: 10.0,
            age: Some(28),
            gender: Some(0),
            dosha: Some("PITTA".into()),
        }
    }

    #[tokio::test]
    async fn predict_sends_flat_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_json(json!({
                "calories": 420.0, "protein": 18.0, "carbs": 55.0, "fat": 12.0,
                "iron": 2.0, "vitaminC": 10.0, "age": 28, "gender": 0, "dosha": "PITTA"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "probabilities": {"iron_def": 0.81, "vitc_def": 0.4, "protein_def": 0.05},
                "suggestions": ["Eat more lentils"],
                "risk_assessment": {"iron_def": "high"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = MlClient::new(&server.uri());
        let prediction = client.predict(&payload()).await.unwrap();
        assert_eq!(prediction.probabilities.iron_def, 0.81);
        assert_eq!(prediction.suggestions, vec!["Eat more lentils"]);
        assert_eq!(
            prediction.risk_assessment.unwrap().get("iron_def").map(String::as_str),
            Some("high")
        );
    }

    #[tokio::test]
    async fn non_success_status_keeps_upstream_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Model not loaded"))
            .mount(&server)
            .await;

        let err = MlClient::new(&server.uri()).predict(&payload()).await.unwrap_err();
        match err {
            MlError::Upstream { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "Model not loaded");
            }
            other => panic!("error inesperado: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        let err = MlClient::new("http://127.0.0.1:1").predict(&payload()).await.unwrap_err();
        assert!(matches!(err, MlError::Network(_)));
    }

    #[tokio::test]
    async fn recognized_foods_keep_unknown_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/recognize-food"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "foods": [{"name": "rice", "estimatedCalories": 130.0, "boundingBox": [1, 2, 3, 4]}],
                "confidence": 0.92
            })))
            .mount(&server)
            .await;

        let result = MlClient::new(&server.uri())
            .recognize_food(&RecognitionRequest {
                image: "aGVsbG8=".into(),
                format: "image/png".into(),
            })
            .await
            .unwrap();

        let food = &result.foods[0];
        assert_eq!(food.estimated_calories, Some(130.0));
        assert_eq!(food.extra.get("boundingBox"), Some(&json!([1, 2, 3, 4])));
        assert!(result.suggestions.is_none());
    }
}
