//! Reconocimiento de alimentos en imágenes: codificación base64, llamada al
//! servicio ML y enriquecimiento con nutrición y propiedades ayurvédicas.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use serde_json::Value;

use crate::{
    ayurveda::{ayurvedic_properties, AyurvedicProperties},
    ml_client::{MlClient, MlError, RecognitionRequest, RecognizedFood},
};

const FALLBACK_FORMAT: &str = "application/octet-stream";

/// Imagen recibida en el formulario.
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl UploadedImage {
    /// Tipo MIME declarado o, si falta, deducido de la extensión del fichero.
    pub fn format(&self) -> String {
        self.content_type
            .clone()
            .filter(|ct| !ct.is_empty())
            .or_else(|| {
                self.file_name
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first_raw())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| FALLBACK_FORMAT.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct EstimatedNutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedFood {
    #[serde(flatten)]
    pub food: RecognizedFood,
    pub nutrition: EstimatedNutrition,
    pub ayurvedic_properties: AyurvedicProperties,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionReport {
    pub recognized_foods: Vec<EnrichedFood>,
    pub confidence: Value,
    pub suggestions: Vec<String>,
}

/// Claves que añade el enriquecimiento; si el servicio ML ya las trae se descartan
/// para no duplicarlas al aplanar `food`.
const ENRICHED_KEYS: [&str; 2] = ["nutrition", "ayurvedicProperties"];

pub fn enrich(mut food: RecognizedFood) -> EnrichedFood {
    for key in ENRICHED_KEYS {
        food.extra.remove(key);
    }

    let nutrition = EstimatedNutrition {
        calories: food.estimated_calories.unwrap_or(0.0),
        protein: food.estimated_protein.unwrap_or(0.0),
        carbs: food.estimated_carbs.unwrap_or(0.0),
        fat: food.estimated_fat.unwrap_or(0.0),
    };
    let ayurvedic_properties = ayurvedic_properties(&food.name);

    EnrichedFood {
        food,
        nutrition,
        ayurvedic_properties,
    }
}

pub async fn recognize(ml: &MlClient, image: &UploadedImage) -> Result<RecognitionReport, MlError> {
    let request = RecognitionRequest {
        image: STANDARD.encode(&image.bytes),
        format: image.format(),
    };

    let result = ml.recognize_food(&request).await?;

    Ok(RecognitionReport {
        recognized_foods: result.foods.into_iter().map(enrich).collect(),
        confidence: result.confidence,
        suggestions: result.suggestions.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn image(content_type: Option<&str>, file_name: Option<&str>) -> UploadedImage {
        UploadedImage {
            bytes: b"hello".to_vec(),
            content_type: content_type.map(str::to_string),
            file_name: file_name.map(str::to_string),
        }
    }

    #[test]
    fn format_prefers_declared_type_then_extension() {
        assert_eq!(image(Some("image/png"), Some("plate.jpg")).format(), "image/png");
        assert_eq!(image(None, Some("plate.jpg")).format(), "image/jpeg");
        assert_eq!(image(None, None).format(), FALLBACK_FORMAT);
    }

    #[test]
    fn enrichment_defaults_to_zero_and_unknown() {
        let enriched = enrich(RecognizedFood {
            name: "Quinoa".into(),
            estimated_calories: Some(120.0),
            estimated_protein: None,
            estimated_carbs: None,
            estimated_fat: None,
            extra: Map::new(),
        });
        assert_eq!(enriched.nutrition.calories, 120.0);
        assert_eq!(enriched.nutrition.fat, 0.0);
        assert_eq!(enriched.ayurvedic_properties.energy, "neutral");

        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["name"], "Quinoa");
        assert_eq!(value["estimatedCalories"], 120.0);
        assert_eq!(value["ayurvedicProperties"]["taste"], "unknown");
    }

    #[test]
    fn upstream_keys_do_not_collide_with_enrichment() {
        let mut extra = Map::new();
        extra.insert("nutrition".into(), json!({"calories": 999}));
        extra.insert("ayurvedicProperties".into(), json!("sweet"));
        extra.insert("portion".into(), json!("1 cup"));

        let enriched = enrich(RecognizedFood {
            name: "Rice".into(),
            estimated_calories: Some(130.0),
            estimated_protein: None,
            estimated_carbs: None,
            estimated_fat: None,
            extra,
        });

        let text = serde_json::to_string(&enriched).unwrap();
        assert_eq!(text.matches("\"nutrition\"").count(), 1);
        assert_eq!(text.matches("\"ayurvedicProperties\"").count(), 1);

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["nutrition"]["calories"], 130.0);
        assert_eq!(value["ayurvedicProperties"]["energy"], "cooling");
        assert_eq!(value["portion"], "1 cup");
    }

    #[tokio::test]
    async fn image_is_sent_base64_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/recognize-food"))
            .and(body_json(json!({"image": "aGVsbG8=", "format": "image/jpeg"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "foods": [{"name": "Spinach", "estimatedProtein": 3.0}],
                "confidence": 0.88,
                "suggestions": ["Pair with lemon"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let report = recognize(&MlClient::new(&server.uri()), &image(Some("image/jpeg"), None))
            .await
            .unwrap();

        assert_eq!(report.recognized_foods.len(), 1);
        assert_eq!(report.recognized_foods[0].ayurvedic_properties.taste, "bitter");
        assert_eq!(report.recognized_foods[0].nutrition.protein, 3.0);
        assert_eq!(report.confidence, json!(0.88));
        assert_eq!(report.suggestions, vec!["Pair with lemon"]);
    }
}
