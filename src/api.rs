use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Json, Multipart,
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::{
    analysis::{self, MealAnalysis, MealRequest, ProfileSnapshot},
    app_state::AppState,
    ayurveda::{dosha_food_recommendations, seasonal_recommendations, DoshaFoodGuide},
    batch::{self, BatchMeal, BatchResponse, NumericProfile},
    error::AppError,
    ml_client::MlError,
    models::{FoodNutrient, MlPayload, MlPrediction, UserProfile, UserProfileUpdate},
    nutrient_db,
    personalized::{self, CurrentNutrition, MealPreferences, PersonalProfile, PersonalizedReport},
    recognition::{self, RecognitionReport, UploadedImage},
    weekly::{self, DayMeals, WeeklyReport},
};

// --- Payloads de la API ---
// Los campos obligatorios son `Option` para responder 400 con un mensaje claro
// en lugar del 422 por defecto de axum.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    meals: Option<Vec<BatchMeal>>,
    user_profile: Option<NumericProfile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPayload {
    weekly_meals: Option<Vec<DayMeals>>,
    user_profile: Option<NumericProfile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedPayload {
    user_profile: Option<PersonalProfile>,
    current_nutrition: Option<CurrentNutrition>,
    #[serde(default)]
    preferences: MealPreferences,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePayload {
    foods: Option<Vec<String>>,
    user_id: Option<String>,
    user_profile: Option<ProfileSnapshot>,
    #[serde(default)]
    portions: Vec<Option<f64>>,
}

#[derive(Deserialize)]
pub struct FoodSearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Deserialize)]
pub struct SeasonalParams {
    #[serde(default)]
    season: String,
    #[serde(default)]
    dosha: String,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(app_state.config.max_upload_bytes);

    Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/ml-predict", post(predict_handler))
        .route("/api/ml-predict/batch", post(batch_handler))
        .route("/api/ml-predict/weekly-analysis", post(weekly_handler))
        .route(
            "/api/ml-predict/personalized-recommendations",
            post(personalized_handler),
        )
        .route(
            "/api/ml-predict/food-recognition",
            post(food_recognition_handler).layer(upload_limit),
        )
        .route("/api/foods", get(search_foods_handler))
        .route("/api/foods/:name", get(food_handler))
        .route("/api/ayurveda/seasonal", get(seasonal_handler))
        .route("/api/ayurveda/:dosha/foods", get(dosha_foods_handler))
        .route("/api/users", post(create_user_handler))
        .route("/api/users/:id", get(get_user_handler).put(update_user_handler))
        .route("/api/health", get(health_handler))
        .with_state(app_state)
}

// --- Handlers de análisis ---

#[axum::debug_handler]
async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzePayload>, JsonRejection>,
) -> Result<Json<MealAnalysis>, AppError> {
    let Json(payload) = payload?;

    let (Some(foods), Some(user_id)) = (payload.foods, payload.user_id.filter(|id| !id.is_empty()))
    else {
        return Err(AppError::missing("Missing required fields: foods, userId"));
    };

    let request = MealRequest {
        foods: &foods,
        portions: &payload.portions,
        user_id: &user_id,
        profile: payload.user_profile,
    };

    analysis::analyze_meal(&state.ml_client, &state.users, request)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Error en el análisis de la comida: {}", e);
            AppError::internal("Failed to analyze meal")
        })
}

#[axum::debug_handler]
async fn predict_handler(
    State(state): State<AppState>,
    payload: Result<Json<MlPayload>, JsonRejection>,
) -> Result<Json<MlPrediction>, AppError> {
    let Json(payload) = payload?;

    match state.ml_client.predict(&payload).await {
        Ok(prediction) => Ok(Json(prediction)),
        Err(MlError::Upstream { status, body }) => {
            error!("El servicio ML respondió {}: {}", status, body);
            Err(AppError::Upstream {
                message: "ML service error".to_string(),
                detail: body,
            })
        }
        Err(e) => {
            error!("Error en la predicción ML: {}", e);
            Err(AppError::internal("Failed to get ML predictions"))
        }
    }
}

#[axum::debug_handler]
async fn batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchPayload>, JsonRejection>,
) -> Result<Json<BatchResponse>, AppError> {
    let Json(payload) = payload?;

    let meals = payload.meals.unwrap_or_default();
    if meals.is_empty() {
        return Err(AppError::missing("No meals provided for analysis"));
    }
    let profile = payload
        .user_profile
        .ok_or_else(|| AppError::missing("Missing required field: userProfile"))?;

    info!("Predicción por lotes de {} comidas", meals.len());
    Ok(Json(batch::predict_batch(&state.ml_client, &meals, &profile).await))
}

#[axum::debug_handler]
async fn weekly_handler(
    State(state): State<AppState>,
    payload: Result<Json<WeeklyPayload>, JsonRejection>,
) -> Result<Json<WeeklyReport>, AppError> {
    let Json(payload) = payload?;

    let week = payload.weekly_meals.unwrap_or_default();
    if week.is_empty() {
        return Err(AppError::missing("No weekly meal data provided"));
    }
    let profile = payload
        .user_profile
        .ok_or_else(|| AppError::missing("Missing required field: userProfile"))?;

    Ok(Json(weekly::analyze_week(&state.ml_client, &week, &profile).await))
}

#[axum::debug_handler]
async fn personalized_handler(
    State(state): State<AppState>,
    payload: Result<Json<PersonalizedPayload>, JsonRejection>,
) -> Result<Json<PersonalizedReport>, AppError> {
    let Json(payload) = payload?;

    let (Some(profile), Some(nutrition)) = (payload.user_profile, payload.current_nutrition) else {
        return Err(AppError::missing(
            "Missing required fields: userProfile, currentNutrition",
        ));
    };

    let report =
        personalized::personalize(&state.ml_client, &profile, &nutrition, &payload.preferences).await;
    Ok(Json(report))
}

#[axum::debug_handler]
async fn food_recognition_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecognitionReport>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::MalformedPayload(e.body_text()))?;

    let image = read_image_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::missing("No image provided"))?;

    match recognition::recognize(&state.ml_client, &image).await {
        Ok(report) => Ok(Json(report)),
        Err(MlError::Upstream { status, body }) => {
            error!("Reconocimiento fallido ({}): {}", status, body);
            Err(AppError::Upstream {
                message: "Food recognition failed".to_string(),
                detail: body,
            })
        }
        Err(e) => {
            error!("Error en el reconocimiento de alimentos: {}", e);
            Err(AppError::internal("Failed to recognize food"))
        }
    }
}

/// Busca el campo `image` del formulario; el resto se descarta.
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<UploadedImage>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::MalformedPayload(e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::MalformedPayload(e.body_text()))?;

        return Ok(Some(UploadedImage {
            bytes: bytes.to_vec(),
            content_type,
            file_name,
        }));
    }

    Ok(None)
}

// --- Tablas estáticas ---

#[axum::debug_handler]
async fn search_foods_handler(Query(params): Query<FoodSearchParams>) -> Json<Vec<&'static FoodNutrient>> {
    Json(nutrient_db::search_foods(&params.q))
}

#[axum::debug_handler]
async fn food_handler(Path(name): Path<String>) -> Result<Json<&'static FoodNutrient>, AppError> {
    nutrient_db::get_food_nutrients(&name)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Food not found: {name}")))
}

#[axum::debug_handler]
async fn dosha_foods_handler(Path(dosha): Path<String>) -> Json<DoshaFoodGuide> {
    Json(dosha_food_recommendations(&dosha))
}

#[axum::debug_handler]
async fn seasonal_handler(Query(params): Query<SeasonalParams>) -> Json<Value> {
    let advice = seasonal_recommendations(&params.season, &params.dosha);
    Json(json!({ "season": params.season, "dosha": params.dosha, "advice": advice }))
}

// --- Usuarios ---

#[axum::debug_handler]
async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    state
        .users
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[axum::debug_handler]
async fn update_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UserProfileUpdate>, JsonRejection>,
) -> Result<Json<UserProfile>, AppError> {
    let Json(update) = payload?;
    state
        .users
        .update(&id, update)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[axum::debug_handler]
async fn create_user_handler(
    State(state): State<AppState>,
    payload: Result<Json<UserProfile>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let Json(profile) = payload?;
    let created = state.users.create(profile).await;
    Ok((StatusCode::CREATED, Json(created)))
}

// --- Salud ---

#[axum::debug_handler]
async fn health_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    match state.ml_client.health().await {
        Ok(ml_status) => Ok(Json(json!({
            "status": "ok",
            "mlService": ml_status,
            "timestamp": Utc::now().to_rfc3339(),
        }))),
        Err(e) => {
            error!("Health check del servicio ML en {} fallido: {}", state.ml_client.base_url(), e);
            Err(AppError::Upstream {
                message: "ML service unreachable".to_string(),
                detail: e.to_string(),
            })
        }
    }
}
