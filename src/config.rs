//! Carga y gestión de configuración de la aplicación (servidor + microservicio ML).

use std::env;
use anyhow::{anyhow, Result};
use url::Url;

pub const DEFAULT_ML_SERVICE_URL: &str = "http://localhost:8000";
/// Límite por defecto del formulario de reconocimiento de imágenes (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,
    /// URL base del microservicio ML, sin barra final.
    pub ml_service_url: String,
    /// Directorio con el frontend estático (si existe).
    pub static_dir: String,
    /// Tamaño máximo del cuerpo multipart en `/api/ml-predict/food-recognition`.
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

        let ml_service_url = env::var("ML_SERVICE_URL")
            .unwrap_or_else(|_| DEFAULT_ML_SERVICE_URL.to_string());
        let ml_service_url = normalize_service_url(&ml_service_url)?;

        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "frontend".to_string());

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => parse_upload_limit(&raw)?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            server_addr,
            ml_service_url,
            static_dir,
            max_upload_bytes,
        })
    }
}

/// Valida la URL del servicio ML y elimina la barra final para poder
/// concatenar rutas como `/predict`.
pub fn normalize_service_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| anyhow!("ML_SERVICE_URL inválida ({raw}): {e}"))?;

    match url.scheme() {
        "http" | "https" => Ok(url.as_str().trim_end_matches('/').to_string()),
        other => Err(anyhow!("Esquema no soportado en ML_SERVICE_URL: {other}")),
    }
}

fn parse_upload_limit(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(anyhow!("MAX_UPLOAD_BYTES debe ser mayor que 0")),
        Ok(bytes) => Ok(bytes),
        Err(e) => Err(anyhow!("MAX_UPLOAD_BYTES inválido ({raw}): {e}")),
    }
}
