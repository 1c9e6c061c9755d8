//! Utilidades de validación
//!
//! Funciones helper para validación de datos y conversión de tipos.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::ValidationError;

use crate::utils::errors::AppError;

/// Validar y convertir string a UUID
pub fn validate_uuid(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.add_param("value".into(), &value.to_string());
        error
    })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar una ventana de tiempo de alquiler: semiabierta [start, end),
/// requiere start < end
pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::BadRequest(
            "Start time must be before end time".to_string(),
        ));
    }
    Ok(())
}

/// Validar coordenadas geográficas
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::BadRequest(format!(
            "Invalid coordinates: ({}, {})",
            latitude, longitude
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_window() {
        let t1 = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

        assert!(validate_window(t1, t2).is_ok());
        assert!(validate_window(t2, t1).is_err());
        // Ventana vacía no es válida
        assert!(validate_window(t1, t1).is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(48.8566, 2.3522).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("not-a-uuid").is_err());
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
    }
}
