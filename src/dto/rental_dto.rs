//! DTOs de Rental
//!
//! Los campos obligatorios del body llegan como Option para poder devolver
//! un 400 con mensaje claro en vez del rechazo genérico del extractor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::rental::{Rental, RentalStatus};
use crate::models::vehicle::VehicleCategory;

// Request de búsqueda de disponibilidad
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// Query params de la búsqueda: paginación, orden y categoría
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    // Nombres de orden heredados del cliente: minDist, highRating, priceDesc
    pub query: Option<String>,
    pub category: Option<VehicleCategory>,
}

/// Criterio de orden de la búsqueda
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSort {
    PriceAsc,
    DistanceAsc,
    RatingDesc,
    PriceDesc,
}

impl SearchSort {
    /// Precio ascendente salvo que el cliente pida otro orden
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("minDist") => SearchSort::DistanceAsc,
            Some("highRating") => SearchSort::RatingDesc,
            Some("priceDesc") => SearchSort::PriceDesc,
            _ => SearchSort::PriceAsc,
        }
    }
}

// Un vehículo disponible con su distancia al punto buscado
#[derive(Debug, Serialize)]
pub struct AvailableVehicleResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: VehicleCategory,
    pub company: String,
    pub model: String,
    pub year: i32,
    pub price_per_hour: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    pub rating_average: f64,
    pub rating_count: i32,
    pub distance_m: f64,
}

// Response paginada de la búsqueda
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub vehicles: Vec<AvailableVehicleResponse>,
    pub total: i64,
    pub page: u32,
    pub total_pages: u32,
}

// Request para solicitar un alquiler
#[derive(Debug, Deserialize)]
pub struct RentRequest {
    pub vehicle_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

// Request para puntuar un alquiler
#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rent_id: Option<Uuid>,
    pub rating: Option<i64>,
}

// Filtro de estados para /requests: lista separada por comas
#[derive(Debug, Deserialize)]
pub struct StatusFilterQuery {
    pub status: Option<String>,
}

// Response de alquiler
#[derive(Debug, Serialize)]
pub struct RentalResponse {
    pub id: Uuid,
    pub renter_id: Uuid,
    pub lender_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: RentalStatus,
    pub has_rated: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Rental> for RentalResponse {
    fn from(r: Rental) -> Self {
        Self {
            id: r.id,
            renter_id: r.renter_id,
            lender_id: r.lender_id,
            vehicle_id: r.vehicle_id,
            start_time: r.start_time,
            end_time: r.end_time,
            status: r.status,
            has_rated: r.has_rated,
            created_at: r.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parsing_defaults_to_price_asc() {
        assert_eq!(SearchSort::parse(None), SearchSort::PriceAsc);
        assert_eq!(SearchSort::parse(Some("unknown")), SearchSort::PriceAsc);
        assert_eq!(SearchSort::parse(Some("minDist")), SearchSort::DistanceAsc);
        assert_eq!(SearchSort::parse(Some("highRating")), SearchSort::RatingDesc);
        assert_eq!(SearchSort::parse(Some("priceDesc")), SearchSort::PriceDesc);
    }
}
