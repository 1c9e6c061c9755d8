//! Controller de alquileres (booking workflow)
//!
//! Orquesta las operaciones del renter (búsqueda, solicitud, rating) y del
//! lender (listar solicitudes, aprobar, rechazar) componiendo el directory
//! de vehículos y el ledger de alquileres.

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::api::ApiResponse;
use crate::dto::rental_dto::{
    AvailabilityQuery, AvailabilityRequest, AvailabilityResponse, AvailableVehicleResponse,
    RatingRequest, RentRequest, RentalResponse, SearchSort,
};
use crate::models::rental::RentalStatus;
use crate::models::vehicle::RatingAggregate;
use crate::repositories::rental_repository::RentalRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::AppError;
use crate::utils::validation::{validate_coordinates, validate_window};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

pub struct RentalController {
    rentals: RentalRepository,
    vehicles: VehicleRepository,
}

impl RentalController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            rentals: RentalRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    /// Búsqueda de disponibilidad: vehículos cerca del punto sin alquiler
    /// pending/approved que solape la ventana pedida
    pub async fn find_available(
        &self,
        request: AvailabilityRequest,
        query: AvailabilityQuery,
        radius_m: f64,
    ) -> Result<AvailabilityResponse, AppError> {
        let (start, end, latitude, longitude) = match (
            request.start_time,
            request.end_time,
            request.latitude,
            request.longitude,
        ) {
            (Some(s), Some(e), Some(lat), Some(lng)) => (s, e, lat, lng),
            _ => {
                return Err(AppError::BadRequest(
                    "Start time, end time, and location are required".to_string(),
                ))
            }
        };

        validate_window(start, end)?;
        validate_coordinates(latitude, longitude)?;

        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = (page as i64 - 1) * limit as i64;
        let sort = SearchSort::parse(query.query.as_deref());

        let rows = self
            .vehicles
            .find_available(
                latitude,
                longitude,
                radius_m,
                start,
                end,
                query.category,
                sort,
                limit as i64,
                offset,
            )
            .await?;

        let total = self
            .vehicles
            .count_available(latitude, longitude, radius_m, start, end, query.category)
            .await?;

        let vehicles = rows
            .into_iter()
            .map(|r| AvailableVehicleResponse {
                id: r.id,
                owner_id: r.owner_id,
                category: r.category,
                company: r.company,
                model: r.model,
                year: r.year,
                price_per_hour: r.price_per_hour.to_string().parse().unwrap_or(0.0),
                latitude: r.latitude,
                longitude: r.longitude,
                image_url: r.image_url,
                rating_average: r.rating_average,
                rating_count: r.rating_count,
                distance_m: r.distance_m,
            })
            .collect();

        let total_pages = (total as u32).div_ceil(limit);

        Ok(AvailabilityResponse {
            vehicles,
            total,
            page,
            total_pages,
        })
    }

    /// Crear una solicitud de alquiler (estado pending)
    pub async fn rent(
        &self,
        renter_id: Uuid,
        request: RentRequest,
    ) -> Result<ApiResponse<RentalResponse>, AppError> {
        let (vehicle_id, start, end) =
            match (request.vehicle_id, request.start_time, request.end_time) {
                (Some(v), Some(s), Some(e)) => (v, s, e),
                _ => {
                    return Err(AppError::BadRequest(
                        "Vehicle ID, start time, and end time are required".to_string(),
                    ))
                }
            };

        validate_window(start, end)?;

        let rental = self
            .rentals
            .create_request(renter_id, vehicle_id, start, end)
            .await?;

        Ok(ApiResponse::success_with_message(
            rental.into(),
            "Rental request created".to_string(),
        ))
    }

    /// Puntuar un alquiler completado por el renter, exactamente una vez
    pub async fn rate(
        &self,
        renter_id: Uuid,
        request: RatingRequest,
    ) -> Result<ApiResponse<RatingAggregate>, AppError> {
        let rent_id = request
            .rent_id
            .ok_or_else(|| AppError::BadRequest("Rent ID is required".to_string()))?;

        let score = match request.rating {
            Some(s) if (1..=5).contains(&s) => s as u8,
            _ => {
                return Err(AppError::BadRequest(
                    "Rating must be an integer from 1 to 5".to_string(),
                ))
            }
        };

        let aggregate = self.rentals.rate(rent_id, renter_id, score).await?;

        Ok(ApiResponse::success_with_message(
            aggregate,
            "Rating submitted".to_string(),
        ))
    }

    /// Alquileres donde el caller es el renter
    pub async fn my_rentals(&self, renter_id: Uuid) -> Result<Vec<RentalResponse>, AppError> {
        let rentals = self.rentals.find_by_renter(renter_id).await?;
        Ok(rentals.into_iter().map(RentalResponse::from).collect())
    }

    /// Solicitudes donde el caller es el lender, con filtro opcional de
    /// estados separado por comas ("pending,approved")
    pub async fn lender_requests(
        &self,
        lender_id: Uuid,
        status_filter: Option<&str>,
    ) -> Result<Vec<RentalResponse>, AppError> {
        let statuses = parse_status_filter(status_filter)?;

        let rentals = self.rentals.find_by_lender(lender_id, &statuses).await?;
        Ok(rentals.into_iter().map(RentalResponse::from).collect())
    }

    pub async fn approve(
        &self,
        actor_id: Uuid,
        rental_id: Uuid,
    ) -> Result<ApiResponse<RentalResponse>, AppError> {
        let rental = self.rentals.approve(rental_id, actor_id).await?;

        Ok(ApiResponse::success_with_message(
            rental.into(),
            "Rental request approved".to_string(),
        ))
    }

    pub async fn reject(
        &self,
        actor_id: Uuid,
        rental_id: Uuid,
    ) -> Result<ApiResponse<RentalResponse>, AppError> {
        let rental = self.rentals.reject(rental_id, actor_id).await?;

        Ok(ApiResponse::success_with_message(
            rental.into(),
            "Rental request rejected".to_string(),
        ))
    }
}

/// Parsear el filtro "a,b,c" a estados; un nombre desconocido es un 400
fn parse_status_filter(filter: Option<&str>) -> Result<Vec<RentalStatus>, AppError> {
    let Some(filter) = filter else {
        return Ok(Vec::new());
    };

    let mut statuses = Vec::new();
    for part in filter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let status = RentalStatus::parse(part)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown rental status: {}", part)))?;
        if !statuses.contains(&status) {
            statuses.push(status);
        }
    }

    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_filter() {
        assert!(parse_status_filter(None).unwrap().is_empty());
        assert!(parse_status_filter(Some("")).unwrap().is_empty());

        let parsed = parse_status_filter(Some("pending, approved")).unwrap();
        assert_eq!(parsed, vec![RentalStatus::Pending, RentalStatus::Approved]);

        // Duplicados se colapsan
        let parsed = parse_status_filter(Some("pending,pending")).unwrap();
        assert_eq!(parsed, vec![RentalStatus::Pending]);

        assert!(parse_status_filter(Some("pending,bogus")).is_err());
    }
}
