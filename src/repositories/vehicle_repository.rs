//! Repositorio de vehículos
//!
//! CRUD de vehículos y la búsqueda por proximidad con exclusión de
//! ventanas ocupadas (el lado "directory" del availability index).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::rental_dto::SearchSort;
use crate::models::vehicle::{Vehicle, VehicleCategory};
use crate::utils::errors::AppError;

// La columna location es GEOGRAPHY; se expone siempre como lat/lng
const VEHICLE_COLUMNS: &str = r#"
    id, owner_id, category, company, model, year, num_plate, price_per_hour,
    ST_Y(location::geometry) AS latitude, ST_X(location::geometry) AS longitude,
    image_url, available, rating_average, rating_count, created_at, updated_at
"#;

/// Fila de la búsqueda de disponibilidad: vehículo + distancia al punto
#[derive(Debug, sqlx::FromRow)]
pub struct AvailableVehicleRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: VehicleCategory,
    pub company: String,
    pub model: String,
    pub year: i32,
    pub num_plate: String,
    pub price_per_hour: Decimal,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: String,
    pub available: bool,
    pub rating_average: f64,
    pub rating_count: i32,
    pub distance_m: f64,
}

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        owner_id: Uuid,
        category: VehicleCategory,
        company: String,
        model: String,
        year: i32,
        num_plate: String,
        price_per_hour: f64,
        latitude: f64,
        longitude: f64,
        image_url: String,
    ) -> Result<Vehicle, AppError> {
        let id = Uuid::new_v4();
        let price = Decimal::from_f64_retain(price_per_hour)
            .filter(|p| p.is_sign_positive() && !p.is_zero())
            .ok_or_else(|| {
                AppError::BadRequest("Price per hour must be a positive number".to_string())
            })?;

        let query = format!(
            r#"
            INSERT INTO vehicles
                (id, owner_id, category, company, model, year, num_plate,
                 price_per_hour, location, image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                    ST_SetSRID(ST_MakePoint($9, $10), 4326)::geography, $11, $12, $12)
            RETURNING {VEHICLE_COLUMNS}
            "#
        );

        let vehicle = sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(category)
            .bind(company)
            .bind(model)
            .bind(year)
            .bind(num_plate)
            .bind(price)
            .bind(longitude)
            .bind(latitude)
            .bind(image_url)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let query = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = $1");

        let vehicle = sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<Vehicle>, AppError> {
        let query = format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE owner_id = $1 ORDER BY created_at DESC"
        );

        let vehicles = sqlx::query_as::<_, Vehicle>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    pub async fn update(
        &self,
        id: Uuid,
        price_per_hour: Option<f64>,
        image_url: Option<String>,
        available: Option<bool>,
    ) -> Result<Vehicle, AppError> {
        let price = match price_per_hour {
            Some(p) => Some(
                Decimal::from_f64_retain(p)
                    .filter(|d| d.is_sign_positive() && !d.is_zero())
                    .ok_or_else(|| {
                        AppError::BadRequest("Price per hour must be a positive number".to_string())
                    })?,
            ),
            None => None,
        };

        let query = format!(
            r#"
            UPDATE vehicles SET
                price_per_hour = COALESCE($2, price_per_hour),
                image_url = COALESCE($3, image_url),
                available = COALESCE($4, available),
                updated_at = $5
            WHERE id = $1
            RETURNING {VEHICLE_COLUMNS}
            "#
        );

        let vehicle = sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .bind(price)
            .bind(image_url)
            .bind(available)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Vehículos dentro del radio sin ningún alquiler pending/approved que
    /// solape la ventana pedida. Garantía point-in-time: no es una reserva.
    #[allow(clippy::too_many_arguments)]
    pub async fn find_available(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        category: Option<VehicleCategory>,
        sort: SearchSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AvailableVehicleRow>, AppError> {
        // El alias distance_m existe en el SELECT, así que ORDER BY puede
        // usarlo. El fragmento sale de un match cerrado, nunca del cliente.
        let order_by = match sort {
            SearchSort::PriceAsc => "price_per_hour ASC",
            SearchSort::DistanceAsc => "distance_m ASC",
            SearchSort::RatingDesc => "rating_average DESC",
            SearchSort::PriceDesc => "price_per_hour DESC",
        };

        let query = format!(
            r#"
            SELECT {VEHICLE_COLUMNS},
                   ST_Distance(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography) AS distance_m
            FROM vehicles
            WHERE ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
              AND ($4::vehicle_category IS NULL OR category = $4)
              AND id NOT IN (
                  SELECT vehicle_id FROM rentals
                  WHERE status IN ('pending', 'approved')
                    AND start_time < $6 AND end_time > $5
              )
            ORDER BY {order_by}
            LIMIT $7 OFFSET $8
            "#
        );

        let rows = sqlx::query_as::<_, AvailableVehicleRow>(&query)
            .bind(longitude)
            .bind(latitude)
            .bind(radius_m)
            .bind(category)
            .bind(window_start)
            .bind(window_end)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Total de vehículos disponibles para la misma consulta, para paginar
    pub async fn count_available(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        category: Option<VehicleCategory>,
    ) -> Result<i64, AppError> {
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM vehicles
            WHERE ST_DWithin(location, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)
              AND ($4::vehicle_category IS NULL OR category = $4)
              AND id NOT IN (
                  SELECT vehicle_id FROM rentals
                  WHERE status IN ('pending', 'approved')
                    AND start_time < $6 AND end_time > $5
              )
            "#,
        )
        .bind(longitude)
        .bind(latitude)
        .bind(radius_m)
        .bind(category)
        .bind(window_start)
        .bind(window_end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
