//! Repositorio de alquileres (el ledger)
//!
//! Dueño de la detección de conflictos y de las transiciones de estado.
//! Toda mutación corre en una transacción que bloquea primero la fila del
//! vehículo con FOR UPDATE: eso serializa los check-then-act por vehículo.
//! La constraint de exclusión rentals_no_approved_overlap es el backstop a
//! nivel de base de datos para aprobaciones concurrentes.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::rental::{Rental, RentalStatus};
use crate::models::vehicle::RatingAggregate;
use crate::utils::errors::AppError;

const APPROVED_OVERLAP_CONSTRAINT: &str = "rentals_no_approved_overlap";

/// Violaciones de la constraint de exclusión son conflictos de reserva,
/// no errores internos
fn map_booking_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.constraint() == Some(APPROVED_OVERLAP_CONSTRAINT) {
            return AppError::Conflict(
                "Vehicle already has an approved booking in this time range".to_string(),
            );
        }
    }
    AppError::Database(e)
}

pub struct RentalRepository {
    pool: PgPool,
}

impl RentalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Rental>, AppError> {
        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    pub async fn find_by_renter(&self, renter_id: Uuid) -> Result<Vec<Rental>, AppError> {
        let rentals = sqlx::query_as::<_, Rental>(
            "SELECT * FROM rentals WHERE renter_id = $1 ORDER BY created_at DESC",
        )
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    /// Solicitudes donde el caller es el lender, opcionalmente filtradas a
    /// un subconjunto de estados (vacío = todos)
    pub async fn find_by_lender(
        &self,
        lender_id: Uuid,
        statuses: &[RentalStatus],
    ) -> Result<Vec<Rental>, AppError> {
        // Los literales salen de RentalStatus::as_str, nunca del cliente
        let query = if statuses.is_empty() {
            "SELECT * FROM rentals WHERE lender_id = $1 ORDER BY created_at DESC".to_string()
        } else {
            let list = statuses
                .iter()
                .map(|s| format!("'{}'", s.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "SELECT * FROM rentals WHERE lender_id = $1 AND status IN ({list}) ORDER BY created_at DESC"
            )
        };

        let rentals = sqlx::query_as::<_, Rental>(&query)
            .bind(lender_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rentals)
    }

    pub async fn find_by_vehicle(&self, vehicle_id: Uuid) -> Result<Vec<Rental>, AppError> {
        let rentals = sqlx::query_as::<_, Rental>(
            "SELECT * FROM rentals WHERE vehicle_id = $1 ORDER BY start_time DESC",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rentals)
    }

    /// Crear una solicitud de alquiler en estado pending.
    ///
    /// Chequeo de conflicto en tiempo de escritura: cualquier alquiler
    /// pending o approved del mismo vehículo cuya ventana semiabierta
    /// solape la pedida bloquea la creación. El lender se copia del owner
    /// del vehículo en este instante.
    pub async fn create_request(
        &self,
        renter_id: Uuid,
        vehicle_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Rental, AppError> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<(Uuid,)> =
            sqlx::query_as("SELECT owner_id FROM vehicles WHERE id = $1 FOR UPDATE")
                .bind(vehicle_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (lender_id,) = owner.ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let (conflict,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM rentals
                WHERE vehicle_id = $1
                  AND status IN ('pending', 'approved')
                  AND start_time < $3 AND end_time > $2
            )
            "#,
        )
        .bind(vehicle_id)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(&mut *tx)
        .await?;

        if conflict {
            return Err(AppError::Conflict(
                "Vehicle already has a booking or pending request in this time range".to_string(),
            ));
        }

        let rental = sqlx::query_as::<_, Rental>(
            r#"
            INSERT INTO rentals
                (id, renter_id, lender_id, vehicle_id, start_time, end_time,
                 status, has_rated, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', FALSE, $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(renter_id)
        .bind(lender_id)
        .bind(vehicle_id)
        .bind(start_time)
        .bind(end_time)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(rental)
    }

    /// Aprobar una solicitud pending.
    ///
    /// Re-valida el solape solo contra alquileres ya approved (más estrecho
    /// que en la creación: aprobar no compite con otros pending). El lock
    /// FOR UPDATE del vehículo garantiza que de dos aprobaciones
    /// concurrentes solapadas solo una puede comprometerse.
    pub async fn approve(&self, rental_id: Uuid, actor_id: Uuid) -> Result<Rental, AppError> {
        let mut tx = self.pool.begin().await?;

        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1 FOR UPDATE")
            .bind(rental_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Rental request not found".to_string()))?;

        let owner: Option<(Uuid,)> =
            sqlx::query_as("SELECT owner_id FROM vehicles WHERE id = $1 FOR UPDATE")
                .bind(rental.vehicle_id)
                .fetch_optional(&mut *tx)
                .await?;
        let current_owner = owner.map(|(id,)| id);

        if actor_id != rental.lender_id && Some(actor_id) != current_owner {
            return Err(AppError::Forbidden(
                "Only the lender or the vehicle owner can approve this request".to_string(),
            ));
        }

        if rental.status != RentalStatus::Pending {
            return Err(AppError::InvalidState(
                "Only pending requests can be approved".to_string(),
            ));
        }

        let (conflict,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM rentals
                WHERE vehicle_id = $1
                  AND id <> $2
                  AND status = 'approved'
                  AND start_time < $4 AND end_time > $3
            )
            "#,
        )
        .bind(rental.vehicle_id)
        .bind(rental.id)
        .bind(rental.start_time)
        .bind(rental.end_time)
        .fetch_one(&mut *tx)
        .await?;

        if conflict {
            return Err(AppError::Conflict(
                "Vehicle already has an approved booking in this time range".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Rental>(
            "UPDATE rentals SET status = 'approved', updated_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(rental.id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_booking_conflict)?;

        tx.commit().await.map_err(map_booking_conflict)?;

        Ok(updated)
    }

    /// Rechazar una solicitud pending. Sin chequeo de conflicto.
    pub async fn reject(&self, rental_id: Uuid, actor_id: Uuid) -> Result<Rental, AppError> {
        let mut tx = self.pool.begin().await?;

        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1 FOR UPDATE")
            .bind(rental_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Rental request not found".to_string()))?;

        let owner: Option<(Uuid,)> = sqlx::query_as("SELECT owner_id FROM vehicles WHERE id = $1")
            .bind(rental.vehicle_id)
            .fetch_optional(&mut *tx)
            .await?;
        let current_owner = owner.map(|(id,)| id);

        if actor_id != rental.lender_id && Some(actor_id) != current_owner {
            return Err(AppError::Forbidden(
                "Only the lender or the vehicle owner can reject this request".to_string(),
            ));
        }

        if rental.status != RentalStatus::Pending {
            return Err(AppError::InvalidState(
                "Only pending requests can be rejected".to_string(),
            ));
        }

        let updated = sqlx::query_as::<_, Rental>(
            "UPDATE rentals SET status = 'rejected', updated_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(rental.id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Puntuar un alquiler: actualizar el agregado del vehículo y marcar
    /// has_rated en la misma transacción. O ambas escrituras comprometen
    /// o ninguna: nunca una media movida con has_rated sin marcar.
    pub async fn rate(
        &self,
        rental_id: Uuid,
        renter_id: Uuid,
        score: u8,
    ) -> Result<RatingAggregate, AppError> {
        let mut tx = self.pool.begin().await?;

        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1 FOR UPDATE")
            .bind(rental_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Rental record not found".to_string()))?;

        if rental.renter_id != renter_id {
            return Err(AppError::Forbidden(
                "Not authorized to rate this rental".to_string(),
            ));
        }

        if rental.has_rated {
            return Err(AppError::InvalidState(
                "This rental has already been rated".to_string(),
            ));
        }

        let current: Option<(f64, i32)> = sqlx::query_as(
            "SELECT rating_average, rating_count FROM vehicles WHERE id = $1 FOR UPDATE",
        )
        .bind(rental.vehicle_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (average, count) =
            current.ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        let aggregate = RatingAggregate::new(average, count).apply(score);

        sqlx::query(
            "UPDATE vehicles SET rating_average = $2, rating_count = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(rental.vehicle_id)
        .bind(aggregate.average)
        .bind(aggregate.count)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE rentals SET has_rated = TRUE, updated_at = $2 WHERE id = $1")
            .bind(rental.id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(aggregate)
    }
}
