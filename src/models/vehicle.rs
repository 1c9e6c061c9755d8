//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, la categoría y el agregado de
//! rating. Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Categoría del vehículo - mapea al ENUM vehicle_category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Car,
    Bike,
    Suv,
    Truck,
    Van,
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
///
/// `available` es un flag publicitario del owner; la disponibilidad real
/// para una ventana de tiempo la decide el ledger de alquileres.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Agregado de rating: media aritmética de exactamente `count` puntuaciones
/// individuales en [1,5]. Se recalcula de forma incremental, nunca se
/// guardan las puntuaciones sueltas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatingAggregate {
    pub average: f64,
    pub count: i32,
}

impl RatingAggregate {
    pub fn new(average: f64, count: i32) -> Self {
        Self { average, count }
    }

    /// Incorporar una puntuación nueva al agregado:
    /// new_avg = (avg * count + score) / (count + 1)
    ///
    /// Sin redondeo: el redondeo es un problema de presentación.
    pub fn apply(self, score: u8) -> Self {
        let new_count = self.count + 1;
        let new_average = (self.average * self.count as f64 + score as f64) / new_count as f64;
        Self {
            average: new_average,
            count: new_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_rating_is_the_average() {
        let agg = RatingAggregate::new(0.0, 0).apply(4);
        assert_eq!(agg.count, 1);
        assert!((agg.average - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_incremental_mean_matches_direct_mean() {
        let scores = [5u8, 3, 4, 1, 5, 2, 4];
        let mut agg = RatingAggregate::new(0.0, 0);
        for s in scores {
            agg = agg.apply(s);
        }

        let direct: f64 = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;
        assert_eq!(agg.count, scores.len() as i32);
        assert!((agg.average - direct).abs() < 1e-9);
    }

    #[test]
    fn test_mean_is_order_independent() {
        let mut forward = RatingAggregate::new(0.0, 0);
        let mut backward = RatingAggregate::new(0.0, 0);
        let scores = [1u8, 2, 3, 4, 5];

        for s in scores {
            forward = forward.apply(s);
        }
        for s in scores.iter().rev() {
            backward = backward.apply(*s);
        }

        assert!((forward.average - backward.average).abs() < 1e-9);
        assert_eq!(forward.count, backward.count);
    }
}
