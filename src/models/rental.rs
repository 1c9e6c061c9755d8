//! Modelo de Rental
//!
//! La entidad central del marketplace: una solicitud de alquiler con su
//! máquina de estados y el test de solape de ventanas semiabiertas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del alquiler - mapea al ENUM rental_status
///
/// pending → {approved, rejected}; approved → {completed, cancelled}.
/// rejected, cancelled y completed son terminales.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "rental_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Approved => "approved",
            RentalStatus::Rejected => "rejected",
            RentalStatus::Cancelled => "cancelled",
            RentalStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(RentalStatus::Pending),
            "approved" => Some(RentalStatus::Approved),
            "rejected" => Some(RentalStatus::Rejected),
            "cancelled" => Some(RentalStatus::Cancelled),
            "completed" => Some(RentalStatus::Completed),
            _ => None,
        }
    }

    /// Estados desde los que no se permite ninguna transición más
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RentalStatus::Rejected | RentalStatus::Cancelled | RentalStatus::Completed
        )
    }

    /// Un alquiler en este estado ocupa la ventana del vehículo de cara a
    /// nuevas solicitudes
    pub fn blocks_window(&self) -> bool {
        matches!(self, RentalStatus::Pending | RentalStatus::Approved)
    }

    /// Tabla de transiciones de la máquina de estados
    pub fn can_transition_to(&self, next: RentalStatus) -> bool {
        matches!(
            (self, next),
            (RentalStatus::Pending, RentalStatus::Approved)
                | (RentalStatus::Pending, RentalStatus::Rejected)
                | (RentalStatus::Approved, RentalStatus::Completed)
                | (RentalStatus::Approved, RentalStatus::Cancelled)
        )
    }
}

/// Rental principal - mapea exactamente a la tabla rentals
///
/// `lender_id` se copia del owner del vehículo al crear la solicitud; una
/// transferencia posterior del vehículo no afecta alquileres existentes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rental {
    pub id: Uuid,
    pub renter_id: Uuid,
    pub lender_id: Uuid,
    pub vehicle_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: RentalStatus,
    pub has_rated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Test de solape de ventanas semiabiertas [start, end):
/// a y b se solapan sii a.start < b.end && a.end > b.start.
/// Ventanas que solo se tocan en un extremo NO se solapan.
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, min, 0).unwrap()
    }

    #[test]
    fn test_touching_windows_do_not_overlap() {
        // [10:00, 11:00) y [11:00, 12:00) comparten solo el extremo
        assert!(!windows_overlap(t(10, 0), t(11, 0), t(11, 0), t(12, 0)));
        assert!(!windows_overlap(t(11, 0), t(12, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn test_partial_overlap() {
        // [10:00, 11:00) contra [10:30, 11:30)
        assert!(windows_overlap(t(10, 0), t(11, 0), t(10, 30), t(11, 30)));
        assert!(windows_overlap(t(10, 30), t(11, 30), t(10, 0), t(11, 0)));
    }

    #[test]
    fn test_containment_overlaps() {
        assert!(windows_overlap(t(9, 0), t(14, 0), t(10, 0), t(11, 0)));
        assert!(windows_overlap(t(10, 0), t(11, 0), t(9, 0), t(14, 0)));
    }

    #[test]
    fn test_disjoint_windows() {
        assert!(!windows_overlap(t(8, 0), t(9, 0), t(12, 0), t(13, 0)));
    }

    #[test]
    fn test_identical_windows_overlap() {
        let start = t(10, 0);
        let end = start + Duration::hours(2);
        assert!(windows_overlap(start, end, start, end));
    }

    #[test]
    fn test_state_machine_transitions() {
        use RentalStatus::*;

        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Completed));
        assert!(Approved.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Cancelled));
        assert!(!Approved.can_transition_to(Rejected));

        // Estados terminales: ninguna transición permitida
        for terminal in [Rejected, Cancelled, Completed] {
            assert!(terminal.is_terminal());
            for next in [Pending, Approved, Rejected, Cancelled, Completed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_window_blocking_states() {
        assert!(RentalStatus::Pending.blocks_window());
        assert!(RentalStatus::Approved.blocks_window());
        assert!(!RentalStatus::Rejected.blocks_window());
        assert!(!RentalStatus::Cancelled.blocks_window());
        assert!(!RentalStatus::Completed.blocks_window());
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            RentalStatus::Pending,
            RentalStatus::Approved,
            RentalStatus::Rejected,
            RentalStatus::Cancelled,
            RentalStatus::Completed,
        ] {
            assert_eq!(RentalStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(RentalStatus::parse("invalid"), None);
    }
}
