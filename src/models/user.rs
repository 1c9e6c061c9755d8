//! Rol de usuario
//!
//! La identidad (registro, login, sesiones) vive en un servicio externo;
//! aquí solo llega el id del actor y su rol dentro del marketplace.

use serde::{Deserialize, Serialize};

/// Rol del actor autenticado
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Renter: solicita y paga alquileres
    User,
    /// Lender: publica vehículos y aprueba/rechaza solicitudes
    Vendor,
}
