//! Modelos de dominio
//!
//! Structs que mapean a las tablas PostgreSQL y las reglas puras del
//! dominio (solape de ventanas, máquina de estados, agregado de rating).

pub mod rental;
pub mod user;
pub mod vehicle;
