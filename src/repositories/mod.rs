//! Repositorios de acceso a datos

pub mod rental_repository;
pub mod vehicle_repository;
