//! Controllers de la aplicación

pub mod rental_controller;
pub mod vehicle_controller;
