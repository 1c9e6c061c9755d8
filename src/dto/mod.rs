//! DTOs de request/response de la API

pub mod api;
pub mod rental_dto;
pub mod vehicle_dto;
