pub mod rental_routes;
pub mod vehicle_routes;
