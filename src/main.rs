use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use vehicle_rental::config::environment::EnvironmentConfig;
use vehicle_rental::database::{create_pool, run_migrations};
use vehicle_rental::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use vehicle_rental::routes;
use vehicle_rental::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚗 Vehicle Rental Marketplace - API");
    info!("===================================");

    // Inicializar base de datos
    let pool = match create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        error!("❌ Error ejecutando migraciones: {}", e);
        return Err(anyhow::anyhow!("Error de migraciones: {}", e));
    }
    info!("✅ Base de datos lista (migraciones aplicadas)");

    let config = EnvironmentConfig::default();
    let port = config.port;

    // Sin CORS_ORIGINS se permite cualquier origen (solo desarrollo)
    let cors = if config.cors_origins.is_empty() {
        cors_middleware()
    } else {
        cors_middleware_with_origins(config.cors_origins.clone())
    };

    let app_state = AppState::new(pool, config);

    let app = Router::new()
        .nest(
            "/api/rentals",
            routes::rental_routes::create_rental_router(app_state.clone()),
        )
        .nest(
            "/api/vehicles",
            routes::vehicle_routes::create_vehicle_router(app_state.clone()),
        )
        .layer(cors)
        .with_state(app_state);

    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("🚙 Rentals:");
    info!("   POST  /api/rentals/available - Buscar vehículos disponibles");
    info!("   POST  /api/rentals/rent - Solicitar alquiler");
    info!("   POST  /api/rentals/rating - Puntuar alquiler");
    info!("   GET   /api/rentals/my - Mis alquileres (renter)");
    info!("   GET   /api/rentals/requests - Solicitudes recibidas (lender)");
    info!("   PATCH /api/rentals/:id/approve - Aprobar solicitud");
    info!("   PATCH /api/rentals/:id/reject - Rechazar solicitud");
    info!("🚗 Vehicles:");
    info!("   POST   /api/vehicles - Publicar vehículo");
    info!("   GET    /api/vehicles - Mis vehículos");
    info!("   PATCH  /api/vehicles/:id - Actualizar vehículo");
    info!("   DELETE /api/vehicles/:id - Eliminar vehículo");
    info!("   GET    /api/vehicles/:id/rents - Historial de alquileres");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal SIGTERM recibida, apagando servidor...");
        },
    }
}
