//! HTTP server core

use crate::config::{Config, ServerConfig};
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_cors::Cors;
use actix_web::{App, HttpServer as ActixHttpServer, web};
use tracing::info;
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    config: ServerConfig,
    state: AppState,
}

impl HttpServer {
    /// Build state (router, stores, directories) from validated configuration
    pub fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        config
            .storage
            .ensure_dirs()
            .map_err(|e| GatewayError::Config(format!("cannot create storage dirs: {}", e)))?;

        let state = AppState::new(config.clone());

        Ok(Self {
            config: config.server.clone(),
            state,
        })
    }

    fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let cors_config = &state.config.server.cors;
        let mut cors = Cors::default();
        if cors_config.enabled {
            if cors_config.allows_all_origins() {
                cors = cors
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header();
            } else {
                for origin in &cors_config.allowed_origins {
                    cors = cors.allowed_origin(origin);
                }
                cors = cors.allow_any_method().allow_any_header();
            }
        }

        let output_dir = state.config.storage.output_dir.clone();

        App::new()
            .app_data(state)
            .wrap(cors)
            .wrap(TracingLogger::default())
            .configure(routes::health::configure_routes)
            .configure(routes::research::configure_routes)
            .configure(routes::script::configure_routes)
            .configure(routes::voice::configure_routes)
            .configure(routes::video::configure_routes)
            .configure(routes::generate::configure_routes)
            .service(actix_files::Files::new("/outputs", output_dir))
    }

    /// Start serving
    pub async fn start(self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .bind(&bind_addr)
            .map_err(|e| {
                GatewayError::Config(format!("cannot bind {}: {}", bind_addr, e))
            })?
            .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| GatewayError::Internal(format!("server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
