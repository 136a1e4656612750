//! Application assembly: storage selection, shared state and the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_multipart::form::MultipartFormConfig;
use actix_web::dev::{ServiceRequest, ServiceResponse, fn_service};
use actix_web::{App, HttpServer, middleware, web};

use crate::db::{establish_connection_pool, run_migrations};
use crate::models::config::{AuthConfig, HistoryConfig, ServerConfig, StorageKind};
use crate::repository::{DieselRepository, MemoryRepository, Repository};
use crate::routes::auth::{login, me, signup};
use crate::routes::generation::{generate, list_generations, show_generation};
use crate::routes::{json_error_handler, multipart_error_handler};
use crate::simulator::GenerationSimulator;
use crate::uploads::{UPLOADS_URL_PREFIX, UploadStore};

/// URL prefix of the pre-rendered images handed out by the simulator.
pub const MOCK_IMAGES_URL_PREFIX: &str = "/api/mock-images";

/// Handler state shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub repo: web::Data<dyn Repository>,
    pub auth: web::Data<AuthConfig>,
    pub history: web::Data<HistoryConfig>,
    pub simulator: web::Data<GenerationSimulator>,
    pub uploads: web::Data<UploadStore>,
    pub mock_images_dir: PathBuf,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn Repository>,
        auth: AuthConfig,
        history: HistoryConfig,
        simulator: GenerationSimulator,
        uploads: UploadStore,
        mock_images_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repo: web::Data::from(repo),
            auth: web::Data::new(auth),
            history: web::Data::new(history),
            simulator: web::Data::new(simulator),
            uploads: web::Data::new(uploads),
            mock_images_dir: mock_images_dir.into(),
        }
    }

    /// Registers the handler state, the image directories and the JSON API.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.repo.clone())
            .app_data(self.auth.clone())
            .app_data(self.history.clone())
            .app_data(self.simulator.clone())
            .app_data(self.uploads.clone())
            // Must precede the `/api` scope, which would otherwise claim the prefix.
            .service(Files::new(MOCK_IMAGES_URL_PREFIX, &self.mock_images_dir))
            .service(
                web::scope(UPLOADS_URL_PREFIX)
                    .wrap(
                        middleware::DefaultHeaders::new()
                            .add(("Cross-Origin-Resource-Policy", "cross-origin")),
                    )
                    .service(Files::new("", self.uploads.dir())),
            )
            .service(
                web::scope("/api")
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .app_data(
                        MultipartFormConfig::default().error_handler(multipart_error_handler),
                    )
                    .service(signup)
                    .service(login)
                    .service(me)
                    .service(generate)
                    .service(list_generations)
                    .service(show_generation),
            );
    }
}

/// Serves the built frontend, answering unknown paths with its `index.html`.
pub fn frontend_service(static_dir: &str) -> Files {
    let index = PathBuf::from(static_dir).join("index.html");
    Files::new("/", static_dir)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let index = index.clone();
            async move {
                let (req, _) = req.into_parts();
                let file = NamedFile::open_async(index).await?;
                let res = file.into_response(&req);
                Ok::<_, actix_web::Error>(ServiceResponse::new(req, res))
            }
        }))
}

fn build_repository(server_config: &ServerConfig) -> std::io::Result<Arc<dyn Repository>> {
    match server_config.storage {
        StorageKind::Sqlite => {
            let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
                std::io::Error::other(format!("Failed to establish database connection: {e}"))
            })?;
            run_migrations(&pool).map_err(|e| {
                std::io::Error::other(format!("Failed to run database migrations: {e}"))
            })?;
            Ok(Arc::new(DieselRepository::new(pool)))
        }
        StorageKind::Memory => {
            log::warn!("Using in-memory storage, all data is lost on restart");
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    server_config
        .history
        .validate()
        .map_err(|e| std::io::Error::other(format!("Invalid history settings: {e}")))?;

    let repo = build_repository(&server_config)?;

    let simulator = GenerationSimulator::from_config(&server_config.simulator)
        .map_err(|e| std::io::Error::other(format!("Invalid simulator settings: {e}")))?;

    let uploads = UploadStore::new(&server_config.uploads_dir)?;

    let state = AppState::new(
        repo,
        server_config.auth.clone(),
        server_config.history,
        simulator,
        uploads,
        &server_config.mock_images_dir,
    );

    let static_dir = server_config.static_dir.clone();
    let bind_address = (server_config.address.clone(), server_config.port);

    log::info!(
        "Starting studio on {}:{} with {:?} storage",
        server_config.address,
        server_config.port,
        server_config.storage
    );

    HttpServer::new(move || {
        let app = App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .configure(|cfg| state.configure(cfg));

        match &static_dir {
            Some(dir) => app.service(frontend_service(dir)),
            None => app,
        }
    })
    .bind(bind_address)?
    .run()
    .await
}
