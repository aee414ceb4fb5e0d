use actix_web::{middleware::Logger, web, App, HttpServer};
use allo_aide::config::{Settings, StorageBackend};
use allo_aide::render::TeraRenderer;
use allo_aide::repository::{MemoryStore, PgStore, Store};
use allo_aide::state::AppState;
use allo_aide::{db, routes};
use std::io;
use std::sync::Arc;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialiser le logger
    env_logger::init();

    // Charger les variables d'environnement
    if cfg!(debug_assertions) {
        match dotenvy::dotenv() {
            Ok(path) => log::info!(".env file loaded from path: {}", path.display()),
            Err(e) => log::warn!(
                "Could not load .env file: {}, using environment variables.",
                e
            ),
        }
    }

    let settings = Settings::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let store: Arc<dyn Store> = match &settings.storage {
        StorageBackend::Postgres {
            database_url,
            pool_size,
        } => {
            // Créer le pool de connexions async
            let pool = db::create_pool(database_url, *pool_size)
                .await
                .map_err(|e| startup_error("Failed to create database connection pool", e))?;
            Arc::new(PgStore::new(pool))
        }
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; all data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let renderer =
        TeraRenderer::new().map_err(|e| startup_error("Failed to load templates", e))?;

    let bind_address = settings.bind_address();
    let state = web::Data::new(AppState::new(store, Arc::new(renderer), settings));

    log::info!("🚀 Allo Aide starting at http://{}", bind_address);

    // Démarrer le serveur HTTP
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
