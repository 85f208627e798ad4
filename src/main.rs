use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use todo_lists::auth::{AuthMiddleware, TokenService};
use todo_lists::config::Config;
use todo_lists::repository::{PgStore, Repository};
use todo_lists::routes::{self, health};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io)?;

    let store = PgStore::connect(&config).await.map_err(to_io)?;
    store.migrate().await.map_err(to_io)?;

    let repository = web::Data::new(Repository::new(store));
    let tokens = TokenService::from_config(&config).map_err(to_io)?;
    let token_data = web::Data::new(tokens.clone());

    log::info!("Starting todo-lists server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(repository.clone())
            .app_data(token_data.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::auth_config)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(tokens.clone()))
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

fn to_io(err: todo_lists::AppError) -> std::io::Error {
    log::error!("startup failed: {}", err);
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}
