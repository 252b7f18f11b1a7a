mod config;
mod db;
mod error;
mod registry;
mod services;
mod views;

use crate::config::Config;
use crate::registry::state::PdfRegistry;
use actix_files::Files;
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info};
use mime_guess::from_path;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let file_path = req.match_info().query("tail");

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => HttpResponse::NotFound().body("Not Found"),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    config.ensure_dirs()?;

    if let Err(e) = db::open(&config).and_then(|conn| db::init_schema(&conn)) {
        error!("cannot initialise database {}: {}", config.database_path.display(), e);
        std::process::exit(1);
    }
    info!("database ready at {}", config.database_path.display());

    let registry = PdfRegistry::default();
    let bind = (config.host.clone(), config.port);
    info!("Server running at http://{}:{} (public base {})", bind.0, bind.1, config.base_url);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(registry.clone()))
            .configure(services::configure)
            .route("/static/{tail:.*}", web::get().to(serve_embedded))
            .service(Files::new("/certificates", config.certificates_dir.clone()))
    })
        .bind(bind)?
        .run()
        .await
}
