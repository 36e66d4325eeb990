#[macro_use]
extern crate lazy_static;
use std::collections::HashMap;

use actix_files::{Files, NamedFile};
use actix_identity::IdentityMiddleware;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{
    cookie::Key,
    http::{Method, StatusCode},
    middleware::{self, from_fn},
    web::{self, Data},
    App, Either, HttpResponse, HttpServer, Responder,
};
use log::info;
use sqlx::SqlitePool;
use tera::Tera;

mod auth;
mod config;
mod db;
mod errors;
mod forms;
mod placeholder;
mod routes;
mod seed;
mod structs;
mod ui;
mod utils;

use config::Config;

#[derive(Debug, Clone)]
pub struct AppState {
    db_pool: SqlitePool,
}

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = match Tera::new("templates/**/*") {
            Ok(t) => t,
            Err(e) => {
                log::error!("Parsing error(s): {}", e);
                ::std::process::exit(1);
            }
        };
        tera.autoescape_on(vec![".html"]);
        tera.register_filter("currency", currency_filter);
        tera
    };
}

/// `{{ amount | currency }}` renders minor units as dollars.
fn currency_filter(value: &tera::Value, _: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    let minor_units = value
        .as_i64()
        .ok_or_else(|| tera::Error::msg(format!("currency filter expects an integer, got {}", value)))?;
    Ok(tera::Value::String(utils::format_currency(minor_units)))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("FATAL: {}", e);
        e
    })?;

    let db_pool = db::connect(&config.database_url).await.map_err(|e| {
        log::error!("FATAL: cannot open database {}: {}", config.database_url, e);
        e
    })?;
    db::ensure_schema(&db_pool).await?;

    info!("Database schema ready");

    let session_key = Key::from(config.session_key.as_slice());
    let bind = (config.host.clone(), config.port);
    info!("Starting HTTP server on http://{}:{}/", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            // the guard reads the identity, so it must sit inside the identity middleware
            .wrap(from_fn(auth::access_guard))
            .wrap(IdentityMiddleware::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .configure(routes::configure)
            .app_data(Data::new(AppState {
                db_pool: db_pool.clone(),
            }))
            .default_service(web::to(default_handler))
    })
    .bind(bind)?
    .run()
    .await
}

async fn default_handler(req_method: Method) -> Result<impl Responder, std::io::Error> {
    match req_method {
        Method::GET => {
            let file = NamedFile::open("static/404.html")?
                .customize()
                .with_status(StatusCode::NOT_FOUND);
            Ok(Either::Left(file))
        }
        _ => Ok(Either::Right(HttpResponse::MethodNotAllowed().finish())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{call_service, init_service, TestRequest};

    #[test]
    fn currency_filter_formats_minor_units() {
        let out = currency_filter(&tera::Value::from(15795), &HashMap::new()).unwrap();
        assert_eq!(out, tera::Value::String("$157.95".to_owned()));
        assert!(currency_filter(&tera::Value::from("abc"), &HashMap::new()).is_err());
    }

    #[test]
    fn templates_load_relative_to_the_working_directory() {
        let names: Vec<&str> = TEMPLATES.get_template_names().collect();
        for page in ["base.html", "login.html", "dashboard/index.html", "components/macros.html"] {
            assert!(names.contains(&page), "{}", page);
        }
    }

    #[actix_web::test]
    async fn unknown_routes_fall_back() {
        let app = init_service(App::new().default_service(web::to(default_handler))).await;

        let resp = call_service(&app, TestRequest::get().uri("/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = call_service(&app, TestRequest::delete().uri("/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
