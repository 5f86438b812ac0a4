#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::serde::json::Json;
use rocket::{Build, Rocket};
use serde_json::{json, Value};

mod analytics;
mod boot;
mod config;
mod content;
mod db;
mod engagement;
mod error;
mod models;
mod portfolio;
mod routes;
mod security;
mod store;

#[cfg(test)]
mod tests;

use config::SiteConfig;
use store::Store;

/// Mount point of the operator API.
pub const OPERATOR_MOUNT: &str = "/cms";

pub struct NoCacheOperator;

#[rocket::async_trait]
impl Fairing for NoCacheOperator {
    fn info(&self) -> Info {
        Info { name: "No-Cache Operator API", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        if req.uri().path().starts_with(OPERATOR_MOUNT) {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(401)]
fn unauthorized() -> Json<Value> {
    Json(json!({ "success": false, "error": "Authentication required" }))
}

#[catch(404)]
fn not_found() -> Json<Value> {
    Json(json!({ "success": false, "error": "Not found" }))
}

#[catch(422)]
fn unprocessable() -> Json<Value> {
    Json(json!({ "success": false, "error": "Malformed request body" }))
}

#[catch(500)]
fn server_error() -> Json<Value> {
    Json(json!({ "success": false, "error": "Internal server error" }))
}

/// Assemble the application around an already selected store.
pub fn build_rocket(config: SiteConfig, store: Arc<dyn Store>) -> Rocket<Build> {
    let operator_api_mount = format!("{}/api", OPERATOR_MOUNT);

    rocket::build()
        .manage(store)
        .manage(config)
        .attach(NoCacheOperator)
        .mount("/api", routes::api::routes())
        .mount("/auth", routes::auth::routes())
        .mount(&operator_api_mount, routes::admin_api::routes())
        .register("/", catchers![unauthorized, not_found, unprocessable, server_error])
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let config = match SiteConfig::load() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load site configuration: {}", e);
            std::process::exit(1);
        }
    };
    let store = match boot::select_store(&config) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to open data store: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("{} API mounted at /api, operator API at {}/api", config.site.name, OPERATOR_MOUNT);
    build_rocket(config, store)
}
