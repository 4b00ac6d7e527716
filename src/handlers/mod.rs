pub mod department;
pub mod employee;
pub mod health;
pub mod import;

use actix_cors::Cors;
use actix_web::web;

use crate::config::Config;

/// Cross-origin policy for the browser client, which is served separately.
pub fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if config.cors_allowed_origins.is_empty() {
        return cors.allow_any_origin().send_wildcard();
    }
    config
        .cors_allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/health")
            .route(web::get().to(health::health_check)),
    )
    .service(
        web::resource("/api/departments")
            .route(web::get().to(department::get_departments))
            .route(web::post().to(department::create_department)),
    )
    .service(
        web::resource("/api/departments/{id}")
            .route(web::get().to(department::get_department))
            .route(web::put().to(department::update_department))
            .route(web::delete().to(department::delete_department)),
    )
    .service(
        web::resource("/api/employees")
            .route(web::get().to(employee::get_employees))
            .route(web::post().to(employee::create_employee)),
    )
    .service(
        web::resource("/api/employees/department/{department_id}")
            .route(web::get().to(employee::get_employees_by_department)),
    )
    .service(
        web::resource("/api/employees/{id}")
            .route(web::get().to(employee::get_employee))
            .route(web::put().to(employee::update_employee))
            .route(web::delete().to(employee::delete_employee)),
    )
    .service(
        web::resource("/api/import/employees")
            .route(web::post().to(import::import_employees)),
    )
    .service(
        web::resource("/api/import/template")
            .route(web::get().to(import::download_template)),
    );
}
