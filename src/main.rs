mod config;
mod db;
mod errors;
mod handlers;
mod import;
mod models;
mod utils;

use std::io;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use crate::config::Config;
use crate::db::{DepartmentStore, EmployeeStore, PgDepartmentStore, PgEmployeeStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;

    let pool = db::create_pool(&config)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("Failed to connect to the database: {}", err)))?;
    db::run_migrations(&pool)
        .await
        .map_err(|err| io::Error::new(io::ErrorKind::Other, format!("Failed to run migrations: {}", err)))?;

    let employees: Arc<dyn EmployeeStore> = Arc::new(PgEmployeeStore::new(pool.clone()));
    let departments: Arc<dyn DepartmentStore> = Arc::new(PgDepartmentStore::new(pool));

    let bind_address = (config.host.clone(), config.port);
    info!("Starting server at {}:{}", bind_address.0, bind_address.1);

    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .wrap(handlers::cors(&config))
            .wrap(middleware::Logger::default())
            .app_data(web::Data::from(employees.clone()))
            .app_data(web::Data::from(departments.clone()))
            .app_data(config.clone())
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024))
            .configure(handlers::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
