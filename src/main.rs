use actix_cors::Cors;
use actix_web::{web::Data, App, HttpServer};
use dotenvy::dotenv;
use log::info;
use reqwest::Client;

mod config;
mod errors;
mod models;
mod routes;
mod yahoo;

use config::{AppConfig, ALLOWED_ORIGINS};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config: AppConfig = AppConfig::from_env();

    let client: Client = match Client::builder().user_agent(yahoo::USER_AGENT).build() {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Failed to build HTTP client: {}", err);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "HTTP client setup failed",
            ));
        }
    };

    let bind_addr: (String, u16) = (config.host.clone(), config.port);
    info!("Starting market-data-svc on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        let mut cors: Cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in ALLOWED_ORIGINS {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .app_data(Data::new(client.clone()))
            .app_data(Data::new(config.clone()))
            .service(routes::get_price)
            .service(routes::get_chart)
            .service(routes::get_quote)
            .service(routes::health)
    })
    .bind(bind_addr)?
    .run()
    .await
}
