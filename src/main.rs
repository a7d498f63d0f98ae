use dotenvy::dotenv;
use order_reporting::{build_server, Store};
use std::env;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "database.sqlite".to_string());
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("PORT: {e}")))?;

    let store = Store::open(&database_url).map_err(io::Error::other)?;

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(store, &host, port)?.await
}
