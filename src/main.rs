use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use timeclock::auth::jwt::accepted_for;
use timeclock::config::Config;
use timeclock::db::init_db;
use timeclock::docs::ApiDoc;
use timeclock::export::pdf::ReportFonts;
use timeclock::routes;
use timeclock::store::{AttendanceStore, MySqlStore, UserStore};
use timeclock::utils::{used_tokens::UsedTokens, user_directory::UserDirectory};

use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Time clock is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    let store = Arc::new(MySqlStore::new(pool));
    let attendance_store: Arc<dyn AttendanceStore> = store.clone();
    let user_store: Arc<dyn UserStore> = store;

    let attendance_data: Data<dyn AttendanceStore> = Data::from(attendance_store);
    let user_data: Data<dyn UserStore> = Data::from(user_store.clone());
    let directory = Data::new(UserDirectory::new(
        user_store,
        Duration::from_secs(config.user_cache_ttl),
    ));

    let used_tokens = Data::new(UsedTokens::new(accepted_for(config.clock_token_ttl)));
    let fonts = Data::new(ReportFonts::load(
        config.pdf_font_path.as_deref(),
        config.pdf_bold_font_path.as_deref(),
    )?);

    let directory_for_warmup = directory.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = directory_for_warmup.warmup().await {
            error!(error = %e, "Failed to warm up user directory");
        }
    });

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(attendance_data.clone())
            .app_data(user_data.clone())
            .app_data(directory.clone())
            .app_data(used_tokens.clone())
            .app_data(fonts.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
