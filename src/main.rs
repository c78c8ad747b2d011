use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use hrm_attendance::config::Config;
use hrm_attendance::docs::ApiDoc;
use hrm_attendance::provider::HrmsApiClient;
use hrm_attendance::routes;
use hrm_attendance::sync::AttendanceSyncEngine;

#[get("/")]
async fn index() -> impl Responder {
    "HRM attendance console is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "attendance.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(upstream = %config.hrms_api_url, "Attendance console starting...");

    let client = Arc::new(
        HrmsApiClient::new(config.hrms_api_url.clone(), config.request_timeout)
            .context("failed to build HRMS API client")?,
    );
    let engine = Data::new(AttendanceSyncEngine::new(client.clone(), client));

    // fetch-on-mount: load today's attendance in the background
    let engine_for_warmup = engine.clone();
    actix_web::rt::spawn(async move {
        let today = engine_for_warmup.selected_date();
        if let Err(e) = engine_for_warmup.load_day(today).await {
            warn!(error = %e, %today, "Initial attendance load failed");
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
            .app_data(engine.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
