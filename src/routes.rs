use crate::{api::attendance, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let attendance_limiter = build_limiter(config.rate_mark_per_min);

    cfg.service(
        web::scope(&config.api_prefix).service(
            web::scope("/attendance")
                // /attendance
                .service(
                    web::resource("")
                        .wrap(attendance_limiter)
                        .route(web::get().to(attendance::get_attendance))
                        .route(web::post().to(attendance::mark_attendance)),
                )
                // /attendance/date
                .service(web::resource("/date").route(web::put().to(attendance::select_date))),
        ),
    );
}
