use crate::{
    api::{attendance, dashboard, reports, users},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

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

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let public_limiter = Arc::new(build_limiter(config.rate_public_per_min));

    // Selection screen + password check
    cfg.service(
        web::resource("/users")
            .wrap(public_limiter.clone())
            .route(web::get().to(users::list_users)),
    )
    .service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/clear")
                    .wrap(public_limiter.clone())
                    .route(web::post().to(handlers::clear)),
            ),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(public_limiter)
            .service(
                web::scope("/clock")
                    .wrap(from_fn(auth_middleware))
                    // /clock/today
                    .service(web::resource("/today").route(web::get().to(attendance::today)))
                    // /clock/{action}
                    .service(
                        web::resource("/{action}").route(web::post().to(attendance::clock_action)),
                    ),
            )
            .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)))
            .service(
                web::scope("/reports")
                    // /reports
                    .service(web::resource("").route(web::get().to(reports::list_reports)))
                    // /reports/export/csv
                    .service(
                        web::resource("/export/csv").route(web::get().to(reports::export_csv)),
                    )
                    // /reports/export/pdf
                    .service(
                        web::resource("/export/pdf").route(web::get().to(reports::export_pdf)),
                    ),
            ),
    );
}

// SELECT USER + PASSWORD
//  └─ POST /auth/login → clock token (5 min)
//  └─ POST /auth/clear → token revoked

// PUNCH (one per token)
//  └─ Authorization: Bearer clock token
//       └─ POST /api/clock/{clock_in|clock_out|break_start|break_end}
