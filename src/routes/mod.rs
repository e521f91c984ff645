// Route exports
pub mod analyze;

use actix_web::web;

pub use analyze::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(analyze::configure),
    );
}
