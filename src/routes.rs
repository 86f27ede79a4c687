use crate::api::{dashboard, records, scan, stats};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str) {
    cfg.service(
        web::scope(api_prefix)
            .service(web::resource("/scan").route(web::post().to(scan::scan)))
            .service(web::resource("/stats").route(web::get().to(stats::get_stats)))
            .service(web::resource("/records").route(web::get().to(records::list_records)))
            .service(web::resource("/dashboard/summary").route(web::get().to(dashboard::summary))),
    );
}
