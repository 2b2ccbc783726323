use actix_web::{web, Scope};

pub mod issues;
pub mod scanner;

pub fn create_api_router() -> Scope {
    web::scope("/api")
        .service(scanner_routes())
        .service(issues_routes())
}

fn scanner_routes() -> Scope {
    web::scope("/scanner").configure(scanner::configure_scanner_routes)
}

fn issues_routes() -> Scope {
    web::scope("/issues").configure(issues::configure_issue_routes)
}
