use actix_web::web::{self};

pub mod routes {
    pub mod gems;
    pub mod webhook;
}

pub mod services {
    pub mod ledger;
    pub(crate) mod packs;
    pub(crate) mod pay;
}

mod dtos {
    pub(crate) mod gems;
}

pub mod models {
    pub mod pack;
}

pub use services::packs::get_gem_packs;

pub fn mount_gems() -> actix_web::Scope {
    web::scope("/gems")
        .service(routes::gems::get_balance)
        .service(routes::gems::get_packs)
        .service(routes::gems::get_purchases)
        .service(routes::gems::post_purchase)
        .service(routes::gems::post_deduct)
}

pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/pay").service(routes::webhook::post_webhook)
}
