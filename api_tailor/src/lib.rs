use actix_web::web::{self};

pub mod routes {
    pub mod gap;
}

mod services {
    pub(crate) mod gap;
}

mod dtos {
    pub(crate) mod gap;
}

pub fn mount_tailor() -> actix_web::Scope {
    web::scope("/tailor").service(routes::gap::post_gap_analysis)
}
