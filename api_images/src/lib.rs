use actix_web::web::{self};

pub mod routes {
    pub mod images;
}

mod services {
    pub(crate) mod images;
}

mod dtos {
    pub(crate) mod images;
}

pub fn mount_images() -> actix_web::Scope {
    web::scope("/images")
        .service(routes::images::post_generate)
        .service(routes::images::post_save)
        .service(routes::images::get_images)
        .service(routes::images::delete_image)
}
