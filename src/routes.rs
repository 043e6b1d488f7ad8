use actix_web::web;

pub mod bookings;
pub mod content;
pub mod health;
pub mod payment;
pub mod places;
pub mod search;

/// Register every route. Shared by the binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check)).service(
        web::scope("/api")
            .route("/search", web::post().to(search::search))
            .route("/search/options", web::get().to(search::options))
            .route("/offers/filter", web::post().to(search::filter))
            .route(
                "/create-payment-intent",
                web::post().to(payment::create_payment_intent),
            )
            .route("/places/resolve", web::get().to(places::resolve))
            .service(
                web::scope("/content")
                    .route("/terms", web::get().to(content::terms))
                    .route("/privacy", web::get().to(content::privacy))
                    .route(
                        "/vendor-terms/{vendor_id}",
                        web::get().to(content::vendor_terms),
                    ),
            )
            .service(
                web::scope("/bookings")
                    .route("", web::post().to(bookings::create))
                    .route("/{id}", web::get().to(bookings::get))
                    .route("/{id}", web::delete().to(bookings::close))
                    .route("/{id}/continue", web::post().to(bookings::continue_to_driver))
                    .route("/{id}/back", web::post().to(bookings::back))
                    .route(
                        "/{id}/extras/reload",
                        web::post().to(bookings::reload_extras),
                    )
                    .route(
                        "/{id}/extras/{name}/toggle",
                        web::post().to(bookings::toggle_extra),
                    )
                    .route("/{id}/driver", web::put().to(bookings::update_driver))
                    .route("/{id}/payment", web::post().to(bookings::open_payment))
                    .route(
                        "/{id}/payment/close",
                        web::post().to(bookings::close_payment),
                    )
                    .route(
                        "/{id}/payment/retry",
                        web::post().to(bookings::retry_payment),
                    )
                    .route("/{id}/confirm", web::post().to(bookings::confirm)),
            ),
    );
}
