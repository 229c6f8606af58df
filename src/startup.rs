use crate::chatbot::{EntityExtractor, IntentClassifier, LlmGateway, ResponseRouter};
use crate::configuration::Settings;
use crate::connectors;
use crate::routes;
use crate::services::{Catalog, PgCatalog};
use actix_cors::Cors;
use actix_web::{dev::Server, error, http, web, App, HttpServer};
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub async fn run(
    listener: TcpListener,
    pg_pool: Pool<Postgres>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let settings = web::Data::new(settings);
    let pg_pool_data = web::Data::new(pg_pool.clone());

    // Pattern tables compile once here and are read-only afterwards.
    let classifier = IntentClassifier::new()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
    let classifier = web::Data::new(classifier);

    let extractor = Arc::new(
        EntityExtractor::new().map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?,
    );
    let extractor_data = web::Data::from(extractor.clone());

    let ollama_connector = connectors::init_ollama(&settings.ollama);
    let catalog: Arc<dyn Catalog> = Arc::new(PgCatalog::new(pg_pool));
    let router = web::Data::new(ResponseRouter::new(
        catalog,
        LlmGateway::new(ollama_connector),
        extractor,
    ));

    let flutterwave_connector = connectors::init_flutterwave(&settings.connectors);
    let paypal_connector = connectors::init_paypal(&settings.connectors);

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let msg: String = match err {
            error::JsonPayloadError::Deserialize(err) => format!(
                "{{\"kind\":\"deserialize\",\"line\":{}, \"column\":{}, \"msg\":\"{}\"}}",
                err.line(),
                err.column(),
                err
            ),
            _ => format!("{{\"kind\":\"other\",\"msg\":\"{}\"}}", err),
        };
        error::InternalError::new(msg, http::StatusCode::BAD_REQUEST).into()
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .service(web::scope("/health_check").service(routes::health_check))
            .service(
                web::scope("/products")
                    .service(routes::catalog::categories_handler)
                    .service(routes::catalog::category_handler)
                    .service(routes::catalog::list_handler)
                    .service(routes::catalog::item_handler),
            )
            .service(
                web::scope("/cart")
                    .service(routes::cart::add_handler)
                    .service(routes::cart::stat_handler)
                    .service(routes::cart::item_in_cart_handler)
                    .service(routes::cart::quantity_handler)
                    .service(routes::cart::delete_handler)
                    .service(routes::cart::cart_handler),
            )
            .service(
                web::scope("/checkout")
                    .service(routes::checkout::initiate_handler)
                    .service(routes::checkout::callback_handler)
                    .service(routes::checkout::paypal_initiate_handler)
                    .service(routes::checkout::paypal_callback_handler),
            )
            .service(
                web::scope("/api/chat").service(
                    web::resource(["", "/"])
                        .route(web::post().to(routes::chat::handler))
                        .default_service(web::route().to(routes::chat::method_not_allowed)),
                ),
            )
            .app_data(json_config.clone())
            .app_data(pg_pool_data.clone())
            .app_data(settings.clone())
            .app_data(classifier.clone())
            .app_data(extractor_data.clone())
            .app_data(router.clone())
            .app_data(flutterwave_connector.clone())
            .app_data(paypal_connector.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
