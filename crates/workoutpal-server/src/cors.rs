use http::Method;
use http::header::HeaderName;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use workoutpal_config::{AnyOrList, CorsConfig};

/// Build a Tower CORS layer from configuration
///
/// Values that do not parse as origins, methods or header names are
/// dropped with a warning.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_origin(match &config.origins {
            AnyOrList::Any => AllowOrigin::any(),
            AnyOrList::List(origins) => AllowOrigin::list(parse_all(origins, "origin")),
        })
        .allow_methods(match &config.methods {
            AnyOrList::Any => AllowMethods::any(),
            AnyOrList::List(methods) => AllowMethods::list(parse_all::<Method>(methods, "method")),
        })
        .allow_headers(match &config.headers {
            AnyOrList::Any => AllowHeaders::any(),
            AnyOrList::List(headers) => AllowHeaders::list(parse_all::<HeaderName>(headers, "header")),
        })
        .allow_credentials(config.credentials);

    match config.max_age_duration() {
        Some(duration) => layer.max_age(duration),
        None => layer,
    }
}

fn parse_all<T: std::str::FromStr>(values: &[String], kind: &str) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| {
            let parsed = value.parse().ok();
            if parsed.is_none() {
                tracing::warn!(kind, %value, "ignoring invalid CORS value");
            }
            parsed
        })
        .collect()
}
