use actix_web::HttpResponse;

/// Both endpoints are called straight from the browser client, so every
/// response carries a permissive CORS policy.
pub const CORS_ALLOW_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");
pub const CORS_ALLOW_METHODS: (&str, &str) = ("Access-Control-Allow-Methods", "POST, OPTIONS");
pub const CORS_ALLOW_HEADERS: (&str, &str) = (
    "Access-Control-Allow-Headers",
    "authorization, x-client-info, apikey, content-type",
);

/// CORS preflight reply, shared by both endpoints
pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(CORS_ALLOW_ORIGIN)
        .insert_header(CORS_ALLOW_METHODS)
        .insert_header(CORS_ALLOW_HEADERS)
        .finish()
}
