use std::env;

pub const DEFAULT_EXCHANGE_RATE_URL: &str = "https://open.er-api.com/v6/latest/USD";

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "https://artista-portal-client.vercel.app",
    "https://artista.skynetsilicon.com",
];

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,
    pub jwt_cookie_name: String,
    pub jwt_expiry_days: i64,
    pub cookie_secure: bool,

    pub exchange_rate_url: String,
    pub exchange_rate_timeout_secs: u64,
    // used only when the live rate cannot be fetched
    pub exchange_rate_fallback: Option<f64>,

    pub allowed_origins: Vec<String>,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "artista".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-dev-secret".to_string());
    let jwt_cookie_name = env::var("JWT_COOKIE_NAME").unwrap_or_else(|_| "auth".to_string());
    let jwt_expiry_days = env::var("JWT_EXPIRY_DAYS")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|d| *d > 0)
        .unwrap_or(7);
    let cookie_secure = env::var("COOKIE_SECURE")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false);

    let exchange_rate_url = env::var("EXCHANGE_RATE_URL")
        .unwrap_or_else(|_| DEFAULT_EXCHANGE_RATE_URL.to_string());
    let exchange_rate_timeout_secs = env::var("EXCHANGE_RATE_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let exchange_rate_fallback = env::var("EXCHANGE_RATE_FALLBACK")
        .ok()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|r| r.is_finite() && *r > 0.0);

    let allowed_origins = match env::var("ALLOWED_ORIGINS") {
        Ok(raw) => parse_origins(&raw),
        Err(_) => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
    };

    Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        jwt_secret,
        jwt_cookie_name,
        jwt_expiry_days,
        cookie_secure,
        exchange_rate_url,
        exchange_rate_timeout_secs,
        exchange_rate_fallback,
        allowed_origins,
    }
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}
