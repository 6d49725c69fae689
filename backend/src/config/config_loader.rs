use anyhow::{Ok, Result};

use super::config_model::DotEnvyConfig;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = super::config_model::BackendServer {
        port: std::env::var("SERVER_PORT_BACKEND")
            .expect("SERVER_PORT_BACKEND is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = super::config_model::Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let supabase = super::config_model::Supabase {
        jwt_secret: std::env::var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET is invalid"),
    };

    let app = super::config_model::App {
        base_url: std::env::var("APP_BASE_URL").expect("APP_BASE_URL is invalid"),
    };

    let encryption = super::config_model::Encryption {
        key: std::env::var("ENCRYPTION_KEY").expect("ENCRYPTION_KEY is invalid"),
    };

    let gmail = super::config_model::Gmail {
        client_id: std::env::var("GOOGLE_CLIENT_ID").expect("GOOGLE_CLIENT_ID is invalid"),
        client_secret: std::env::var("GOOGLE_CLIENT_SECRET")
            .expect("GOOGLE_CLIENT_SECRET is invalid"),
        redirect_uri: std::env::var("GOOGLE_REDIRECT_URI")
            .expect("GOOGLE_REDIRECT_URI is invalid"),
    };

    let sendgrid = super::config_model::SendGrid {
        api_key: std::env::var("SENDGRID_API_KEY").expect("SENDGRID_API_KEY is invalid"),
        from_email: std::env::var("SENDGRID_FROM_EMAIL")
            .expect("SENDGRID_FROM_EMAIL is invalid"),
        from_name: std::env::var("SENDGRID_FROM_NAME")
            .unwrap_or_else(|_| "Outreach".to_string()),
        webhook_secret: std::env::var("SENDGRID_WEBHOOK_SECRET").ok(),
    };

    let ai = super::config_model::Ai {
        provider: std::env::var("AI_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
        openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
        openai_model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
        anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
        anthropic_model: std::env::var("ANTHROPIC_MODEL")
            .unwrap_or_else(|_| "claude-3-sonnet-20240229".to_string()),
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
        app,
        encryption,
        gmail,
        sendgrid,
        ai,
    })
}
