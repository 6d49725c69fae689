#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub supabase: Supabase,
    pub app: App,
    pub encryption: Encryption,
    pub gmail: Gmail,
    pub sendgrid: SendGrid,
    pub ai: Ai,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub jwt_secret: String,
}

/// Public base URL of the deployment, used for tracking links and the
/// OAuth redirect back into the settings page.
#[derive(Debug, Clone)]
pub struct App {
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Encryption {
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct Gmail {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct SendGrid {
    pub api_key: String,
    pub from_email: String,
    pub from_name: String,
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Ai {
    pub provider: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
}
