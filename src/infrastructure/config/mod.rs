use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub aws_region: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Pipeline
    pub audiobook_bucket: String,
    pub task_queue_url: String,
    pub audio_joiner_endpoint: String,
    pub audio_transcoder_endpoint: String,
    // Article source & delivery
    pub blog_base_url: String,
    pub cdn_base_url: String,
    // Clova CSS
    pub clova_client_id: String,
    pub clova_client_secret: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Default when LOG_FORMAT is unset: structured logs in production,
    /// human-readable logs everywhere else.
    pub fn default_for(environment: &Environment) -> Self {
        match environment {
            Environment::Production => LogFormat::Json,
            Environment::Development => LogFormat::Pretty,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .as_str()
        {
            "production" => Environment::Production,
            _ => Environment::Development,
        };

        let log_format = match env::var("LOG_FORMAT") {
            Ok(value) if value == "json" => LogFormat::Json,
            Ok(_) => LogFormat::Pretty,
            Err(_) => LogFormat::default_for(&environment),
        };

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "ap-northeast-2".to_string()),
            environment,
            log_format,
            audiobook_bucket: env::var("AUDIOBOOK_BUCKET")?,
            task_queue_url: env::var("AUDIOBOOK_TASK_QUEUE_URL")?,
            audio_joiner_endpoint: env::var("AUDIO_JOINER_ENDPOINT")?,
            audio_transcoder_endpoint: env::var("AUDIO_TRANSCODER_ENDPOINT")?,
            blog_base_url: env::var("BLOG_BASE_URL")
                .unwrap_or_else(|_| "http://blog.weirdx.io".to_string()),
            cdn_base_url: env::var("AUDIOBOOK_CDN_BASE_URL")?,
            clova_client_id: env::var("CLOVA_CSS_CLIENT_ID")?,
            clova_client_secret: env::var("CLOVA_CSS_CLIENT_SECRET")?,
        };

        Ok(config)
    }
}
