use anyhow::{bail, Context, Result};
use axum::http::Method;
use std::env;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub cloudinary: CloudinaryConfig,
    pub cors: CorsConfig,
    pub upload: UploadConfig,
    pub read: ReadConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
    pub delivery_base_url: String,
    /// Build `https` delivery URLs
    pub secure: bool,
    pub signature_algorithm: SignatureAlgorithm,
}

// Hand-written so the secret never reaches the logs.
impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("api_base_url", &self.api_base_url)
            .field("delivery_base_url", &self.delivery_base_url)
            .field("secure", &self.secure)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            other => bail!("Unsupported signature algorithm: {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// `*` allows any origin
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<Method>,
    pub allowed_headers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub staging_dir: PathBuf,
    pub field_name: String,
    /// `None` disables the framework body limit entirely
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ReadConfig {
    pub verify_exists: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            cloudinary: CloudinaryConfig {
                cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
                api_key: required("CLOUDINARY_API_KEY")?,
                api_secret: required("CLOUDINARY_API_SECRET")?,
                api_base_url: env::var("CLOUDINARY_API_BASE_URL")
                    .unwrap_or_else(|_| "https://api.cloudinary.com".to_string()),
                delivery_base_url: env::var("CLOUDINARY_DELIVERY_BASE_URL")
                    .unwrap_or_else(|_| "https://res.cloudinary.com".to_string()),
                secure: env::var("CLOUDINARY_SECURE")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .context("CLOUDINARY_SECURE must be true or false")?,
                signature_algorithm: SignatureAlgorithm::parse(
                    &env::var("CLOUDINARY_SIGNATURE_ALGORITHM")
                        .unwrap_or_else(|_| "sha1".to_string()),
                )?,
            },
            cors: CorsConfig {
                allowed_origins: split_list(
                    &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| {
                        "http://localhost:3000,http://localhost:5173".to_string()
                    }),
                ),
                allowed_methods: parse_methods(
                    &env::var("CORS_ALLOWED_METHODS").unwrap_or_else(|_| "GET,POST".to_string()),
                )?,
                allowed_headers: split_list(
                    &env::var("CORS_ALLOWED_HEADERS")
                        .unwrap_or_else(|_| "Content-Type".to_string()),
                ),
            },
            upload: UploadConfig {
                staging_dir: env::var("UPLOAD_STAGING_DIR")
                    .unwrap_or_else(|_| "uploads".to_string())
                    .into(),
                field_name: env::var("UPLOAD_FIELD_NAME").unwrap_or_else(|_| "file".to_string()),
                max_body_bytes: env::var("UPLOAD_MAX_BODY_BYTES")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()
                    .context("UPLOAD_MAX_BODY_BYTES must be a byte count")?,
            },
            read: ReadConfig {
                verify_exists: env::var("READ_VERIFY_EXISTS")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .context("READ_VERIFY_EXISTS must be true or false")?,
            },
        })
    }
}

fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{} must be set", name),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_methods(raw: &str) -> Result<Vec<Method>> {
    split_list(raw)
        .iter()
        .map(|name| {
            let upper = name.to_ascii_uppercase();
            match upper.as_str() {
                "GET" | "POST" | "PUT" | "PATCH" | "DELETE" | "HEAD" | "OPTIONS" => {
                    Method::from_bytes(upper.as_bytes())
                        .with_context(|| format!("Invalid HTTP method: {}", name))
                }
                _ => bail!("Unsupported CORS method: {}", name),
            }
        })
        .collect()
}
