//! Runtime configuration, read from the environment.
//!
//! | Variable          | Default                 |
//! |-------------------|-------------------------|
//! | `BIND_ADDR`       | `0.0.0.0:8080`          |
//! | `JWT_SECRET`      | `dev-secret` (warned)   |
//! | `PUBLIC_BASE_URL` | `http://localhost:8080` |
//! | `DATABASE_URL`    | unset: in-memory stores |
//! | `IMAGE_DIR`       | unset: in-memory images |

use std::path::PathBuf;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_JWT_SECRET: &str = "dev-secret";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// Origin used for image URLs and QR targets.
    pub public_base_url: String,
    pub database_url: Option<String>,
    pub image_dir: Option<PathBuf>,
}

impl ApiConfig {
    /// In-memory configuration with the given signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            jwt_secret: jwt_secret.into(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            database_url: None,
            image_dir: None,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEFAULT_JWT_SECRET.to_string()
        });

        Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            public_base_url: get("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
            database_url: get("DATABASE_URL"),
            image_dir: get("IMAGE_DIR").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ApiConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let cfg = config_from(&[("DATABASE_URL", "  ")]);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.jwt_secret, "dev-secret");
        assert_eq!(cfg.public_base_url, "http://localhost:8080");
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.image_dir, None);
    }

    #[test]
    fn reads_all_variables() {
        let cfg = config_from(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("PUBLIC_BASE_URL", "https://shop.example.com/"),
            ("DATABASE_URL", "postgres://localhost/consign"),
            ("IMAGE_DIR", "/var/lib/consign"),
        ]);
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.public_base_url, "https://shop.example.com");
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/consign"));
        assert_eq!(cfg.image_dir, Some(PathBuf::from("/var/lib/consign")));
    }
}
