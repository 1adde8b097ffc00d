//! Daemon configuration.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context as _;

/// Gateway configuration, loaded from a JSON file.
///
/// `callback_url` is the wildcard route: any recipient domain without
/// an explicit entry in `routes` forwards there. Leave it out to
/// accept only the domains listed in `routes`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Address the SMTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Hostname announced in the greeting and Received stamps.
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Wildcard callback URL.
    #[serde(default)]
    pub callback_url: Option<String>,

    /// Per-domain callback URLs, keyed by recipient domain.
    #[serde(default)]
    pub routes: HashMap<String, String>,

    /// Shared-secret token posted along with every message.
    #[serde(default)]
    pub token: Option<String>,
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// neither a wildcard nor a per-domain route is configured.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;

        if config.callback_url.is_none() && config.routes.is_empty() {
            anyhow::bail!("config must set callback_url or at least one route");
        }

        Ok(config)
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 25))
}

fn default_hostname() -> String {
    "localhost".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> tempfile_path::TempConfig {
        tempfile_path::TempConfig::new(contents)
    }

    /// Tiny self-cleaning temp file helper for config tests.
    mod tempfile_path {
        use std::path::PathBuf;

        pub struct TempConfig {
            path: PathBuf,
        }

        impl TempConfig {
            #[allow(clippy::unwrap_used)]
            pub fn new(contents: &str) -> Self {
                let mut path = std::env::temp_dir();
                path.push(format!(
                    "mailhook-config-{}-{:?}.json",
                    std::process::id(),
                    std::thread::current().id()
                ));
                std::fs::write(&path, contents).unwrap();
                Self { path }
            }

            pub fn path(&self) -> &std::path::Path {
                &self.path
            }
        }

        impl Drop for TempConfig {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.path);
            }
        }
    }

    #[test]
    fn test_minimal_config() {
        let file = write_config(r#"{"callback_url": "http://hook.test/cb"}"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.listen_addr.port(), 25);
        assert_eq!(config.hostname, "localhost");
        assert_eq!(config.callback_url.as_deref(), Some("http://hook.test/cb"));
        assert!(config.routes.is_empty());
        assert!(config.token.is_none());
    }

    #[test]
    fn test_full_config() {
        let file = write_config(
            r#"{
                "listen_addr": "127.0.0.1:2525",
                "hostname": "mx.example.com",
                "callback_url": "http://hook.test/cb",
                "routes": {"special.example.com": "http://hook.test/special"},
                "token": "s3cret"
            }"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.listen_addr.port(), 2525);
        assert_eq!(config.hostname, "mx.example.com");
        assert_eq!(
            config.routes.get("special.example.com").map(String::as_str),
            Some("http://hook.test/special")
        );
        assert_eq!(config.token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_config_without_any_route_rejected() {
        let file = write_config(r#"{"hostname": "mx.example.com"}"#);
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/mailhook.json")).is_err());
    }
}
