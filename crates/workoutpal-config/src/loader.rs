use std::net::SocketAddr;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use crate::{AnyOrList, Config};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Parses the file, applies `DATABASE_URL` and `PORT` from the
    /// environment, then validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails, an
    /// environment override is malformed, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse configuration from TOML text, applying environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if TOML parsing fails, an environment override is
    /// malformed, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Override values from well-known environment variables
    ///
    /// Empty values are ignored.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(url) = var("DATABASE_URL") {
            self.database.url = SecretString::from(url);
        }

        if let Some(port) = var("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid PORT value `{port}`: {e}"))?;
            let address = self.server.listen_address_or_default();
            self.server.listen_address = Some(SocketAddr::new(address.ip(), port));
        }

        Ok(())
    }

    /// Validate that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error if the database settings cannot produce a working
    /// pool or the health path is not absolute
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_database_config()?;
        self.validate_health_config()?;
        self.validate_cors_config()?;
        Ok(())
    }

    fn validate_database_config(&self) -> anyhow::Result<()> {
        if self.database.url.expose_secret().is_empty() {
            anyhow::bail!("database.url must not be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be greater than 0");
        }

        if self.database.acquire_timeout == 0 {
            anyhow::bail!("database.acquire_timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_health_config(&self) -> anyhow::Result<()> {
        let health = &self.server.health;

        if health.enabled && !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/', got `{}`", health.path);
        }

        Ok(())
    }

    fn validate_cors_config(&self) -> anyhow::Result<()> {
        let Some(cors) = &self.server.cors else {
            return Ok(());
        };

        if cors.credentials
            && [&cors.origins, &cors.methods, &cors.headers]
                .iter()
                .any(|list| **list == AnyOrList::Any)
        {
            anyhow::bail!("server.cors.credentials requires explicit origins, methods and headers");
        }

        Ok(())
    }
}
