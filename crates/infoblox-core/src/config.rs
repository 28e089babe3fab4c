//! Configuration types for the Infoblox WAPI client
//!
//! [`ProviderConfig`] is the user-facing configuration surface (normally
//! resolved from `INFOBLOX_*` environment variables). [`ProviderConfig::configure`]
//! gates the WAPI version and produces an immutable [`ClientConfig`] that every
//! transport is built from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the WAPI user name
pub const ENV_USER: &str = "INFOBLOX_USER";
/// Environment variable holding the WAPI password
pub const ENV_PASSWORD: &str = "INFOBLOX_PASSWORD";
/// Environment variable holding the grid master host name
pub const ENV_SERVER: &str = "INFOBLOX_SERVER";
/// Environment variable holding the protocol (`https` or `http`)
pub const ENV_PROTOCOL: &str = "INFOBLOX_PROTOCOL";
/// Environment variable holding the WAPI version
pub const ENV_VERSION: &str = "INFOBLOX_VERSION";
/// Environment variable allowing unverifiable TLS certificates
pub const ENV_ALLOW_UNVERIFIED_SSL: &str = "INFOBLOX_ALLOW_UNVERIFIED_SSL";
/// Environment variable holding the per-request timeout in seconds
pub const ENV_TIMEOUT: &str = "INFOBLOX_TIMEOUT";

/// Oldest WAPI version this crate speaks
pub const MINIMUM_WAPI_VERSION: WapiVersion = WapiVersion {
    major: 1,
    minor: 2,
    patch: 1,
};

/// Provider configuration, as declared by the user
///
/// # Security
///
/// The Debug implementation does NOT expose the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// WAPI user name
    pub user: String,

    /// WAPI password
    pub password: String,

    /// Grid master host name (optionally with port)
    pub server: String,

    /// `https` or `http`
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// WAPI version string, `major.minor.patch`
    #[serde(default = "default_version")]
    pub version: String,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub allow_unverified_ssl: bool,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("user", &self.user)
            .field("password", &"<REDACTED>")
            .field("server", &self.server)
            .field("protocol", &self.protocol)
            .field("version", &self.version)
            .field("allow_unverified_ssl", &self.allow_unverified_ssl)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration with default protocol, version, TLS policy and timeout
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        server: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            server: server.into(),
            protocol: default_protocol(),
            version: default_version(),
            allow_unverified_ssl: false,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Load configuration from `INFOBLOX_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Missing or empty optional variables fall back to their defaults;
    /// missing required ones and unparsable values are configuration errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::config(format!("{} is required", key)))
        };

        let allow_unverified_ssl = match optional(ENV_ALLOW_UNVERIFIED_SSL) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                Error::config(format!(
                    "{} must be a boolean (true/false/1/0). Got: {}",
                    ENV_ALLOW_UNVERIFIED_SSL, raw
                ))
            })?,
            None => false,
        };

        let timeout_secs = match optional(ENV_TIMEOUT) {
            Some(raw) => raw.trim().parse().map_err(|_| {
                Error::config(format!(
                    "{} must be a whole number of seconds. Got: {}",
                    ENV_TIMEOUT, raw
                ))
            })?,
            None => default_timeout_secs(),
        };

        Ok(Self {
            user: required(ENV_USER)?,
            password: required(ENV_PASSWORD)?,
            server: required(ENV_SERVER)?,
            protocol: optional(ENV_PROTOCOL).unwrap_or_else(default_protocol),
            version: optional(ENV_VERSION).unwrap_or_else(default_version),
            allow_unverified_ssl,
            timeout_secs,
        })
    }

    /// Set the WAPI version string
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the protocol
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Allow or forbid unverifiable TLS certificates
    pub fn with_allow_unverified_ssl(mut self, allow: bool) -> Self {
        self.allow_unverified_ssl = allow;
        self
    }

    /// Set the per-request timeout in seconds
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate the configuration without building a client configuration
    pub fn validate(&self) -> Result<()> {
        if self.user.is_empty() {
            return Err(Error::config("Infoblox user cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(Error::config("Infoblox password cannot be empty"));
        }
        if self.server.is_empty() {
            return Err(Error::config("Infoblox server cannot be empty"));
        }
        match self.protocol.as_str() {
            "https" | "http" => {}
            other => {
                return Err(Error::config(format!(
                    "Infoblox protocol must be https or http. Got: {}",
                    other
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(Error::config("Infoblox timeout must be > 0 seconds"));
        }

        parse_supported_version(&self.version).map(|_| ())
    }

    /// Gate the WAPI version and build the immutable client configuration
    pub fn configure(&self) -> Result<ClientConfig> {
        self.validate()?;
        let version = parse_supported_version(&self.version)?;

        let endpoint = format!(
            "{}://{}/wapi/v{}",
            self.protocol, self.server, self.version
        );

        if self.allow_unverified_ssl {
            tracing::warn!(
                "TLS certificate verification disabled for {}",
                endpoint
            );
        }

        Ok(ClientConfig {
            endpoint,
            user: self.user.clone(),
            password: self.password.clone(),
            version,
            insecure: self.allow_unverified_ssl,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Immutable client configuration shared by every request
///
/// Produced once by [`ProviderConfig::configure`] and handed to a transport.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// `{protocol}://{server}/wapi/v{version}`
    pub endpoint: String,
    /// Basic auth user
    pub user: String,
    /// Basic auth password
    pub password: String,
    /// Parsed WAPI version
    pub version: WapiVersion,
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("password", &"<REDACTED>")
            .field("version", &self.version)
            .field("insecure", &self.insecure)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// WAPI version triple, ordered lexicographically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WapiVersion {
    /// Major component
    pub major: u32,
    /// Minor component
    pub minor: u32,
    /// Patch component
    pub patch: u32,
}

impl WapiVersion {
    /// Whether this crate can talk to this WAPI version
    pub fn is_supported(&self) -> bool {
        *self >= MINIMUM_WAPI_VERSION
    }
}

impl fmt::Display for WapiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for WapiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::config(format!("Invalid Infoblox version {}", s));

        let mut parts = s.split('.');
        let mut next = || -> Result<u32> {
            parts
                .next()
                .and_then(|p| p.parse().ok())
                .ok_or_else(invalid)
        };
        let version = WapiVersion {
            major: next()?,
            minor: next()?,
            patch: next()?,
        };

        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

fn parse_supported_version(raw: &str) -> Result<WapiVersion> {
    let unsupported = || {
        Error::config(format!(
            "Unsupported Infoblox version {}. Infoblox WAPI {} or higher is required",
            raw, MINIMUM_WAPI_VERSION
        ))
    };

    let version: WapiVersion = raw.parse().map_err(|_| unsupported())?;
    if !version.is_supported() {
        return Err(unsupported());
    }
    Ok(version)
}

/// Boolean spellings accepted in environment variables
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn default_protocol() -> String {
    "https".to_string()
}

fn default_version() -> String {
    MINIMUM_WAPI_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base() -> ProviderConfig {
        ProviderConfig::new("admin", "secret_password_123", "gm.example.com")
    }

    #[test]
    fn test_defaults() {
        let config = base();
        assert_eq!(config.protocol, "https");
        assert_eq!(config.version, "1.2.1");
        assert!(!config.allow_unverified_ssl);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_configure_builds_endpoint() {
        let client = base().with_version("2.7.3").configure().unwrap();

        assert_eq!(client.endpoint, "https://gm.example.com/wapi/v2.7.3");
        assert_eq!(
            client.version,
            WapiVersion {
                major: 2,
                minor: 7,
                patch: 3
            }
        );
        assert_eq!(client.timeout, Duration::from_secs(30));
        assert!(!client.insecure);
    }

    #[test]
    fn test_supported_versions() {
        for version in ["1.2.1", "1.2.10", "1.3.0", "1.10.0", "2.0.0", "2.12.3"] {
            assert!(
                base().with_version(version).configure().is_ok(),
                "{} should be supported",
                version
            );
        }
    }

    #[test]
    fn test_unsupported_versions() {
        for version in ["0.9.9", "1.0.0", "1.1.9", "1.2.0", "0.99.99"] {
            let err = base().with_version(version).configure().unwrap_err();
            assert!(matches!(err, Error::Config(_)));
            let msg = err.to_string();
            assert!(msg.contains(version), "{} not named in: {}", version, msg);
            assert!(msg.contains("1.2.1"), "minimum not named in: {}", msg);
        }
    }

    #[test]
    fn test_malformed_versions_are_config_errors() {
        for version in ["", "1", "1.2", "1.2.x", "v1.2.1", "1.2.1.4", "-1.2.1"] {
            let err = base().with_version(version).configure().unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{:?}", version);
        }
    }

    #[test]
    fn test_version_ordering_is_lexicographic() {
        let v = |s: &str| s.parse::<WapiVersion>().unwrap();
        assert!(v("1.2.1") < v("1.2.2"));
        assert!(v("1.2.9") < v("1.3.0"));
        assert!(v("1.9.9") < v("2.0.0"));
        assert!(v("1.10.0") > v("1.9.0"));
        assert!(!v("1.1.100").is_supported());
    }

    #[test]
    fn test_invalid_protocol() {
        let err = base().with_protocol("ftp").configure().unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(ProviderConfig::new("", "pw", "gm").validate().is_err());
        assert!(ProviderConfig::new("u", "", "gm").validate().is_err());
        assert!(ProviderConfig::new("u", "pw", "").validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(base().with_timeout_secs(0).validate().is_err());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = ProviderConfig::from_lookup(lookup_from(&[
            (ENV_USER, "admin"),
            (ENV_PASSWORD, "pw"),
            (ENV_SERVER, "gm.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.protocol, "https");
        assert_eq!(config.version, "1.2.1");
        assert!(!config.allow_unverified_ssl);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_lookup_empty_optionals_use_defaults() {
        let config = ProviderConfig::from_lookup(lookup_from(&[
            (ENV_USER, "admin"),
            (ENV_PASSWORD, "pw"),
            (ENV_SERVER, "gm.example.com"),
            (ENV_PROTOCOL, ""),
            (ENV_VERSION, ""),
            (ENV_ALLOW_UNVERIFIED_SSL, ""),
            (ENV_TIMEOUT, ""),
        ]))
        .unwrap();

        assert_eq!(config.protocol, "https");
        assert_eq!(config.version, "1.2.1");
        assert!(!config.allow_unverified_ssl);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.configure().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = ProviderConfig::from_lookup(lookup_from(&[
            (ENV_USER, "admin"),
            (ENV_PASSWORD, "pw"),
            (ENV_SERVER, "10.1.1.1:8443"),
            (ENV_PROTOCOL, "http"),
            (ENV_VERSION, "2.5.0"),
            (ENV_ALLOW_UNVERIFIED_SSL, "true"),
            (ENV_TIMEOUT, "5"),
        ]))
        .unwrap();

        let client = config.configure().unwrap();
        assert_eq!(client.endpoint, "http://10.1.1.1:8443/wapi/v2.5.0");
        assert!(client.insecure);
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_missing_required() {
        let err = ProviderConfig::from_lookup(lookup_from(&[
            (ENV_USER, "admin"),
            (ENV_SERVER, "gm"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ENV_PASSWORD));
    }

    #[test]
    fn test_from_lookup_bad_values() {
        let vars = [
            (ENV_USER, "admin"),
            (ENV_PASSWORD, "pw"),
            (ENV_SERVER, "gm"),
            (ENV_ALLOW_UNVERIFIED_SSL, "yes please"),
        ];
        assert!(ProviderConfig::from_lookup(lookup_from(&vars)).is_err());

        let vars = [
            (ENV_USER, "admin"),
            (ENV_PASSWORD, "pw"),
            (ENV_SERVER, "gm"),
            (ENV_TIMEOUT, "thirty"),
        ];
        assert!(ProviderConfig::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_password_not_exposed_in_debug() {
        let config = base();
        let client = config.configure().unwrap();

        for debug_str in [format!("{:?}", config), format!("{:?}", client)] {
            assert!(!debug_str.contains("secret_password_123"));
            assert!(debug_str.contains("<REDACTED>"));
        }
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{"user":"admin","password":"pw","server":"gm.example.com"}"#,
        )
        .unwrap();
        assert_eq!(config.version, "1.2.1");
        assert_eq!(config.timeout_secs, 30);
    }
}
