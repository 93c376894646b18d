//! Zoho Books Authentication
//!
//! Resolves the organization, OAuth access token and API domain from module
//! parameters, environment variables, or the user config file.

use crate::config::Config;
use crate::error::{Error, Result};
use std::fmt;
use url::Url;

/// Default data-center domain for the Zoho APIs
pub const DEFAULT_API_DOMAIN: &str = "https://www.zohoapis.com";

pub const ENV_ORGANIZATION_ID: &str = "ZOHO_ORGANIZATION_ID";
pub const ENV_ACCESS_TOKEN: &str = "ZOHO_ACCESS_TOKEN";
pub const ENV_API_DOMAIN: &str = "ZOHO_API_DOMAIN";

/// Credential values as supplied to a module (all optional)
#[derive(Debug, Clone, Default)]
pub struct CredentialParams {
    pub organization_id: Option<String>,
    pub access_token: Option<String>,
    pub api_domain: Option<String>,
}

/// Resolved credentials, shared by every request in one invocation
#[derive(Clone)]
pub struct Credentials {
    organization_id: String,
    access_token: String,
    api_domain: Url,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("organization_id", &self.organization_id)
            .field("access_token", &"********")
            .field("api_domain", &self.api_domain.as_str())
            .finish()
    }
}

impl Credentials {
    /// Build credentials from already-resolved values
    pub fn new(organization_id: &str, access_token: &str, api_domain: &str) -> Result<Self> {
        let organization_id = organization_id.trim();
        if !validate_organization_id(organization_id) {
            return Err(Error::config(format!(
                "organization_id must be numeric, got '{}'",
                organization_id
            )));
        }

        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(Error::config("access_token must not be empty"));
        }

        Ok(Self {
            organization_id: organization_id.to_string(),
            access_token: access_token.to_string(),
            api_domain: parse_api_domain(api_domain)?,
        })
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// Value for the `Authorization` header
    pub fn auth_header(&self) -> String {
        format!("Zoho-oauthtoken {}", self.access_token)
    }

    /// Root of the Books v3 API, without a trailing slash
    pub fn base_url(&self) -> String {
        format!("{}/books/v3", self.api_domain.as_str().trim_end_matches('/'))
    }
}

/// Resolve credentials using the process environment
pub fn resolve(params: &CredentialParams, config: &Config) -> Result<Credentials> {
    resolve_with(params, config, |key| std::env::var(key).ok())
}

/// Resolve credentials: explicit parameter > environment > config file > default
pub fn resolve_with<F>(params: &CredentialParams, config: &Config, env: F) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |explicit: &Option<String>, key: &str| {
        non_empty(explicit.clone()).or_else(|| non_empty(env(key)))
    };

    let organization_id = pick(&params.organization_id, ENV_ORGANIZATION_ID)
        .or_else(|| non_empty(config.organization_id.clone()))
        .ok_or_else(|| {
            Error::config(format!(
                "organization_id is required either as parameter or {} environment variable",
                ENV_ORGANIZATION_ID
            ))
        })?;

    // Tokens are never read from the config file
    let access_token = pick(&params.access_token, ENV_ACCESS_TOKEN).ok_or_else(|| {
        Error::config(format!(
            "access_token is required either as parameter or {} environment variable",
            ENV_ACCESS_TOKEN
        ))
    })?;

    let api_domain = pick(&params.api_domain, ENV_API_DOMAIN)
        .or_else(|| non_empty(config.api_domain.clone()))
        .unwrap_or_else(|| DEFAULT_API_DOMAIN.to_string());

    tracing::debug!(
        "Resolved credentials for organization {} at {}",
        organization_id,
        api_domain
    );

    Credentials::new(&organization_id, &access_token, &api_domain)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Zoho organization IDs are plain digit strings
fn validate_organization_id(organization_id: &str) -> bool {
    !organization_id.is_empty() && organization_id.chars().all(|c| c.is_ascii_digit())
}

fn parse_api_domain(api_domain: &str) -> Result<Url> {
    let url = Url::parse(api_domain.trim())
        .map_err(|e| Error::config(format!("api_domain '{}' is not a valid URL: {}", api_domain, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(Error::config(format!(
            "api_domain must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(Error::config(format!("api_domain '{}' has no host", api_domain)));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_explicit_params_win_over_environment() {
        let params = CredentialParams {
            organization_id: Some("111".into()),
            access_token: Some("param-token".into()),
            api_domain: Some("https://www.zohoapis.eu".into()),
        };
        let env = env_of(&[
            (ENV_ORGANIZATION_ID, "222"),
            (ENV_ACCESS_TOKEN, "env-token"),
            (ENV_API_DOMAIN, "https://www.zohoapis.in"),
        ]);

        let creds = resolve_with(&params, &Config::default(), env).unwrap();
        assert_eq!(creds.organization_id(), "111");
        assert_eq!(creds.auth_header(), "Zoho-oauthtoken param-token");
        assert_eq!(creds.base_url(), "https://www.zohoapis.eu/books/v3");
    }

    #[test]
    fn test_environment_fills_missing_params() {
        let env = env_of(&[(ENV_ORGANIZATION_ID, "222"), (ENV_ACCESS_TOKEN, "env-token")]);

        let creds = resolve_with(&CredentialParams::default(), &Config::default(), env).unwrap();
        assert_eq!(creds.organization_id(), "222");
        assert_eq!(creds.base_url(), "https://www.zohoapis.com/books/v3");
    }

    #[test]
    fn test_config_file_supplies_organization_and_domain() {
        let config = Config {
            organization_id: Some("333".into()),
            api_domain: Some("https://www.zohoapis.com.au/".into()),
        };
        let env = env_of(&[(ENV_ACCESS_TOKEN, "env-token")]);

        let creds = resolve_with(&CredentialParams::default(), &config, env).unwrap();
        assert_eq!(creds.organization_id(), "333");
        assert_eq!(creds.base_url(), "https://www.zohoapis.com.au/books/v3");
    }

    #[test]
    fn test_missing_token_is_configuration_error() {
        let params = CredentialParams {
            organization_id: Some("111".into()),
            ..Default::default()
        };

        let err = resolve_with(&params, &Config::default(), env_of(&[])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains(ENV_ACCESS_TOKEN));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let params = CredentialParams {
            organization_id: Some("111".into()),
            access_token: Some("   ".into()),
            api_domain: None,
        };

        let err = resolve_with(&params, &Config::default(), env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("access_token is required"));
    }

    #[test]
    fn test_invalid_domain_rejected() {
        assert!(Credentials::new("111", "t", "ftp://books.zoho.com").is_err());
        assert!(Credentials::new("111", "t", "not a url").is_err());
    }

    #[test]
    fn test_organization_id_must_be_numeric() {
        assert!(Credentials::new("org-1", "t", DEFAULT_API_DOMAIN).is_err());
        assert!(Credentials::new("123456789", "t", DEFAULT_API_DOMAIN).is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = Credentials::new("111", "secret-token", DEFAULT_API_DOMAIN).unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret-token"));
    }
}
