// src/config.rs
// =============================================================================
// Runtime configuration: command-line flags plus the GitHub credential from
// the environment.
//
// Credential lookup order:
//   1. PAT_READ_ONLY
//   2. GITHUB_TOKEN
// Empty values are ignored. With no credential we still run, just with the
// much lower unauthenticated search rate limit.
// =============================================================================

use std::env;
use std::path::PathBuf;
use url::Url;

use crate::cli::Cli;
use crate::github::StatsPolicy;

const TOKEN_VARS: [&str; 2] = ["PAT_READ_ONLY", "GITHUB_TOKEN"];

#[derive(Debug, Clone)]
pub struct Config {
    pub path: PathBuf,
    pub section: String,
    pub policy: StatsPolicy,
    pub api_base: Url,
    pub token: Option<String>,
    pub dry_run: bool,
    pub json: bool,
}

impl Config {
    /// Build the configuration from parsed flags and the process environment
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        Self::from_parts(cli, |name| env::var(name).ok())
    }

    fn from_parts(cli: Cli, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base = Url::parse(&cli.api_url).map_err(|source| ConfigError::InvalidApiUrl {
            value: cli.api_url.clone(),
            source,
        })?;
        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue("api-url"));
        }

        for (name, value) in [
            ("section", &cli.section),
            ("author", &cli.author),
            ("org", &cli.org),
            ("org-search", &cli.org_search),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue(name));
            }
        }

        let token = TOKEN_VARS
            .iter()
            .filter_map(|&name| lookup(name))
            .find(|value| !value.trim().is_empty());

        Ok(Self {
            path: cli.path,
            section: cli.section,
            policy: StatsPolicy {
                author: cli.author,
                sentinel_org: cli.org,
                org_search: cli.org_search,
            },
            api_base,
            token,
            dry_run: cli.dry_run,
            json: cli.json,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API URL '{value}': {source}")]
    InvalidApiUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid value for --{0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["readme-stats"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_parts(cli(&[]), no_env).unwrap();
        assert_eq!(config.api_base.as_str(), "https://api.github.com/");
        assert_eq!(config.policy.author, "johnsaigle");
        assert_eq!(config.policy.sentinel_org, "m0-foundation");
        assert_eq!(config.token, None);
    }

    #[test]
    fn test_token_prefers_pat_read_only() {
        let config = Config::from_parts(cli(&[]), |name| match name {
            "PAT_READ_ONLY" => Some("pat".to_string()),
            "GITHUB_TOKEN" => Some("gh".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("pat"));
    }

    #[test]
    fn test_token_skips_empty_values() {
        let config = Config::from_parts(cli(&[]), |name| match name {
            "PAT_READ_ONLY" => Some("  ".to_string()),
            "GITHUB_TOKEN" => Some("gh".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("gh"));
    }

    #[test]
    fn test_invalid_api_url() {
        let result = Config::from_parts(cli(&["--api-url", "not a url"]), no_env);
        assert!(matches!(result, Err(ConfigError::InvalidApiUrl { .. })));

        let result = Config::from_parts(cli(&["--api-url", "ftp://example.com"]), no_env);
        assert!(matches!(result, Err(ConfigError::InvalidValue("api-url"))));
    }

    #[test]
    fn test_empty_author_rejected() {
        let result = Config::from_parts(cli(&["--author", ""]), no_env);
        assert!(matches!(result, Err(ConfigError::InvalidValue("author"))));
    }
}
