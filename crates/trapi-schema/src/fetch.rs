//! # Schema Retrieval
//!
//! Retrieves TRAPI schema documents and the release and branch lists of
//! the schema repository.
//!
//! ## Sources
//!
//! | Selector | Document |
//! |---|---|
//! | `Released(v)` | `{raw}/{org}/{repo}/v{v}/TranslatorReasonerAPI.yaml` |
//! | `Branch(b)` | `{raw}/{org}/{repo}/{b}/TranslatorReasonerAPI.yaml` |
//! | `FilePath(p)` | local file `p` |
//!
//! Release tags come from `{api}/repos/{org}/{repo}/releases`; only tags
//! of the form `v<version>` are kept, with the `v` stripped.
//!
//! ## Crate Policy
//!
//! Every request carries the configured timeout. Nothing is retried; a
//! failed request is returned as a [`FetchError`] naming the URL.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{FetchError, SchemaError};
use crate::validate::{SchemaSource, TrapiSchema};
use crate::version::{VersionResolver, VersionSelector};

/// File name of the TRAPI OpenAPI document in the schema repository.
pub const SCHEMA_FILE_NAME: &str = "TranslatorReasonerAPI.yaml";

const PAGE_SIZE: &str = "100";

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
}

/// Blocking client for the schema repository.
#[derive(Debug, Clone)]
pub struct SchemaFetcher {
    http: reqwest::blocking::Client,
    config: FetchConfig,
}

impl SchemaFetcher {
    /// Build a fetcher from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("trapi-schema/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// URL of the schema document for a release or branch; `None` for
    /// local files.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the URL cannot be joined.
    pub fn schema_url(&self, selector: &VersionSelector) -> Result<Option<Url>, FetchError> {
        let Some(git_ref) = selector.git_ref() else {
            return Ok(None);
        };
        let path = format!(
            "{}/{}/{git_ref}/{SCHEMA_FILE_NAME}",
            self.config.organization, self.config.repository
        );
        self.config
            .raw_base_url
            .join(&path)
            .map(Some)
            .map_err(|_| FetchError::InvalidUrl(path))
    }

    /// Schema document text for a selector.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Io`] for unreadable local files and the
    /// transport variants for remote documents.
    pub fn fetch_document(&self, selector: &VersionSelector) -> Result<String, FetchError> {
        if let VersionSelector::FilePath(path) = selector {
            tracing::debug!(path = %path.display(), "reading local TRAPI schema");
            return std::fs::read_to_string(path).map_err(|source| FetchError::Io {
                path: path.display().to_string(),
                source,
            });
        }
        let url = self
            .schema_url(selector)?
            .ok_or_else(|| FetchError::InvalidUrl(selector.to_string()))?;
        tracing::info!(version = %selector, url = %url, "fetching TRAPI schema");
        let response = self.get(&url)?;
        response.text().map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Published release versions, `v` prefix stripped, in listing order.
    ///
    /// # Errors
    ///
    /// Returns a transport or decode error.
    pub fn fetch_releases(&self) -> Result<Vec<String>, FetchError> {
        let releases: Vec<Release> = self.get_json("releases")?;
        Ok(releases
            .into_iter()
            .filter_map(|r| r.tag_name.strip_prefix('v').map(str::to_string))
            .collect())
    }

    /// Branch names of the schema repository.
    ///
    /// # Errors
    ///
    /// Returns a transport or decode error.
    pub fn fetch_branches(&self) -> Result<Vec<String>, FetchError> {
        let branches: Vec<Branch> = self.get_json("branches")?;
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    /// A resolver over the live release and branch lists.
    ///
    /// # Errors
    ///
    /// Returns the first retrieval error.
    pub fn resolver(&self) -> Result<VersionResolver, FetchError> {
        Ok(VersionResolver::new(self.fetch_releases()?, self.fetch_branches()?))
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, listing: &str) -> Result<T, FetchError> {
        let path = format!(
            "repos/{}/{}/{listing}",
            self.config.organization, self.config.repository
        );
        let mut url = self
            .config
            .api_base_url
            .join(&path)
            .map_err(|_| FetchError::InvalidUrl(path))?;
        url.query_pairs_mut().append_pair("per_page", PAGE_SIZE);
        tracing::debug!(url = %url, "listing schema repository");
        let response = self.get(&url)?;
        response.json().map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn get(&self, url: &Url) -> Result<reqwest::blocking::Response, FetchError> {
        let response = self.http.get(url.clone()).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.config.timeout_secs,
                }
            } else {
                FetchError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::warn!(url = %url, status, "schema repository request failed");
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}

impl SchemaSource for SchemaFetcher {
    fn load(&self, selector: &VersionSelector) -> Result<TrapiSchema, SchemaError> {
        let text = self.fetch_document(selector)?;
        TrapiSchema::from_yaml_str(&text, selector.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::SemVer;
    use std::io::Write;
    use std::path::PathBuf;

    fn fetcher() -> SchemaFetcher {
        SchemaFetcher::new(FetchConfig::local_mock(9200).unwrap()).unwrap()
    }

    #[test]
    fn release_url_uses_tag() {
        let url = fetcher()
            .schema_url(&VersionSelector::Released(SemVer::parse("1.4.0").unwrap()))
            .unwrap()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9200/NCATSTranslator/ReasonerAPI/v1.4.0/TranslatorReasonerAPI.yaml"
        );
    }

    #[test]
    fn branch_url_uses_name() {
        let url = fetcher()
            .schema_url(&VersionSelector::Branch("master".into()))
            .unwrap()
            .unwrap();
        assert!(url.as_str().ends_with("/ReasonerAPI/master/TranslatorReasonerAPI.yaml"));
    }

    #[test]
    fn local_file_has_no_url() {
        let selector = VersionSelector::FilePath(PathBuf::from("schema.yaml"));
        assert!(fetcher().schema_url(&selector).unwrap().is_none());
    }

    #[test]
    fn reads_local_schema_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "openapi: 3.0.1").unwrap();
        let selector = VersionSelector::FilePath(file.path().to_path_buf());
        let text = fetcher().fetch_document(&selector).unwrap();
        assert!(text.starts_with("openapi"));
    }

    #[test]
    fn missing_local_file_is_io_error() {
        let selector = VersionSelector::FilePath(PathBuf::from("/nonexistent/trapi_schema.yaml"));
        let err = fetcher().fetch_document(&selector).unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }), "{err}");
    }
}
