//! Blocking HTTP client for the backend REST API.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::ApiConfig;
use crate::domain::{Commission, CommissionsResponse, PyramidResponse, Session};
use crate::infrastructure::traits::{ApiError, PyramidApi};

/// [`PyramidApi`] over HTTP.
///
/// One attempt per request; there is no retry and no cancellation of
/// requests already in flight.
#[derive(Debug, Clone)]
pub struct HttpPyramidApi {
    client: Client,
    base_url: Url,
    token_header: HeaderName,
}

impl HttpPyramidApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("base_url '{}': {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!(
                "base_url '{}' cannot carry a path",
                config.base_url
            )));
        }
        let token_header = HeaderName::from_bytes(config.token_header.as_bytes())
            .map_err(|e| ApiError::Config(format!("token_header '{}': {e}", config.token_header)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            token_header,
        })
    }

    /// `{base}/{endpoint}[/{id}]`; the id is always one percent-encoded segment.
    pub fn url_for(&self, endpoint: &str, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(endpoint.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                path.push(id);
            }
        }
        url
    }

    #[instrument(level = "debug", skip(self, url, session), fields(url = %url))]
    fn get_json<T: DeserializeOwned>(&self, url: Url, session: &Session) -> Result<T, ApiError> {
        let mut request = self.client.get(url.clone());
        if let Some(token) = &session.token {
            let value = HeaderValue::from_str(token)
                .map_err(|e| ApiError::Config(format!("session token: {e}")))?;
            request = request.header(self.token_header.clone(), value);
        }

        let response = request.send().map_err(|e| ApiError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        debug!(status = status.as_u16(), "response received");
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<T>().map_err(|e| ApiError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl PyramidApi for HttpPyramidApi {
    fn fetch_pyramid(
        &self,
        endpoint: &str,
        user_id: &str,
        session: &Session,
    ) -> Result<PyramidResponse, ApiError> {
        let url = self.url_for(endpoint, Some(user_id));
        self.get_json(url, session)
    }

    fn fetch_commissions(&self, session: &Session) -> Result<Vec<Commission>, ApiError> {
        let url = self.url_for("comisiones", None);
        let response: CommissionsResponse = self.get_json(url, session)?;
        Ok(response.commissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str) -> Result<HttpPyramidApi, ApiError> {
        HttpPyramidApi::new(&ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        })
    }

    #[test]
    fn given_base_with_path_when_building_url_then_appends_segments() {
        let api = api("https://mlm.example.com/api/").unwrap();

        let url = api.url_for("usuarios/piramide-completa", Some("65a1f0"));

        assert_eq!(
            url.as_str(),
            "https://mlm.example.com/api/usuarios/piramide-completa/65a1f0"
        );
    }

    #[test]
    fn given_user_id_with_reserved_characters_when_building_url_then_encodes_segment() {
        let api = api("https://mlm.example.com/api").unwrap();

        let url = api.url_for("usuarios/piramide", Some("a b/c?"));

        assert_eq!(
            url.as_str(),
            "https://mlm.example.com/api/usuarios/piramide/a%20b%2Fc%3F"
        );
    }

    #[test]
    fn given_endpoint_without_id_when_building_url_then_no_trailing_segment() {
        let api = api("http://localhost:4000").unwrap();

        assert_eq!(
            api.url_for("comisiones", None).as_str(),
            "http://localhost:4000/comisiones"
        );
    }

    #[test]
    fn given_invalid_base_url_when_creating_client_then_config_error() {
        assert!(matches!(api("not a url"), Err(ApiError::Config(_))));
        assert!(matches!(api("mailto:ops@example.com"), Err(ApiError::Config(_))));
    }

    #[test]
    fn given_invalid_token_header_when_creating_client_then_config_error() {
        let result = HttpPyramidApi::new(&ApiConfig {
            token_header: "bad header".to_string(),
            ..ApiConfig::default()
        });
        assert!(matches!(result, Err(ApiError::Config(_))));
    }
}
