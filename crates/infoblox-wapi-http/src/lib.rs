// # Infoblox WAPI HTTP Transport
//
// reqwest implementation of `WapiTransport`.
//
// ## Behavior
//
// - One HTTP request per `execute` call
// - HTTP Basic auth on every request
// - `Accept: application/json` and `Content-Type: application/json`
// - Per-request timeout from `ClientConfig`
// - TLS verification skipped only when `ClientConfig::insecure` is set
// - Redirects are never followed; a 3xx reaches the caller as a response
// - No retries, no caching, no background tasks
//
// Any HTTP status is returned as a `WapiResponse`. Only failures of the
// exchange itself (connect, TLS, timeout, body read) become `TransportError`.
//
// ## Security Requirements
//
// - The password NEVER appears in logs or Debug output
// - Credentials are sent as a header, never embedded in the URL

use async_trait::async_trait;
use infoblox_core::config::ClientConfig;
use infoblox_core::traits::{HttpMethod, TransportError, WapiRequest, WapiResponse, WapiTransport};
use infoblox_core::{Error, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};

/// reqwest-backed WAPI transport
///
/// # Security
///
/// The Debug implementation does NOT expose the password.
pub struct HttpTransport {
    /// `{protocol}://{server}/wapi/v{version}`
    endpoint: String,

    user: String,

    /// ⚠️ NEVER log this value
    password: String,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("password", &"<REDACTED>")
            .finish()
    }
}

impl HttpTransport {
    /// Build a transport from an immutable client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .redirect(reqwest::redirect::Policy::none())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            "WAPI transport ready: {} (timeout {:?}, insecure {})",
            config.endpoint,
            config.timeout,
            config.insecure
        );

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            password: config.password.clone(),
            client,
        })
    }

    /// Base URL every request path is appended to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl WapiTransport for HttpTransport {
    async fn execute(&self, request: WapiRequest) -> std::result::Result<WapiResponse, TransportError> {
        let url = self.url(&request.path);
        tracing::debug!("{} {}", request.method, url);

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &url)
            .basic_auth(&self.user, Some(&self.password));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("Failed to read response body: {}", e)))?;

        Ok(WapiResponse { status, body })
    }

    fn transport_name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infoblox_core::ProviderConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{basic_auth, body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REF: &str = "record:host/ZG5z:www.example.com/default";

    fn client_config(server: &MockServer) -> ClientConfig {
        ProviderConfig::new("admin", "s3cret-password", server.address().to_string())
            .with_protocol("http")
            .with_version("2.7.0")
            .configure()
            .unwrap()
    }

    #[tokio::test]
    async fn test_endpoint_carries_full_wapi_version() {
        let server = MockServer::start().await;
        let transport = HttpTransport::new(&client_config(&server)).unwrap();

        assert_eq!(
            transport.endpoint(),
            format!("http://{}/wapi/v2.7.0", server.address())
        );

        // Two-part versions never reach the transport
        let short = ProviderConfig::new("admin", "pw", server.address().to_string())
            .with_version("2.7")
            .configure();
        assert!(matches!(short, Err(infoblox_core::Error::Config(_))));
    }

    #[tokio::test]
    async fn test_get_sends_auth_headers_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/wapi/v2.7.0/{}", REF)))
            .and(query_param("_return_fields+", "ttl,use_ttl"))
            .and(basic_auth("admin", "s3cret-password"))
            .and(header("Accept", "application/json"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name": "www.example.com"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&client_config(&server)).unwrap();
        let response = transport
            .execute(WapiRequest::get(REF).with_query("_return_fields+", "ttl,use_ttl"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"name": "www.example.com"}"#);
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        let body = json!({
            "name": "www.example.com",
            "ipv4addrs": [{"ipv4addr": "10.0.0.5"}],
            "ttl": 300,
            "use_ttl": true
        });
        Mock::given(method("POST"))
            .and(path("/wapi/v2.7.0/record:host"))
            .and(body_json(body.clone()))
            .respond_with(ResponseTemplate::new(201).set_body_string(format!("\"{}\"", REF)))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&client_config(&server)).unwrap();
        let response = transport
            .execute(WapiRequest::post("record:host", body))
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, format!("\"{}\"", REF));
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404).set_body_string(
                r#"{"Error": "AdmConDataNotFoundError", "code": "Client.Ibap.Data.NotFound", "text": "not found"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&client_config(&server)).unwrap();
        let response = transport.execute(WapiRequest::delete(REF)).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(response.body.contains("Client.Ibap.Data.NotFound"));
    }

    #[tokio::test]
    async fn test_redirect_is_not_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/wapi/v2.7.0/{}", REF)))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/elsewhere", server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/elsewhere"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&client_config(&server)).unwrap();
        let response = transport.execute(WapiRequest::get(REF)).await.unwrap();

        assert_eq!(response.status, 302);
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let mut config = client_config(&server);
        config.timeout = Duration::from_millis(200);
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport.execute(WapiRequest::get(REF)).await.unwrap_err();
        assert!(err.to_string().contains("HTTP request failed"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let config = ProviderConfig::new("admin", "s3cret-password", "127.0.0.1:1")
            .with_protocol("http")
            .configure()
            .unwrap();
        let transport = HttpTransport::new(&config).unwrap();

        let err = transport.execute(WapiRequest::get(REF)).await.unwrap_err();
        assert!(!err.to_string().contains("s3cret-password"));
    }

    #[test]
    fn test_url_joins_endpoint_and_path() {
        let config = ProviderConfig::new("admin", "pw", "gm.example.com")
            .configure()
            .unwrap();
        let transport = HttpTransport::new(&config).unwrap();

        assert_eq!(transport.endpoint(), "https://gm.example.com/wapi/v1.2.1");
        assert_eq!(
            transport.url("record:host"),
            "https://gm.example.com/wapi/v1.2.1/record:host"
        );
        assert_eq!(
            transport.url(&format!("/{}", REF)),
            format!("https://gm.example.com/wapi/v1.2.1/{}", REF)
        );
    }

    #[test]
    fn test_password_not_exposed_in_debug() {
        let config = ProviderConfig::new("admin", "s3cret-password", "gm.example.com")
            .configure()
            .unwrap();
        let transport = HttpTransport::new(&config).unwrap();

        let debug_str = format!("{:?}", transport);
        assert!(!debug_str.contains("s3cret-password"));
        assert!(debug_str.contains("<REDACTED>"));
        assert!(debug_str.contains("HttpTransport"));
    }
}
