//! The authenticated JSON request pipeline.
//!
//! # Design
//! `ApiClient` holds injected configuration, an auth provider and a
//! transport, and carries no mutable state between calls. A call is split the
//! same way for every endpoint: [`ApiClient::build_request`] produces an
//! `HttpRequest`, the transport executes it, and [`parse_response`] maps the
//! `HttpResponse` to exactly one of `Found`, `NotFound` or an error. Both
//! halves are pure and usable on their own.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use url::form_urlencoded;

use crate::auth::AuthProvider;
use crate::config::ClientConfig;
use crate::error::{ApiError, GENERIC_FAILURE_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// Ordered, already-stringified query parameters.
pub type QueryParams = Vec<(String, String)>;

/// A call that reached the server and was not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Found(T),
    /// The server answered 404.
    NotFound,
}

impl<T> Outcome<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Found(value) => Some(value),
            Outcome::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Found(value) => Outcome::Found(f(value)),
            Outcome::NotFound => Outcome::NotFound,
        }
    }
}

/// Per-call settings. Defaults to an authenticated GET with no body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub query_params: Option<QueryParams>,
    pub require_auth: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            body: None,
            query_params: None,
            require_auth: true,
        }
    }
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query_params: Option<QueryParams>) -> Self {
        self.query_params = query_params;
        self
    }

    pub fn without_auth(mut self) -> Self {
        self.require_auth = false;
        self
    }
}

/// Keep only the parameters that have a value, in their original order.
/// Returns `None` when nothing is left.
pub fn build_query_params<I, K, V>(params: I) -> Option<QueryParams>
where
    I: IntoIterator<Item = (K, Option<V>)>,
    K: Into<String>,
    V: ToString,
{
    let filtered: QueryParams = params
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.into(), value.to_string())))
        .collect();
    if filtered.is_empty() {
        None
    } else {
        Some(filtered)
    }
}

/// Client for the Goal Pyramid JSON API.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    auth: Arc<dyn AuthProvider>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        config: ClientConfig,
        auth: Arc<dyn AuthProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            auth,
            transport,
        }
    }

    /// Client that talks to the network through reqwest.
    pub fn with_reqwest(config: ClientConfig, auth: Arc<dyn AuthProvider>) -> Self {
        Self::new(config, auth, Arc::new(ReqwestTransport::new()))
    }

    /// Build the request for one call.
    ///
    /// Fails with [`ApiError::Unauthenticated`] when auth is required and no
    /// id token is available.
    pub fn build_request(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<HttpRequest, ApiError> {
        let token = if options.require_auth {
            match self.auth.tokens().id_token {
                Some(token) if !token.is_empty() => Some(token),
                _ => return Err(ApiError::Unauthenticated),
            }
        } else {
            None
        };

        let mut url = format!("{}{endpoint}", self.config.api_url());
        if let Some(params) = options.query_params.as_ref().filter(|p| !p.is_empty()) {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params)
                .finish();
            url.push('?');
            url.push_str(&query);
        }

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = token {
            // Raw token, no "Bearer" scheme: the backend authorizer expects it bare.
            headers.push(("Authorization".to_string(), token));
        }

        let body = match &options.body {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                serde_json::to_string(value)
                    .map_err(|e| ApiError::Serialization(e.to_string()))?,
            ),
        };

        Ok(HttpRequest {
            method: options.method,
            url,
            headers,
            body,
        })
    }

    /// Perform one call. Every failure is logged with its method and endpoint
    /// before being returned.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Outcome<T>, ApiError> {
        let result = self.execute(endpoint, &options).await;
        if let Err(err) = &result {
            log_failure(options.method, endpoint, err);
        }
        result
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<Outcome<T>, ApiError> {
        let request = self.build_request(endpoint, options)?;
        let response = self.transport.execute(request).await?;
        parse_response(response)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query_params: Option<QueryParams>,
    ) -> Result<Outcome<T>, ApiError> {
        self.request(endpoint, RequestOptions::new(HttpMethod::Get).with_query(query_params))
            .await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<Outcome<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_with_body(HttpMethod::Post, endpoint, body).await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<Outcome<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_with_body(HttpMethod::Put, endpoint, body).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Outcome<T>, ApiError> {
        self.request(endpoint, RequestOptions::new(HttpMethod::Delete))
            .await
    }

    async fn request_with_body<B, T>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &B,
    ) -> Result<Outcome<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = match serde_json::to_value(body) {
            Ok(body) => body,
            Err(e) => {
                let err = ApiError::Serialization(e.to_string());
                log_failure(method, endpoint, &err);
                return Err(err);
            }
        };
        self.request(endpoint, RequestOptions::new(method).with_body(body))
            .await
    }
}

/// Map a response to its outcome. First match wins: 404, then any other
/// non-2xx status, then the 2xx body.
pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<Outcome<T>, ApiError> {
    if response.status == 404 {
        return Ok(Outcome::NotFound);
    }
    if !response.is_success() {
        return Err(ApiError::Rejected {
            status: response.status,
            message: rejection_message(&response.body),
        });
    }
    serde_json::from_str(&response.body)
        .map(Outcome::Found)
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// The `error` string from a JSON error body, or the generic message.
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|value| value.get("error"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(GENERIC_FAILURE_MESSAGE)
        .to_string()
}

fn log_failure(method: HttpMethod, endpoint: &str, err: &ApiError) {
    error!(method = %method, endpoint, error = %err, "API request failed");
}


#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::test_support::*;
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_get_sets_json_and_raw_token_headers() {
        let client = client_with(Some("tok-123"), RecordingTransport::failing());
        let req = client
            .build_request("/profile", &RequestOptions::default())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/profile");
        assert_eq!(
            req.headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "tok-123".to_string()),
            ]
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn build_without_auth_skips_token_check_and_header() {
        let client = client_with(None, RecordingTransport::failing());
        let req = client
            .build_request("/health", &RequestOptions::default().without_auth())
            .unwrap();
        assert_eq!(req.header("authorization"), None);
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn build_without_token_fails() {
        let client = client_with(None, RecordingTransport::failing());
        let err = client
            .build_request("/profile", &RequestOptions::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));

        let client = client_with(Some(""), RecordingTransport::failing());
        let err = client
            .build_request("/profile", &RequestOptions::default())
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[test]
    fn build_encodes_query_like_a_form() {
        let client = client_with(Some("t"), RecordingTransport::failing());
        let options = RequestOptions::default().with_query(Some(vec![
            ("user_id".to_string(), "a b&c".to_string()),
            ("limit".to_string(), "5".to_string()),
        ]));
        let req = client.build_request("/profile", &options).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/profile?user_id=a+b%26c&limit=5"
        );
    }

    #[test]
    fn build_skips_empty_query() {
        let client = client_with(Some("t"), RecordingTransport::failing());
        let options = RequestOptions::default().with_query(Some(Vec::new()));
        let req = client.build_request("/profile", &options).unwrap();
        assert_eq!(req.url, "http://localhost:3000/profile");
    }

    #[test]
    fn build_serializes_body() {
        let client = client_with(Some("t"), RecordingTransport::failing());
        let options =
            RequestOptions::new(HttpMethod::Post).with_body(json!({"display_name": "Ada"}));
        let req = client.build_request("/profile", &options).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"display_name": "Ada"}));

        let options = RequestOptions::new(HttpMethod::Post).with_body(Value::Null);
        assert!(client.build_request("/profile", &options).unwrap().body.is_none());
    }

    #[test]
    fn parse_404_is_not_found() {
        let outcome: Outcome<Value> = parse_response(response(404, r#"{"error":"gone"}"#)).unwrap();
        assert_eq!(outcome, Outcome::NotFound);
    }

    #[test]
    fn parse_rejection_uses_error_field() {
        let err = parse_response::<Value>(response(400, r#"{"error":"Bio too long"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
        assert_eq!(err.to_string(), "Bio too long");
    }

    #[test]
    fn parse_rejection_falls_back_to_generic_message() {
        for body in ["internal error", "", r#"{"message":"x"}"#, r#"{"error":42}"#, r#"{"error":""}"#] {
            let err = parse_response::<Value>(response(500, body)).unwrap_err();
            assert_eq!(err.to_string(), "Request failed", "body: {body}");
        }
    }

    #[test]
    fn parse_success_returns_body() {
        let outcome: Outcome<Value> = parse_response(response(200, r#"[1,"two",{"three":3}]"#)).unwrap();
        assert_eq!(outcome, Outcome::Found(json!([1, "two", {"three": 3}])));

        let outcome: Outcome<Value> = parse_response(response(201, "null")).unwrap();
        assert_eq!(outcome, Outcome::Found(Value::Null));
    }

    #[test]
    fn parse_success_with_bad_json_fails() {
        let err = parse_response::<Value>(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn query_params_drop_missing_values() {
        let params = build_query_params([("a", Some(1)), ("b", None), ("c", None)]);
        assert_eq!(params, Some(vec![("a".to_string(), "1".to_string())]));

        let params = build_query_params([("a", None::<i32>)]);
        assert_eq!(params, None);
    }

    #[test]
    fn outcome_helpers() {
        assert_eq!(Outcome::Found(2).map(|n| n * 2).into_option(), Some(4));
        assert!(!Outcome::<i32>::NotFound.is_found());
        assert_eq!(Outcome::<i32>::NotFound.into_option(), None);
    }

    #[tokio::test]
    async fn unauthenticated_call_sends_nothing() {
        let transport = RecordingTransport::responding(200, "{}");
        let client = client_with(None, transport.clone());
        let err = client.get::<Value>("/profile", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn wrappers_fix_the_method() {
        let transport = RecordingTransport::responding(200, "{}");
        let client = client_with(Some("t"), transport.clone());

        client.get::<Value>("/a", None).await.unwrap();
        client.post::<_, Value>("/b", &json!({"x": 1})).await.unwrap();
        client.put::<_, Value>("/c", &json!({"y": 2})).await.unwrap();
        client.delete::<Value>("/d").await.unwrap();

        let sent = transport.sent();
        let methods: Vec<_> = sent.iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete]
        );
        assert_eq!(sent[1].body.as_deref(), Some(r#"{"x":1}"#));
        assert_eq!(sent[2].body.as_deref(), Some(r#"{"y":2}"#));
        assert!(sent[3].body.is_none());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let client = client_with(Some("t"), RecordingTransport::failing());
        let err = client.get::<Value>("/profile", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn typed_get_decodes_into_struct() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Ping {
            ok: bool,
        }
        let client = client_with(Some("t"), RecordingTransport::responding(200, r#"{"ok":true}"#));
        let outcome: Outcome<Ping> = client.get("/ping", None).await.unwrap();
        assert_eq!(outcome, Outcome::Found(Ping { ok: true }));
    }

    /// Answers every request with its own body and URL.
    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            tokio::task::yield_now().await;
            let body = json!({
                "url": request.url,
                "sent": request.body.map(|b| serde_json::from_str::<Value>(&b).unwrap()),
                "auth": request.headers.iter().find(|(k, _)| k == "Authorization").map(|(_, v)| v.clone()),
            });
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: body.to_string(),
            })
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_calls_are_isolated() {
        let client = client_with(Some("shared-token"), Arc::new(EchoTransport));
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    let endpoint = format!("/items/{i}");
                    let outcome: Outcome<Value> =
                        client.post(&endpoint, &json!({ "n": i })).await.unwrap();
                    (i, outcome)
                })
            })
            .collect();

        for handle in handles {
            let (i, outcome) = handle.await.unwrap();
            let Outcome::Found(echo) = outcome else {
                panic!("call {i} returned NotFound");
            };
            assert_eq!(echo["url"], format!("http://localhost:3000/items/{i}"));
            assert_eq!(echo["sent"], json!({ "n": i }));
            assert_eq!(echo["auth"], "shared-token");
        }
    }
}
