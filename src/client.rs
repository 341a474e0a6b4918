use crate::error::{Error, Result};
use crate::models::{Field, SearchPage, SearchRequest, WorklogPage};
use base64::Engine;
use reqwest::{Client, Response, header};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub enum Auth {
    Basic { email: String, api_token: String },
    Bearer { token: String },
}

/// 429 / 5xx 応答に対するリトライ方針。
/// `Retry-After` ヘッダーが数値ならそれを優先し、
/// なければ `backoff_base * 2^(attempt-1)` 秒の指数バックオフで待つ。
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_tries: u32,
    pub backoff_base: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: 5,
            backoff_base: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub auth: Auth,
    pub verify_ssl: bool,
    pub ca_bundle: Option<PathBuf>,
    pub http_proxy: Option<String>,
    pub https_proxy: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl JiraConfig {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Result<Self> {
        let base_url = base_url.into();

        // Validate URL
        let _ = Url::parse(&base_url)
            .map_err(|_| Error::InvalidConfiguration("Invalid base URL".to_string()))?;

        Ok(Self {
            base_url,
            auth,
            verify_ssl: true,
            ca_bundle: None,
            http_proxy: None,
            https_proxy: None,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        })
    }

    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    pub fn ca_bundle(mut self, path: Option<PathBuf>) -> Self {
        self.ca_bundle = path;
        self
    }

    pub fn http_proxy(mut self, proxy: Option<String>) -> Self {
        self.http_proxy = proxy;
        self
    }

    pub fn https_proxy(mut self, proxy: Option<String>) -> Self {
        self.https_proxy = proxy;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Jira Cloud への接続1本分のクライアント。
/// 並行タスクはそれぞれ自分用のインスタンスを `JiraClient::new` で作る
/// （タスク間で可変状態を共有しない）。
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: Client,
    config: Arc<JiraConfig>,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        // 認証ヘッダーを追加
        match &config.auth {
            Auth::Basic { email, api_token } => {
                let auth_value = format!("{}:{}", email, api_token);
                let encoded =
                    base64::engine::general_purpose::STANDARD.encode(auth_value.as_bytes());
                headers.insert(
                    header::AUTHORIZATION,
                    header::HeaderValue::from_str(&format!("Basic {}", encoded))
                        .map_err(|_| Error::InvalidConfiguration("Invalid auth header".to_string()))?,
                );
            }
            Auth::Bearer { token } => {
                headers.insert(
                    header::AUTHORIZATION,
                    header::HeaderValue::from_str(&format!("Bearer {}", token))
                        .map_err(|_| Error::InvalidConfiguration("Invalid auth header".to_string()))?,
                );
            }
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout);

        if !config.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(path) = &config.ca_bundle {
            let pem = std::fs::read(path).map_err(|e| {
                Error::InvalidConfiguration(format!("Cannot read CA bundle {}: {}", path.display(), e))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)?;
            builder = builder.add_root_certificate(cert);
        }
        if let Some(proxy) = &config.http_proxy {
            builder = builder.proxy(reqwest::Proxy::http(proxy)?);
        }
        if let Some(proxy) = &config.https_proxy {
            builder = builder.proxy(reqwest::Proxy::https(proxy)?);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// リトライ付きGET。429/5xx のみリトライ対象で、
    /// 最終試行の応答は成功・失敗を問わずそのまま返す。
    /// トランスポート層の失敗（TLS含む）はリトライせず即座に伝播する。
    pub async fn get_with_retry(
        &self,
        path: &str,
        params: Option<&[(String, String)]>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.config.base_url, path);
        self.execute_with_retry(|| {
            let mut request = self.client.get(&url);
            if let Some(query) = params {
                request = request.query(query);
            }
            request
        })
        .await
    }

    /// リトライ付きPOST。常にJSONボディを送る。セマンティクスはGETと同一。
    pub async fn post_with_retry(&self, path: &str, body: &Value) -> Result<Response> {
        let url = format!("{}{}", self.config.base_url, path);
        self.execute_with_retry(|| self.client.post(&url).json(body)).await
    }

    async fn execute_with_retry<F>(&self, mut build: F) -> Result<Response>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let policy = self.config.retry;
        let mut attempt: u32 = 1;
        loop {
            let response = build().send().await?;
            let status = response.status();
            let retryable = status.as_u16() == 429 || status.is_server_error();
            if !retryable || attempt >= policy.max_tries {
                return Ok(response);
            }

            let delay = retry_after_seconds(&response)
                .unwrap_or_else(|| policy.backoff_base * 2f64.powi(attempt as i32 - 1));
            debug!(status = status.as_u16(), attempt, delay, "retrying request");
            if delay > 0.0 {
                tokio::time::sleep(Duration::from_secs_f64(delay)).await;
            }
            attempt += 1;
        }
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// 検索エンドポイントの1ページを取得する。
    pub async fn search_page(&self, request: &SearchRequest) -> Result<SearchPage> {
        let body = serde_json::to_value(request)?;
        let response = self.post_with_retry("/rest/api/3/search/jql", &body).await?;
        Self::parse_json(response).await
    }

    /// JQL検索を最後のページまでたどって全課題を返す。
    /// 継続トークンがない、または課題ゼロのページが来たら打ち切る
    /// （古いトークンで無限ループしないための空ページ判定）。
    pub async fn search_issues(
        &self,
        jql: &str,
        fields: &[String],
        page_size: u32,
    ) -> Result<Vec<crate::models::Issue>> {
        let mut issues = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let request = SearchRequest::new(jql)
                .fields(fields.to_vec())
                .max_results(page_size)
                .next_page_token(token.clone());
            let page = self.search_page(&request).await?;
            debug!(count = page.issues.len(), "search page received");
            if page.issues.is_empty() {
                break;
            }
            issues.extend(page.issues);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(issues)
    }

    /// フィールドカタログを照会し、指定idのフィールドが存在するかを返す。
    pub async fn field_exists(&self, field_id: &str) -> Result<bool> {
        let response = self.get_with_retry("/rest/api/3/field", None).await?;
        let fields: Vec<Field> = Self::parse_json(response).await?;
        Ok(fields.iter().any(|field| field.id == field_id))
    }

    /// 課題の作業ログを offset/limit カーソルで1ページ取得する。
    pub async fn worklog_page(
        &self,
        issue_key: &str,
        start_at: u32,
        max_results: u32,
    ) -> Result<WorklogPage> {
        let path = format!("/rest/api/3/issue/{}/worklog", issue_key);
        let params = [
            ("startAt".to_string(), start_at.to_string()),
            ("maxResults".to_string(), max_results.to_string()),
        ];
        let response = self.get_with_retry(&path, Some(&params)).await?;
        Self::parse_json(response).await
    }
}

fn retry_after_seconds(response: &Response) -> Option<f64> {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok())
}
