//! # Extração via API HTTP
//!
//! Módulo para extração de dados de endpoints HTTP com tolerância a
//! rate limit. Uma única chamada lógica é retentada de forma transparente
//! quando o servidor responde 429, respeitando a dica de espera enviada
//! no cabeçalho `Retry-After`.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::error::{ExtractError, FetchError, Result};
use crate::types::{DataRow, DataValue, Table};

/// Espera padrão, em segundos, quando o servidor não informa `Retry-After`
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Número padrão de tentativas de uma requisição
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Métodos HTTP suportados pelo fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Descrição de uma requisição de extração
///
/// `max_attempts` conta requisições emitidas, não retentativas, e é
/// sempre ≥ 1.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    url: String,
    method: HttpMethod,
    headers: HashMap<String, String>,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    max_attempts: usize,
}

impl FetchRequest {
    fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            query: Vec::new(),
            body: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Cria uma requisição GET
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    /// Cria uma requisição POST
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url, HttpMethod::Post)
    }

    /// Adiciona um cabeçalho
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adiciona um parâmetro de query string
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Define o corpo JSON da requisição
    pub fn with_json_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Define o limite de tentativas (mínimo 1)
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

/// Resultado de uma busca bem-sucedida
///
/// Corpo JSON válido vira `Json`; qualquer outro corpo (inclusive vazio)
/// vira `Text`. Falha de parsing de JSON não é condição de erro.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchPayload {
    Json(serde_json::Value),
    Text(String),
}

impl FetchPayload {
    /// Converte um payload JSON tabular em `Table`
    ///
    /// Um array de objetos vira uma linha por objeto; um objeto isolado
    /// vira uma tabela de linha única.
    pub fn into_table(self) -> Result<Table> {
        match self {
            FetchPayload::Json(serde_json::Value::Array(items)) => {
                let mut rows = Vec::with_capacity(items.len());
                for item in &items {
                    rows.push(json_object_to_row(item)?);
                }
                Ok(Table::from_rows(rows))
            }
            FetchPayload::Json(value @ serde_json::Value::Object(_)) => {
                Ok(Table::from_rows(vec![json_object_to_row(&value)?]))
            }
            FetchPayload::Json(other) => Err(ExtractError::InvalidFormat(format!(
                "payload JSON não tabular: {}",
                other
            ))
            .into()),
            FetchPayload::Text(_) => Err(ExtractError::InvalidFormat(
                "payload de texto não pode ser convertido em tabela".to_string(),
            )
            .into()),
        }
    }
}

fn json_object_to_row(value: &serde_json::Value) -> Result<DataRow> {
    match DataValue::from_json(value) {
        DataValue::Object(map) => Ok(map),
        _ => Err(ExtractError::InvalidFormat(format!(
            "elemento JSON não é um objeto: {}",
            value
        ))
        .into()),
    }
}

/// Fetcher HTTP com retentativa limitada a rate limit
///
/// Apenas o status 429 dispara retentativa; qualquer outro status de erro
/// falha imediatamente. O único ponto de suspensão é a espera ditada pelo
/// servidor, limitada pelo número máximo de tentativas da requisição.
#[derive(Debug, Clone)]
pub struct RateLimitedFetcher {
    client: Client,
    default_backoff: Duration,
}

impl RateLimitedFetcher {
    /// Cria um fetcher com a política padrão
    pub fn new() -> Result<Self> {
        Self::with_config(&FetchConfig::default())
    }

    /// Cria um fetcher a partir da configuração
    pub fn with_config(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(FetchError::Transport)?;

        Ok(Self {
            client,
            default_backoff: Duration::from_secs(config.default_backoff_secs),
        })
    }

    /// Executa a requisição, retentando somente em 429
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchPayload> {
        for attempt in 1..=request.max_attempts {
            info!(
                url = %request.url,
                method = %request.method,
                attempt,
                "Acessando URL"
            );

            let response = self.send(request).await.map_err(FetchError::Transport)?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = self.retry_after(response.headers());
                warn!(
                    url = %request.url,
                    attempt,
                    wait_secs = wait.as_secs(),
                    "Rate limit atingido; aguardando para retentar"
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(FetchError::HttpStatus {
                    status: status.as_u16(),
                    message,
                }
                .into());
            }

            let text = response.text().await.map_err(FetchError::Transport)?;
            return Ok(match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(json) => FetchPayload::Json(json),
                Err(_) => {
                    debug!(url = %request.url, "Resposta não é JSON; retornando texto puro");
                    FetchPayload::Text(text)
                }
            });
        }

        Err(FetchError::RetriesExhausted {
            url: request.url.clone(),
            max_attempts: request.max_attempts,
        }
        .into())
    }

    async fn send(&self, request: &FetchRequest) -> reqwest::Result<reqwest::Response> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.send().await
    }

    /// Lê a dica de espera do servidor; valores ausentes ou não inteiros
    /// caem no padrão configurado
    fn retry_after(&self, headers: &reqwest::header::HeaderMap) -> Duration {
        headers
            .get("Retry-After")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.default_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_json_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/series"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"dt": "2024-01-01", "valor": 10}])),
            )
            .mount(&server)
            .await;

        let fetcher = RateLimitedFetcher::new().unwrap();
        let request = FetchRequest::get(format!("{}/series", server.uri()));
        let payload = fetcher.fetch(&request).await.unwrap();

        match payload {
            FetchPayload::Json(value) => {
                assert_eq!(value[0]["dt"], "2024-01-01");
                assert_eq!(value[0]["valor"], 10);
            }
            other => panic!("esperado Json, obtido {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_returns_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("não é json {"))
            .mount(&server)
            .await;

        let fetcher = RateLimitedFetcher::new().unwrap();
        let request = FetchRequest::get(server.uri());
        let payload = fetcher.fetch(&request).await.unwrap();

        assert_eq!(payload, FetchPayload::Text("não é json {".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_empty_body_is_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let fetcher = RateLimitedFetcher::new().unwrap();
        let request = FetchRequest::get(server.uri());
        let payload = fetcher.fetch(&request).await.unwrap();

        assert_eq!(payload, FetchPayload::Text(String::new()));
    }

    #[tokio::test]
    async fn test_fetch_retries_on_429_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(3)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let fetcher = RateLimitedFetcher::new().unwrap();
        let request = FetchRequest::get(server.uri()).with_max_attempts(5);
        let payload = fetcher.fetch(&request).await.unwrap();

        assert_eq!(
            payload,
            FetchPayload::Json(serde_json::json!({"ok": true}))
        );

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_exhausts_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .mount(&server)
            .await;

        let fetcher = RateLimitedFetcher::new().unwrap();
        let request = FetchRequest::get(server.uri()).with_max_attempts(3);
        let err = fetcher.fetch(&request).await.unwrap_err();

        match err {
            EtlError::Fetch(FetchError::RetriesExhausted { url, max_attempts }) => {
                assert_eq!(url, server.uri());
                assert_eq!(max_attempts, 3);
            }
            other => panic!("esperado RetriesExhausted, obtido {:?}", other),
        }

        // Exatamente max_attempts requisições emitidas
        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_http_error_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("falha interna"))
            .mount(&server)
            .await;

        let fetcher = RateLimitedFetcher::new().unwrap();
        let request = FetchRequest::get(server.uri()).with_max_attempts(5);
        let err = fetcher.fetch(&request).await.unwrap_err();

        match err {
            EtlError::Fetch(FetchError::HttpStatus { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "falha interna");
            }
            other => panic!("esperado HttpStatus, obtido {:?}", other),
        }

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_unparseable_retry_after_uses_default() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "logo"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let config = FetchConfig {
            default_backoff_secs: 1,
            ..FetchConfig::default()
        };
        let fetcher = RateLimitedFetcher::with_config(&config).unwrap();
        let request = FetchRequest::get(server.uri());

        let start = std::time::Instant::now();
        let payload = fetcher.fetch(&request).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(payload, FetchPayload::Json(serde_json::json!({})));
        assert!(elapsed >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_fetch_forwards_headers_query_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ingest"))
            .and(header("x-api-key", "segredo"))
            .and(query_param("page", "2"))
            .and(body_json(serde_json::json!({"filtro": "ativos"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = RateLimitedFetcher::new().unwrap();
        let request = FetchRequest::post(format!("{}/ingest", server.uri()))
            .with_header("x-api-key", "segredo")
            .with_query_param("page", "2")
            .with_json_body(serde_json::json!({"filtro": "ativos"}));

        let payload = fetcher.fetch(&request).await.unwrap();
        assert_eq!(payload, FetchPayload::Json(serde_json::json!({"ok": true})));
    }

    #[tokio::test]
    async fn test_max_attempts_floor_is_one() {
        let request = FetchRequest::get("http://api.example.com").with_max_attempts(0);
        assert_eq!(request.max_attempts(), 1);
    }

    #[test]
    fn test_payload_array_into_table() {
        let payload = FetchPayload::Json(serde_json::json!([
            {"dt": "2024-01-01", "valor": 1},
            {"dt": "2024-01-02", "valor": 2}
        ]));

        let table = payload.into_table().unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has_column("dt"));
        assert_eq!(
            table.rows()[0].get("valor"),
            Some(&DataValue::Integer(1))
        );
    }

    #[test]
    fn test_payload_single_object_into_table() {
        let payload = FetchPayload::Json(serde_json::json!({"dt": "2024-01-01"}));
        let table = payload.into_table().unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_payload_text_into_table_fails() {
        let payload = FetchPayload::Text("linha1\nlinha2".to_string());
        let err = payload.into_table().unwrap_err();
        assert!(matches!(
            err,
            EtlError::Extract(ExtractError::InvalidFormat(_))
        ));
    }
}
