use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use apiwire_core::{ApiClient, Config, ConfigError, RequestOptions};
use clap::Parser;
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Issue one request through the configured API client and print the body.
#[derive(Debug, Parser)]
#[command(name = "apiwire", version, about)]
pub(crate) struct Cli {
    /// Path to the TOML config file (falls back to `APIWIRE_CONFIG`).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Extra header for this request, replacing a default of the same name.
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Timeout for this request only, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// JSON request body.
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,

    /// HTTP method, e.g. GET or POST.
    pub method: String,

    /// Path relative to the base URL, or an absolute URL.
    pub path: String,
}

pub(crate) fn resolve_config_path(arg: Option<PathBuf>) -> PathBuf {
    if let Some(path) = arg {
        return path;
    }
    if let Ok(path) = std::env::var("APIWIRE_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Load the config file and env overrides. Only file problems are reported
/// against the file path; env errors keep their own message.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load(path).map_err(|e| match e {
        ConfigError::Read { .. } | ConfigError::Parse(_) => {
            anyhow::Error::new(e).context(format!("failed to load {}", path.display()))
        }
        other => other.into(),
    })
}

pub(crate) fn parse_header(raw: &str) -> anyhow::Result<(HeaderName, HeaderValue)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("header {raw:?} must look like NAME:VALUE");
    };
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .with_context(|| format!("invalid header name in {raw:?}"))?;
    let value = HeaderValue::from_str(value.trim())
        .with_context(|| format!("invalid header value in {raw:?}"))?;
    Ok((name, value))
}

pub(crate) fn request_options(cli: &Cli) -> anyhow::Result<RequestOptions> {
    let mut options = RequestOptions::new();
    for raw in &cli.headers {
        let (name, value) = parse_header(raw)?;
        options = options.header(name, value);
    }
    if let Some(ms) = cli.timeout_ms {
        options = options.timeout(Duration::from_millis(ms));
    }
    Ok(options)
}

/// # Errors
///
/// Returns an error on invalid arguments, or any request failure.
pub(crate) async fn run(client: &ApiClient, cli: &Cli) -> anyhow::Result<String> {
    let method = Method::from_bytes(cli.method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method {:?}", cli.method))?;
    let options = request_options(cli)?;

    let mut req = client.request_with(method, &cli.path, &options)?;
    if let Some(ref data) = cli.data {
        let body: serde_json::Value =
            serde_json::from_str(data).context("--data must be valid JSON")?;
        req = req.json(&body);
    }

    let resp = client.send(req).await?;
    tracing::info!(status = %resp.status(), url = %resp.url(), "request completed");
    resp.text().await.context("failed to read response body")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use apiwire_core::{ApiError, ClientConfig};
    use reqwest::StatusCode;
    use reqwest::header::ACCEPT;
    use serial_test::serial;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> ApiClient {
        let config = ClientConfig::new(url::Url::parse(&server.uri()).unwrap());
        ApiClient::new(&config).unwrap()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("apiwire").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_method_and_path() {
        let cli = parse(&["get", "/users"]);
        assert_eq!(cli.method, "get");
        assert_eq!(cli.path, "/users");
        assert!(cli.headers.is_empty());
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_repeated_headers() {
        let cli = parse(&["-H", "accept: text/csv", "--header", "x-trace:1", "GET", "/"]);
        assert_eq!(cli.headers, vec!["accept: text/csv", "x-trace:1"]);
    }

    #[test]
    fn parse_header_trims_parts() {
        let (name, value) = parse_header(" Accept :  text/plain ").unwrap();
        assert_eq!(name, ACCEPT);
        assert_eq!(value, "text/plain");
    }

    #[test]
    fn parse_header_keeps_colons_in_value() {
        let (name, value) = parse_header("x-origin: http://a.test:8080").unwrap();
        assert_eq!(name.as_str(), "x-origin");
        assert_eq!(value, "http://a.test:8080");
    }

    #[test]
    fn parse_header_rejects_missing_colon() {
        assert!(parse_header("accept").is_err());
        assert!(parse_header("bad name: x").is_err());
    }

    #[test]
    fn request_options_from_flags() {
        let cli = parse(&["--timeout-ms", "250", "-H", "accept:text/csv", "GET", "/a"]);
        let options = request_options(&cli).unwrap();
        assert_eq!(options.timeout, Some(Duration::from_millis(250)));
        assert_eq!(options.headers.get(ACCEPT).unwrap(), "text/csv");
    }

    #[test]
    fn explicit_config_path_wins() {
        let path = resolve_config_path(Some(PathBuf::from("/etc/apiwire.toml")));
        assert_eq!(path, PathBuf::from("/etc/apiwire.toml"));
    }

    #[test]
    #[serial]
    fn config_path_from_env_var() {
        unsafe { std::env::set_var("APIWIRE_CONFIG", "/srv/apiwire/prod.toml") };
        let path = resolve_config_path(None);
        unsafe { std::env::remove_var("APIWIRE_CONFIG") };

        assert_eq!(path, PathBuf::from("/srv/apiwire/prod.toml"));
    }

    #[test]
    #[serial]
    fn config_path_defaults_when_unset() {
        unsafe { std::env::remove_var("APIWIRE_CONFIG") };
        assert_eq!(resolve_config_path(None), PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    #[serial]
    fn load_config_env_error_not_blamed_on_file() {
        unsafe { std::env::set_var("API_TIMEOUT", "soon") };
        let result = load_config(Path::new("/nonexistent/apiwire.toml"));
        unsafe { std::env::remove_var("API_TIMEOUT") };

        let err = result.unwrap_err();
        assert!(!err.to_string().contains("failed to load"));
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidTimeout { .. })
        ));
    }

    #[test]
    #[serial]
    fn load_config_file_error_names_path() {
        unsafe { std::env::remove_var("API_TIMEOUT") };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[api\n").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("failed to load {}", file.path().display())
        );
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn run_returns_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/despesas/ultimo-ano"))
            .and(header("accept", "text/csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("operadora\nHAPVIDA\n"))
            .expect(1)
            .mount(&server)
            .await;

        let cli = parse(&["-H", "accept: text/csv", "get", "/api/despesas/ultimo-ano"]);
        let body = run(&client_for(&server), &cli).await.unwrap();
        assert_eq!(body, "operadora\nHAPVIDA\n");
    }

    #[tokio::test]
    async fn run_sends_data_as_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/operadoras"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "registro_ans": "123456" })))
            .respond_with(ResponseTemplate::new(201).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let cli = parse(&[
            "--data",
            r#"{"registro_ans":"123456"}"#,
            "POST",
            "/api/operadoras",
        ]);
        let body = run(&client_for(&server), &cli).await.unwrap();
        assert_eq!(body, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn run_rejects_invalid_data_before_sending() {
        let server = MockServer::start().await;
        let cli = parse(&["--data", "{not json", "POST", "/api/operadoras"]);

        let err = run(&client_for(&server), &cli).await.unwrap_err();
        assert!(err.to_string().contains("--data must be valid JSON"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_rejects_invalid_method() {
        let server = MockServer::start().await;
        let cli = parse(&["GE T", "/"]);

        let err = run(&client_for(&server), &cli).await.unwrap_err();
        assert!(err.to_string().contains("invalid HTTP method"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_surfaces_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/operadoras/busca"))
            .respond_with(
                ResponseTemplate::new(422).set_body_string("termo: field required"),
            )
            .mount(&server)
            .await;

        let cli = parse(&["GET", "/api/operadoras/busca"]);
        let err = run(&client_for(&server), &cli).await.unwrap_err();
        match err.downcast_ref::<ApiError>() {
            Some(ApiError::Status { status, body }) => {
                assert_eq!(*status, StatusCode::UNPROCESSABLE_ENTITY);
                assert_eq!(body, "termo: field required");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }
}
