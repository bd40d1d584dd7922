//! ClickHouse HTTP interface driver.
//!
//! Statements are POSTed to the server's HTTP endpoint (port 8123 by
//! default). Row results are requested in `JSONCompact` format, which
//! returns column metadata plus rows as positional arrays. A per-handle
//! session id makes `USE` stick across statements, matching the session
//! semantics of a native connection. The default database is selected
//! with a `USE` at connect time, never via the `database` request
//! parameter: the server applies that parameter at query level, where it
//! overrides any `USE` issued on the session.

use crate::client::{ChClient, ColumnMeta, QueryRows, RowMap};
use crate::config::ClickHouseConfig;
use crate::error::{ChError, ChResult};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

const USER_HEADER: &str = "X-ClickHouse-User";
const KEY_HEADER: &str = "X-ClickHouse-Key";

pub struct HttpClient {
    http: reqwest::Client,
    endpoint: String,
    username: String,
    password: String,
    /// Query parameters attached to every request: session_id and the
    /// compression flag. The database context lives in the session only;
    /// a per-request `database` parameter would override `USE` at query
    /// level.
    params: Vec<(String, String)>,
}

/// Wire shape of a `JSONCompact` response.
#[derive(Debug, Deserialize)]
struct JsonCompactResponse {
    meta: Vec<JsonCompactColumn>,
    data: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct JsonCompactColumn {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
}

impl HttpClient {
    /// Open a session with the given configuration.
    ///
    /// The configuration fields are applied verbatim: host/port/secure
    /// form the endpoint, username/password become auth headers, verify
    /// controls certificate checking and compress controls response
    /// compression. The handshake issues `USE <database>`, which both
    /// pings the server and pins the session's default context, so
    /// creation fails immediately on an unreachable host, bad
    /// credentials, or a missing database.
    pub async fn connect(config: &ClickHouseConfig) -> ChResult<Self> {
        let client = Self::build(config)?;
        client
            .execute(&format!("USE {}", config.database), &[])
            .await?;
        Ok(client)
    }

    /// Assemble the client. No network activity happens here.
    fn build(config: &ClickHouseConfig) -> ChResult<Self> {
        let mut builder = reqwest::Client::builder();
        if config.secure && !config.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if !config.compress {
            builder = builder.no_gzip();
        }
        let http = builder
            .build()
            .map_err(|e| ChError::connection(format!("Failed to build HTTP client: {e}")))?;

        let scheme = if config.secure { "https" } else { "http" };
        let endpoint = format!("{scheme}://{}:{}/", config.host, config.port);

        let mut params = vec![("session_id".to_string(), Uuid::new_v4().to_string())];
        if config.compress {
            params.push(("enable_http_compression".to_string(), "1".to_string()));
        }

        Ok(Self {
            http,
            endpoint,
            username: config.username.clone(),
            password: config.password.clone(),
            params,
        })
    }

    /// POST a statement body and return the raw response on HTTP success.
    /// Non-2xx responses carry the ClickHouse error text in the body.
    async fn execute(
        &self,
        body: &str,
        extra_params: &[(&str, &str)],
    ) -> ChResult<reqwest::Response> {
        debug!(statement = %body.lines().next().unwrap_or_default(), "Sending statement");

        let response = self
            .http
            .post(&self.endpoint)
            .header(USER_HEADER, &self.username)
            .header(KEY_HEADER, &self.password)
            .query(&self.params)
            .query(extra_params)
            .body(body.to_owned())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChError::query(format!(
                "ClickHouse returned {status}: {}",
                text.trim()
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl ChClient for HttpClient {
    async fn query(&self, sql: &str) -> ChResult<QueryRows> {
        let response = self
            .execute(sql, &[("default_format", "JSONCompact")])
            .await?;
        let parsed: JsonCompactResponse = response.json().await?;

        Ok(QueryRows {
            columns: parsed
                .meta
                .into_iter()
                .map(|c| ColumnMeta {
                    name: c.name,
                    type_name: c.type_name,
                })
                .collect(),
            rows: parsed.data,
        })
    }

    async fn command(&self, sql: &str) -> ChResult<()> {
        self.execute(sql, &[]).await?;
        Ok(())
    }

    async fn insert(&self, table: &str, rows: &[RowMap]) -> ChResult<()> {
        let mut body = format!("INSERT INTO {table} FORMAT JSONEachRow\n");
        for row in rows {
            body.push_str(&serde_json::to_string(row)?);
            body.push('\n');
        }
        self.execute(&body, &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_compact_response_parses() {
        let raw = r#"{
            "meta": [
                {"name": "id", "type": "UInt64"},
                {"name": "name", "type": "String"}
            ],
            "data": [[1, "alice"], [2, "bob"]],
            "rows": 2,
            "statistics": {"elapsed": 0.001, "rows_read": 2, "bytes_read": 32}
        }"#;

        let parsed: JsonCompactResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.meta.len(), 2);
        assert_eq!(parsed.meta[0].name, "id");
        assert_eq!(parsed.meta[1].type_name, "String");
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0][1], serde_json::json!("alice"));
    }

    #[test]
    fn test_json_compact_response_empty_result() {
        let raw = r#"{"meta": [], "data": []}"#;
        let parsed: JsonCompactResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.meta.is_empty());
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_request_params_carry_session_but_not_database() {
        let client = HttpClient::build(&ClickHouseConfig::default()).unwrap();
        let keys: Vec<&str> = client.params.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"session_id"));
        assert!(!keys.contains(&"database"));
    }

    #[test]
    fn test_compression_param_follows_config() {
        let on = HttpClient::build(&ClickHouseConfig::default()).unwrap();
        assert!(
            on.params
                .iter()
                .any(|(k, v)| k == "enable_http_compression" && v == "1")
        );

        let off = HttpClient::build(&ClickHouseConfig {
            compress: false,
            ..ClickHouseConfig::default()
        })
        .unwrap();
        assert!(off.params.iter().all(|(k, _)| k != "enable_http_compression"));
    }

    #[test]
    fn test_endpoint_scheme_follows_secure_flag() {
        let plain = HttpClient::build(&ClickHouseConfig::default()).unwrap();
        assert_eq!(plain.endpoint, "http://localhost:8123/");

        let tls = HttpClient::build(&ClickHouseConfig {
            secure: true,
            port: 8443,
            ..ClickHouseConfig::default()
        })
        .unwrap();
        assert_eq!(tls.endpoint, "https://localhost:8443/");
    }
}
