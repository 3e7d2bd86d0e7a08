//! PostgREST backend over HTTP.
//!
//! Translates [`Query`] into PostgREST's URL grammar:
//!
//! ```text
//! GET {url}/schedules?select=*,activities(*)&user_id=eq.usr-1
//!     &activities.order=start_date.asc&order=created_at.desc&limit=5
//! ```
//!
//! Inner embeds use `table!inner(...)`, embedded filters are prefixed with the
//! embed path (`questions.quiz_id=eq.qiz-1`). Single-row calls ask for
//! `application/vnd.pgrst.object+json`, and a `PGRST116` answer reporting zero
//! rows is mapped to [`BackendError::NoRows`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_RANGE};
use serde::Deserialize;
use serde_json::Value;
use study_config::BackendConfig;

use super::{BackendError, QueryBackend};
use crate::query::{Embedding, Join, Op, Order, Predicate, Query, Row};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

/// HTTP client for one PostgREST endpoint and schema.
pub struct PostgrestBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bearer: String,
    schema: String,
}

impl PostgrestBackend {
    /// Build a client from the `[backend]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the underlying `reqwest::Client`
    /// fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("studyhub/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            api_key: config.api_key.clone(),
            bearer: config.api_key.clone(),
            schema: config.schema.clone(),
        })
    }

    /// Send the signed-in user's access token instead of the API key as bearer,
    /// so row-level security applies to that user.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.bearer = token.into();
        self
    }

    fn url(&self, table: &str, params: &[(String, String)]) -> String {
        let mut url = format!("{}/{table}", self.base_url);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&encode_params(params));
        }
        url
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.bearer))
            .header("Accept-Profile", &self.schema)
            .header("Content-Profile", &self.schema)
    }

    async fn send_rows(&self, request: reqwest::RequestBuilder) -> Result<Vec<Row>, BackendError> {
        let resp = check_response(request.send().await?).await?;
        let body: Value = resp.json().await?;
        rows_from_body(body)
    }

    async fn send_single(&self, request: reqwest::RequestBuilder) -> Result<Row, BackendError> {
        let resp = check_response(request.header(ACCEPT, SINGLE_OBJECT).send().await?).await?;
        match resp.json::<Value>().await? {
            Value::Object(row) => Ok(row),
            other => Err(BackendError::Decode(format!(
                "expected a single object, got {other}"
            ))),
        }
    }
}

#[async_trait]
impl QueryBackend for PostgrestBackend {
    fn name(&self) -> &'static str {
        "postgrest"
    }

    async fn select(&self, query: &Query) -> Result<Vec<Row>, BackendError> {
        let url = self.url(query.table, &query_params(query)?);
        tracing::debug!(backend = "postgrest", table = query.table, %url, "select");
        self.send_rows(self.request(reqwest::Method::GET, &url)).await
    }

    async fn select_single(&self, query: &Query) -> Result<Row, BackendError> {
        let url = self.url(query.table, &query_params(query)?);
        tracing::debug!(backend = "postgrest", table = query.table, %url, "select_single");
        self.send_single(self.request(reqwest::Method::GET, &url))
            .await
    }

    async fn count(&self, query: &Query) -> Result<u64, BackendError> {
        let url = self.url(query.table, &query_params(query)?);
        tracing::debug!(backend = "postgrest", table = query.table, %url, "count");
        let resp = self
            .request(reqwest::Method::HEAD, &url)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let resp = check_response(resp).await?;
        resp.headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| BackendError::Decode("missing or malformed Content-Range".into()))
    }

    async fn insert(&self, table: &'static str, rows: Vec<Row>) -> Result<Vec<Row>, BackendError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.url(table, &[]);
        tracing::debug!(backend = "postgrest", table, rows = rows.len(), "insert");
        let body = Value::Array(rows.into_iter().map(Value::Object).collect());
        let request = self
            .request(reqwest::Method::POST, &url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&body);
        self.send_rows(request).await
    }

    async fn update(
        &self,
        table: &'static str,
        predicates: &[Predicate],
        values: Row,
    ) -> Result<Vec<Row>, BackendError> {
        let url = self.url(table, &filter_params("", predicates)?);
        tracing::debug!(backend = "postgrest", table, %url, "update");
        let request = self
            .request(reqwest::Method::PATCH, &url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&values);
        self.send_rows(request).await
    }

    async fn update_single(
        &self,
        table: &'static str,
        predicates: &[Predicate],
        values: Row,
    ) -> Result<Row, BackendError> {
        let url = self.url(table, &filter_params("", predicates)?);
        tracing::debug!(backend = "postgrest", table, %url, "update_single");
        let request = self
            .request(reqwest::Method::PATCH, &url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&values);
        self.send_single(request).await
    }

    async fn delete(
        &self,
        table: &'static str,
        predicates: &[Predicate],
    ) -> Result<Vec<Row>, BackendError> {
        let url = self.url(table, &filter_params("", predicates)?);
        tracing::debug!(backend = "postgrest", table, %url, "delete");
        let request = self
            .request(reqwest::Method::DELETE, &url)
            .header("Prefer", RETURN_REPRESENTATION);
        self.send_rows(request).await
    }
}

// ── Query string ───────────────────────────────────────────────────

/// All query-string pairs for a select or count.
fn query_params(query: &Query) -> Result<Vec<(String, String)>, BackendError> {
    let mut params = vec![("select".to_string(), select_list(&query.embeds))];
    params.extend(filter_params("", &query.predicates)?);
    embed_params("", &query.embeds, &mut params)?;
    if !query.order.is_empty() {
        params.push(("order".to_string(), order_list(&query.order)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    Ok(params)
}

/// `*,activities(*)`, `*,questions(*,answers(*))`, `*,schedules!inner(*)`.
fn select_list(embeds: &[Embedding]) -> String {
    let mut select = String::from("*");
    for embed in embeds {
        select.push(',');
        select.push_str(embed.table);
        if embed.join == Join::Inner {
            select.push_str("!inner");
        }
        select.push('(');
        select.push_str(&select_list(&embed.embeds));
        select.push(')');
    }
    select
}

fn embed_params(
    prefix: &str,
    embeds: &[Embedding],
    params: &mut Vec<(String, String)>,
) -> Result<(), BackendError> {
    for embed in embeds {
        let path = format!("{prefix}{}.", embed.table);
        params.extend(filter_params(&path, &embed.predicates)?);
        if !embed.order.is_empty() {
            params.push((format!("{path}order"), order_list(&embed.order)));
        }
        embed_params(&path, &embed.embeds, params)?;
    }
    Ok(())
}

fn filter_params(
    prefix: &str,
    predicates: &[Predicate],
) -> Result<Vec<(String, String)>, BackendError> {
    predicates
        .iter()
        .map(|p| Ok((format!("{prefix}{}", p.column), filter_value(p)?)))
        .collect()
}

/// Right-hand side of one filter pair: `eq.done`, `in.("a","b")`, `not.is.null`.
fn filter_value(predicate: &Predicate) -> Result<String, BackendError> {
    let value = &predicate.value;
    Ok(match predicate.op {
        Op::Eq => format!("eq.{}", literal(value)),
        Op::Neq => format!("neq.{}", literal(value)),
        Op::Gt => format!("gt.{}", literal(value)),
        Op::Gte => format!("gte.{}", literal(value)),
        Op::Lt => format!("lt.{}", literal(value)),
        Op::Lte => format!("lte.{}", literal(value)),
        Op::IsNull => "is.null".to_string(),
        Op::NotNull => "not.is.null".to_string(),
        Op::In => {
            let Value::Array(values) = value else {
                return Err(BackendError::InvalidQuery(format!(
                    "IN on '{}' expects an array",
                    predicate.column
                )));
            };
            let items: Vec<String> = values.iter().map(quoted).collect();
            format!("in.({})", items.join(","))
        }
    })
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// List element for `in.(...)`: strings are double-quoted so commas and
/// parentheses inside them survive.
fn quoted(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        other => other.to_string(),
    }
}

fn order_list(order: &[Order]) -> String {
    order
        .iter()
        .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_params(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

// ── Responses ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// Check an HTTP response for PostgREST error conditions.
///
/// Returns the response unchanged on success. A `406` with code `PGRST116`
/// (single object requested) becomes [`BackendError::NoRows`] or
/// [`BackendError::MultipleRows`]; every other non-success status becomes
/// [`BackendError::Api`] with the Postgres/PostgREST code when present.
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();

    if status == 406 && body.code.as_deref() == Some("PGRST116") {
        match body.details.as_deref().and_then(row_count_in_details) {
            Some(0) => return Err(BackendError::NoRows),
            Some(n) => return Err(BackendError::MultipleRows(n)),
            None => {}
        }
    }

    let message = match (body.message, body.details) {
        (Some(message), Some(details)) => format!("{message} ({details})"),
        (Some(message), None) => message,
        (None, _) => text,
    };
    Err(BackendError::Api {
        status,
        code: body.code,
        message,
    })
}

/// Row count from `"The result contains 0 rows"` / `"Results contain 2 rows, ..."`.
fn row_count_in_details(details: &str) -> Option<usize> {
    let words: Vec<&str> = details.split_whitespace().collect();
    words
        .windows(2)
        .find(|pair| pair[1].starts_with("row"))
        .and_then(|pair| pair[0].parse().ok())
}

/// Total from a `Content-Range` header: `0-24/3573` or `*/0`.
fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.parse().ok()
}

fn rows_from_body(body: Value) -> Result<Vec<Row>, BackendError> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                other => Err(BackendError::Decode(format!("expected a row object, got {other}"))),
            })
            .collect(),
        Value::Object(row) => Ok(vec![row]),
        other => Err(BackendError::Decode(format!("expected rows, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::test_columns::{Child, Parent};
    use crate::query::{Embed, Filter, Select};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .header("Content-Type", "application/json")
                .body(body.to_string())
                .unwrap(),
        )
    }

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn builds_nested_select_with_embedded_filters_and_order() {
        let query = Select::<Parent>::new()
            .filter(Filter::new().eq(Parent::Id, "p-1"))
            .order_desc(Parent::Title)
            .limit(5)
            .embed(
                Embed::children(Child::ParentId)
                    .filter(Filter::new().neq(Child::Status, "done"))
                    .order_asc(Child::Rank),
            )
            .into_query();

        let params = query_params(&query).unwrap();
        assert_eq!(
            pairs(&params),
            vec![
                ("select", "*,children(*)"),
                ("id", "eq.p-1"),
                ("children.status", "neq.done"),
                ("children.order", "rank.asc"),
                ("order", "title.desc"),
                ("limit", "5"),
            ]
        );
    }

    #[test]
    fn inner_embed_uses_inner_hint() {
        let query = Select::<Child>::new()
            .embed(
                Embed::<Parent>::parent(Child::ParentId)
                    .inner()
                    .filter(Filter::new().eq(Parent::Title, "Plan")),
            )
            .into_query();
        let params = query_params(&query).unwrap();
        assert_eq!(
            pairs(&params),
            vec![("select", "*,parents!inner(*)"), ("parents.title", "eq.Plan")]
        );
    }

    #[test]
    fn filter_values_cover_every_operator() {
        let filter = Filter::<Child>::new()
            .in_(Child::Status, ["a,b", "c"])
            .is_null(Child::Rank)
            .not_null(Child::ParentId)
            .gte(Child::Rank, 2)
            .eq(Child::Status, true);
        let values: Vec<String> = filter
            .predicates()
            .iter()
            .map(|p| filter_value(p).unwrap())
            .collect();
        assert_eq!(
            values,
            vec![
                "in.(\"a,b\",\"c\")",
                "is.null",
                "not.is.null",
                "gte.2",
                "eq.true"
            ]
        );
    }

    #[test]
    fn params_are_url_encoded() {
        let encoded = encode_params(&[
            ("select".into(), "*,activities(*)".into()),
            ("title".into(), "eq.Plan A&B".into()),
        ]);
        assert_eq!(
            encoded,
            "select=%2A%2Cactivities%28%2A%29&title=eq.Plan%20A%26B"
        );
    }

    #[test]
    fn content_range_parsing() {
        assert_eq!(parse_content_range("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-24/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn row_count_from_pgrst116_details() {
        assert_eq!(row_count_in_details("The result contains 0 rows"), Some(0));
        assert_eq!(
            row_count_in_details(
                "Results contain 2 rows, application/vnd.pgrst.object+json requires 1 row"
            ),
            Some(2)
        );
        assert_eq!(row_count_in_details("something else"), None);
    }

    #[tokio::test]
    async fn check_response_maps_zero_rows_to_no_rows() {
        let resp = mock_response(
            406,
            r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"Cannot coerce the result to a single JSON object"}"#,
        );
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(err, BackendError::NoRows));
    }

    #[tokio::test]
    async fn check_response_surfaces_constraint_code() {
        let resp = mock_response(
            409,
            r#"{"code":"23505","details":"Key (email)=(ana@x.com) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"users_email_key\""}"#,
        );
        let err = check_response(resp).await.unwrap_err();
        match err {
            BackendError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code.as_deref(), Some("23505"));
                assert!(message.contains("already exists"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_response_keeps_plain_text_bodies() {
        let resp = mock_response(502, "Bad Gateway");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Api { status: 502, code: None, ref message } if message == "Bad Gateway"
        ));
    }

    #[tokio::test]
    async fn check_response_success() {
        let resp = mock_response(200, "[]");
        assert!(check_response(resp).await.is_ok());
    }

    #[test]
    fn rows_from_body_accepts_array_or_object() {
        let rows = rows_from_body(json!([{"id": "a"}, {"id": "b"}])).unwrap();
        assert_eq!(rows.len(), 2);
        let rows = rows_from_body(json!({"id": "a"})).unwrap();
        assert_eq!(rows[0]["id"], "a");
        assert!(rows_from_body(json!("nope")).is_err());
    }

    #[test]
    fn client_uses_api_key_as_default_bearer() {
        let config = BackendConfig {
            url: "https://abc.supabase.co/rest/v1/".into(),
            api_key: "anon".into(),
            ..Default::default()
        };
        let backend = PostgrestBackend::new(&config).unwrap();
        assert_eq!(backend.bearer, "anon");
        assert_eq!(
            backend.url("users", &[]),
            "https://abc.supabase.co/rest/v1/users"
        );
        let backend = backend.with_access_token("user-jwt");
        assert_eq!(backend.bearer, "user-jwt");
    }
}
