//! Linear GraphQL implementation of [`AttachmentClient`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    AttachmentClient, CreateAttachment, CreateAttachmentResult, RemoteError, RemoteResult,
};
use crate::models::RemoteAttachment;
use crate::util::{compact_text, is_http_url, normalize_text_option};

pub const DEFAULT_API_URL: &str = "https://api.linear.app/graphql";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const ATTACHMENT_PAGE_SIZE: u32 = 100;
const MAX_ATTACHMENT_PAGES: usize = 20;

const ATTACHMENTS_FOR_URL_QUERY: &str = r"
query AttachmentsForUrl($url: String!, $first: Int!, $after: String) {
  attachmentsForURL(url: $url, first: $first, after: $after) {
    nodes { id url issue { id identifier } }
    pageInfo { hasNextPage endCursor }
  }
}";

const ISSUE_QUERY: &str = r"
query Issue($id: String!) {
  issue(id: $id) { id identifier }
}";

const ATTACHMENT_CREATE_MUTATION: &str = r"
mutation AttachmentCreate($input: AttachmentCreateInput!) {
  attachmentCreate(input: $input) { success attachment { id } }
}";

const ATTACHMENT_DELETE_MUTATION: &str = r"
mutation AttachmentDelete($id: String!) {
  attachmentDelete(id: $id) { success }
}";

#[derive(Clone)]
pub struct LinearClient {
    endpoint: String,
    access_token: String,
    client: reqwest::Client,
}

impl fmt::Debug for LinearClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LinearClient")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl LinearClient {
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> RemoteResult<Self> {
        Self::with_timeout(
            endpoint,
            access_token,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> RemoteResult<Self> {
        let endpoint = normalize_endpoint(endpoint.into())?;
        let access_token = normalize_text_option(Some(access_token.into())).ok_or_else(|| {
            RemoteError::InvalidConfiguration("access token must not be empty".to_string())
        })?;

        Ok(Self {
            endpoint,
            access_token,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> RemoteResult<T> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let retry_after_secs = parse_retry_after(
            response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok()),
        );
        let body = response.text().await?;

        decode_response(operation, status, retry_after_secs, &body)
    }
}

#[async_trait]
impl AttachmentClient for LinearClient {
    async fn attachments_for_url(&self, url: &str) -> RemoteResult<Vec<RemoteAttachment>> {
        let mut attachments = Vec::new();
        let mut after: Option<String> = None;

        for _page in 0..MAX_ATTACHMENT_PAGES {
            let data: AttachmentsForUrlData = self
                .execute(
                    "attachmentsForURL",
                    ATTACHMENTS_FOR_URL_QUERY,
                    json!({ "url": url, "first": ATTACHMENT_PAGE_SIZE, "after": after }),
                )
                .await?;

            let connection = data.attachments_for_url;
            attachments.extend(
                connection
                    .nodes
                    .into_iter()
                    .filter_map(AttachmentNode::into_remote),
            );

            match connection.page_info {
                Some(PageInfo {
                    has_next_page: true,
                    end_cursor: Some(cursor),
                }) => after = Some(cursor),
                _ => return Ok(attachments),
            }
        }

        tracing::warn!(
            pages = MAX_ATTACHMENT_PAGES,
            "Stopped paging attachments for URL; results may be incomplete"
        );
        Ok(attachments)
    }

    async fn resolve_issue(&self, identifier: &str) -> RemoteResult<Option<String>> {
        match self
            .execute::<IssueData>("issue", ISSUE_QUERY, json!({ "id": identifier }))
            .await
        {
            Ok(data) => Ok(data.issue.map(|issue| issue.id)),
            Err(RemoteError::NotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn create_attachment(
        &self,
        input: &CreateAttachment,
    ) -> RemoteResult<CreateAttachmentResult> {
        let data: AttachmentCreateData = self
            .execute(
                "attachmentCreate",
                ATTACHMENT_CREATE_MUTATION,
                json!({ "input": input }),
            )
            .await?;

        let payload = data.attachment_create;
        Ok(CreateAttachmentResult {
            success: payload.success,
            attachment_id: payload.attachment.map(|attachment| attachment.id),
        })
    }

    async fn delete_attachment(&self, attachment_id: &str) -> RemoteResult<bool> {
        let data: AttachmentDeleteData = self
            .execute(
                "attachmentDelete",
                ATTACHMENT_DELETE_MUTATION,
                json!({ "id": attachment_id }),
            )
            .await?;
        Ok(data.attachment_delete.success)
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    extensions: Option<GraphqlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlErrorExtensions {
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
    user_presentable_message: Option<String>,
}

impl GraphqlError {
    fn display_message(&self) -> &str {
        self.extensions
            .as_ref()
            .and_then(|extensions| extensions.user_presentable_message.as_deref())
            .unwrap_or(&self.message)
    }

    fn has_signal(&self, candidates: &[&str]) -> bool {
        let Some(extensions) = self.extensions.as_ref() else {
            return false;
        };
        [extensions.kind.as_deref(), extensions.code.as_deref()]
            .into_iter()
            .flatten()
            .map(signal_key)
            .any(|signal| candidates.contains(&signal.as_str()))
    }

    fn is_forbidden(&self) -> bool {
        self.has_signal(&[
            "forbidden",
            "authenticationerror",
            "unauthenticated",
            "unauthorized",
        ])
    }

    fn is_rate_limited(&self) -> bool {
        self.has_signal(&["ratelimited"])
    }

    fn is_not_found(&self) -> bool {
        self.has_signal(&["notfound", "entitynotfound"])
            || self.message.to_ascii_lowercase().contains("entity not found")
    }
}

#[derive(Debug, Deserialize)]
struct AttachmentsForUrlData {
    #[serde(rename = "attachmentsForURL")]
    attachments_for_url: AttachmentConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentConnection {
    #[serde(default)]
    nodes: Vec<AttachmentNode>,
    #[serde(default)]
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AttachmentNode {
    id: String,
    url: String,
    issue: Option<IssueNode>,
}

impl AttachmentNode {
    fn into_remote(self) -> Option<RemoteAttachment> {
        let Some(issue) = self.issue else {
            tracing::debug!(attachment_id = %self.id, "Skipping attachment without a linked issue");
            return None;
        };
        Some(RemoteAttachment {
            id: self.id,
            url: self.url,
            issue_id: issue.id,
            issue_identifier: issue.identifier,
        })
    }
}

#[derive(Debug, Deserialize)]
struct IssueNode {
    id: String,
    identifier: String,
}

#[derive(Debug, Deserialize)]
struct IssueData {
    issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentCreateData {
    attachment_create: AttachmentCreatePayload,
}

#[derive(Debug, Deserialize)]
struct AttachmentCreatePayload {
    success: bool,
    attachment: Option<AttachmentIdNode>,
}

#[derive(Debug, Deserialize)]
struct AttachmentIdNode {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentDeleteData {
    attachment_delete: SuccessPayload,
}

#[derive(Debug, Deserialize)]
struct SuccessPayload {
    success: bool,
}

fn decode_response<T: DeserializeOwned>(
    operation: &str,
    status: StatusCode,
    retry_after_secs: Option<u64>,
    body: &str,
) -> RemoteResult<T> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(RemoteError::RateLimited {
            message: with_retry_hint(format!("{operation} returned HTTP 429"), retry_after_secs),
            retry_after_secs,
        });
    }
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(RemoteError::Forbidden(format!(
            "{operation} returned HTTP {}",
            status.as_u16()
        )));
    }

    let envelope = match serde_json::from_str::<GraphqlResponse>(body) {
        Ok(envelope) => envelope,
        Err(error) => return Err(status_error(operation, status, body, &error)),
    };

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        return Err(classify_errors(operation, &errors, retry_after_secs));
    }
    if !status.is_success() {
        return Err(status_error(operation, status, body, &"no GraphQL errors"));
    }

    let data = envelope.data.filter(|data| !data.is_null()).ok_or_else(|| {
        RemoteError::InvalidPayload(format!("{operation} response did not include data"))
    })?;
    serde_json::from_value(data)
        .map_err(|error| RemoteError::InvalidPayload(format!("{operation}: {error}")))
}

fn status_error(
    operation: &str,
    status: StatusCode,
    body: &str,
    detail: &impl fmt::Display,
) -> RemoteError {
    if status == StatusCode::NOT_FOUND {
        return RemoteError::NotFound(format!("{operation} returned HTTP 404"));
    }
    if status.is_success() {
        return RemoteError::InvalidPayload(format!("{operation}: {detail}"));
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        RemoteError::Api(format!("{operation} failed with HTTP {}", status.as_u16()))
    } else {
        RemoteError::Api(format!(
            "{operation} failed: {trimmed} ({})",
            status.as_u16()
        ))
    }
}

fn classify_errors(
    operation: &str,
    errors: &[GraphqlError],
    retry_after_secs: Option<u64>,
) -> RemoteError {
    let joined = errors
        .iter()
        .map(GraphqlError::display_message)
        .collect::<Vec<_>>()
        .join("; ");
    let message = format!("{operation}: {}", compact_text(&joined));

    if errors.iter().any(GraphqlError::is_forbidden) {
        RemoteError::Forbidden(message)
    } else if errors.iter().any(GraphqlError::is_rate_limited) {
        RemoteError::RateLimited {
            message: with_retry_hint(message, retry_after_secs),
            retry_after_secs,
        }
    } else if errors.iter().any(GraphqlError::is_not_found) {
        RemoteError::NotFound(message)
    } else {
        RemoteError::Api(message)
    }
}

fn with_retry_hint(message: String, retry_after_secs: Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!("{message} (retry after {secs}s)"),
        None => message,
    }
}

fn signal_key(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase()
}

fn parse_retry_after(value: Option<&str>) -> Option<u64> {
    value.and_then(|value| value.trim().parse::<u64>().ok())
}

fn normalize_endpoint(raw: String) -> RemoteResult<String> {
    let endpoint = normalize_text_option(Some(raw)).ok_or_else(|| {
        RemoteError::InvalidConfiguration("endpoint must not be empty".to_string())
    })?;
    if is_http_url(&endpoint) {
        Ok(endpoint.trim_end_matches('/').to_string())
    } else {
        Err(RemoteError::InvalidConfiguration(
            "endpoint must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serve `responses` in order, one connection each, and hand back the
    /// request bodies the server saw. `head` is the status line optionally
    /// followed by extra header lines.
    async fn spawn_graphql_server(
        responses: Vec<(&'static str, String)>,
    ) -> (String, JoinHandle<Vec<Value>>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let address = listener.local_addr().expect("local address");

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (head, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let request = read_request_body(&mut socket).await;
                requests.push(serde_json::from_str(&request).unwrap_or(Value::Null));
                let response = format!(
                    "HTTP/1.1 {head}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
            requests
        });

        (format!("http://{address}/graphql"), handle)
    }

    async fn read_request_body(socket: &mut TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.unwrap_or(0);
            if read == 0 {
                return String::new();
            }
            buffer.extend_from_slice(&chunk[..read]);

            let Some(header_end) = buffer.windows(4).position(|window| window == b"\r\n\r\n")
            else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_string();
            let content_length = headers
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let body_start = header_end + 4;
            if buffer.len() >= body_start + content_length {
                return String::from_utf8_lossy(&buffer[body_start..body_start + content_length])
                    .to_string();
            }
        }
    }

    fn attachment_page(id: &str, next_cursor: Option<&str>) -> String {
        json!({
            "data": {
                "attachmentsForURL": {
                    "nodes": [{
                        "id": id,
                        "url": "https://docs.example.com/doc/a?source=outline",
                        "issue": { "id": format!("issue-{id}"), "identifier": format!("ENG-{id}") }
                    }],
                    "pageInfo": { "hasNextPage": next_cursor.is_some(), "endCursor": next_cursor }
                }
            }
        })
        .to_string()
    }

    fn decode<T: DeserializeOwned>(status: u16, body: &str) -> RemoteResult<T> {
        decode_response(
            "test",
            StatusCode::from_u16(status).unwrap(),
            Some(30),
            body,
        )
    }

    #[test]
    fn new_rejects_invalid_configuration() {
        let err = LinearClient::new("  ", "token").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));

        let err = LinearClient::new("api.linear.app/graphql", "token").unwrap_err();
        assert!(err.to_string().contains("http:// or https://"));

        let err = LinearClient::new(DEFAULT_API_URL, "   ").unwrap_err();
        assert!(err.to_string().contains("access token"));
    }

    #[test]
    fn new_trims_trailing_slash() {
        let client = LinearClient::new("https://api.linear.app/graphql/", "token").unwrap();
        assert_eq!(client.endpoint(), "https://api.linear.app/graphql");
    }

    #[test]
    fn debug_redacts_access_token() {
        let client = LinearClient::new(DEFAULT_API_URL, "lin_oauth_secret").unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("lin_oauth_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn decodes_attachment_page() {
        let body = r#"{
          "data": {
            "attachmentsForURL": {
              "nodes": [
                { "id": "a1", "url": "https://docs.example.com/doc/a?source=outline",
                  "issue": { "id": "i1", "identifier": "ENG-456" } },
                { "id": "a2", "url": "https://docs.example.com/doc/a?source=outline",
                  "issue": null }
              ],
              "pageInfo": { "hasNextPage": false, "endCursor": null }
            }
          }
        }"#;

        let data: AttachmentsForUrlData = decode(200, body).unwrap();
        let attachments: Vec<RemoteAttachment> = data
            .attachments_for_url
            .nodes
            .into_iter()
            .filter_map(AttachmentNode::into_remote)
            .collect();
        assert_eq!(
            attachments,
            vec![RemoteAttachment {
                id: "a1".to_string(),
                url: "https://docs.example.com/doc/a?source=outline".to_string(),
                issue_id: "i1".to_string(),
                issue_identifier: "ENG-456".to_string(),
            }]
        );
    }

    #[test]
    fn forbidden_graphql_error_is_classified() {
        let body = r#"{
          "data": null,
          "errors": [{
            "message": "Forbidden",
            "extensions": { "type": "forbidden", "userPresentableMessage": "You don't have access" }
          }]
        }"#;
        let err = decode::<Value>(400, body).unwrap_err();
        assert!(err.is_forbidden(), "{err:?}");
        assert!(err.to_string().contains("You don't have access"));
    }

    #[test]
    fn http_status_forbidden_is_classified_without_body() {
        assert!(decode::<Value>(403, "").unwrap_err().is_forbidden());
        assert!(decode::<Value>(401, "<html>").unwrap_err().is_forbidden());
    }

    #[test]
    fn entity_not_found_is_classified() {
        let body = r#"{ "errors": [{ "message": "Entity not found: Attachment" }] }"#;
        assert!(decode::<Value>(200, body).unwrap_err().is_not_found());

        let body = r#"{ "errors": [{ "message": "missing", "extensions": { "code": "NOT_FOUND" } }] }"#;
        assert!(decode::<Value>(400, body).unwrap_err().is_not_found());
    }

    #[test]
    fn rate_limit_keeps_retry_after() {
        match decode::<Value>(429, "").unwrap_err() {
            RemoteError::RateLimited {
                retry_after_secs, ..
            } => assert_eq!(retry_after_secs, Some(30)),
            other => panic!("unexpected error: {other:?}"),
        }

        let body = r#"{ "errors": [{ "message": "Too many", "extensions": { "code": "RATELIMITED" } }] }"#;
        assert!(matches!(
            decode::<Value>(400, body).unwrap_err(),
            RemoteError::RateLimited { .. }
        ));
    }

    #[test]
    fn unparseable_error_body_becomes_api_error() {
        let err = decode::<Value>(502, "bad gateway").unwrap_err();
        match err {
            RemoteError::Api(message) => {
                assert!(message.contains("bad gateway"));
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_data_is_invalid_payload() {
        let err = decode::<IssueData>(200, r#"{ "data": null }"#).unwrap_err();
        assert!(matches!(err, RemoteError::InvalidPayload(_)));
    }

    #[test]
    fn decodes_mutation_payloads() {
        let created: AttachmentCreateData = decode(
            200,
            r#"{ "data": { "attachmentCreate": { "success": true, "attachment": { "id": "a9" } } } }"#,
        )
        .unwrap();
        assert!(created.attachment_create.success);
        assert_eq!(created.attachment_create.attachment.unwrap().id, "a9");

        let deleted: AttachmentDeleteData = decode(
            200,
            r#"{ "data": { "attachmentDelete": { "success": false } } }"#,
        )
        .unwrap();
        assert!(!deleted.attachment_delete.success);
    }

    #[test]
    fn create_input_serializes_camel_case() {
        let input = CreateAttachment {
            issue_id: "i1".to_string(),
            title: "Roadmap".to_string(),
            subtitle: "Outline".to_string(),
            url: "https://docs.example.com/doc/a?source=outline".to_string(),
            icon_url: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["issueId"], "i1");
        assert_eq!(value["subtitle"], "Outline");
        assert!(value.get("iconUrl").is_none());
    }

    #[test]
    fn parse_retry_after_accepts_seconds_only() {
        assert_eq!(parse_retry_after(Some(" 12 ")), Some(12));
        assert_eq!(parse_retry_after(Some("Wed, 21 Oct 2015 07:28:00 GMT")), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[tokio::test]
    async fn attachments_for_url_follows_cursor_across_pages() {
        let (endpoint, server) = spawn_graphql_server(vec![
            ("200 OK", attachment_page("a1", Some("cursor-1"))),
            ("200 OK", attachment_page("a2", None)),
        ])
        .await;
        let client = LinearClient::new(endpoint, "token").unwrap();

        let attachments = client
            .attachments_for_url("https://docs.example.com/doc/a?source=outline")
            .await
            .unwrap();

        let ids: Vec<&str> = attachments
            .iter()
            .map(|attachment| attachment.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a1", "a2"]);
        assert_eq!(attachments[1].issue_identifier, "ENG-a2");

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["variables"]["after"], Value::Null);
        assert_eq!(requests[1]["variables"]["after"], "cursor-1");
        assert_eq!(
            requests[1]["variables"]["url"],
            "https://docs.example.com/doc/a?source=outline"
        );
    }

    #[tokio::test]
    async fn attachments_for_url_stops_at_page_cap() {
        let pages = (0..MAX_ATTACHMENT_PAGES)
            .map(|page| {
                let id = format!("a{page}");
                let cursor = format!("cursor-{page}");
                ("200 OK", attachment_page(&id, Some(&cursor)))
            })
            .collect();
        let (endpoint, server) = spawn_graphql_server(pages).await;
        let client = LinearClient::new(endpoint, "token").unwrap();

        let attachments = client
            .attachments_for_url("https://docs.example.com/doc/a?source=outline")
            .await
            .unwrap();

        assert_eq!(attachments.len(), MAX_ATTACHMENT_PAGES);
        assert_eq!(server.await.unwrap().len(), MAX_ATTACHMENT_PAGES);
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after_header() {
        let (endpoint, server) = spawn_graphql_server(vec![(
            "429 Too Many Requests\r\nretry-after: 7",
            r#"{ "errors": [{ "message": "Rate limit exceeded" }] }"#.to_string(),
        )])
        .await;
        let client = LinearClient::new(endpoint, "token").unwrap();

        let err = client.resolve_issue("ENG-1").await.unwrap_err();

        match err {
            RemoteError::RateLimited {
                message,
                retry_after_secs,
            } => {
                assert_eq!(retry_after_secs, Some(7));
                assert!(message.contains("retry after 7s"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn forbidden_status_fails_create() {
        let (endpoint, server) = spawn_graphql_server(vec![(
            "403 Forbidden",
            r#"{ "errors": [{ "message": "Forbidden" }] }"#.to_string(),
        )])
        .await;
        let client = LinearClient::new(endpoint, "token").unwrap();

        let err = client
            .create_attachment(&CreateAttachment {
                issue_id: "i1".to_string(),
                title: "Roadmap".to_string(),
                subtitle: "Outline".to_string(),
                url: "https://docs.example.com/doc/a?source=outline".to_string(),
                icon_url: None,
            })
            .await
            .unwrap_err();

        assert!(err.is_forbidden(), "{err:?}");
        let requests = server.await.unwrap();
        assert_eq!(requests[0]["variables"]["input"]["issueId"], "i1");
    }

    #[tokio::test(flavor = "multi_thread")]
    #[ignore = "Requires LINEAR_ACCESS_TOKEN plus network access"]
    async fn linear_lists_attachments_for_unknown_url() {
        let _ = dotenvy::dotenv();

        let token = std::env::var("LINEAR_ACCESS_TOKEN").expect("LINEAR_ACCESS_TOKEN must be set");
        let client = LinearClient::new(DEFAULT_API_URL, token).unwrap();
        let attachments = client
            .attachments_for_url("https://backlinks.invalid/doc/none?source=outline")
            .await
            .unwrap_or_else(|error| panic!("attachmentsForURL failed: {error}"));
        assert!(attachments.is_empty());
    }
}
