//! Stateless HTTP request builder and response parser for the table API.
//!
//! # Design
//! `TableClient` holds only its `RemoteConfig` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The host executes the HTTP round-trip in between, so one
//! operation is always exactly one outbound call.

use url::form_urlencoded;

use crate::config::RemoteConfig;
use crate::error::{ApiError, Operation};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DataRecord, NewRecord, NewUser, RecordPatch, User};

const REST_PREFIX: &str = "/rest/v1";
const USERS: &str = "users";
const DATA: &str = "data";

const RETURN_MINIMAL: &str = "return=minimal";
const RETURN_MINIMAL_COUNTED: &str = "return=minimal, count=exact";
const COUNT_EXACT: &str = "count=exact";

pub const REGISTERED: &str = "User registered successfully";
pub const RECORD_ADDED: &str = "Record added successfully";
pub const RECORD_UPDATED: &str = "Record updated successfully";
pub const RECORD_DELETED: &str = "Record deleted successfully";

/// Synchronous, stateless client for the table API.
#[derive(Debug, Clone)]
pub struct TableClient {
    config: RemoteConfig,
}

impl TableClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }

    // -----------------------------------------------------------------------
    // users
    // -----------------------------------------------------------------------

    /// Insert a user row. The body carries the digest, never `password`.
    pub fn build_register(&self, login: &str, password: &str) -> Result<HttpRequest, ApiError> {
        let payload = NewUser {
            login: login.to_string(),
            hashed_password: self.config.digest().digest(password),
        };
        let body = to_json(&payload)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.table_url(USERS, &[]),
            headers: self.write_headers(Some(RETURN_MINIMAL)),
            body: Some(body),
        })
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, Operation::Register)?;
        Ok(REGISTERED.to_string())
    }

    /// Filtered read on login and digest. Only `id` and `login` are selected.
    pub fn build_login(&self, login: &str, password: &str) -> HttpRequest {
        let digest = self.config.digest().digest(password);
        HttpRequest {
            method: HttpMethod::Get,
            url: self.table_url(
                USERS,
                &[
                    ("select", "id,login".to_string()),
                    ("login", eq(login)),
                    ("hashed_password", eq(&digest)),
                ],
            ),
            headers: self.auth_headers(),
            body: None,
        }
    }

    /// `Ok(None)` when no row matched; that is a credential mismatch, not a
    /// failure.
    pub fn parse_login(&self, response: HttpResponse) -> Result<Option<User>, ApiError> {
        check_status(&response, Operation::Login)?;
        let users: Vec<User> = from_json(&response.body)?;
        Ok(users.into_iter().next())
    }

    // -----------------------------------------------------------------------
    // data
    // -----------------------------------------------------------------------

    pub fn build_list_data(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.table_url(DATA, &[("select", "*".to_string())]),
            headers: self.auth_headers(),
            body: None,
        }
    }

    pub fn parse_list_data(&self, response: HttpResponse) -> Result<Vec<DataRecord>, ApiError> {
        check_status(&response, Operation::ListData)?;
        if response.body.trim().is_empty() {
            return Ok(Vec::new());
        }
        from_json(&response.body)
    }

    pub fn build_add_data(
        &self,
        content: &str,
        user_id: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let payload = NewRecord {
            content: content.to_string(),
            user_id: user_id.map(str::to_string),
        };
        let body = to_json(&payload)?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.table_url(DATA, &[]),
            headers: self.write_headers(Some(RETURN_MINIMAL)),
            body: Some(body),
        })
    }

    pub fn parse_add_data(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, Operation::AddData)?;
        Ok(RECORD_ADDED.to_string())
    }

    pub fn build_update_data(&self, id: &str, content: &str) -> Result<HttpRequest, ApiError> {
        let payload = RecordPatch {
            content: content.to_string(),
        };
        let body = to_json(&payload)?;
        let prefer = if self.config.strict_mutations() {
            RETURN_MINIMAL_COUNTED
        } else {
            RETURN_MINIMAL
        };
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            url: self.table_url(DATA, &[("id", eq(id))]),
            headers: self.write_headers(Some(prefer)),
            body: Some(body),
        })
    }

    pub fn parse_update_data(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, Operation::UpdateData)?;
        self.check_affected(&response)?;
        Ok(RECORD_UPDATED.to_string())
    }

    pub fn build_delete_data(&self, id: &str) -> HttpRequest {
        let mut headers = self.auth_headers();
        if self.config.strict_mutations() {
            headers.push(("prefer".to_string(), COUNT_EXACT.to_string()));
        }
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.table_url(DATA, &[("id", eq(id))]),
            headers,
            body: None,
        }
    }

    pub fn parse_delete_data(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, Operation::DeleteData)?;
        self.check_affected(&response)?;
        Ok(RECORD_DELETED.to_string())
    }

    // -----------------------------------------------------------------------
    // helpers
    // -----------------------------------------------------------------------

    fn table_url(&self, table: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}{REST_PREFIX}/{table}", self.config.base_url());
        if !query.is_empty() {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in query {
                serializer.append_pair(key, value);
            }
            url.push('?');
            url.push_str(&serializer.finish());
        }
        url
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        let key = self.config.api_key();
        vec![
            ("apikey".to_string(), key.to_string()),
            ("authorization".to_string(), format!("Bearer {key}")),
        ]
    }

    fn write_headers(&self, prefer: Option<&str>) -> Vec<(String, String)> {
        let mut headers = self.auth_headers();
        headers.push(("content-type".to_string(), "application/json".to_string()));
        if let Some(prefer) = prefer {
            headers.push(("prefer".to_string(), prefer.to_string()));
        }
        headers
    }

    fn check_affected(&self, response: &HttpResponse) -> Result<(), ApiError> {
        if self.config.strict_mutations() && affected_rows(response) == Some(0) {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

/// Rows touched by a PATCH or DELETE, read from `Content-Range`.
///
/// `*/N` and `a-b/N` give `N`; `a-b/*` gives `b - a + 1`; `*/*` gives 0.
/// `None` when the header is absent or unreadable.
pub fn affected_rows(response: &HttpResponse) -> Option<u64> {
    let value = response.header("content-range")?.trim();
    let (range, total) = value.split_once('/')?;
    if let Ok(total) = total.trim().parse::<u64>() {
        return Some(total);
    }
    match range.trim() {
        "*" => Some(0),
        range => {
            let (first, last) = range.split_once('-')?;
            let first = first.trim().parse::<u64>().ok()?;
            let last = last.trim().parse::<u64>().ok()?;
            last.checked_sub(first).map(|span| span + 1)
        }
    }
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

fn to_json<T: serde::Serialize>(payload: &T) -> Result<String, ApiError> {
    serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map a non-2xx status to `ApiError::Remote`, keeping the body.
fn check_status(response: &HttpResponse, operation: Operation) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Remote {
        operation,
        status: response.status,
        body: response.body.clone(),
    })
}
