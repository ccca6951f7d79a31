//! In-memory stand-in for a table-oriented REST data API.
//!
//! Speaks the subset of the `/rest/v1/<table>` dialect the bridge uses:
//! `col=eq.value` filters, `select`, `Prefer: return=minimal|representation`
//! and `count=exact`, `Content-Range` on mutations, an API key check, and a
//! unique `users.login`. Every request is recorded so tests can assert how
//! many calls an operation made.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{
    net::TcpListener,
    sync::{Mutex, RwLock},
};
use uuid::Uuid;

pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy)]
enum IdKind {
    Uuid,
    Serial,
}

#[derive(Debug)]
struct Table {
    columns: &'static [&'static str],
    required: &'static [&'static str],
    unique: &'static [&'static str],
    id: IdKind,
    rows: Vec<Row>,
    next_serial: u64,
}

impl Table {
    fn users() -> Self {
        Self {
            columns: &["id", "login", "hashed_password"],
            required: &["login", "hashed_password"],
            unique: &["login"],
            id: IdKind::Uuid,
            rows: Vec::new(),
            next_serial: 1,
        }
    }

    fn data() -> Self {
        Self {
            columns: &["id", "content", "user_id"],
            required: &["content"],
            unique: &[],
            id: IdKind::Serial,
            rows: Vec::new(),
            next_serial: 1,
        }
    }

    fn next_id(&mut self) -> Value {
        match self.id {
            IdKind::Uuid => Value::String(Uuid::new_v4().to_string()),
            IdKind::Serial => {
                let id = self.next_serial;
                self.next_serial += 1;
                json!(id)
            }
        }
    }
}

/// One request as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub table: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Shared state behind the router. Cloning shares the same tables.
#[derive(Clone)]
pub struct MockState {
    api_key: Arc<str>,
    tables: Arc<RwLock<HashMap<String, Table>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockState {
    pub fn new(api_key: &str) -> Self {
        let mut tables = HashMap::new();
        tables.insert("users".to_string(), Table::users());
        tables.insert("data".to_string(), Table::data());
        Self {
            api_key: Arc::from(api_key),
            tables: Arc::new(RwLock::new(tables)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Snapshot of every stored row of `table`.
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        let tables = self.tables.read().await;
        tables.get(table).map(|t| t.rows.clone()).unwrap_or_default()
    }

    /// Every request received so far, oldest first.
    pub async fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    async fn record(
        &self,
        method: &'static str,
        table: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) {
        self.requests.lock().await.push(RecordedRequest {
            method,
            table: table.to_string(),
            query: query.to_vec(),
            body: body.cloned(),
        });
    }
}

pub fn app(api_key: &str) -> Router {
    app_with_state(MockState::new(api_key))
}

pub fn app_with_state(state: MockState) -> Router {
    Router::new()
        .route(
            "/rest/v1/{table}",
            get(select_rows)
                .post(insert_rows)
                .patch(update_rows)
                .delete(delete_rows),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

type Params = Query<Vec<(String, String)>>;

async fn select_rows(
    State(state): State<MockState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Params,
) -> Response {
    state.record("GET", &table, &query, None).await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }

    let tables = state.tables.read().await;
    let Some(t) = tables.get(&table) else {
        return missing_table(&table);
    };
    let filters = match parse_filters(t, &table, &query) {
        Ok(filters) => filters,
        Err(resp) => return resp,
    };
    let columns = match parse_select(t, &table, &query) {
        Ok(columns) => columns,
        Err(resp) => return resp,
    };

    let rows: Vec<Row> = t
        .rows
        .iter()
        .filter(|row| matches_filters(row, &filters))
        .map(|row| project(row, columns.as_deref()))
        .collect();
    Json(rows).into_response()
}

async fn insert_rows(
    State(state): State<MockState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Params,
    Json(body): Json<Value>,
) -> Response {
    state.record("POST", &table, &query, Some(&body)).await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }

    let mut tables = state.tables.write().await;
    let Some(t) = tables.get_mut(&table) else {
        return missing_table(&table);
    };

    let objects = match body {
        Value::Object(row) => vec![row],
        Value::Array(items) => {
            let mut rows = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(row) => rows.push(row),
                    _ => return bad_json(),
                }
            }
            rows
        }
        _ => return bad_json(),
    };

    let mut inserted = Vec::with_capacity(objects.len());
    for mut row in objects {
        if let Err(resp) = check_columns(t, &table, &row) {
            return resp;
        }
        for column in t.required {
            if row.get(*column).map_or(true, Value::is_null) {
                return pg_error(
                    StatusCode::BAD_REQUEST,
                    "23502",
                    &format!(
                        "null value in column \"{column}\" of relation \"{table}\" violates not-null constraint"
                    ),
                );
            }
        }
        for column in t.unique {
            let value = row.get(*column);
            let taken = t
                .rows
                .iter()
                .chain(inserted.iter())
                .any(|existing: &Row| value.is_some() && existing.get(*column) == value);
            if taken {
                return pg_error(
                    StatusCode::CONFLICT,
                    "23505",
                    &format!("duplicate key value violates unique constraint \"{table}_{column}_key\""),
                );
            }
        }
        if !row.contains_key("id") {
            row.insert("id".to_string(), t.next_id());
        }
        for column in t.columns {
            row.entry(column.to_string()).or_insert(Value::Null);
        }
        inserted.push(row);
    }
    t.rows.extend(inserted.iter().cloned());

    if prefers(&headers, "return=representation") {
        (StatusCode::CREATED, Json(inserted)).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn update_rows(
    State(state): State<MockState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Params,
    Json(body): Json<Value>,
) -> Response {
    state.record("PATCH", &table, &query, Some(&body)).await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }

    let mut tables = state.tables.write().await;
    let Some(t) = tables.get_mut(&table) else {
        return missing_table(&table);
    };
    let filters = match parse_filters(t, &table, &query) {
        Ok(filters) => filters,
        Err(resp) => return resp,
    };
    let Value::Object(patch) = body else {
        return bad_json();
    };
    if let Err(resp) = check_columns(t, &table, &patch) {
        return resp;
    }
    for column in t.required {
        if patch.get(*column).is_some_and(Value::is_null) {
            return pg_error(
                StatusCode::BAD_REQUEST,
                "23502",
                &format!(
                    "null value in column \"{column}\" of relation \"{table}\" violates not-null constraint"
                ),
            );
        }
    }

    let mut touched = Vec::new();
    for row in t.rows.iter_mut().filter(|row| matches_filters(row, &filters)) {
        for (key, value) in &patch {
            row.insert(key.clone(), value.clone());
        }
        touched.push(row.clone());
    }
    mutation_response(&headers, touched)
}

async fn delete_rows(
    State(state): State<MockState>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(query): Params,
) -> Response {
    state.record("DELETE", &table, &query, None).await;
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }

    let mut tables = state.tables.write().await;
    let Some(t) = tables.get_mut(&table) else {
        return missing_table(&table);
    };
    let filters = match parse_filters(t, &table, &query) {
        Ok(filters) => filters,
        Err(resp) => return resp,
    };

    let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(&mut t.rows)
        .into_iter()
        .partition(|row| matches_filters(row, &filters));
    t.rows = kept;
    mutation_response(&headers, removed)
}

fn mutation_response(headers: &HeaderMap, rows: Vec<Row>) -> Response {
    let count = rows.len();
    let range = if prefers(headers, "count=exact") {
        format!("*/{count}")
    } else if count == 0 {
        "*/*".to_string()
    } else {
        format!("0-{}/*", count - 1)
    };

    if prefers(headers, "return=representation") {
        (StatusCode::OK, [(header::CONTENT_RANGE, range)], Json(rows)).into_response()
    } else {
        (StatusCode::NO_CONTENT, [(header::CONTENT_RANGE, range)]).into_response()
    }
}

fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let key = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let expected = Some(&*state.api_key);
    if key == expected && bearer == expected {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid API key"})),
        )
            .into_response())
    }
}

fn prefers(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get_all("prefer")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|pref| pref.trim() == token)
}

fn parse_filters(
    table: &Table,
    name: &str,
    query: &[(String, String)],
) -> Result<Vec<(String, String)>, Response> {
    let mut filters = Vec::new();
    for (column, predicate) in query.iter().filter(|(k, _)| k != "select") {
        if !table.columns.contains(&column.as_str()) {
            return Err(missing_column(name, column));
        }
        let Some(value) = predicate.strip_prefix("eq.") else {
            return Err(pg_error(
                StatusCode::BAD_REQUEST,
                "PGRST100",
                &format!("unsupported filter \"{predicate}\" on column \"{column}\""),
            ));
        };
        filters.push((column.clone(), value.to_string()));
    }
    Ok(filters)
}

fn parse_select(
    table: &Table,
    name: &str,
    query: &[(String, String)],
) -> Result<Option<Vec<String>>, Response> {
    let Some((_, select)) = query.iter().find(|(k, _)| k == "select") else {
        return Ok(None);
    };
    if select.trim() == "*" {
        return Ok(None);
    }
    let mut columns = Vec::new();
    for column in select.split(',').map(str::trim) {
        if !table.columns.contains(&column) {
            return Err(missing_column(name, column));
        }
        columns.push(column.to_string());
    }
    Ok(Some(columns))
}

fn check_columns(table: &Table, name: &str, row: &Row) -> Result<(), Response> {
    match row.keys().find(|k| !table.columns.contains(&k.as_str())) {
        Some(column) => Err(pg_error(
            StatusCode::BAD_REQUEST,
            "PGRST204",
            &format!("Could not find the '{column}' column of '{name}' in the schema cache"),
        )),
        None => Ok(()),
    }
}

fn matches_filters(row: &Row, filters: &[(String, String)]) -> bool {
    filters.iter().all(|(column, expected)| match row.get(column) {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => n.to_string() == *expected,
        Some(Value::Bool(b)) => b.to_string() == *expected,
        _ => false,
    })
}

fn project(row: &Row, columns: Option<&[String]>) -> Row {
    match columns {
        None => row.clone(),
        Some(columns) => columns
            .iter()
            .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
            .collect(),
    }
}

fn pg_error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({"code": code, "message": message}))).into_response()
}

fn missing_table(table: &str) -> Response {
    pg_error(
        StatusCode::NOT_FOUND,
        "42P01",
        &format!("relation \"public.{table}\" does not exist"),
    )
}

fn missing_column(table: &str, column: &str) -> Response {
    pg_error(
        StatusCode::BAD_REQUEST,
        "42703",
        &format!("column {table}.{column} does not exist"),
    )
}

fn bad_json() -> Response {
    pg_error(StatusCode::BAD_REQUEST, "PGRST102", "Invalid body")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn filters_compare_numbers_and_strings_as_text() {
        let r = row(json!({"id": 42, "content": "x", "user_id": null}));
        assert!(matches_filters(&r, &[("id".to_string(), "42".to_string())]));
        assert!(matches_filters(&r, &[("content".to_string(), "x".to_string())]));
        assert!(!matches_filters(&r, &[("id".to_string(), "4".to_string())]));
        assert!(!matches_filters(&r, &[("user_id".to_string(), "null".to_string())]));
    }

    #[test]
    fn projection_keeps_requested_columns() {
        let r = row(json!({"id": "u1", "login": "alice", "hashed_password": "d"}));
        let columns = ["id".to_string(), "login".to_string()];
        let projected = project(&r, Some(columns.as_slice()));
        assert_eq!(Value::Object(projected), json!({"id": "u1", "login": "alice"}));
    }

    #[test]
    fn serial_ids_increment() {
        let mut table = Table::data();
        assert_eq!(table.next_id(), json!(1));
        assert_eq!(table.next_id(), json!(2));
    }

    #[test]
    fn uuid_ids_are_strings() {
        let mut table = Table::users();
        assert!(table.next_id().is_string());
    }

    #[test]
    fn filters_reject_unknown_operators() {
        let table = Table::data();
        let query = vec![("id".to_string(), "gt.3".to_string())];
        assert!(parse_filters(&table, "data", &query).is_err());
    }

    #[test]
    fn select_star_means_all_columns() {
        let table = Table::users();
        let query = vec![("select".to_string(), "*".to_string())];
        assert_eq!(parse_select(&table, "users", &query).unwrap(), None);
    }
}
