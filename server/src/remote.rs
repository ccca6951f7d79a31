//! Async facade over `TableClient`: build, execute once, parse.

use tablebridge_core::{
    affected_rows, ApiError, DataRecord, HttpRequest, HttpResponse, Operation, RemoteConfig,
    TableClient, User,
};
use tracing::{debug, warn};

use crate::transport::HttpTransport;

/// Shared by every handler. Cheap to clone; the reqwest pool is shared.
#[derive(Debug, Clone)]
pub struct RemoteDataClient {
    tables: TableClient,
    transport: HttpTransport,
}

impl RemoteDataClient {
    pub fn new(config: RemoteConfig) -> Self {
        Self::with_transport(config, HttpTransport::default())
    }

    pub fn with_transport(config: RemoteConfig, transport: HttpTransport) -> Self {
        Self {
            tables: TableClient::new(config),
            transport,
        }
    }

    pub async fn register_user(&self, login: &str, password: &str) -> Result<String, ApiError> {
        let request = self.tables.build_register(login, password)?;
        let response = self.send(Operation::Register, request).await?;
        self.tables.parse_register(response)
    }

    /// `Ok(None)` when the credentials match no user.
    pub async fn login_user(&self, login: &str, password: &str) -> Result<Option<User>, ApiError> {
        let request = self.tables.build_login(login, password);
        let response = self.send(Operation::Login, request).await?;
        self.tables.parse_login(response)
    }

    pub async fn get_all_data(&self) -> Result<Vec<DataRecord>, ApiError> {
        let request = self.tables.build_list_data();
        let response = self.send(Operation::ListData, request).await?;
        self.tables.parse_list_data(response)
    }

    pub async fn add_data(&self, content: &str, user_id: Option<&str>) -> Result<String, ApiError> {
        let request = self.tables.build_add_data(content, user_id)?;
        let response = self.send(Operation::AddData, request).await?;
        self.tables.parse_add_data(response)
    }

    pub async fn update_data(&self, id: &str, content: &str) -> Result<String, ApiError> {
        let request = self.tables.build_update_data(id, content)?;
        let response = self.send(Operation::UpdateData, request).await?;
        note_untouched(Operation::UpdateData, id, &response);
        self.tables.parse_update_data(response)
    }

    pub async fn delete_data(&self, id: &str) -> Result<String, ApiError> {
        let request = self.tables.build_delete_data(id);
        let response = self.send(Operation::DeleteData, request).await?;
        note_untouched(Operation::DeleteData, id, &response);
        self.tables.parse_delete_data(response)
    }

    async fn send(
        &self,
        operation: Operation,
        request: HttpRequest,
    ) -> Result<HttpResponse, ApiError> {
        debug!(
            %operation,
            method = %request.method,
            endpoint = request.endpoint(),
            prefer = request.header("prefer").unwrap_or("-"),
            "remote call"
        );
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| ApiError::Transport {
                operation,
                message: e.to_string(),
            })?;
        if !response.is_success() {
            warn!(%operation, status = response.status, "remote call rejected");
        }
        Ok(response)
    }
}

/// The remote treats zero affected rows as success; make it visible.
fn note_untouched(operation: Operation, id: &str, response: &HttpResponse) {
    if response.is_success() && affected_rows(response) == Some(0) {
        warn!(%operation, id, "no row matched");
    }
}
