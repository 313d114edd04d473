//! HTTP gateway for the Stellar reservations API.
//!
//! Pure pass-through: every operation issues exactly one request and either
//! returns server-authoritative data or a normalized [`ApiError`]. Retries
//! and caching are deliberately absent — both are the store's concern.
//!
//! Mutation endpoints (`update_status`, `modify`) parse their responses as
//! [`ReservaPatch`] rather than a full record: the store merges exactly the
//! fields the server reported, and anything the server left unspecified
//! keeps its local value.

pub mod errors;
pub mod json;

use crate::config::StoreConfig;
use crate::model::{Estado, ListParams, NuevaReserva, Page, Reserva, ReservaId, ReservaPatch};
use async_trait::async_trait;
use errors::ApiError;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

#[async_trait]
pub trait ReservasGateway: Send + Sync {
    async fn list(&self, params: &ListParams) -> Result<Page, ApiError>;
    async fn get(&self, id: ReservaId) -> Result<Reserva, ApiError>;
    async fn create(&self, data: &NuevaReserva) -> Result<Reserva, ApiError>;
    async fn update_status(
        &self,
        id: ReservaId,
        estado: Estado,
        motivo: Option<&str>,
    ) -> Result<ReservaPatch, ApiError>;
    async fn modify(&self, id: ReservaId, cambios: &ReservaPatch) -> Result<ReservaPatch, ApiError>;
}

pub struct ReservasApi {
    client: reqwest::Client,
    base_url: Url,
    shutdown: CancellationToken,
}

impl ReservasApi {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            client,
            base_url,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    /// Tie in-flight requests to `token`; once it fires, pending and future
    /// requests resolve to [`ApiError::Cancelled`].
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        tokio::select! {
            _ = self.shutdown.cancelled() => Err(ApiError::Cancelled),
            result = request.send() => Ok(result?),
        }
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        id: Option<ReservaId>,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let url = response.url().to_string();
        let body = tokio::select! {
            _ = self.shutdown.cancelled() => return Err(ApiError::Cancelled),
            body = response.text() => body.map_err(ApiError::Network)?,
        };

        if !status.is_success() {
            return Err(status_error(status, &body, id));
        }

        json::parse_json(&body).map_err(|detail| {
            warn!(%url, %detail, "malformed response body");
            ApiError::Malformed { url, detail }
        })
    }
}

/// Map a non-success status plus its body to the error taxonomy.
fn status_error(status: StatusCode, body: &str, id: Option<ReservaId>) -> ApiError {
    let message = error_message(body);
    if status == StatusCode::NOT_FOUND
        && let Some(id) = id
    {
        return ApiError::NotFound { id };
    }
    if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        return ApiError::Validation {
            message: message.unwrap_or_else(|| "Solicitud inválida".to_owned()),
        };
    }
    ApiError::Server {
        status: status.as_u16(),
        message,
    }
}

/// Pull the human-readable message out of an error body. The backend is not
/// consistent: some routes answer `{"message": ...}`, others `{"error": ...}`.
fn error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .filter(|message| !message.is_empty())
}

/// Reject records the server failed to assign an id to. The PHP layer has
/// been seen returning half-built rows on replication lag.
fn require_id(reserva: Reserva, url: &str) -> Result<Reserva, ApiError> {
    if reserva.id.0 == 0 {
        return Err(ApiError::Malformed {
            url: url.to_owned(),
            detail: "reservation without a usable id".to_owned(),
        });
    }
    Ok(reserva)
}

#[async_trait]
impl ReservasGateway for ReservasApi {
    async fn list(&self, params: &ListParams) -> Result<Page, ApiError> {
        let url = self.endpoint("reservas");
        let response = self.send(self.client.get(url.as_str()).query(params)).await?;
        let page: Page = self.parse_response(response, None).await?;
        debug!(count = page.data.len(), total = page.meta.total, "listed reservations");
        Ok(page)
    }

    async fn get(&self, id: ReservaId) -> Result<Reserva, ApiError> {
        let url = self.endpoint(&format!("reservas/{id}"));
        let response = self.send(self.client.get(url.as_str())).await?;
        let reserva: Reserva = self.parse_response(response, Some(id)).await?;
        require_id(reserva, &url)
    }

    async fn create(&self, data: &NuevaReserva) -> Result<Reserva, ApiError> {
        let url = self.endpoint("reservas");
        let response = self.send(self.client.post(url.as_str()).json(data)).await?;
        let reserva: Reserva = self.parse_response(response, None).await?;
        let reserva = require_id(reserva, &url)?;
        debug!(id = %reserva.id, "reservation created");
        Ok(reserva)
    }

    async fn update_status(
        &self,
        id: ReservaId,
        estado: Estado,
        motivo: Option<&str>,
    ) -> Result<ReservaPatch, ApiError> {
        let url = self.endpoint(&format!("reservas/{id}/estado"));
        let body = json!({ "estado": estado, "motivoCancelacion": motivo });
        let response = self.send(self.client.patch(url.as_str()).json(&body)).await?;
        let patch = self.parse_response(response, Some(id)).await?;
        debug!(%id, %estado, "status update acknowledged");
        Ok(patch)
    }

    async fn modify(&self, id: ReservaId, cambios: &ReservaPatch) -> Result<ReservaPatch, ApiError> {
        let url = self.endpoint(&format!("reservas/{id}"));
        let response = self.send(self.client.patch(url.as_str()).json(cambios)).await?;
        self.parse_response(response, Some(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_doubled_slashes() {
        let api = ReservasApi::new(
            Url::parse("http://localhost:8000/api/").unwrap(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(api.endpoint("reservas"), "http://localhost:8000/api/reservas");
        assert_eq!(
            api.endpoint("reservas/42/estado"),
            "http://localhost:8000/api/reservas/42/estado"
        );
    }

    #[test]
    fn error_message_reads_both_backend_shapes() {
        assert_eq!(
            error_message(r#"{"message": "Reserva no encontrada"}"#).as_deref(),
            Some("Reserva no encontrada")
        );
        assert_eq!(
            error_message(r#"{"error": "Error al cancelar la reserva"}"#).as_deref(),
            Some("Error al cancelar la reserva")
        );
        assert_eq!(error_message(r#"{"message": ""}"#), None);
        assert_eq!(error_message("<html>nope</html>"), None);
    }

    #[test]
    fn status_error_maps_the_taxonomy() {
        let err = status_error(StatusCode::NOT_FOUND, "{}", Some(ReservaId(9)));
        assert!(matches!(err, ApiError::NotFound { id } if id == ReservaId(9)));

        // A 404 on a collection route has no id to blame.
        let err = status_error(StatusCode::NOT_FOUND, "{}", None);
        assert!(matches!(err, ApiError::Server { status: 404, .. }));

        let err = status_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message": "fechaViaje es obligatoria"}"#,
            None,
        );
        match err {
            ApiError::Validation { message } => assert_eq!(message, "fechaViaje es obligatoria"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let err = status_error(StatusCode::BAD_GATEWAY, "", None);
        assert!(matches!(err, ApiError::Server { status: 502, message: None }));
    }

    #[test]
    fn require_id_rejects_half_built_rows() {
        let mut reserva = crate::model::tests::sample_reserva(0);
        assert!(require_id(reserva.clone(), "http://x").is_err());
        reserva.id = ReservaId(3);
        assert!(require_id(reserva, "http://x").is_ok());
    }
}
