//! WebSocket transport to the gateway.

use serde::Deserialize;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        self,
        client::IntoClientRequest,
        http::{HeaderValue, StatusCode, header::AUTHORIZATION},
    },
};

use crate::error::ClientError;

pub type GatewayStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Body of a rejected handshake
#[derive(Debug, Deserialize)]
struct RejectionBody {
    error: String,
}

/// Open a connection, sending the token as `Authorization: Bearer`.
///
/// A `401` on the handshake maps to `ClientError::AuthRejected` carrying the
/// gateway's reason. Every other failure is a retryable `ConnectionError`.
pub async fn connect(url: &str, token: &str) -> Result<GatewayStream, ClientError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| ClientError::InvalidRequest(format!("bad url '{}': {}", url, e)))?;
    let authorization = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| ClientError::InvalidRequest(format!("bad token: {}", e)))?;
    request.headers_mut().insert(AUTHORIZATION, authorization);

    match connect_async(request).await {
        Ok((stream, response)) => {
            tracing::debug!(status = %response.status(), "Handshake completed");
            Ok(stream)
        }
        Err(tungstenite::Error::Http(response))
            if response.status() == StatusCode::UNAUTHORIZED =>
        {
            let reason = response
                .body()
                .as_deref()
                .and_then(|body| serde_json::from_slice::<RejectionBody>(body).ok())
                .map(|body| body.error)
                .unwrap_or_else(|| "unauthorized".to_string());
            Err(ClientError::AuthRejected(reason))
        }
        Err(tungstenite::Error::Http(response)) => Err(ClientError::ConnectionError(format!(
            "handshake failed with HTTP {}",
            response.status()
        ))),
        Err(e) => Err(ClientError::ConnectionError(e.to_string())),
    }
}
