pub mod client;
pub mod service;
pub mod transport;

pub use client::{
    ClientCapabilities, ClientInfo, ClientOptions, Error, McpClient, McpClientTrait, Session,
};
pub use service::McpService;
pub use transport::{StreamableHttpTransport, Transport, TransportRequest, TransportResponse};

/// Opens a session against an HTTP endpoint with default transport settings.
pub async fn connect_http(
    endpoint: &str,
    options: ClientOptions,
) -> Result<McpClient<StreamableHttpTransport>, Error> {
    let transport = StreamableHttpTransport::new(endpoint)?;
    McpClient::open(transport, options).await
}
