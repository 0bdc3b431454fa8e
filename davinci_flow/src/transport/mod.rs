mod errors;
mod http_transport;
mod types;

pub use errors::TransportError;
pub use http_transport::ReqwestTransport;
pub use types::{FlowRequest, ResponseStatus, Transport, TransportResponse};
