pub mod fixtures;
pub mod mock_transport;
pub mod mock_webauthn;

pub use fixtures::*;
pub use mock_transport::ScriptedTransport;
pub use mock_webauthn::MockWebAuthn;
