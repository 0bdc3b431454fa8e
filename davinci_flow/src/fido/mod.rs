mod errors;
mod transform;
mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::collector::{Collector, CollectorType};

pub use errors::{FidoError, FidoErrorCode};
pub use transform::{
    NativeError, from_assertion, from_credential, map_native_error, to_creation_options,
    to_request_options,
};
pub use types::{
    AlgValue, AssertionCredential, AssertionResponse, AssertionResponseValue, AssertionValue,
    AttestationResponse, AttestationResponseValue, AttestationValue, CreationOptions,
    CreationOptionsJson, CredentialDescriptor, FidoAuthenticationValue, FidoRegistrationValue,
    PubKeyCredParam, PublicKeyCredential, RelyingParty, RequestOptions, RequestOptionsJson,
    UserEntity,
};

/// The platform's credential API (`navigator.credentials` in a browser).
///
/// `Ok(None)` means the call resolved without producing a credential.
#[async_trait]
pub trait WebAuthnCapability: Send + Sync {
    async fn create(
        &self,
        options: CreationOptions,
    ) -> Result<Option<PublicKeyCredential>, NativeError>;

    async fn get(
        &self,
        options: RequestOptions,
    ) -> Result<Option<AssertionCredential>, NativeError>;
}

const NO_CREDENTIAL_MESSAGE: &str = "No credential returned by the authenticator";
const NO_ASSERTION_MESSAGE: &str = "No assertion returned by the authenticator";

/// Drives FIDO2 registration and authentication through a [`WebAuthnCapability`].
///
/// Capability failures come back as [`FidoError`] values; nothing here panics
/// or bubbles a native error up unchanged.
pub struct Fido<W> {
    capability: W,
}

impl<W: WebAuthnCapability> Fido<W> {
    pub fn new(capability: W) -> Self {
        Self { capability }
    }

    /// Registers a credential from server-sent `publicKeyCredentialCreationOptions`.
    pub async fn register(&self, options: &Value) -> Result<FidoRegistrationValue, FidoError> {
        let options = to_creation_options(options)?;
        match self.capability.create(options).await {
            Ok(Some(credential)) => {
                tracing::debug!("FIDO registration produced credential {}", credential.id);
                Ok(FidoRegistrationValue {
                    attestation_value: from_credential(&credential),
                })
            }
            Ok(None) => {
                tracing::warn!("{}", NO_CREDENTIAL_MESSAGE);
                Err(FidoError::unknown(NO_CREDENTIAL_MESSAGE))
            }
            Err(native) => {
                let error = map_native_error(&native);
                tracing::warn!("FIDO registration rejected: {} ({})", error, native.name);
                Err(error)
            }
        }
    }

    /// Signs an assertion from server-sent `publicKeyCredentialRequestOptions`.
    pub async fn authenticate(
        &self,
        options: &Value,
    ) -> Result<FidoAuthenticationValue, FidoError> {
        let options = to_request_options(options)?;
        match self.capability.get(options).await {
            Ok(Some(assertion)) => {
                tracing::debug!("FIDO authentication produced assertion {}", assertion.id);
                Ok(FidoAuthenticationValue {
                    assertion_value: from_assertion(&assertion),
                })
            }
            Ok(None) => {
                tracing::warn!("{}", NO_ASSERTION_MESSAGE);
                Err(FidoError::unknown(NO_ASSERTION_MESSAGE))
            }
            Err(native) => {
                let error = map_native_error(&native);
                tracing::warn!("FIDO authentication rejected: {} ({})", error, native.name);
                Err(error)
            }
        }
    }
}

/// WebAuthn options carried by a FIDO collector's `output.config`.
pub fn collector_options(collector: &Collector) -> Option<&Value> {
    let Collector::ObjectValueCollector(c) = collector else {
        return None;
    };
    let key = match c.collector_type {
        CollectorType::FidoRegistrationCollector => "publicKeyCredentialCreationOptions",
        CollectorType::FidoAuthenticationCollector => "publicKeyCredentialRequestOptions",
        _ => return None,
    };
    c.output
        .config
        .as_ref()?
        .get(key)
        .filter(|options| !options.is_null())
}
