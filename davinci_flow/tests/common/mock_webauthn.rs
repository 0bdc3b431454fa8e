use async_trait::async_trait;
use davinci_flow::{
    AssertionCredential, AssertionResponse, AttestationResponse, CreationOptions, NativeError,
    PublicKeyCredential, RequestOptions, WebAuthnCapability,
};

/// Authenticator stand-in: either produces fixed credentials or rejects
/// every call with one native error.
pub struct MockWebAuthn {
    rejection: Option<NativeError>,
}

impl MockWebAuthn {
    pub fn accepting() -> Self {
        Self { rejection: None }
    }

    pub fn rejecting(name: &str, message: &str) -> Self {
        Self {
            rejection: Some(NativeError::new(name, message)),
        }
    }
}

#[async_trait]
impl WebAuthnCapability for MockWebAuthn {
    async fn create(
        &self,
        options: CreationOptions,
    ) -> Result<Option<PublicKeyCredential>, NativeError> {
        if let Some(rejection) = &self.rejection {
            return Err(rejection.clone());
        }
        Ok(Some(PublicKeyCredential {
            id: "credential-1".to_string(),
            raw_id: vec![0xde, 0xad],
            cred_type: "public-key".to_string(),
            authenticator_attachment: Some("platform".to_string()),
            response: AttestationResponse {
                client_data_json: options.challenge,
                attestation_object: vec![0xa0],
            },
        }))
    }

    async fn get(
        &self,
        options: RequestOptions,
    ) -> Result<Option<AssertionCredential>, NativeError> {
        if let Some(rejection) = &self.rejection {
            return Err(rejection.clone());
        }
        Ok(Some(AssertionCredential {
            id: "credential-1".to_string(),
            raw_id: vec![0xde, 0xad],
            cred_type: "public-key".to_string(),
            authenticator_attachment: None,
            response: AssertionResponse {
                client_data_json: options.challenge,
                authenticator_data: vec![1],
                signature: vec![2],
                user_handle: Some(vec![3]),
            },
        }))
    }
}
