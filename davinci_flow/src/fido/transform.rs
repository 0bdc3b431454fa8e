use serde_json::Value;

use super::errors::{FidoError, FidoErrorCode};
use super::types::{
    AlgValue, AssertionCredential, AssertionResponseValue, AssertionValue, AttestationResponseValue,
    AttestationValue, CreationOptions, CreationOptionsJson, CredentialDescriptor,
    PubKeyCredParam, PublicKeyCredential, RequestOptions, RequestOptionsJson, UserEntity,
};
use crate::utils::base64_encode;

/// Rejection raised by the WebAuthn capability, identified by its `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    pub name: String,
    pub message: String,
}

impl NativeError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Reinterprets signed bytes as raw bytes (-1 becomes 0xff).
pub(crate) fn signed_to_bytes(values: &[i8]) -> Vec<u8> {
    values.iter().map(|&b| b as u8).collect()
}

fn descriptors(list: Vec<CredentialDescriptor<Vec<i8>>>) -> Vec<CredentialDescriptor<Vec<u8>>> {
    list.into_iter()
        .map(|d| CredentialDescriptor {
            cred_type: d.cred_type,
            id: signed_to_bytes(&d.id),
            transports: d.transports,
        })
        .collect()
}

fn parse_alg(alg: AlgValue) -> Result<i64, FidoError> {
    match alg {
        AlgValue::Number(n) => Ok(n),
        AlgValue::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| FidoError::unknown(format!("Invalid alg value: {s}"))),
    }
}

pub fn to_creation_options(options: &Value) -> Result<CreationOptions, FidoError> {
    let json: CreationOptionsJson = serde_json::from_value(options.clone())
        .map_err(|e| FidoError::unknown(format!("Invalid registration options: {e}")))?;

    let pub_key_cred_params = json
        .pub_key_cred_params
        .into_iter()
        .map(|p| {
            Ok(PubKeyCredParam {
                cred_type: p.cred_type,
                alg: parse_alg(p.alg)?,
            })
        })
        .collect::<Result<Vec<_>, FidoError>>()?;

    Ok(CreationOptions {
        challenge: signed_to_bytes(&json.challenge),
        rp: json.rp,
        user: UserEntity {
            id: signed_to_bytes(&json.user.id),
            name: json.user.name,
            display_name: json.user.display_name,
        },
        pub_key_cred_params,
        timeout: json.timeout,
        exclude_credentials: descriptors(json.exclude_credentials),
        authenticator_selection: json.authenticator_selection,
        attestation: json.attestation,
        extensions: json.extensions,
    })
}

pub fn to_request_options(options: &Value) -> Result<RequestOptions, FidoError> {
    let json: RequestOptionsJson = serde_json::from_value(options.clone())
        .map_err(|e| FidoError::unknown(format!("Invalid authentication options: {e}")))?;

    Ok(RequestOptions {
        challenge: signed_to_bytes(&json.challenge),
        timeout: json.timeout,
        rp_id: json.rp_id,
        allow_credentials: descriptors(json.allow_credentials),
        user_verification: json.user_verification,
        extensions: json.extensions,
    })
}

pub fn from_credential(credential: &PublicKeyCredential) -> AttestationValue {
    AttestationValue {
        id: credential.id.clone(),
        raw_id: base64_encode(&credential.raw_id),
        cred_type: credential.cred_type.clone(),
        response: AttestationResponseValue {
            client_data_json: base64_encode(&credential.response.client_data_json),
            attestation_object: base64_encode(&credential.response.attestation_object),
        },
        authenticator_attachment: credential.authenticator_attachment.clone(),
    }
}

pub fn from_assertion(assertion: &AssertionCredential) -> AssertionValue {
    AssertionValue {
        id: assertion.id.clone(),
        raw_id: base64_encode(&assertion.raw_id),
        cred_type: assertion.cred_type.clone(),
        response: AssertionResponseValue {
            client_data_json: base64_encode(&assertion.response.client_data_json),
            authenticator_data: base64_encode(&assertion.response.authenticator_data),
            signature: base64_encode(&assertion.response.signature),
            user_handle: assertion.response.user_handle.as_deref().map(base64_encode),
        },
        authenticator_attachment: assertion.authenticator_attachment.clone(),
    }
}

pub fn map_native_error(error: &NativeError) -> FidoError {
    FidoError::new(FidoErrorCode::from_name(&error.name), error.message.clone())
}
