use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `alg` as sent by the server: usually a number, sometimes a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlgValue {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelyingParty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// User entity; `B` is `Vec<i8>` on the wire and `Vec<u8>` for the capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity<B> {
    pub id: B,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKeyCredParam<A> {
    #[serde(rename = "type")]
    pub cred_type: String,
    pub alg: A,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDescriptor<B> {
    #[serde(rename = "type")]
    pub cred_type: String,
    pub id: B,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
}

/// Registration options in the JSON-safe shape the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationOptionsJson {
    pub challenge: Vec<i8>,
    pub rp: RelyingParty,
    pub user: UserEntity<Vec<i8>>,
    pub pub_key_cred_params: Vec<PubKeyCredParam<AlgValue>>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub exclude_credentials: Vec<CredentialDescriptor<Vec<i8>>>,
    #[serde(default)]
    pub authenticator_selection: Option<Value>,
    #[serde(default)]
    pub attestation: Option<String>,
    #[serde(default)]
    pub extensions: Option<Value>,
}

/// Authentication options in the JSON-safe shape the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptionsJson {
    pub challenge: Vec<i8>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub rp_id: Option<String>,
    #[serde(default)]
    pub allow_credentials: Vec<CredentialDescriptor<Vec<i8>>>,
    #[serde(default)]
    pub user_verification: Option<String>,
    #[serde(default)]
    pub extensions: Option<Value>,
}

/// Registration options handed to the WebAuthn capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationOptions {
    pub challenge: Vec<u8>,
    pub rp: RelyingParty,
    pub user: UserEntity<Vec<u8>>,
    pub pub_key_cred_params: Vec<PubKeyCredParam<i64>>,
    pub timeout: Option<u64>,
    pub exclude_credentials: Vec<CredentialDescriptor<Vec<u8>>>,
    pub authenticator_selection: Option<Value>,
    pub attestation: Option<String>,
    pub extensions: Option<Value>,
}

/// Authentication options handed to the WebAuthn capability.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub challenge: Vec<u8>,
    pub timeout: Option<u64>,
    pub rp_id: Option<String>,
    pub allow_credentials: Vec<CredentialDescriptor<Vec<u8>>>,
    pub user_verification: Option<String>,
    pub extensions: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationResponse {
    pub client_data_json: Vec<u8>,
    pub attestation_object: Vec<u8>,
}

/// Credential returned by the capability's `create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyCredential {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub cred_type: String,
    pub authenticator_attachment: Option<String>,
    pub response: AttestationResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResponse {
    pub client_data_json: Vec<u8>,
    pub authenticator_data: Vec<u8>,
    pub signature: Vec<u8>,
    pub user_handle: Option<Vec<u8>>,
}

/// Assertion returned by the capability's `get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionCredential {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub cred_type: String,
    pub authenticator_attachment: Option<String>,
    pub response: AssertionResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttestationResponseValue {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    #[serde(rename = "attestationObject")]
    pub attestation_object: String,
}

/// Base64 form of a [`PublicKeyCredential`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationValue {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub cred_type: String,
    pub response: AttestationResponseValue,
    pub authenticator_attachment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResponseValue {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
    pub user_handle: Option<String>,
}

/// Base64 form of an [`AssertionCredential`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionValue {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub cred_type: String,
    pub response: AssertionResponseValue,
    pub authenticator_attachment: Option<String>,
}

/// Value to put on a FIDO registration collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FidoRegistrationValue {
    pub attestation_value: AttestationValue,
}

/// Value to put on a FIDO authentication collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FidoAuthenticationValue {
    pub assertion_value: AssertionValue,
}
