//! davinci_flow - Client-side engine for server-driven DaVinci authentication flows
//!
//! The server returns one step (a node) at a time. This crate turns each
//! step into typed collectors, classifies every response into
//! `continue`/`error`/`failure`/`success`, and serializes the collected
//! input back into the next request.

mod client;
mod collector;
mod config;
mod errors;
mod fido;
mod node;
mod storage;
mod transport;
mod utils;

pub use client::{AuthorizationContext, DaVinciClient};

pub use collector::{
    ActionCollector, ActionOutput, Collector, CollectorCategory, CollectorError, CollectorType,
    DeviceOption, FieldDescription, FieldValidation, MultiValueCollector, MultiValueOutput,
    NoValueCollector, NoValueOutput, ObjectValueCollector, ObjectValueOutput, SelectOption,
    SingleValueCollector, SingleValueOutput, ValidatedInput, ValidatedSingleValueCollector,
    ValidationRule, ValueInput, derive_collectors, update_collector, validate_collector,
};

pub use config::{DAVINCI_REQUEST_TIMEOUT, DAVINCI_RESPONSE_MODE, DAVINCI_SCOPE, FlowConfig};

pub use errors::FlowError;

pub use fido::{
    AlgValue, AssertionCredential, AssertionResponse, AssertionResponseValue, AssertionValue,
    AttestationResponse, AttestationResponseValue, AttestationValue, CreationOptions,
    CreationOptionsJson, CredentialDescriptor, Fido, FidoAuthenticationValue, FidoError,
    FidoErrorCode, FidoRegistrationValue, NativeError, PubKeyCredParam, PublicKeyCredential,
    RelyingParty, RequestOptions, RequestOptionsJson, UserEntity, WebAuthnCapability,
    collector_options, from_assertion, from_credential, map_native_error, to_creation_options,
    to_request_options,
};

pub use node::{
    Authorization, CacheInfo, ClientInfo, CollectorErrorDetail, ContinueNode, DaVinciError,
    DaVinciRequest, ErrorCode, ErrorNode, ErrorStatus, ErrorType, EventType, FailureNode,
    FlowState, Link, Node, NodeStatus, RequestData, RequestParameters, ServerInfo, SuccessNode,
    SuccessServer, Transition, build_action_request, build_submit_request, classify,
};

pub use storage::{FlowStorage, InMemoryFlowStorage, StorageError};

pub use transport::{
    FlowRequest, ReqwestTransport, ResponseStatus, Transport, TransportError, TransportResponse,
};

pub use utils::UtilError;
