use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::validation::ValidationRule;

/// Field description as declared by the server in `form.components.fields`.
///
/// Every property is optional: a malformed description must still produce a
/// collector carrying a construction error instead of failing the whole node.
/// Option lists stay untyped because select fields and device fields use
/// different option shapes under the same `options` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescription {
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub key: Option<String>,
    pub label: Option<String>,
    pub content: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<Value>>,
    pub validation: Option<FieldValidation>,
    pub links: Option<Value>,
    pub action: Option<String>,
    pub trigger: Option<String>,
    pub default_country_code: Option<String>,
    pub validate_phone_number: Option<bool>,
    pub public_key_credential_creation_options: Option<Value>,
    pub public_key_credential_request_options: Option<Value>,
}

impl FieldDescription {
    /// Reads a field description without ever failing.
    ///
    /// Each property is parsed on its own, so an ill-typed one (e.g.
    /// `"required": "yes"`) is dropped while its siblings are kept.
    pub fn from_value(value: &Value) -> Self {
        Self {
            field_type: property(value, "type"),
            key: property(value, "key"),
            label: property(value, "label"),
            content: property(value, "content"),
            required: property(value, "required"),
            options: property(value, "options"),
            validation: property(value, "validation"),
            links: property(value, "links"),
            action: property(value, "action"),
            trigger: property(value, "trigger"),
            default_country_code: property(value, "defaultCountryCode"),
            validate_phone_number: property(value, "validatePhoneNumber"),
            public_key_credential_creation_options: property(
                value,
                "publicKeyCredentialCreationOptions",
            ),
            public_key_credential_request_options: property(
                value,
                "publicKeyCredentialRequestOptions",
            ),
        }
    }

    /// Navigation target of a social-login / IdP button.
    pub(crate) fn authenticate_href(&self) -> Option<String> {
        self.links
            .as_ref()
            .and_then(|links| links.pointer("/authenticate/href"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

fn property<T: DeserializeOwned>(value: &Value, name: &str) -> Option<T> {
    let raw = value.get(name).filter(|raw| !raw.is_null())?;
    match serde_json::from_value(raw.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Ignoring malformed field property {}: {}", name, e);
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    pub regex: Option<String>,
    pub error_message: Option<String>,
}

/// Concrete kind of a collector. Serializes to the names clients switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectorType {
    TextCollector,
    PasswordCollector,
    SingleSelectCollector,
    MultiSelectCollector,
    SingleValueCollector,
    SubmitCollector,
    FlowCollector,
    IdpCollector,
    ActionCollector,
    ReadOnlyCollector,
    PhoneNumberCollector,
    DeviceRegistrationCollector,
    DeviceAuthenticationCollector,
    FidoRegistrationCollector,
    FidoAuthenticationCollector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectorCategory {
    SingleValueCollector,
    ValidatedSingleValueCollector,
    MultiValueCollector,
    ActionCollector,
    NoValueCollector,
    ObjectValueCollector,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: Value,
}

/// One entry of a device registration / authentication picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOption {
    #[serde(rename = "type")]
    pub device_type: String,
    pub label: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueInput<V> {
    pub key: String,
    pub value: V,
    #[serde(rename = "type")]
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedInput {
    pub key: String,
    pub value: Value,
    #[serde(rename = "type")]
    pub field_type: String,
    pub validation: Vec<ValidationRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleValueOutput {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    /// Display default. Always `None` for password collectors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiValueOutput {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub value: Vec<Value>,
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutput {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    /// `None`: the collector kind has no navigation target (submit, flow).
    /// `Some(None)`: an IdP button whose target the server did not supply,
    /// serialized as `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoValueOutput {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectValueOutput {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<DeviceOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleValueCollector {
    #[serde(rename = "type")]
    pub collector_type: CollectorType,
    pub id: String,
    pub name: String,
    pub error: Option<String>,
    pub input: ValueInput<Value>,
    pub output: SingleValueOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedSingleValueCollector {
    #[serde(rename = "type")]
    pub collector_type: CollectorType,
    pub id: String,
    pub name: String,
    pub error: Option<String>,
    pub input: ValidatedInput,
    pub output: SingleValueOutput,
}

impl ValidatedSingleValueCollector {
    /// Messages of every rule the value breaks; empty when the value passes.
    pub fn validate(&self, value: &Value) -> Vec<String> {
        self.input
            .validation
            .iter()
            .filter_map(|rule| rule.check(value))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiValueCollector {
    #[serde(rename = "type")]
    pub collector_type: CollectorType,
    pub id: String,
    pub name: String,
    pub error: Option<String>,
    pub input: ValueInput<Vec<Value>>,
    pub output: MultiValueOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionCollector {
    #[serde(rename = "type")]
    pub collector_type: CollectorType,
    pub id: String,
    pub name: String,
    pub error: Option<String>,
    pub output: ActionOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoValueCollector {
    #[serde(rename = "type")]
    pub collector_type: CollectorType,
    pub id: String,
    pub name: String,
    pub error: Option<String>,
    pub output: NoValueOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectValueCollector {
    #[serde(rename = "type")]
    pub collector_type: CollectorType,
    pub id: String,
    pub name: String,
    pub error: Option<String>,
    pub input: ValueInput<Value>,
    pub output: ObjectValueOutput,
}

/// One field the server wants filled, or one action the user may trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category")]
pub enum Collector {
    SingleValueCollector(SingleValueCollector),
    ValidatedSingleValueCollector(ValidatedSingleValueCollector),
    MultiValueCollector(MultiValueCollector),
    ActionCollector(ActionCollector),
    NoValueCollector(NoValueCollector),
    ObjectValueCollector(ObjectValueCollector),
}

impl Collector {
    pub fn category(&self) -> CollectorCategory {
        match self {
            Self::SingleValueCollector(_) => CollectorCategory::SingleValueCollector,
            Self::ValidatedSingleValueCollector(_) => {
                CollectorCategory::ValidatedSingleValueCollector
            }
            Self::MultiValueCollector(_) => CollectorCategory::MultiValueCollector,
            Self::ActionCollector(_) => CollectorCategory::ActionCollector,
            Self::NoValueCollector(_) => CollectorCategory::NoValueCollector,
            Self::ObjectValueCollector(_) => CollectorCategory::ObjectValueCollector,
        }
    }

    pub fn collector_type(&self) -> CollectorType {
        match self {
            Self::SingleValueCollector(c) => c.collector_type,
            Self::ValidatedSingleValueCollector(c) => c.collector_type,
            Self::MultiValueCollector(c) => c.collector_type,
            Self::ActionCollector(c) => c.collector_type,
            Self::NoValueCollector(c) => c.collector_type,
            Self::ObjectValueCollector(c) => c.collector_type,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::SingleValueCollector(c) => &c.id,
            Self::ValidatedSingleValueCollector(c) => &c.id,
            Self::MultiValueCollector(c) => &c.id,
            Self::ActionCollector(c) => &c.id,
            Self::NoValueCollector(c) => &c.id,
            Self::ObjectValueCollector(c) => &c.id,
        }
    }

    /// Server field key.
    pub fn name(&self) -> &str {
        match self {
            Self::SingleValueCollector(c) => &c.name,
            Self::ValidatedSingleValueCollector(c) => &c.name,
            Self::MultiValueCollector(c) => &c.name,
            Self::ActionCollector(c) => &c.name,
            Self::NoValueCollector(c) => &c.name,
            Self::ObjectValueCollector(c) => &c.name,
        }
    }

    /// Construction error, set when the field description lacked metadata.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::SingleValueCollector(c) => c.error.as_deref(),
            Self::ValidatedSingleValueCollector(c) => c.error.as_deref(),
            Self::MultiValueCollector(c) => c.error.as_deref(),
            Self::ActionCollector(c) => c.error.as_deref(),
            Self::NoValueCollector(c) => c.error.as_deref(),
            Self::ObjectValueCollector(c) => c.error.as_deref(),
        }
    }

    /// Working value as it would be submitted, `None` for collectors without input.
    pub fn input_value(&self) -> Option<Value> {
        match self {
            Self::SingleValueCollector(c) => Some(c.input.value.clone()),
            Self::ValidatedSingleValueCollector(c) => Some(c.input.value.clone()),
            Self::MultiValueCollector(c) => Some(Value::Array(c.input.value.clone())),
            Self::ObjectValueCollector(c) => Some(c.input.value.clone()),
            Self::ActionCollector(_) | Self::NoValueCollector(_) => None,
        }
    }
}
