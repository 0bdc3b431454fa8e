//! Builders turning one server field description into one collector.
//!
//! Builders never fail. Missing metadata is recorded as a sentence in the
//! collector's `error`, in the fixed order Key, Label, Type, so a client can
//! render a diagnostic in place of the broken field.

use serde_json::{Value, json};

use super::types::{
    ActionCollector, ActionOutput, Collector, CollectorType, DeviceOption, FieldDescription,
    MultiValueCollector, MultiValueOutput, NoValueCollector, NoValueOutput, ObjectValueCollector,
    ObjectValueOutput, SelectOption, SingleValueCollector, SingleValueOutput,
    ValidatedInput, ValidatedSingleValueCollector, ValueInput,
};
use super::validation::ValidationRule;

pub(crate) const KEY_MISSING: &str = "Key is not found in the field object. ";
pub(crate) const LABEL_MISSING: &str = "Label is not found in the field object. ";
pub(crate) const TYPE_MISSING: &str = "Type is not found in the field object. ";
pub(crate) const OPTIONS_MISSING: &str = "Options are not found in the field object. ";
pub(crate) const CONTENT_MISSING: &str = "Content is not found in the field object. ";
pub(crate) const CREATION_OPTIONS_MISSING: &str =
    "Credential creation options are not found in the field object. ";
pub(crate) const REQUEST_OPTIONS_MISSING: &str =
    "Credential request options are not found in the field object. ";

/// Identity shared by every collector built from one field.
struct Identity {
    id: String,
    key: String,
    label: String,
    field_type: String,
    errors: String,
}

impl Identity {
    fn new(field: &FieldDescription, idx: usize) -> Self {
        let mut errors = String::new();
        if field.key.is_none() {
            errors.push_str(KEY_MISSING);
        }
        if field.label.is_none() {
            errors.push_str(LABEL_MISSING);
        }
        if field.field_type.is_none() {
            errors.push_str(TYPE_MISSING);
        }
        Self::assemble(field, field.label.clone(), idx, errors)
    }

    /// Read-only fields carry `content` instead of a key and label.
    fn for_content(field: &FieldDescription, idx: usize) -> Self {
        let mut errors = String::new();
        if field.field_type.is_none() {
            errors.push_str(TYPE_MISSING);
        }
        if field.content.is_none() {
            errors.push_str(CONTENT_MISSING);
        }
        Self::assemble(field, field.content.clone(), idx, errors)
    }

    fn assemble(
        field: &FieldDescription,
        label: Option<String>,
        idx: usize,
        errors: String,
    ) -> Self {
        let key = field.key.clone().unwrap_or_default();
        let field_type = field.field_type.clone().unwrap_or_default();
        let prefix = if !key.is_empty() {
            key.as_str()
        } else if !field_type.is_empty() {
            field_type.as_str()
        } else {
            "field"
        };
        Self {
            id: format!("{prefix}-{idx}"),
            key,
            label: label.unwrap_or_default(),
            field_type,
            errors,
        }
    }

    fn push_error(&mut self, message: &str) {
        self.errors.push_str(message);
    }

    fn error(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            tracing::debug!("Collector {} built with errors: {}", self.id, self.errors);
            Some(self.errors.clone())
        }
    }
}

fn select_options(field: &FieldDescription, identity: &mut Identity) -> Vec<SelectOption> {
    let Some(options) = field.options.as_ref() else {
        identity.push_error(OPTIONS_MISSING);
        return Vec::new();
    };
    options
        .iter()
        .map(|option| SelectOption {
            label: option
                .get("label")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            value: option.get("value").cloned().unwrap_or(Value::Null),
        })
        .collect()
}

fn device_options(field: &FieldDescription, identity: &mut Identity) -> Vec<DeviceOption> {
    let Some(options) = field.options.as_ref() else {
        identity.push_error(OPTIONS_MISSING);
        return Vec::new();
    };
    let text = |option: &Value, name: &str| {
        option
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    options
        .iter()
        .map(|option| DeviceOption {
            device_type: text(option, "type").unwrap_or_default(),
            label: text(option, "title").unwrap_or_default(),
            content: text(option, "description").unwrap_or_default(),
            icon_src: text(option, "iconSrc"),
            value: text(option, "id"),
            default: option
                .get("default")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
        .collect()
}

/// Generic single-value collector; `prefill` seeds both the working value and
/// the display default.
pub fn single_value_collector(
    collector_type: CollectorType,
    field: &FieldDescription,
    idx: usize,
    prefill: Option<&Value>,
) -> Collector {
    let identity = Identity::new(field, idx);
    let value = prefill.cloned().unwrap_or_else(|| json!(""));
    Collector::SingleValueCollector(SingleValueCollector {
        collector_type,
        error: identity.error(),
        input: ValueInput {
            key: identity.key.clone(),
            value: value.clone(),
            field_type: identity.field_type.clone(),
        },
        output: SingleValueOutput {
            key: identity.key.clone(),
            label: identity.label,
            field_type: identity.field_type,
            value: Some(value),
            options: None,
        },
        name: identity.key,
        id: identity.id,
    })
}

/// Text input. Becomes a validated collector when the field declares
/// `required` or a `validation` pattern.
pub fn text_collector(field: &FieldDescription, idx: usize, prefill: Option<&Value>) -> Collector {
    let rules = ValidationRule::from_field(field);
    if rules.is_empty() {
        return single_value_collector(CollectorType::TextCollector, field, idx, prefill);
    }

    let identity = Identity::new(field, idx);
    let value = prefill.cloned().unwrap_or_else(|| json!(""));
    Collector::ValidatedSingleValueCollector(ValidatedSingleValueCollector {
        collector_type: CollectorType::TextCollector,
        error: identity.error(),
        input: ValidatedInput {
            key: identity.key.clone(),
            value: value.clone(),
            field_type: identity.field_type.clone(),
            validation: rules,
        },
        output: SingleValueOutput {
            key: identity.key.clone(),
            label: identity.label,
            field_type: identity.field_type,
            value: Some(value),
            options: None,
        },
        name: identity.key,
        id: identity.id,
    })
}

/// Password input. Never prefilled and never echoes a display value.
pub fn password_collector(field: &FieldDescription, idx: usize) -> Collector {
    let identity = Identity::new(field, idx);
    Collector::SingleValueCollector(SingleValueCollector {
        collector_type: CollectorType::PasswordCollector,
        error: identity.error(),
        input: ValueInput {
            key: identity.key.clone(),
            value: json!(""),
            field_type: identity.field_type.clone(),
        },
        output: SingleValueOutput {
            key: identity.key.clone(),
            label: identity.label,
            field_type: identity.field_type,
            value: None,
            options: None,
        },
        name: identity.key,
        id: identity.id,
    })
}

/// Dropdown / radio group.
pub fn single_select_collector(
    field: &FieldDescription,
    idx: usize,
    prefill: Option<&Value>,
) -> Collector {
    let mut identity = Identity::new(field, idx);
    let options = select_options(field, &mut identity);
    let value = prefill.cloned().unwrap_or_else(|| json!(""));
    Collector::SingleValueCollector(SingleValueCollector {
        collector_type: CollectorType::SingleSelectCollector,
        error: identity.error(),
        input: ValueInput {
            key: identity.key.clone(),
            value: value.clone(),
            field_type: identity.field_type.clone(),
        },
        output: SingleValueOutput {
            key: identity.key.clone(),
            label: identity.label,
            field_type: identity.field_type,
            value: Some(value),
            options: Some(options),
        },
        name: identity.key,
        id: identity.id,
    })
}

/// Checkbox / combobox.
pub fn multi_select_collector(
    field: &FieldDescription,
    idx: usize,
    prefill: Option<&Value>,
) -> Collector {
    let mut identity = Identity::new(field, idx);
    let options = select_options(field, &mut identity);
    let value = match prefill {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single.clone()],
    };
    Collector::MultiValueCollector(MultiValueCollector {
        collector_type: CollectorType::MultiSelectCollector,
        error: identity.error(),
        input: ValueInput {
            key: identity.key.clone(),
            value: value.clone(),
            field_type: identity.field_type.clone(),
        },
        output: MultiValueOutput {
            key: identity.key.clone(),
            label: identity.label,
            field_type: identity.field_type,
            value,
            options,
        },
        name: identity.key,
        id: identity.id,
    })
}

/// Submit, flow-link, IdP and other button/link collectors.
///
/// Only IdP collectors carry a `url`, which is `null` when the field has no
/// `links.authenticate.href`.
pub fn action_collector(
    collector_type: CollectorType,
    field: &FieldDescription,
    idx: usize,
) -> Collector {
    let identity = Identity::new(field, idx);
    let url = match collector_type {
        CollectorType::IdpCollector => Some(field.authenticate_href()),
        _ => None,
    };
    Collector::ActionCollector(ActionCollector {
        collector_type,
        error: identity.error(),
        output: ActionOutput {
            key: identity.key.clone(),
            label: identity.label,
            field_type: identity.field_type,
            url,
        },
        name: identity.key,
        id: identity.id,
    })
}

/// Label / read-only text.
pub fn read_only_collector(field: &FieldDescription, idx: usize) -> Collector {
    let identity = Identity::for_content(field, idx);
    Collector::NoValueCollector(NoValueCollector {
        collector_type: CollectorType::ReadOnlyCollector,
        error: identity.error(),
        output: NoValueOutput {
            key: identity.key.clone(),
            label: identity.label,
            field_type: identity.field_type,
        },
        name: identity.key,
        id: identity.id,
    })
}

pub fn phone_number_collector(
    field: &FieldDescription,
    idx: usize,
    prefill: Option<&Value>,
) -> Collector {
    let identity = Identity::new(field, idx);
    let country_code = field.default_country_code.clone().unwrap_or_default();
    let value = match prefill {
        Some(v @ Value::Object(_)) => v.clone(),
        _ => json!({ "countryCode": country_code, "phoneNumber": "" }),
    };
    Collector::ObjectValueCollector(ObjectValueCollector {
        collector_type: CollectorType::PhoneNumberCollector,
        error: identity.error(),
        input: ValueInput {
            key: identity.key.clone(),
            value: value.clone(),
            field_type: identity.field_type.clone(),
        },
        output: ObjectValueOutput {
            key: identity.key.clone(),
            label: identity.label,
            field_type: identity.field_type,
            value: Some(value),
            options: Vec::new(),
            config: Some(json!({
                "defaultCountryCode": country_code,
                "validatePhoneNumber": field.validate_phone_number.unwrap_or(false),
            })),
        },
        name: identity.key,
        id: identity.id,
    })
}

/// Device pickers. Authentication pickers preselect the default device.
pub fn device_collector(
    collector_type: CollectorType,
    field: &FieldDescription,
    idx: usize,
) -> Collector {
    let mut identity = Identity::new(field, idx);
    let options = device_options(field, &mut identity);
    let value = match collector_type {
        CollectorType::DeviceAuthenticationCollector => options
            .iter()
            .find(|o| o.default)
            .and_then(|o| o.value.clone())
            .map(Value::String)
            .unwrap_or_else(|| json!("")),
        _ => json!(""),
    };
    Collector::ObjectValueCollector(ObjectValueCollector {
        collector_type,
        error: identity.error(),
        input: ValueInput {
            key: identity.key.clone(),
            value,
            field_type: identity.field_type.clone(),
        },
        output: ObjectValueOutput {
            key: identity.key.clone(),
            label: identity.label,
            field_type: identity.field_type,
            value: None,
            options,
            config: None,
        },
        name: identity.key,
        id: identity.id,
    })
}

/// FIDO2 field; `action: REGISTER` selects registration, anything else authentication.
pub fn fido_collector(field: &FieldDescription, idx: usize) -> Collector {
    let mut identity = Identity::new(field, idx);
    let registering = field.action.as_deref() == Some("REGISTER");

    let (collector_type, options_key, options) = if registering {
        (
            CollectorType::FidoRegistrationCollector,
            "publicKeyCredentialCreationOptions",
            field.public_key_credential_creation_options.clone(),
        )
    } else {
        (
            CollectorType::FidoAuthenticationCollector,
            "publicKeyCredentialRequestOptions",
            field.public_key_credential_request_options.clone(),
        )
    };
    if options.is_none() {
        identity.push_error(if registering {
            CREATION_OPTIONS_MISSING
        } else {
            REQUEST_OPTIONS_MISSING
        });
    }

    let mut config = serde_json::Map::new();
    config.insert(options_key.to_string(), options.unwrap_or(Value::Null));
    config.insert("action".to_string(), json!(field.action));
    config.insert("trigger".to_string(), json!(field.trigger));

    Collector::ObjectValueCollector(ObjectValueCollector {
        collector_type,
        error: identity.error(),
        input: ValueInput {
            key: identity.key.clone(),
            value: json!({}),
            field_type: identity.field_type.clone(),
        },
        output: ObjectValueOutput {
            key: identity.key.clone(),
            label: identity.label,
            field_type: identity.field_type,
            value: None,
            options: Vec::new(),
            config: Some(Value::Object(config)),
        },
        name: identity.key,
        id: identity.id,
    })
}
