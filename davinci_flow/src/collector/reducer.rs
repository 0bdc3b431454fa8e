use serde_json::{Map, Value};

use super::builders::{
    action_collector, device_collector, fido_collector, multi_select_collector,
    password_collector, phone_number_collector, read_only_collector, single_select_collector,
    single_value_collector, text_collector,
};
use super::errors::CollectorError;
use super::types::{Collector, CollectorType, FieldDescription};

/// Builds the ordered collector list for one node.
///
/// The output mirrors `fields` one-to-one; the position of each field is its
/// ordinal, used as the id suffix. Prefill values are looked up in
/// `form_data` by field key. Password fields ignore prefill unconditionally.
pub fn derive_collectors(
    fields: &[Value],
    form_data: Option<&Map<String, Value>>,
) -> Vec<Collector> {
    fields
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let field = FieldDescription::from_value(raw);
            let prefill = field
                .key
                .as_deref()
                .and_then(|key| form_data.and_then(|data| data.get(key)));
            build_collector(&field, idx, prefill)
        })
        .collect()
}

fn build_collector(field: &FieldDescription, idx: usize, prefill: Option<&Value>) -> Collector {
    let field_type = field.field_type.as_deref().unwrap_or_default();

    match field_type {
        "CHECKBOX" | "COMBOBOX" => multi_select_collector(field, idx, prefill),
        "DROPDOWN" | "RADIO" => single_select_collector(field, idx, prefill),
        "PASSWORD" | "PASSWORD_VERIFY" => password_collector(field, idx),
        "TEXT" => text_collector(field, idx, prefill),
        "LABEL" => read_only_collector(field, idx),
        "PHONE_NUMBER" => phone_number_collector(field, idx, prefill),
        "DEVICE_REGISTRATION" => {
            device_collector(CollectorType::DeviceRegistrationCollector, field, idx)
        }
        "DEVICE_AUTHENTICATION" => {
            device_collector(CollectorType::DeviceAuthenticationCollector, field, idx)
        }
        "FIDO2" => fido_collector(field, idx),
        "SUBMIT_BUTTON" => action_collector(CollectorType::SubmitCollector, field, idx),
        "FLOW_BUTTON" | "FLOW_LINK" => action_collector(CollectorType::FlowCollector, field, idx),
        "SOCIAL_LOGIN_BUTTON" => action_collector(CollectorType::IdpCollector, field, idx),
        other if other.ends_with("BUTTON") || other.ends_with("LINK") => {
            action_collector(CollectorType::ActionCollector, field, idx)
        }
        other => {
            tracing::debug!(
                "Unrecognized field type {:?}, using a single-value collector",
                other
            );
            single_value_collector(CollectorType::SingleValueCollector, field, idx, prefill)
        }
    }
}

/// Returns a copy of `collectors` with the working value of `id` replaced.
///
/// `None` stands for "no value supplied" and is always rejected; `null` and
/// the empty string are legitimate values and are stored as given.
/// Multi-value collectors take an array as a full replacement and append any
/// other value.
pub fn update_collector(
    collectors: &[Collector],
    id: &str,
    value: Option<Value>,
) -> Result<Vec<Collector>, CollectorError> {
    let position = collectors
        .iter()
        .position(|c| c.id() == id)
        .ok_or_else(|| CollectorError::NotFound(id.to_string()))?;

    if matches!(
        collectors[position],
        Collector::ActionCollector(_) | Collector::NoValueCollector(_)
    ) {
        return Err(CollectorError::ReadOnly(id.to_string()));
    }
    let value = value.ok_or_else(|| CollectorError::UndefinedValue(id.to_string()))?;

    let mut updated = collectors[position].clone();
    let category = updated.category();
    let reject_array = |value: &Value| {
        if value.is_array() {
            Err(CollectorError::InvalidShape {
                id: id.to_string(),
                category,
                reason: "array values are not accepted".to_string(),
            })
        } else {
            Ok(())
        }
    };

    match &mut updated {
        Collector::SingleValueCollector(c) => {
            reject_array(&value)?;
            c.input.value = value;
        }
        Collector::ValidatedSingleValueCollector(c) => {
            reject_array(&value)?;
            c.input.value = value;
        }
        Collector::ObjectValueCollector(c) => {
            reject_array(&value)?;
            c.input.value = value;
        }
        Collector::MultiValueCollector(c) => match value {
            Value::Array(items) => c.input.value = items,
            single => c.input.value.push(single),
        },
        Collector::ActionCollector(_) | Collector::NoValueCollector(_) => {
            return Err(CollectorError::ReadOnly(id.to_string()));
        }
    }

    tracing::debug!("Updated collector {}", id);
    let mut next = collectors.to_vec();
    next[position] = updated;
    Ok(next)
}

/// Runs the validation rules of a validated collector against its working value.
pub fn validate_collector(
    collectors: &[Collector],
    id: &str,
) -> Result<Vec<String>, CollectorError> {
    match collectors.iter().find(|c| c.id() == id) {
        Some(Collector::ValidatedSingleValueCollector(c)) => Ok(c.validate(&c.input.value)),
        Some(_) => Err(CollectorError::NotValidated(id.to_string())),
        None => Err(CollectorError::NotFound(id.to_string())),
    }
}
