use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::types::FieldDescription;

const REQUIRED_MESSAGE: &str = "Value cannot be empty";
const REGEX_MESSAGE: &str = "Value does not match the required pattern";

/// A rule attached to a validated single-value collector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValidationRule {
    Required { message: String, rule: bool },
    Regex { message: String, rule: String },
}

impl ValidationRule {
    /// Rules derived from the `required` flag and `validation` block of a field.
    pub(crate) fn from_field(field: &FieldDescription) -> Vec<Self> {
        let mut rules = Vec::new();

        if field.required == Some(true) {
            rules.push(Self::Required {
                message: REQUIRED_MESSAGE.to_string(),
                rule: true,
            });
        }

        if let Some(pattern) = field.validation.as_ref().and_then(|v| v.regex.clone()) {
            let message = field
                .validation
                .as_ref()
                .and_then(|v| v.error_message.clone())
                .unwrap_or_else(|| REGEX_MESSAGE.to_string());
            rules.push(Self::Regex {
                message,
                rule: pattern,
            });
        }

        rules
    }

    /// Returns the rule's message when `value` breaks it.
    pub(crate) fn check(&self, value: &Value) -> Option<String> {
        match self {
            Self::Required { message, rule } => {
                let empty = match value {
                    Value::Null => true,
                    Value::String(s) => s.is_empty(),
                    Value::Array(items) => items.is_empty(),
                    _ => false,
                };
                (*rule && empty).then(|| message.clone())
            }
            Self::Regex { message, rule } => {
                let Value::String(text) = value else {
                    return None;
                };
                match Regex::new(rule) {
                    Ok(re) if re.is_match(text) => None,
                    Ok(_) => Some(message.clone()),
                    Err(e) => {
                        tracing::warn!("Invalid validation pattern {:?}: {}", rule, e);
                        Some(format!("Invalid regular expression: {rule}"))
                    }
                }
            }
        }
    }
}
