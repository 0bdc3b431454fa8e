mod builders;
mod errors;
mod reducer;
mod types;
mod validation;

pub use errors::CollectorError;
pub use reducer::{derive_collectors, update_collector, validate_collector};
pub use types::{
    ActionCollector, ActionOutput, Collector, CollectorCategory, CollectorType, DeviceOption,
    FieldDescription, FieldValidation, MultiValueCollector, MultiValueOutput, NoValueCollector,
    NoValueOutput, ObjectValueCollector, ObjectValueOutput, SelectOption, SingleValueCollector,
    SingleValueOutput, ValidatedInput, ValidatedSingleValueCollector, ValueInput,
};
pub use validation::ValidationRule;
