use serde::Serialize;
use treasury_core::helpers::dto::Outcome;

/// Treasury-family body: the data itself, plus `error` when anything was
/// missing. A failed aggregation still answers with an empty `T`.
#[derive(Debug, Serialize)]
pub struct WithError<T> {
    #[serde(flatten)]
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn with_error<T: Default>(outcome: Outcome<T>) -> WithError<T> {
    match outcome {
        Outcome::Complete(data) => WithError { data, error: None },
        Outcome::Partial { data, warnings } => WithError {
            data,
            error: Some(warnings.join("; ")),
        },
        Outcome::Failed { error } => WithError {
            data: T::default(),
            error: Some(error),
        },
    }
}

/// Query values that are absent or blank count as missing.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
