use serde::de::{DeserializeOwned, Error as _};
use serde::ser::{Error as _, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name -> ordered list of error strings
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Uniform wrapper returned by every endpoint and by every client call.
///
/// On the wire the variant is picked by the boolean `success` flag. A success
/// payload's fields are written next to `success` and `message`, so a login
/// response reads `{"success":true,"message":…,"data":{"user":…,"token":…}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEnvelope<T> {
    Success {
        message: Option<String>,
        data: T,
    },
    Failure {
        message: String,
        errors: Option<FieldErrors>,
    },
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self::Success {
            message: None,
            data,
        }
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self::Success {
            message: Some(message.into()),
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            errors: None,
        }
    }

    pub fn failure_with_errors(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self::Failure {
            message: message.into(),
            errors: Some(errors),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. } => message.as_deref(),
            Self::Failure { message, .. } => Some(message),
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { errors, .. } => errors.as_ref(),
        }
    }
}

impl<T: Serialize> Serialize for ApiEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success { message, data } => {
                let mut body = match serde_json::to_value(data).map_err(S::Error::custom)? {
                    Value::Object(fields) => fields,
                    Value::Null => Map::new(),
                    other => {
                        return Err(S::Error::custom(format!(
                            "envelope payload must be a JSON object, got {}",
                            other
                        )))
                    }
                };
                body.insert("success".to_string(), Value::Bool(true));
                if let Some(message) = message {
                    body.insert("message".to_string(), Value::String(message.clone()));
                }
                body.serialize(serializer)
            }
            Self::Failure { message, errors } => {
                let len = if errors.is_some() { 3 } else { 2 };
                let mut state = serializer.serialize_struct("ApiEnvelope", len)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("message", message)?;
                if let Some(errors) = errors {
                    state.serialize_field("errors", errors)?;
                }
                state.end()
            }
        }
    }
}

/// Loose view of an error body; both fields may be missing on foreign responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FailureBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<FieldErrors>,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ApiEnvelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let success = value
            .get("success")
            .and_then(Value::as_bool)
            .ok_or_else(|| D::Error::missing_field("success"))?;

        if success {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned);
            let data = T::deserialize(value).map_err(D::Error::custom)?;
            Ok(Self::Success { message, data })
        } else {
            let body: FailureBody = serde_json::from_value(value).map_err(D::Error::custom)?;
            let message = body
                .message
                .ok_or_else(|| D::Error::missing_field("message"))?;
            Ok(Self::Failure {
                message,
                errors: body.errors,
            })
        }
    }
}
