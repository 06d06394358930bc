use crate::error::{ClientError, ClientResult, ErrorResponse, DEFAULT_FAILURE_MESSAGE};
use serde_json::Value;

/// The two response wrappers the backend has used over time
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `{success, data, message}`
    Flagged {
        success: bool,
        data: Value,
        message: Option<String>,
    },
    /// `{code, data, message}`, success when code is 200 or 0
    Coded {
        code: i64,
        data: Value,
        message: Option<String>,
    },
}

impl Envelope {
    /// Pick the envelope shape of a response body. A present `success` key
    /// wins over `code`; anything else is `None`.
    pub fn decode(body: &Value) -> Option<Envelope> {
        let object = body.as_object()?;
        let data = object.get("data").cloned().unwrap_or(Value::Null);
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        match object.get("success") {
            Some(Value::Bool(success)) => {
                return Some(Envelope::Flagged {
                    success: *success,
                    data,
                    message,
                })
            }
            Some(Value::Null) | None => {}
            Some(_) => return None,
        }

        let code = match object.get("code")? {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };

        Some(Envelope::Coded {
            code,
            data,
            message,
        })
    }

    pub fn is_success(&self) -> bool {
        match self {
            Envelope::Flagged { success, .. } => *success,
            Envelope::Coded { code, .. } => *code == 200 || *code == 0,
        }
    }

    /// Resolve to the payload or a business error
    pub fn into_result(self) -> ClientResult<Value> {
        let ok = self.is_success();
        match self {
            Envelope::Flagged { data, .. } | Envelope::Coded { data, .. } if ok => Ok(data),
            Envelope::Flagged { message, .. } => Err(ClientError::Business {
                code: None,
                message: message.unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            }),
            Envelope::Coded { code, message, .. } => Err(ClientError::Business {
                code: Some(code),
                message: message.unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            }),
        }
    }
}

/// Normalize the body of a 2xx response
pub fn normalize(body: &[u8]) -> ClientResult<Value> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ClientError::MalformedResponse(format!("body is not JSON: {}", e)))?;

    Envelope::decode(&value)
        .ok_or_else(|| {
            ClientError::MalformedResponse("body matches no known envelope".to_string())
        })?
        .into_result()
}

/// Error for a non-2xx response, using the body's `message` when present
pub fn http_error(status: u16, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status));

    ClientError::Http { status, message }
}
