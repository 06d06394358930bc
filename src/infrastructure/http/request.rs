use crate::error::{ClientError, ClientResult};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Description of one API call, before authentication is applied.
///
/// Defaults: authenticated, no loading indicator, errors shown to the user.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub need_auth: bool,
    pub show_loading: bool,
    pub show_error: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            need_auth: true,
            show_loading: false,
            show_error: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Send without an `Authorization` header, even when signed in
    pub fn public(mut self) -> Self {
        self.need_auth = false;
        self
    }

    pub fn with_loading(mut self, show_loading: bool) -> Self {
        self.show_loading = show_loading;
        self
    }

    /// Suppress the user-facing error notice
    pub fn silent(mut self) -> Self {
        self.show_error = false;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append the fields of a serializable struct as query parameters.
    /// `null` fields are skipped.
    pub fn params<T: Serialize>(mut self, params: &T) -> ClientResult<Self> {
        match serde_json::to_value(params)? {
            Value::Object(map) => {
                for (key, value) in map {
                    match value {
                        Value::Null => {}
                        Value::String(s) => self.query.push((key, s)),
                        other => self.query.push((key, other.to_string())),
                    }
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            _ => Err(ClientError::BadRequest(
                "Query parameters must serialize to an object".to_string(),
            )),
        }
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Absolute URL for this call against `base_url`
    pub fn url(&self, base_url: &str) -> String {
        let query = build_query_string(&self.query);
        if query.is_empty() {
            format!("{}{}", base_url, self.path)
        } else {
            format!("{}{}?{}", base_url, self.path, query)
        }
    }
}

/// Percent-encode `key=value` pairs joined by `&`
pub fn build_query_string(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
