use uuid::Uuid;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const X_REQUEST_ID: &str = "x-request-id";

/// Outgoing headers for one dispatch of a call.
///
/// `Content-Type: application/json` and a fresh `x-request-id` are always
/// present; caller headers come next and may override them. The bearer
/// header is added last, only when the call needs auth and `access_token`
/// is a non-empty token.
pub fn outgoing_headers(
    caller_headers: &[(String, String)],
    need_auth: bool,
    access_token: Option<&str>,
) -> (String, Vec<(String, String)>) {
    let request_id = Uuid::new_v4().to_string();

    let mut headers = vec![
        (CONTENT_TYPE.to_string(), "application/json".to_string()),
        (X_REQUEST_ID.to_string(), request_id.clone()),
    ];

    for (name, value) in caller_headers {
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        headers.push((name.clone(), value.clone()));
    }

    if need_auth {
        if let Some(token) = access_token.filter(|t| !t.is_empty()) {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(AUTHORIZATION));
            headers.push((AUTHORIZATION.to_string(), format!("Bearer {}", token)));
        }
    }

    (request_id, headers)
}
