use crate::journal::{EventSink, SequenceEvent};
use crate::portal::cookies::cookie_header;
use crate::portal::{LoginRequest, LoginResponse, PortalTransport};
use crate::refresh::error::describe_failure;
use crate::refresh::{SessionState, StepError};

/// Account credentials, borrowed from configuration for the login call.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Logs in and captures the session for the rest of the run.
///
/// Empty credentials fail before any network call. The returned session
/// always has a non-empty token; cookies may be empty if the portal sent none.
pub async fn authenticate(
    transport: &dyn PortalTransport,
    credentials: Credentials<'_>,
    sink: &dyn EventSink,
) -> Result<SessionState, StepError> {
    sink.record(SequenceEvent::LoginAttempt);

    if credentials.username.trim().is_empty() || credentials.password.trim().is_empty() {
        let message =
            "Email or password not configured. Set NAUKRI_EMAIL and NAUKRI_PASSWORD".to_string();
        sink.record(SequenceEvent::LoginFailed {
            status: None,
            detail: message.clone(),
        });
        return Err(StepError::Configuration(message));
    }

    let request = LoginRequest {
        username: credentials.username.to_string(),
        password: credentials.password.to_string(),
    };

    let response = match transport.login(&request).await {
        Ok(r) => r,
        Err(e) => return Err(fail(sink, None, e.to_string())),
    };

    if !response.is_success() {
        return Err(fail(sink, Some(response.status), response.body));
    }

    let parsed: LoginResponse = match serde_json::from_str(&response.body) {
        Ok(p) => p,
        Err(e) => {
            return Err(fail(
                sink,
                Some(response.status),
                format!("unreadable login response ({e}): {}", response.body),
            ))
        }
    };

    let token = parsed.auth_token().unwrap_or_default();
    let session = match SessionState::new(token, cookie_header(&response.set_cookies)) {
        Some(s) => s,
        None => {
            return Err(fail(
                sink,
                None,
                "nauk_at token not found in login response".to_string(),
            ))
        }
    };

    sink.record(SequenceEvent::LoginSucceeded {
        token_preview: session.token_preview(),
        cookies_obtained: !session.cookie_header().is_empty(),
    });

    Ok(session)
}

fn fail(sink: &dyn EventSink, status: Option<u16>, detail: String) -> StepError {
    let message = describe_failure(status, &detail);
    sink.record(SequenceEvent::LoginFailed { status, detail });
    StepError::Authentication(message)
}
