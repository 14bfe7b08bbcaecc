//! W3C WebDriver wire envelopes.
//!
//! Every response is `{"value": ...}`; errors put
//! `{"error", "message", "stacktrace"}` inside `value`.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::WebDriverError;

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub value: T,
}

#[derive(Debug, Deserialize)]
struct ErrorValue {
    error: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewSession {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewWindow {
    pub handle: String,
}

/// Decode a driver response body, turning the error envelope into
/// [`WebDriverError::Command`].
pub(crate) fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, WebDriverError> {
    if !(200..300).contains(&status) {
        return Err(match serde_json::from_str::<Envelope<ErrorValue>>(body) {
            Ok(env) => WebDriverError::Command {
                status,
                error: env.value.error,
                message: env.value.message,
            },
            Err(_) => WebDriverError::Command {
                status,
                error: "unknown error".into(),
                message: body.to_string(),
            },
        });
    }

    let env: Envelope<T> = serde_json::from_str(body)?;
    Ok(env.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_new_session() {
        let body = r#"{"value":{"sessionId":"a1b2","capabilities":{"browserName":"chrome"}}}"#;
        let session: NewSession = decode(200, body).unwrap();
        assert_eq!(session.session_id, "a1b2");
    }

    #[test]
    fn decodes_window_handles() {
        let body = r#"{"value":["CDwindow-1","CDwindow-2"]}"#;
        let handles: Vec<String> = decode(200, body).unwrap();
        assert_eq!(handles, vec!["CDwindow-1", "CDwindow-2"]);
    }

    #[test]
    fn decodes_null_value() {
        let body = r#"{"value":null}"#;
        let unit: Option<serde_json::Value> = decode(200, body).unwrap();
        assert!(unit.is_none());
    }

    #[test]
    fn error_envelope_becomes_command_error() {
        let body = r#"{"value":{"error":"invalid session id","message":"session deleted","stacktrace":""}}"#;
        let err = decode::<Vec<String>>(404, body).unwrap_err();
        assert!(err.is_session_lost());
        assert!(!err.is_window_gone());
        match err {
            WebDriverError::Command { status, error, .. } => {
                assert_eq!(status, 404);
                assert_eq!(error, "invalid session id");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn closed_tab_is_not_a_lost_session() {
        let body = r#"{"value":{"error":"no such window","message":"target window already closed","stacktrace":""}}"#;
        let err = decode::<serde_json::Value>(404, body).unwrap_err();
        assert!(err.is_window_gone());
        assert!(!err.is_session_lost());
    }

    #[test]
    fn non_json_error_is_preserved() {
        let err = decode::<Vec<String>>(500, "driver crashed").unwrap_err();
        assert!(!err.is_session_lost());
        assert!(err.to_string().contains("driver crashed"));
    }
}
