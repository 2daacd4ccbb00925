use crate::journal::{EventSink, SequenceEvent};
use crate::portal::{PortalTransport, ProfileUpdateRequest};
use crate::refresh::error::describe_failure;
use crate::refresh::{RemoteFileReference, SessionState, StepError};

/// Points the profile at the freshly uploaded resume.
///
/// Consumes the run's session and file reference: neither is usable after
/// the profile has been updated.
pub async fn apply_to_profile(
    transport: &dyn PortalTransport,
    session: SessionState,
    reference: RemoteFileReference,
    form_key: &str,
    sink: &dyn EventSink,
) -> Result<(), StepError> {
    sink.record(SequenceEvent::ProfileUpdating);

    let request = ProfileUpdateRequest::new(form_key, reference.as_str());

    let response = match transport.update_profile(&session, &request).await {
        Ok(r) => r,
        Err(e) => return Err(fail(sink, None, e.to_string())),
    };

    if !response.is_success() {
        return Err(fail(sink, Some(response.status), response.body));
    }

    sink.record(SequenceEvent::ProfileUpdated {
        body: response.body,
    });
    Ok(())
}

fn fail(sink: &dyn EventSink, status: Option<u16>, detail: String) -> StepError {
    let message = describe_failure(status, &detail);
    sink.record(SequenceEvent::ProfileUpdateFailed { status, detail });
    StepError::ProfileUpdate(message)
}
