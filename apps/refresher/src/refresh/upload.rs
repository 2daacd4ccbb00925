use std::path::Path;

use bytes::Bytes;
use serde_json::Value;

use crate::journal::{EventSink, SequenceEvent};
use crate::portal::{PortalTransport, UploadForm};
use crate::refresh::error::describe_failure;
use crate::refresh::{ReferenceSource, RemoteFileReference, StepError};

/// Correlation keys and fallback policy for the upload.
#[derive(Debug, Clone, Copy)]
pub struct UploadKeys<'a> {
    pub form_key: &'a str,
    pub file_key: &'a str,
    pub allow_file_key_fallback: bool,
}

/// Uploads the resume and returns the portal's reference to it.
///
/// The file is checked before any network call. The reference is taken from
/// `body[file_key].fileKey`, then `body.fileKey`; the configured key is only
/// used when `allow_file_key_fallback` is set, otherwise the upload fails.
pub async fn upload_document(
    transport: &dyn PortalTransport,
    resume_path: &Path,
    keys: UploadKeys<'_>,
    sink: &dyn EventSink,
) -> Result<RemoteFileReference, StepError> {
    let file_name = resume_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    sink.record(SequenceEvent::UploadStarted {
        file_name: file_name.clone(),
    });

    let is_file = tokio::fs::metadata(resume_path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        let err = StepError::FileNotFound(resume_path.to_path_buf());
        sink.record(SequenceEvent::UploadFailed {
            status: None,
            detail: err.to_string(),
        });
        return Err(err);
    }

    let content = match tokio::fs::read(resume_path).await {
        Ok(c) => Bytes::from(c),
        Err(e) => {
            return Err(fail(
                sink,
                None,
                format!("could not read {}: {e}", resume_path.display()),
            ))
        }
    };

    let form = UploadForm {
        form_key: keys.form_key.to_string(),
        file_key: keys.file_key.to_string(),
        file_name,
        content,
    };

    let response = match transport.upload(form).await {
        Ok(r) => r,
        Err(e) => return Err(fail(sink, None, e.to_string())),
    };

    if !response.is_success() {
        return Err(fail(sink, Some(response.status), response.body));
    }

    sink.record(SequenceEvent::UploadResponse {
        body: response.body.clone(),
    });

    let resolved = resolve_file_reference(&response.body, keys.file_key).or_else(|| {
        keys.allow_file_key_fallback
            .then(|| RemoteFileReference::new(keys.file_key))
            .flatten()
            .map(|r| (r, ReferenceSource::ConfiguredFallback))
    });

    let Some((reference, source)) = resolved else {
        return Err(fail(
            sink,
            Some(response.status),
            format!("no file reference in upload response: {}", response.body),
        ));
    };

    sink.record(SequenceEvent::FileReferenceResolved {
        reference: reference.to_string(),
        source,
    });
    Ok(reference)
}

/// Finds the uploaded file's reference in the upload response body.
pub fn resolve_file_reference(
    body: &str,
    file_key: &str,
) -> Option<(RemoteFileReference, ReferenceSource)> {
    let body: Value = serde_json::from_str(body).ok()?;

    let nested = body
        .get(file_key)
        .and_then(|entry| entry.get("fileKey"))
        .and_then(Value::as_str)
        .and_then(RemoteFileReference::new);
    if let Some(reference) = nested {
        return Some((reference, ReferenceSource::Nested));
    }

    body.get("fileKey")
        .and_then(Value::as_str)
        .and_then(RemoteFileReference::new)
        .map(|r| (r, ReferenceSource::TopLevel))
}

fn fail(sink: &dyn EventSink, status: Option<u16>, detail: String) -> StepError {
    let message = describe_failure(status, &detail);
    sink.record(SequenceEvent::UploadFailed { status, detail });
    StepError::Upload(message)
}
