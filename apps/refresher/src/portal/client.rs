use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::SET_COOKIE;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use tracing::debug;

use crate::config::Config;
use crate::portal::headers::{login_headers, profile_headers, upload_headers};
use crate::portal::{
    LoginRequest, PortalResponse, PortalTransport, ProfileUpdateRequest, TransportError,
    UploadForm,
};
use crate::refresh::SessionState;

/// `reqwest`-backed portal transport.
///
/// Holds no cookie store: session cookies are captured explicitly by the
/// login step and sent back by the profile step.
#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    login_url: String,
    upload_url: String,
    profile_url: String,
}

impl PortalClient {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            login_url: config.login_url.clone(),
            upload_url: config.upload_url.clone(),
            profile_url: config.profile_resume_url(),
        })
    }
}

#[async_trait]
impl PortalTransport for PortalClient {
    async fn login(&self, request: &LoginRequest) -> Result<PortalResponse, TransportError> {
        let response = self
            .client
            .post(&self.login_url)
            .headers(login_headers())
            .json(request)
            .send()
            .await?;
        read_response(response).await
    }

    async fn upload(&self, form: UploadForm) -> Result<PortalResponse, TransportError> {
        let mime = mime_guess::from_path(&form.file_name).first_or_octet_stream();
        let file = Part::stream(Body::from(form.content))
            .file_name(form.file_name.clone())
            .mime_str(mime.as_ref())?;

        let multipart = Form::new()
            .text("formKey", form.form_key)
            .part("file", file)
            .text("fileName", form.file_name)
            .text("uploadCallback", "true")
            .text("fileKey", form.file_key);

        let response = self
            .client
            .post(&self.upload_url)
            .headers(upload_headers())
            .multipart(multipart)
            .send()
            .await?;
        read_response(response).await
    }

    async fn update_profile(
        &self,
        session: &SessionState,
        request: &ProfileUpdateRequest,
    ) -> Result<PortalResponse, TransportError> {
        let response = self
            .client
            .post(&self.profile_url)
            .headers(profile_headers(session)?)
            .json(request)
            .send()
            .await?;
        read_response(response).await
    }
}

async fn read_response(response: Response) -> Result<PortalResponse, TransportError> {
    let status = response.status().as_u16();
    let set_cookies = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect::<Vec<_>>();
    let body = response.text().await?;

    debug!(
        "Portal replied {status} ({} bytes, {} cookies)",
        body.len(),
        set_cookies.len()
    );

    Ok(PortalResponse {
        status,
        set_cookies,
        body,
    })
}
