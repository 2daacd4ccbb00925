use serde::{Deserialize, Serialize};

/// Name of the login cookie descriptor that carries the bearer token.
pub const AUTH_COOKIE_NAME: &str = "nauk_at";

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub cookies: Vec<CookieDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct CookieDescriptor {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl LoginResponse {
    /// Value of the `nauk_at` descriptor, if present and non-empty.
    pub fn auth_token(&self) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.name == AUTH_COOKIE_NAME)
            .and_then(|c| c.value.as_deref())
            .filter(|v| !v.is_empty())
    }
}

/// Body of the profile resume update.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdateRequest {
    #[serde(rename = "textCV")]
    pub text_cv: TextCv,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCv {
    pub form_key: String,
    pub file_key: String,
    /// Always `null`; the portal reads the resume from the uploaded file.
    pub text_cv_content: Option<String>,
}

impl ProfileUpdateRequest {
    pub fn new(form_key: &str, file_key: &str) -> Self {
        Self {
            text_cv: TextCv {
                form_key: form_key.to_string(),
                file_key: file_key.to_string(),
                text_cv_content: None,
            },
        }
    }
}
