use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use care_core::model::{
    Appointment, AppointmentId, AuthGrant, Credentials, DoctorSignup, Gender, HealthFeatures,
    NewAppointment, NewPost, NewStory, Post, Reschedule, RiskAssessment, Story, UserId,
};
use care_core::progress::ProgressRecord;

use super::{AppointmentApi, AssistantApi, CommunityApi, DoctorApi, ProgressApi, StoryApi};
use crate::config::ServiceConfig;
use crate::error::ApiError;

const GENDER_HEADER: &str = "x-user-gender";
const API_KEY_HEADER: &str = "x-api-key";

/// Client for the healthcare REST backend.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ServiceConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self::with_client(client, config.api_base_url.clone()))
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        join_segments(&self.base_url, segments)
    }
}

/// Client for the ML service that hosts `/chat` and `/predict`.
#[derive(Clone)]
pub struct HttpAssistant {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpAssistant {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ServiceConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        Ok(Self::with_client(
            client,
            config.ml_base_url.clone(),
            config.ml_api_key.clone(),
        ))
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            api_key: api_key.into(),
        }
    }
}

/// Append percent-encoded path segments to `base`, tolerating a trailing slash.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::Url(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message.or(body.error))
        .filter(|message| !message.trim().is_empty());
    Err(ApiError::HttpStatus { status, message })
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let bytes = send(request).await?.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserRef<'a> {
    user_id: &'a UserId,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    reply: Option<String>,
}

#[async_trait]
impl ProgressApi for HttpBackend {
    async fn fetch_progress(&self, user: &UserId) -> Result<Vec<ProgressRecord>, ApiError> {
        let url = self.endpoint(&["progress", user.as_str()])?;
        debug!("GET {url}");
        send_json(self.client.get(url)).await
    }

    async fn complete_today(&self, user: &UserId) -> Result<(), ApiError> {
        let url = self.endpoint(&["progress", "complete"])?;
        debug!("POST {url}");
        send(self.client.post(url).json(&UserRef { user_id: user })).await?;
        Ok(())
    }
}

#[async_trait]
impl CommunityApi for HttpBackend {
    async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let url = self.endpoint(&["community"])?;
        debug!("GET {url}");
        send_json(self.client.get(url)).await
    }

    async fn create_post(&self, post: &NewPost, gender: Gender) -> Result<Post, ApiError> {
        let url = self.endpoint(&["community"])?;
        debug!("POST {url} as {}", gender.as_str());
        send_json(
            self.client
                .post(url)
                .header(GENDER_HEADER, gender.as_str())
                .json(post),
        )
        .await
    }
}

#[async_trait]
impl AppointmentApi for HttpBackend {
    async fn list_appointments(&self, user: &UserId) -> Result<Vec<Appointment>, ApiError> {
        let url = self.endpoint(&["appointments", "user", user.as_str()])?;
        debug!("GET {url}");
        send_json(self.client.get(url)).await
    }

    async fn create_appointment(
        &self,
        appointment: &NewAppointment,
    ) -> Result<Appointment, ApiError> {
        let url = self.endpoint(&["appointments"])?;
        debug!("POST {url}");
        send_json(self.client.post(url).json(appointment)).await
    }

    async fn reschedule_appointment(
        &self,
        id: &AppointmentId,
        change: &Reschedule,
    ) -> Result<Appointment, ApiError> {
        let url = self.endpoint(&["appointments", id.as_str()])?;
        debug!("PUT {url}");
        send_json(self.client.put(url).json(change)).await
    }

    async fn cancel_appointment(&self, id: &AppointmentId) -> Result<(), ApiError> {
        let url = self.endpoint(&["appointments", id.as_str()])?;
        debug!("DELETE {url}");
        send(self.client.delete(url)).await?;
        Ok(())
    }
}

#[async_trait]
impl StoryApi for HttpBackend {
    async fn list_public_stories(&self) -> Result<Vec<Story>, ApiError> {
        let url = self.endpoint(&["stories"])?;
        debug!("GET {url}");
        send_json(self.client.get(url)).await
    }

    async fn list_user_stories(&self, user: &UserId) -> Result<Vec<Story>, ApiError> {
        let url = self.endpoint(&["stories", "user", user.as_str()])?;
        debug!("GET {url}");
        send_json(self.client.get(url)).await
    }

    async fn create_story(&self, story: &NewStory) -> Result<(), ApiError> {
        let url = self.endpoint(&["stories"])?;
        debug!("POST {url}");
        send(self.client.post(url).json(story)).await?;
        Ok(())
    }
}

#[async_trait]
impl DoctorApi for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ApiError> {
        let url = self.endpoint(&["doctor", "auth", "login"])?;
        debug!("POST {url}");
        send_json(self.client.post(url).json(credentials)).await
    }

    async fn register(&self, signup: &DoctorSignup) -> Result<(), ApiError> {
        let url = self.endpoint(&["doctor", "auth", "register"])?;
        debug!("POST {url}");
        send(self.client.post(url).json(signup)).await?;
        Ok(())
    }

    async fn create_profile(&self, signup: &DoctorSignup) -> Result<AuthGrant, ApiError> {
        let url = self.endpoint(&["doctor", "profile"])?;
        debug!("POST {url}");
        send_json(self.client.post(url).json(signup)).await
    }
}

#[async_trait]
impl AssistantApi for HttpAssistant {
    async fn chat(&self, message: &str) -> Result<Option<String>, ApiError> {
        let url = join_segments(&self.base_url, &["chat"])?;
        debug!("POST {url}");
        let body: ChatResponse =
            send_json(self.client.post(url).json(&ChatRequest { message })).await?;
        Ok(body.reply)
    }

    async fn predict(&self, features: &HealthFeatures) -> Result<RiskAssessment, ApiError> {
        let url = join_segments(&self.base_url, &["predict"])?;
        debug!("POST {url}");
        send_json(
            self.client
                .post(url)
                .header(API_KEY_HEADER, &self.api_key)
                .json(features),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_appended_and_encoded() {
        let base = Url::parse("https://pcod-healthcare.onrender.com/api").unwrap();
        let url = join_segments(&base, &["progress", "demo user"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://pcod-healthcare.onrender.com/api/progress/demo%20user"
        );
    }

    #[test]
    fn trailing_slash_and_bare_host_are_tolerated() {
        let base = Url::parse("http://localhost:5000/api/").unwrap();
        let url = join_segments(&base, &["stories", "user", "u1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/stories/user/u1");

        let ml = Url::parse("https://pcod-ml.onrender.com").unwrap();
        let url = join_segments(&ml, &["predict"]).unwrap();
        assert_eq!(url.as_str(), "https://pcod-ml.onrender.com/predict");
    }

    #[test]
    fn server_message_is_exposed() {
        let err = ApiError::HttpStatus {
            status: reqwest::StatusCode::UNAUTHORIZED,
            message: Some("Invalid credentials".into()),
        };
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert!(err.to_string().contains("Invalid credentials"));
    }
}
