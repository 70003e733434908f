//! REST API client for the scheduling endpoints.
//!
//! Every body goes through the same pipeline: non-2xx statuses become
//! [`ApiError::Status`], 2xx bodies that report a failure become
//! [`ApiError::Rejected`], and the rest is handed to the lenient decoders
//! in [`rota_core::wire`].

use async_trait::async_trait;
use reqwest::Method;
use rota_core::dates::DateKey;
use rota_core::schedule::{
    Assignment, Employee, EmployeeHours, GenerateScheduleRequest, ScheduleRecord,
    ScheduleSummary, ShiftType, UpsertAssignment,
};
use rota_core::types::{EmployeeId, ScheduleId, TeamId};
use rota_core::wire;
use serde_json::Value;
use validator::Validate;

use crate::{ApiError, ClientConfig, ScheduleApi};

/// HTTP client for one scheduling API deployment.
pub struct RotaApi {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
}

impl RotaApi {
    /// Build a client from connection settings.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token: None,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.api_url, path);
        tracing::debug!(%method, %url, "API request");
        let builder = self.client.request(method, url);
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, flattening the error
    /// body into the message otherwise.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status_body(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), error = %err, "API call failed");
            return Err(err);
        }
        Ok(response)
    }

    /// Read a successful body as JSON. An empty body reads as `null`.
    async fn parse_response(response: reqwest::Response) -> Result<Value, ApiError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?
        };
        check_rejection(value)
    }

    /// Assert the response succeeded. The body is still inspected for a
    /// rejection marker.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::parse_response(response).await?;
        Ok(())
    }
}

/// Turn a 2xx body that reports a failure into [`ApiError::Rejected`].
pub fn check_rejection(value: Value) -> Result<Value, ApiError> {
    if wire::is_rejection(&value) {
        return Err(ApiError::Rejected(wire::format_error_payload(&value)));
    }
    Ok(value)
}

#[async_trait]
impl ScheduleApi for RotaApi {
    async fn list_schedules(
        &self,
        team_id: Option<TeamId>,
    ) -> Result<Vec<ScheduleSummary>, ApiError> {
        let mut builder = self.request(Method::GET, "/schedules");
        if let Some(team_id) = team_id {
            builder = builder.query(&[("teamId", team_id)]);
        }
        let body = Self::parse_response(builder.send().await?).await?;
        Ok(wire::decode_schedule_list(body))
    }

    async fn fetch_schedule(&self, schedule_id: ScheduleId) -> Result<ScheduleRecord, ApiError> {
        let response = self
            .request(Method::GET, &format!("/schedules/{schedule_id}"))
            .send()
            .await?;
        let body = Self::parse_response(response).await?;
        wire::decode_schedule(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn delete_schedule(&self, schedule_id: ScheduleId) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/schedules/{schedule_id}"))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn generate_schedule(
        &self,
        request: GenerateScheduleRequest,
    ) -> Result<ScheduleRecord, ApiError> {
        request
            .validate()
            .map_err(|e| ApiError::Invalid(e.to_string()))?;

        let response = self
            .request(Method::POST, "/schedules/generate")
            .json(&request)
            .send()
            .await?;
        let body = Self::parse_response(response).await?;
        wire::decode_schedule(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn fetch_employee_hours(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<EmployeeHours>, ApiError> {
        let response = self
            .request(Method::GET, &format!("/schedules/{schedule_id}/hours"))
            .send()
            .await?;
        let body = Self::parse_response(response).await?;
        Ok(wire::decode_employee_hours(body))
    }

    async fn upsert_assignment(
        &self,
        schedule_id: ScheduleId,
        request: UpsertAssignment,
    ) -> Result<Option<Assignment>, ApiError> {
        let response = self
            .request(Method::PATCH, &format!("/schedules/{schedule_id}/assignment"))
            .json(&request)
            .send()
            .await?;
        let body = Self::parse_response(response).await?;
        Ok(wire::decode_upsert_response(
            body,
            request.employee_id,
            request.date,
        ))
    }

    async fn delete_assignment(
        &self,
        schedule_id: ScheduleId,
        employee_id: EmployeeId,
        date: DateKey,
    ) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/schedules/{schedule_id}/assignment"))
            .query(&[
                ("employeeId", employee_id.to_string()),
                ("date", date.to_string()),
            ])
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn list_employees(&self, team_id: TeamId) -> Result<Vec<Employee>, ApiError> {
        let response = self
            .request(Method::GET, "/employees")
            .query(&[("teamId", team_id)])
            .send()
            .await?;
        let body = Self::parse_response(response).await?;
        Ok(wire::decode_employees(body))
    }

    async fn list_shift_types(&self, team_id: Option<TeamId>) -> Result<Vec<ShiftType>, ApiError> {
        let mut builder = self.request(Method::GET, "/shifts");
        if let Some(team_id) = team_id {
            builder = builder.query(&[("teamId", team_id)]);
        }
        let body = Self::parse_response(builder.send().await?).await?;
        Ok(wire::decode_shift_types(body))
    }
}
