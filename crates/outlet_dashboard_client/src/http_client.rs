//! HTTP client implementation for the outlet reporting API.
//!
//! This module provides a reqwest-based implementation of the
//! [`DashboardClient`](crate::DashboardClient) trait. Every authenticated
//! call reads the bearer token from the shared [`SessionStore`]; a missing
//! token fails before any network traffic happens.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::envelope::{decode_list, decode_one};
use crate::session::{Session, SessionStore};
use crate::{
    ClientError, DashboardClient, Employee, EmployeePayload, EmployeeQuery, FieldErrorMap,
    NewUser, Outlet, ReportQuery, ReportRow, User,
};

/// Client for the reporting backend using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestDashboardClient {
    base_url: String,
    session: Arc<SessionStore>,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct LoginPayload {
    #[serde(alias = "access_token")]
    token: String,
    user: User,
}

impl ReqwestDashboardClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - Root of the backend (e.g. "https://reports.example.com")
    /// * `session` - Session store shared with the rest of the application
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            client: reqwest::Client::new(),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Build a request carrying the session's bearer token.
    async fn authed(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self.session.token().await?;
        Ok(self
            .client
            .request(method, self.url(path))
            .bearer_auth(token.expose_secret()))
    }

    /// Send a request and return the raw body of a successful response.
    async fn send(
        &self,
        resource: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, ClientError> {
        metrics::counter!("outlet_dashboard_requests_total", "resource" => resource).increment(1);
        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                metrics::counter!(
                    "outlet_dashboard_request_failures_total",
                    "resource" => resource,
                    "kind" => "network"
                )
                .increment(1);
                tracing::warn!(resource, "request failed: {e}");
                return Err(ClientError::Network(e));
            }
        };
        let status = resp.status();
        if !status.is_success() {
            metrics::counter!(
                "outlet_dashboard_request_failures_total",
                "resource" => resource,
                "kind" => status.as_u16().to_string()
            )
            .increment(1);
            let err = self.error_from_response(resp).await;
            if matches!(err, ClientError::Unauthenticated(_)) {
                // The token is no longer accepted; drop it so the next
                // screen redirects to login.
                if let Err(e) = self.session.clear().await {
                    tracing::warn!("failed to clear expired session: {e}");
                }
            }
            tracing::warn!(resource, status = status.as_u16(), "request rejected: {err}");
            return Err(err);
        }
        tracing::debug!(resource, status = status.as_u16(), "request succeeded");
        Ok(resp.bytes().await?.to_vec())
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<T>, ClientError> {
        let body = self.send(resource, request).await?;
        decode_list(&body)
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        resource: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let body = self.send(resource, request).await?;
        decode_one(&body)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> ClientError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        if status == 422 {
            return parse_validation_error(&body);
        }
        let body_snippet: String = body.chars().take(256).collect();
        ClientError::from_status(status, body_snippet)
    }
}

/// Laravel-style 422 body: `{"message": "...", "errors": {"field": ["..."]}}`.
/// Single strings are accepted in place of arrays.
fn parse_validation_error(body: &str) -> ClientError {
    let value: serde_json::Value = serde_json::from_str(body).unwrap_or_default();
    let message = value
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or_default()
        .to_string();
    let mut errors = FieldErrorMap::new();
    if let Some(obj) = value.get("errors").and_then(|e| e.as_object()) {
        for (field, msgs) in obj {
            let list: Vec<String> = match msgs {
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect(),
                serde_json::Value::String(s) => vec![s.clone()],
                _ => Vec::new(),
            };
            if !list.is_empty() {
                errors.insert(field.clone(), list);
            }
        }
    }
    ClientError::Validation { message, errors }
}

#[async_trait]
impl DashboardClient for ReqwestDashboardClient {
    async fn login(&self, email: &str, password: &SecretString) -> Result<User, ClientError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });
        let request = self.client.post(self.url("login")).json(&body);
        let payload: LoginPayload = self.fetch_one("login", request).await?;
        self.session
            .set(Session {
                token: SecretString::new(payload.token.into()),
                user: payload.user.clone(),
            })
            .await?;
        tracing::info!(user = %payload.user.email, "logged in");
        Ok(payload.user)
    }

    async fn logout(&self) -> Result<(), ClientError> {
        // Logging out locally must succeed even if the backend call fails.
        let remote = match self.authed(Method::POST, "logout").await {
            Ok(request) => self.send("logout", request).await.map(|_| ()),
            Err(ClientError::Unauthenticated(_)) => Ok(()),
            Err(e) => Err(e),
        };
        self.session.clear().await?;
        remote
    }

    async fn get_outlets(&self) -> Result<Vec<Outlet>, ClientError> {
        let request = self.authed(Method::GET, "outlets").await?;
        self.fetch_list("outlets", request).await
    }

    async fn get_reports(&self, query: &ReportQuery) -> Result<Vec<ReportRow>, ClientError> {
        let request = self
            .authed(Method::GET, "reports")
            .await?
            .query(&query.to_pairs());
        self.fetch_list("reports", request).await
    }

    async fn get_users(&self) -> Result<Vec<User>, ClientError> {
        let request = self.authed(Method::GET, "users").await?;
        self.fetch_list("users", request).await
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ClientError> {
        let body = serde_json::json!({
            "name": user.name,
            "email": user.email,
            "password": user.password.expose_secret(),
            "password_confirmation": user.password.expose_secret(),
            "role": user.role,
        });
        let request = self.authed(Method::POST, "users").await?.json(&body);
        self.fetch_one("users", request).await
    }

    async fn get_employees(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, ClientError> {
        let request = self
            .authed(Method::GET, "karyawan")
            .await?
            .query(&query.to_pairs());
        self.fetch_list("employees", request).await
    }

    async fn get_employee(&self, id: &str) -> Result<Employee, ClientError> {
        let request = self.authed(Method::GET, &format!("karyawan/{id}")).await?;
        self.fetch_one("employees", request).await
    }

    async fn create_employee(&self, payload: &EmployeePayload) -> Result<Employee, ClientError> {
        let request = self.authed(Method::POST, "karyawan").await?.json(payload);
        self.fetch_one("employees", request).await
    }

    async fn update_employee(
        &self,
        id: &str,
        payload: &EmployeePayload,
    ) -> Result<Employee, ClientError> {
        let request = self
            .authed(Method::PUT, &format!("karyawan/{id}"))
            .await?
            .json(payload);
        self.fetch_one("employees", request).await
    }

    async fn delete_employee(&self, id: &str) -> Result<(), ClientError> {
        let request = self
            .authed(Method::DELETE, &format!("karyawan/{id}"))
            .await?;
        self.send("employees", request).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_api_prefix() {
        let client =
            ReqwestDashboardClient::new("http://localhost/", Arc::new(SessionStore::in_memory()));
        assert_eq!(client.url("/outlets"), "http://localhost/api/outlets");
        assert_eq!(client.url("karyawan/3"), "http://localhost/api/karyawan/3");
    }

    #[test]
    fn validation_body_accepts_strings_and_arrays() {
        let err = parse_validation_error(
            r#"{"message": "The given data was invalid.", "errors": {"email": ["taken"], "nik": "required"}}"#,
        );
        let errors = err.field_errors().expect("field errors");
        assert_eq!(errors["email"], vec!["taken".to_string()]);
        assert_eq!(errors["nik"], vec!["required".to_string()]);
        assert_eq!(err.user_message(), "The given data was invalid.");
    }

    #[test]
    fn validation_body_garbage_still_maps_to_validation() {
        let err = parse_validation_error("<html>");
        assert!(matches!(err, ClientError::Validation { .. }));
        assert!(err.field_errors().is_some_and(|e| e.is_empty()));
    }
}
