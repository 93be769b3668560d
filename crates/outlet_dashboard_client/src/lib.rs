//! `DashboardClient` trait, backend models and a reqwest-based implementation
//! for the outlet reporting API.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use schemars::JsonSchema;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub mod config;
pub mod envelope;
pub mod http_client;
pub mod session;
pub mod utils;

/// Field-keyed validation messages, as returned by the backend on 422.
pub type FieldErrorMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("not authenticated: {0}")]
    Unauthenticated(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        errors: FieldErrorMap,
    },
    #[error("backend rejected request: {0}")]
    Rejected(String),
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("session storage error: {0}")]
    Storage(String),
    #[error("configuration error: {0}")]
    Config(String),
}

/// How the UI is expected to react to a failed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    RedirectToLogin,
    ManualRetry,
    FieldErrors,
    Generic,
}

impl ClientError {
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => ClientError::Unauthenticated(body),
            403 => ClientError::Forbidden(body),
            404 => ClientError::NotFound(body),
            _ => ClientError::Server { status, body },
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ClientError::Unauthenticated(_) => ErrorClass::RedirectToLogin,
            ClientError::Network(_) => ErrorClass::ManualRetry,
            ClientError::Validation { .. } => ErrorClass::FieldErrors,
            _ => ErrorClass::Generic,
        }
    }

    /// Field errors carried by a 422 response, if any.
    pub fn field_errors(&self) -> Option<&FieldErrorMap> {
        match self {
            ClientError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Short message suitable for an inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthenticated(_) => {
                "Your session has expired. Please log in again.".into()
            }
            ClientError::Forbidden(_) => "You do not have access to this resource.".into(),
            ClientError::NotFound(_) => "The requested data was not found.".into(),
            ClientError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".into()
            }
            ClientError::Validation { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Validation { .. } => "Some fields are invalid.".into(),
            ClientError::Rejected(msg) if !msg.is_empty() => msg.clone(),
            _ => "Something went wrong while loading data.".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(alias = "staff")]
    User,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

fn default_role() -> Role {
    Role::User
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Outlet {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(
        default,
        alias = "nama_outlet",
        alias = "outlet_name",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub name: String,
    #[serde(default)]
    pub lob: Option<String>,
    #[serde(default, alias = "kota")]
    pub city: Option<String>,
}

/// One performance record for an outlet on a given date.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReportRow {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub outlet_id: String,
    #[serde(
        default,
        alias = "nama_outlet",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub outlet_name: String,
    #[serde(default)]
    pub lob: Option<String>,
    /// Plain `YYYY-MM-DD` or a full timestamp, depending on the endpoint.
    #[serde(
        default,
        alias = "tanggal",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub omzet_fnb: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub omzet_cinema: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub total_audience: f64,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub target_head: f64,
    #[serde(default, deserialize_with = "deserialize_opt_amount")]
    pub target_percentage: Option<f64>,
}

/// Query parameters accepted by the reports endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportQuery {
    pub month: u32,
    pub year: i32,
    pub outlet_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("month", self.month.to_string()),
            ("year", self.year.to_string()),
        ];
        if let Some(id) = &self.outlet_id {
            pairs.push(("outlet_id", id.clone()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct EmergencyContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub relation: Option<String>,
}

/// Employee ("karyawan") record as returned by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub nik: String,
    #[serde(
        default,
        alias = "nama",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "no_hp")]
    pub phone: Option<String>,
    #[serde(default, alias = "jabatan")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub outlet_id: Option<String>,
    #[serde(default)]
    pub outlet_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "tanggal_masuk")]
    pub join_date: Option<String>,
    #[serde(default, alias = "tanggal_akhir_kontrak")]
    pub contract_end: Option<String>,
    #[serde(default, alias = "gaji", deserialize_with = "deserialize_opt_amount")]
    pub salary: Option<f64>,
    #[serde(default, alias = "alamat")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub documents: Vec<String>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
}

/// Serialized with the backend's status values.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum EmploymentStatus {
    #[serde(rename = "tetap", alias = "permanent")]
    Permanent,
    #[serde(rename = "kontrak", alias = "contract")]
    Contract,
    #[serde(rename = "magang", alias = "intern")]
    Intern,
}

impl EmploymentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "permanent" | "tetap" => Some(Self::Permanent),
            "contract" | "kontrak" => Some(Self::Contract),
            "intern" | "magang" => Some(Self::Intern),
            _ => None,
        }
    }
}

/// Body sent when creating or updating an employee. Keys follow the
/// backend's validation rules, which are also the keys of its 422 errors.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct EmployeePayload {
    pub nik: String,
    #[serde(rename = "nama")]
    pub name: String,
    pub email: Option<String>,
    #[serde(rename = "no_hp")]
    pub phone: Option<String>,
    #[serde(rename = "jabatan")]
    pub position: Option<String>,
    pub outlet_id: Option<String>,
    pub status: EmploymentStatus,
    #[serde(rename = "tanggal_masuk")]
    pub join_date: NaiveDate,
    #[serde(rename = "tanggal_akhir_kontrak")]
    pub contract_end: Option<NaiveDate>,
    #[serde(rename = "gaji")]
    pub salary: Option<f64>,
    #[serde(rename = "alamat")]
    pub address: Option<String>,
    pub documents: Vec<String>,
    pub emergency_contact: EmergencyContact,
}

/// New user account. The password never leaves a `SecretString` until the
/// request body is built.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub role: Role,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmployeeQuery {
    pub search: Option<String>,
    pub outlet_id: Option<String>,
    pub status: Option<String>,
}

impl EmployeeQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(s) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", s.trim().to_string()));
        }
        if let Some(id) = &self.outlet_id {
            pairs.push(("outlet_id", id.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status", status.clone()));
        }
        pairs
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match deserialize_opt_string(deserializer)? {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(D::Error::custom("missing id")),
    }
}

fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string().into()),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_opt_string(deserializer)?.unwrap_or_default())
}

/// Numbers arrive as JSON numbers, decimal strings or null. Anything that is
/// not a number counts as absent.
fn deserialize_opt_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_opt_amount(deserializer)?.unwrap_or(0.0))
}

fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[async_trait]
pub trait DashboardClient: Send + Sync + 'static {
    /// Authenticate and store the resulting session.
    async fn login(&self, email: &str, password: &SecretString) -> Result<User, ClientError>;
    /// Invalidate the token on the backend and clear the local session.
    async fn logout(&self) -> Result<(), ClientError>;
    async fn get_outlets(&self) -> Result<Vec<Outlet>, ClientError>;
    async fn get_reports(&self, query: &ReportQuery) -> Result<Vec<ReportRow>, ClientError>;
    async fn get_users(&self) -> Result<Vec<User>, ClientError>;
    async fn create_user(&self, user: &NewUser) -> Result<User, ClientError>;
    async fn get_employees(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, ClientError>;
    async fn get_employee(&self, id: &str) -> Result<Employee, ClientError>;
    async fn create_employee(&self, payload: &EmployeePayload) -> Result<Employee, ClientError>;
    async fn update_employee(
        &self,
        id: &str,
        payload: &EmployeePayload,
    ) -> Result<Employee, ClientError>;
    async fn delete_employee(&self, id: &str) -> Result<(), ClientError>;
}
