//! Screen services: each owns the local state of one screen and talks to the
//! backend through a shared [`DashboardClient`].
//!
//! Every fetch follows the same shape: set `loading`, await the request,
//! record an inline error message on failure, and always clear `loading`
//! afterwards. Nothing is retried automatically.

use std::sync::Arc;

use outlet_dashboard_client::{
    ClientError, DashboardClient, Employee, EmployeeQuery, ErrorClass, Outlet, ReportRow, User,
};
use thiserror::Error;

use crate::domains::daily::{DailyAggregate, aggregate_daily};
use crate::domains::employees;
use crate::domains::outlets::{OutletAggregate, aggregate_outlets};
use crate::domains::summary::{SummaryStats, summarize};
use crate::error::{DashboardError, DashboardResult};
use crate::filter::FilterState;
use crate::forms::employee::SERVER_FIELD_ALIASES;
use crate::forms::{EmployeeForm, FieldErrors, UserForm};
use crate::kpi::KpiConfig;
use crate::pagination::Page;

#[derive(Clone, Debug)]
pub struct DashboardState {
    pub filter: FilterState,
    pub outlet_options: Vec<Outlet>,
    pub rows: Vec<ReportRow>,
    pub daily: Vec<DailyAggregate>,
    pub outlets: Vec<OutletAggregate>,
    pub summary: SummaryStats,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardState {
    fn new(filter: FilterState) -> Self {
        Self {
            filter,
            outlet_options: Vec::new(),
            rows: Vec::new(),
            daily: Vec::new(),
            outlets: Vec::new(),
            summary: SummaryStats::default(),
            loading: false,
            error: None,
        }
    }

    fn clear_data(&mut self) {
        self.rows.clear();
        self.daily.clear();
        self.outlets.clear();
        self.summary = SummaryStats::default();
    }
}

/// Outlet performance dashboard.
pub struct DashboardService {
    client: Arc<dyn DashboardClient>,
    kpi: KpiConfig,
    state: DashboardState,
}

impl DashboardService {
    pub fn new(client: Arc<dyn DashboardClient>, kpi: KpiConfig, filter: FilterState) -> Self {
        Self {
            client,
            kpi,
            state: DashboardState::new(filter),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn kpi(&self) -> &KpiConfig {
        &self.kpi
    }

    /// Populate the outlet dropdown.
    pub async fn load_outlets(&mut self) -> DashboardResult<()> {
        self.state.loading = true;
        let result = self.client.get_outlets().await;
        self.state.loading = false;
        match result {
            Ok(outlets) => {
                self.state.outlet_options = outlets;
                Ok(())
            }
            Err(e) => Err(self.record_failure(e.into())),
        }
    }

    /// Fetch report rows for `filter` and recompute every aggregate.
    ///
    /// On failure the previous data stays on screen next to the error
    /// message, except when the session is gone.
    pub async fn apply_filter(&mut self, filter: FilterState) -> DashboardResult<()> {
        filter.validate().map_err(|e| self.record_failure(e))?;
        self.state.loading = true;
        self.state.error = None;
        let result = self.client.get_reports(&filter.to_query()).await;
        self.state.loading = false;

        match result {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), period = %filter.period_key(), "reports loaded");
                metrics::counter!("outlet_dashboard_refreshes_total", "outcome" => "ok")
                    .increment(1);
                self.state.filter = filter;
                self.state.rows = rows;
                self.recompute()
            }
            Err(e) => {
                metrics::counter!("outlet_dashboard_refreshes_total", "outcome" => "error")
                    .increment(1);
                if e.class() == ErrorClass::RedirectToLogin {
                    self.state.clear_data();
                }
                Err(self.record_failure(e.into()))
            }
        }
    }

    /// Re-run the aggregation over the rows already loaded.
    pub fn recompute(&mut self) -> DashboardResult<()> {
        let f = &self.state.filter;
        let daily = aggregate_daily(&self.state.rows, f.month, f.year, &self.kpi)
            .map_err(|e| self.record_failure(e))?;
        let outlets = aggregate_outlets(&self.state.rows, &self.kpi);
        self.state.summary = summarize(&outlets, &daily);
        self.state.daily = daily;
        self.state.outlets = outlets;
        Ok(())
    }

    fn record_failure(&mut self, err: DashboardError) -> DashboardError {
        tracing::warn!("dashboard update failed: {err}");
        self.state.error = Some(err.user_message());
        err
    }
}

/// Why a form submission did not go through.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Client-side or backend (422) validation failed.
    #[error("invalid input: {0}")]
    Invalid(FieldErrors),
    #[error("{message}")]
    Failed { message: String, class: ErrorClass },
}

impl SubmitError {
    fn from_client(err: ClientError, aliases: &[(&str, &str)]) -> Self {
        match FieldErrors::from_client_error(&err, aliases) {
            Some(mut errors) => {
                if errors.is_empty() {
                    errors.add("form", err.user_message());
                }
                SubmitError::Invalid(errors)
            }
            None => SubmitError::Failed {
                message: err.user_message(),
                class: err.class(),
            },
        }
    }
}

/// Employee listing with local search and pagination, plus create/edit.
pub struct EmployeeService {
    client: Arc<dyn DashboardClient>,
    employees: Vec<Employee>,
    pub search: String,
    pub status: Option<String>,
    pub per_page: usize,
    pub loading: bool,
    pub error: Option<String>,
}

impl EmployeeService {
    pub fn new(client: Arc<dyn DashboardClient>, per_page: usize) -> Self {
        Self {
            client,
            employees: Vec::new(),
            search: String::new(),
            status: None,
            per_page,
            loading: false,
            error: None,
        }
    }

    pub async fn refresh(&mut self, query: &EmployeeQuery) -> DashboardResult<()> {
        self.loading = true;
        self.error = None;
        let result = self.client.get_employees(query).await;
        self.loading = false;
        match result {
            Ok(list) => {
                self.employees = list;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("employee listing failed: {e}");
                self.error = Some(e.user_message());
                self.employees.clear();
                Err(e.into())
            }
        }
    }

    pub fn all(&self) -> &[Employee] {
        &self.employees
    }

    /// Current page of the filtered listing.
    pub fn page(&self, page: usize) -> Page<Employee> {
        let filtered: Vec<Employee> =
            employees::search(&self.employees, &self.search, self.status.as_deref())
                .into_iter()
                .cloned()
                .collect();
        Page::of(&filtered, page, self.per_page)
    }

    pub async fn create(&mut self, form: &EmployeeForm) -> Result<Employee, SubmitError> {
        let payload = form.to_payload().map_err(SubmitError::Invalid)?;
        let created = self
            .client
            .create_employee(&payload)
            .await
            .map_err(|e| SubmitError::from_client(e, SERVER_FIELD_ALIASES))?;
        self.employees.push(created.clone());
        Ok(created)
    }

    pub async fn update(&mut self, id: &str, form: &EmployeeForm) -> Result<Employee, SubmitError> {
        let payload = form.to_payload().map_err(SubmitError::Invalid)?;
        let updated = self
            .client
            .update_employee(id, &payload)
            .await
            .map_err(|e| SubmitError::from_client(e, SERVER_FIELD_ALIASES))?;
        if let Some(slot) = self.employees.iter_mut().find(|e| e.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> DashboardResult<()> {
        match self.client.delete_employee(id).await {
            Ok(()) => {
                self.employees.retain(|e| e.id != id);
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e.into())
            }
        }
    }
}

/// User management (administrators only).
pub struct UserService {
    client: Arc<dyn DashboardClient>,
    users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl UserService {
    pub fn new(client: Arc<dyn DashboardClient>) -> Self {
        Self {
            client,
            users: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub async fn refresh(&mut self) -> DashboardResult<()> {
        self.loading = true;
        self.error = None;
        let result = self.client.get_users().await;
        self.loading = false;
        match result {
            Ok(users) => {
                self.users = users;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.user_message());
                Err(e.into())
            }
        }
    }

    pub async fn create(&mut self, form: &UserForm) -> Result<User, SubmitError> {
        let new_user = form.to_new_user().map_err(SubmitError::Invalid)?;
        let user = self
            .client
            .create_user(&new_user)
            .await
            .map_err(|e| SubmitError::from_client(e, &[]))?;
        self.users.push(user.clone());
        Ok(user)
    }
}
