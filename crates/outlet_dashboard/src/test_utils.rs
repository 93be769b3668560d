//! Scriptable in-memory `DashboardClient` used by the unit tests.
#![cfg(test)]

use std::collections::VecDeque;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::Mutex;

use outlet_dashboard_client::{
    ClientError, DashboardClient, Employee, EmployeePayload, EmployeeQuery, NewUser, Outlet,
    ReportQuery, ReportRow, Role, User,
};

/// Responses are queued per endpoint; an empty queue answers with an empty
/// success. Every call is recorded by name.
#[derive(Default)]
pub struct MockClient {
    pub reports: Mutex<VecDeque<Result<Vec<ReportRow>, ClientError>>>,
    pub employees: Mutex<Vec<Employee>>,
    pub submit_errors: Mutex<VecDeque<ClientError>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockClient {
    pub async fn push_reports(&self, result: Result<Vec<ReportRow>, ClientError>) {
        self.reports.lock().await.push_back(result);
    }

    pub async fn fail_next_submit(&self, err: ClientError) {
        self.submit_errors.lock().await.push_back(err);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: &str) {
        self.calls.lock().await.push(call.to_string());
    }
}

pub fn employee_from(id: &str, payload: &EmployeePayload) -> Employee {
    Employee {
        id: id.to_string(),
        nik: payload.nik.clone(),
        name: payload.name.clone(),
        email: payload.email.clone(),
        phone: payload.phone.clone(),
        position: payload.position.clone(),
        outlet_id: payload.outlet_id.clone(),
        outlet_name: None,
        status: Some(format!("{:?}", payload.status).to_lowercase()),
        join_date: Some(payload.join_date.to_string()),
        contract_end: payload.contract_end.map(|d| d.to_string()),
        salary: payload.salary,
        address: payload.address.clone(),
        documents: payload.documents.clone(),
        emergency_contact: Some(payload.emergency_contact.clone()),
    }
}

#[async_trait]
impl DashboardClient for MockClient {
    async fn login(&self, email: &str, _password: &SecretString) -> Result<User, ClientError> {
        self.record("login").await;
        Ok(User {
            id: "1".into(),
            name: "Test".into(),
            email: email.to_string(),
            role: Role::Admin,
            created_at: None,
        })
    }

    async fn logout(&self) -> Result<(), ClientError> {
        self.record("logout").await;
        Ok(())
    }

    async fn get_outlets(&self) -> Result<Vec<Outlet>, ClientError> {
        self.record("get_outlets").await;
        Ok(Vec::new())
    }

    async fn get_reports(&self, _query: &ReportQuery) -> Result<Vec<ReportRow>, ClientError> {
        self.record("get_reports").await;
        self.reports.lock().await.pop_front().unwrap_or(Ok(Vec::new()))
    }

    async fn get_users(&self) -> Result<Vec<User>, ClientError> {
        self.record("get_users").await;
        Ok(Vec::new())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, ClientError> {
        self.record("create_user").await;
        if let Some(err) = self.submit_errors.lock().await.pop_front() {
            return Err(err);
        }
        Ok(User {
            id: "2".into(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            created_at: None,
        })
    }

    async fn get_employees(&self, _query: &EmployeeQuery) -> Result<Vec<Employee>, ClientError> {
        self.record("get_employees").await;
        Ok(self.employees.lock().await.clone())
    }

    async fn get_employee(&self, id: &str) -> Result<Employee, ClientError> {
        self.record("get_employee").await;
        self.employees
            .lock()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(id.to_string()))
    }

    async fn create_employee(&self, payload: &EmployeePayload) -> Result<Employee, ClientError> {
        self.record("create_employee").await;
        if let Some(err) = self.submit_errors.lock().await.pop_front() {
            return Err(err);
        }
        let mut employees = self.employees.lock().await;
        let created = employee_from(&(employees.len() + 1).to_string(), payload);
        employees.push(created.clone());
        Ok(created)
    }

    async fn update_employee(
        &self,
        id: &str,
        payload: &EmployeePayload,
    ) -> Result<Employee, ClientError> {
        self.record("update_employee").await;
        if let Some(err) = self.submit_errors.lock().await.pop_front() {
            return Err(err);
        }
        Ok(employee_from(id, payload))
    }

    async fn delete_employee(&self, id: &str) -> Result<(), ClientError> {
        self.record("delete_employee").await;
        let mut employees = self.employees.lock().await;
        let before = employees.len();
        employees.retain(|e| e.id != id);
        if employees.len() == before {
            return Err(ClientError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
