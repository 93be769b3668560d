//! Application context shared by every screen: session, theme, current
//! filter and KPI configuration. It is created once at start-up and passed
//! by reference; there is no global state.

use std::sync::Arc;

use outlet_dashboard_client::User;
use outlet_dashboard_client::session::SessionStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::FilterState;
use crate::kpi::KpiConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    OutletPerformance,
    Users,
    UserCreate,
    Employees,
    EmployeeCreate,
    EmployeeEdit,
}

impl Route {
    pub fn requires_auth(self) -> bool {
        !matches!(self, Route::Login)
    }

    /// User management is restricted to administrators.
    pub fn admin_only(self) -> bool {
        matches!(self, Route::Users | Route::UserCreate)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("login required")]
    LoginRequired,
    #[error("administrator role required")]
    AdminRequired,
}

#[derive(Debug)]
pub struct AppContext {
    session: Arc<SessionStore>,
    theme: Theme,
    filter: FilterState,
    kpi: KpiConfig,
}

impl AppContext {
    pub fn new(session: Arc<SessionStore>, filter: FilterState, kpi: KpiConfig) -> Self {
        Self {
            session,
            theme: Theme::default(),
            filter,
            kpi,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    pub fn kpi(&self) -> &KpiConfig {
        &self.kpi
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.user().await
    }

    /// Check whether the current session may open `route`.
    pub async fn guard(&self, route: Route) -> Result<(), AccessError> {
        if !route.requires_auth() {
            return Ok(());
        }
        let user = self.session.user().await.ok_or(AccessError::LoginRequired)?;
        if route.admin_only() && !user.is_admin() {
            return Err(AccessError::AdminRequired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlet_dashboard_client::Role;
    use outlet_dashboard_client::session::Session;
    use secrecy::SecretString;

    fn ctx() -> AppContext {
        AppContext::new(
            Arc::new(SessionStore::in_memory()),
            FilterState::new(3, 2024).expect("filter"),
            KpiConfig::default(),
        )
    }

    async fn login(ctx: &AppContext, role: Role) {
        ctx.session()
            .set(Session {
                token: SecretString::new("t".into()),
                user: User {
                    id: "1".into(),
                    name: "U".into(),
                    email: "u@example.com".into(),
                    role,
                    created_at: None,
                },
            })
            .await
            .expect("set session");
    }

    #[tokio::test]
    async fn guard_redirects_anonymous_users() {
        let ctx = ctx();
        assert_eq!(ctx.guard(Route::Login).await, Ok(()));
        assert_eq!(
            ctx.guard(Route::Dashboard).await,
            Err(AccessError::LoginRequired)
        );
    }

    #[tokio::test]
    async fn guard_restricts_user_management() {
        let ctx = ctx();
        login(&ctx, Role::User).await;
        assert_eq!(ctx.guard(Route::Employees).await, Ok(()));
        assert_eq!(
            ctx.guard(Route::UserCreate).await,
            Err(AccessError::AdminRequired)
        );

        login(&ctx, Role::Admin).await;
        assert_eq!(ctx.guard(Route::Users).await, Ok(()));
    }

    #[test]
    fn theme_toggles() {
        let mut ctx = ctx();
        assert_eq!(ctx.theme(), Theme::Light);
        assert_eq!(ctx.toggle_theme(), Theme::Dark);
        assert_eq!(ctx.toggle_theme(), Theme::Light);
    }
}
