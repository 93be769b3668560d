use std::sync::Arc;

use outlet_dashboard_client::{
    DashboardClient, config::Config, http_client::ReqwestDashboardClient, session::SessionStore,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects OUTLET_DASHBOARD_EMAIL and OUTLET_DASHBOARD_PASSWORD in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let (Some(email), Some(password)) = (cfg.email.as_deref(), cfg.password.as_ref()) else {
        eprintln!("set OUTLET_DASHBOARD_EMAIL and OUTLET_DASHBOARD_PASSWORD");
        return Ok(());
    };
    let client = ReqwestDashboardClient::new(&cfg.base_url, Arc::new(SessionStore::in_memory()));
    let user = client.login(email, password).await?;
    println!("Logged in as {} ({})", user.name, user.email);
    for outlet in client.get_outlets().await? {
        println!("{:>6}  {}", outlet.id, outlet.name);
    }
    client.logout().await?;
    Ok(())
}
