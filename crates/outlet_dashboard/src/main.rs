use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::{UTF8_BORDERS_ONLY, UTF8_FULL};
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use secrecy::SecretString;

use outlet_dashboard::domains::employees::contracts_ending;
use outlet_dashboard::domains::outlets::filter_by_lob;
use outlet_dashboard::export::{self, ExportOptions, ReportKind, report_filename};
use outlet_dashboard::format::{currency, grouped, percent};
use outlet_dashboard::forms::{EmployeeForm, UserForm, employee::payload_schema};
use outlet_dashboard::{
    AppContext, DashboardService, DsStatus, EmployeeService, FilterState, KpiConfig,
    OutletSelection, Route, SubmitError, Theme, UserService, aggregate_outlets,
};
use outlet_dashboard_client::config::Config;
use outlet_dashboard_client::http_client::ReqwestDashboardClient;
use outlet_dashboard_client::session::SessionStore;
use outlet_dashboard_client::{DashboardClient, EmployeeQuery};

#[derive(Parser)]
#[command(name = "outlet-dashboard")]
#[command(about = "Outlet and cinema sales reporting dashboard", long_about = None)]
struct Cli {
    /// Render tables for dark terminals.
    #[arg(long, global = true)]
    dark: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct PeriodArgs {
    /// Month (1-12); defaults to the current month.
    #[arg(long)]
    month: Option<u32>,
    #[arg(long)]
    year: Option<i32>,
    /// Outlet id, or "all".
    #[arg(long, default_value = "all")]
    outlet: String,
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    Outlets,
    Daily,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long, env = "OUTLET_DASHBOARD_EMAIL")]
        email: Option<String>,
    },
    Logout,
    Whoami,
    /// List outlets available for filtering.
    Outlets,
    /// Day-by-day totals for one month.
    Daily {
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Outlets ranked by DS%.
    Ranking {
        #[command(flatten)]
        period: PeriodArgs,
        /// Only rows of this line of business.
        #[arg(long)]
        lob: Option<String>,
    },
    /// Write a PDF report.
    Export {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long, value_enum, default_value = "outlets")]
        kind: ExportKind,
        /// Output path; defaults to a dated file name in the current directory.
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 25)]
        rows_per_page: usize,
        #[arg(long)]
        no_chart: bool,
    },
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    Employees {
        #[command(subcommand)]
        action: EmployeeAction,
    },
    /// Show the active theme.
    Theme,
}

#[derive(Subcommand)]
enum UserAction {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "OUTLET_DASHBOARD_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
}

#[derive(clap::Args, Clone, Default)]
struct EmployeeArgs {
    #[arg(long)]
    nik: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    outlet: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    join_date: Option<String>,
    #[arg(long)]
    contract_end: Option<String>,
    #[arg(long)]
    salary: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long = "document")]
    documents: Vec<String>,
    #[arg(long)]
    emergency_name: Option<String>,
    #[arg(long)]
    emergency_phone: Option<String>,
    #[arg(long)]
    emergency_relation: Option<String>,
}

impl EmployeeArgs {
    /// Overlay the provided flags on `form`.
    fn apply(self, mut form: EmployeeForm) -> EmployeeForm {
        let set = |slot: &mut String, value: Option<String>| {
            if let Some(v) = value {
                *slot = v;
            }
        };
        set(&mut form.nik, self.nik);
        set(&mut form.name, self.name);
        set(&mut form.email, self.email);
        set(&mut form.phone, self.phone);
        set(&mut form.position, self.position);
        set(&mut form.outlet_id, self.outlet);
        set(&mut form.status, self.status);
        set(&mut form.join_date, self.join_date);
        set(&mut form.contract_end, self.contract_end);
        set(&mut form.salary, self.salary);
        set(&mut form.address, self.address);
        set(&mut form.emergency_name, self.emergency_name);
        set(&mut form.emergency_phone, self.emergency_phone);
        set(&mut form.emergency_relation, self.emergency_relation);
        if !self.documents.is_empty() {
            form.documents = self.documents;
        }
        form
    }
}

#[derive(Subcommand)]
enum EmployeeAction {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        outlet: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        per_page: usize,
    },
    Show {
        id: String,
    },
    Create {
        #[command(flatten)]
        fields: EmployeeArgs,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: EmployeeArgs,
    },
    Delete {
        id: String,
    },
    /// Contracts ending within the given number of days.
    Expiring {
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
    /// Print the JSON schema of the employee request body.
    Schema,
}

fn init_tracing() -> String {
    // `OUTLET_DASHBOARD_LOG_LEVEL`, then `RUST_LOG`, default `info`.
    let log_env = std::env::var("OUTLET_DASHBOARD_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    let combined_filter = format!("{},hyper=warn,reqwest=warn", log_env);
    let env_filter = tracing_subscriber::EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    log_env
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn filter_from(args: &PeriodArgs) -> anyhow::Result<FilterState> {
    let base = FilterState::for_date(today());
    let mut filter = FilterState::new(
        args.month.unwrap_or(base.month),
        args.year.unwrap_or(base.year),
    )?
    .with_outlet(OutletSelection::parse(&args.outlet));
    if let (Some(from), Some(to)) = (args.from, args.to) {
        filter = filter.with_range(from, to)?;
    }
    Ok(filter)
}

fn new_table(theme: Theme) -> Table {
    let mut table = Table::new();
    table
        .load_preset(match theme {
            Theme::Light => UTF8_FULL,
            Theme::Dark => UTF8_BORDERS_ONLY,
        })
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn right(text: impl ToString) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn status_cell(status: DsStatus, theme: Theme) -> Cell {
    let [r, g, b] = status.color();
    let color = match theme {
        Theme::Light => Color::Rgb { r, g, b },
        Theme::Dark => Color::Rgb {
            r: r.saturating_add(20),
            g: g.saturating_add(20),
            b: b.saturating_add(20),
        },
    };
    Cell::new(status.label()).fg(color)
}

fn report_submit_error(err: SubmitError) -> anyhow::Error {
    if let SubmitError::Invalid(errors) = &err {
        for (field, messages) in errors.iter() {
            for message in messages {
                eprintln!("  {field}: {message}");
            }
        }
    }
    anyhow::anyhow!(err)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_env = init_tracing();
    tracing::debug!("outlet-dashboard: log filter: {}", log_env);

    let config = Config::from_env()?;
    let session = Arc::new(match &config.session_file {
        Some(path) => SessionStore::persistent(path),
        None => SessionStore::in_memory(),
    });
    let http = ReqwestDashboardClient::new(&config.base_url, session.clone());
    let client: Arc<dyn DashboardClient> = Arc::new(http);
    let kpi = KpiConfig::from_env()?;
    let mut ctx = AppContext::new(session, FilterState::for_date(today()), kpi);
    if cli.dark {
        ctx.set_theme(Theme::Dark);
    }
    let theme = ctx.theme();

    match cli.command {
        Command::Login { email } => {
            let email = email.context("email is required (--email or OUTLET_DASHBOARD_EMAIL)")?;
            let password = match config.password.clone() {
                Some(p) => p,
                None => {
                    eprint!("Password: ");
                    let mut line = String::new();
                    std::io::stdin().read_line(&mut line)?;
                    SecretString::new(line.trim_end().to_string().into())
                }
            };
            let user = client.login(&email, &password).await?;
            println!("Signed in as {} <{}> ({:?})", user.name, user.email, user.role);
            if ctx.session().path().is_none() {
                tracing::warn!(
                    "OUTLET_DASHBOARD_SESSION_FILE is not set; the session ends with this process"
                );
            }
        }
        Command::Logout => {
            client.logout().await?;
            println!("Signed out");
        }
        Command::Whoami => match ctx.current_user().await {
            Some(user) => println!("{} <{}> ({:?})", user.name, user.email, user.role),
            None => println!("Not signed in"),
        },
        Command::Outlets => {
            ctx.guard(Route::Dashboard).await?;
            let outlets = client.get_outlets().await?;
            let mut table = new_table(theme);
            table.set_header(vec!["ID", "Outlet", "LOB", "City"]);
            for o in outlets {
                table.add_row(vec![
                    Cell::new(o.id),
                    Cell::new(o.name),
                    Cell::new(o.lob.unwrap_or_default()),
                    Cell::new(o.city.unwrap_or_default()),
                ]);
            }
            println!("{table}");
        }
        Command::Daily { period } => {
            ctx.guard(Route::Dashboard).await?;
            let filter = filter_from(&period)?;
            ctx.set_filter(filter.clone());
            let mut dashboard =
                DashboardService::new(client.clone(), ctx.kpi().clone(), filter.clone());
            dashboard.apply_filter(filter).await?;
            let state = dashboard.state();

            let mut table = new_table(theme);
            table.set_header(vec![
                "Date", "F&B", "Cinema", "Total", "Audience", "Per Head", "DS", "Achv.",
            ]);
            for d in state.daily.iter().filter(|d| d.has_data) {
                table.add_row(vec![
                    Cell::new(d.date.format("%a %d %b")),
                    right(currency(d.fnb)),
                    right(currency(d.cinema)),
                    right(currency(d.total_sales)),
                    right(grouped(d.audience)),
                    right(currency(d.per_head_fnb)),
                    right(percent(d.avg_ds)),
                    right(percent(d.avg_achievement)),
                ]);
            }
            println!(
                "{} ({} of {} days with data)",
                state.filter.period_label(),
                state.summary.active_days,
                state.summary.days_in_period
            );
            println!("{table}");
            println!(
                "Total sales {}  |  F&B per head {}  |  avg DS {}",
                currency(state.summary.total_sales),
                currency(state.summary.per_head_fnb),
                percent(state.summary.avg_ds)
            );
        }
        Command::Ranking { period, lob } => {
            ctx.guard(Route::OutletPerformance).await?;
            let filter = filter_from(&period)?;
            let mut dashboard =
                DashboardService::new(client.clone(), ctx.kpi().clone(), filter.clone());
            dashboard.apply_filter(filter).await?;
            let state = dashboard.state();
            let outlets = match lob.as_deref() {
                Some(lob) => {
                    let rows: Vec<_> = filter_by_lob(&state.rows, lob)
                        .into_iter()
                        .cloned()
                        .collect();
                    aggregate_outlets(&rows, dashboard.kpi())
                }
                None => state.outlets.clone(),
            };

            let mut table = new_table(theme);
            table.set_header(vec![
                "#", "Outlet", "F&B", "Audience", "Per Head", "DS", "Achv.", "Status",
            ]);
            for (i, o) in outlets.iter().enumerate() {
                table.add_row(vec![
                    right(i + 1),
                    Cell::new(&o.outlet_name),
                    right(currency(o.total_fnb)),
                    right(grouped(o.total_audience)),
                    right(currency(o.avg_per_head)),
                    right(percent(o.avg_ds)),
                    right(percent(o.avg_achievement)),
                    status_cell(o.status, theme),
                ]);
            }
            println!("{}", state.filter.period_label());
            println!("{table}");
        }
        Command::Export {
            period,
            kind,
            output,
            rows_per_page,
            no_chart,
        } => {
            ctx.guard(Route::OutletPerformance).await?;
            let filter = filter_from(&period)?;
            let mut dashboard =
                DashboardService::new(client.clone(), ctx.kpi().clone(), filter.clone());
            dashboard.apply_filter(filter).await?;
            let state = dashboard.state();
            let options = ExportOptions {
                rows_per_page,
                chart: None,
                render_chart: !no_chart,
            };
            let label = state.filter.period_label();
            let kpi = dashboard.kpi();
            let (kind, bytes) = match kind {
                ExportKind::Outlets => (
                    ReportKind::OutletPerformance,
                    export::outlet_report(
                        &state.outlets,
                        &state.summary,
                        &label,
                        today(),
                        kpi,
                        &options,
                    )?,
                ),
                ExportKind::Daily => (
                    ReportKind::DailySales,
                    export::daily_report(
                        &state.daily,
                        &state.summary,
                        &label,
                        today(),
                        kpi,
                        &options,
                    )?,
                ),
            };
            let path = output.unwrap_or_else(|| {
                PathBuf::from(report_filename(kind, &state.filter.period_key(), today()))
            });
            export::save_report(&path, &bytes).await?;
            println!("Wrote {}", path.display());
        }
        Command::Users { action } => match action {
            UserAction::List => {
                ctx.guard(Route::Users).await?;
                let mut users = UserService::new(client.clone());
                users.refresh().await?;
                let mut table = new_table(theme);
                table.set_header(vec!["ID", "Name", "Email", "Role", "Created"]);
                for u in users.users() {
                    table.add_row(vec![
                        Cell::new(&u.id),
                        Cell::new(&u.name),
                        Cell::new(&u.email),
                        Cell::new(format!("{:?}", u.role)),
                        Cell::new(u.created_at.clone().unwrap_or_default()),
                    ]);
                }
                println!("{table}");
            }
            UserAction::Create {
                name,
                email,
                password,
                role,
            } => {
                ctx.guard(Route::UserCreate).await?;
                let form = UserForm {
                    name,
                    email,
                    password_confirmation: password.clone(),
                    password,
                    role,
                };
                let mut users = UserService::new(client.clone());
                let user = users.create(&form).await.map_err(report_submit_error)?;
                println!("Created user {} ({})", user.email, user.id);
            }
        },
        Command::Employees { action } => match action {
            EmployeeAction::List {
                search,
                status,
                outlet,
                page,
                per_page,
            } => {
                ctx.guard(Route::Employees).await?;
                let mut employees = EmployeeService::new(client.clone(), per_page);
                employees
                    .refresh(&EmployeeQuery {
                        search: None,
                        outlet_id: outlet,
                        status: None,
                    })
                    .await?;
                employees.search = search;
                employees.status = status;
                let page = employees.page(page);

                let mut table = new_table(theme);
                table.set_header(vec![
                    "ID",
                    "NIK",
                    "Name",
                    "Position",
                    "Outlet",
                    "Status",
                    "Contract End",
                ]);
                for e in &page.items {
                    table.add_row(vec![
                        Cell::new(&e.id),
                        Cell::new(&e.nik),
                        Cell::new(&e.name),
                        Cell::new(e.position.clone().unwrap_or_default()),
                        Cell::new(
                            e.outlet_name
                                .clone()
                                .or_else(|| e.outlet_id.clone())
                                .unwrap_or_default(),
                        ),
                        Cell::new(e.status.clone().unwrap_or_default()),
                        Cell::new(e.contract_end.clone().unwrap_or_default()),
                    ]);
                }
                println!("{table}");
                println!(
                    "Page {} of {} ({} employees)",
                    page.page, page.total_pages, page.total_items
                );
            }
            EmployeeAction::Show { id } => {
                ctx.guard(Route::EmployeeEdit).await?;
                let employee = client.get_employee(&id).await?;
                println!("{}", serde_json::to_string_pretty(&employee)?);
            }
            EmployeeAction::Create { fields } => {
                ctx.guard(Route::EmployeeCreate).await?;
                let form = fields.apply(EmployeeForm::default());
                let mut employees = EmployeeService::new(client.clone(), 10);
                let created = employees.create(&form).await.map_err(report_submit_error)?;
                println!("Created employee {} ({})", created.name, created.id);
            }
            EmployeeAction::Update { id, fields } => {
                ctx.guard(Route::EmployeeEdit).await?;
                let existing = client.get_employee(&id).await?;
                let form = fields.apply(EmployeeForm::from_employee(&existing));
                let mut employees = EmployeeService::new(client.clone(), 10);
                let updated = employees.update(&id, &form).await.map_err(report_submit_error)?;
                println!("Updated employee {} ({})", updated.name, updated.id);
            }
            EmployeeAction::Delete { id } => {
                ctx.guard(Route::EmployeeEdit).await?;
                let mut employees = EmployeeService::new(client.clone(), 10);
                employees.delete(&id).await?;
                println!("Deleted employee {id}");
            }
            EmployeeAction::Expiring { days } => {
                ctx.guard(Route::Employees).await?;
                let mut employees = EmployeeService::new(client.clone(), 10);
                employees.refresh(&EmployeeQuery::default()).await?;
                let mut table = new_table(theme);
                table.set_header(vec!["Name", "Position", "Contract End", "Days Left"]);
                for (e, end) in contracts_ending(employees.all(), today(), days) {
                    table.add_row(vec![
                        Cell::new(&e.name),
                        Cell::new(e.position.clone().unwrap_or_default()),
                        Cell::new(end),
                        right((end - today()).num_days()),
                    ]);
                }
                println!("{table}");
            }
            EmployeeAction::Schema => {
                println!("{}", serde_json::to_string_pretty(&payload_schema())?);
            }
        },
        Command::Theme => {
            println!("Active theme: {:?} (toggle with --dark)", ctx.theme());
        }
    }

    Ok(())
}
