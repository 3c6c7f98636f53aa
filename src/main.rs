//! Bulletin Console
//!
//! Command line entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::{pin_mut, StreamExt};
use serde::Serialize;
use tracing::{error, info};

use bulletin_console::{
    config::Settings,
    grid::BulletinGrid,
    models::{ContentType, Department, LogAction, LogFilter, LoginCredentials, PageParams, UserData},
    permissions::{require_permission, Permission, RolePermissions},
    queries::Queries,
    services::Services,
    shell,
    utils::{helpers::{create_pagination_info, role_label, truncate_text}, logging},
};

#[derive(Debug, Parser)]
#[command(name = "bulletin-console", version, about = "Bulletin administration console")]
struct Cli {
    /// Configuration file name (extension optional)
    #[arg(long, global = true, default_value = "config")]
    config: String,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "BULLETIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List bulletins
    Bulletins {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one bulletin with its rows
    Bulletin { id: String },
    /// List organizations
    Organizations,
    /// List departments
    Departments,
    /// List users
    Users {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List classificators
    Classificators,
    /// Submission statistics per organization
    Monitoring,
    /// Activity log
    Logs {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Actor user id
        #[arg(long)]
        user: Option<String>,
        /// Audited model, e.g. `Journal` or `RowValue`
        #[arg(long)]
        content_type: Option<String>,
        /// One of get, post, update, delete, login, logout
        #[arg(long)]
        action: Option<String>,
    },
    /// Sections available to the signed-in user
    Nav,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_file(&cli.config).context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    let table = RolePermissions::from_config(&settings.permissions)?;
    let services = Services::from_settings(&settings).await?;
    let queries = Queries::new(services.clone(), &settings.cache);

    if let Err(e) = run(cli.command, cli.json, &services, &queries, &table).await {
        error!(error = %e, "Command failed");
        return Err(e);
    }
    Ok(())
}

async fn run(
    command: Command,
    json: bool,
    services: &Services,
    queries: &Queries,
    table: &RolePermissions,
) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let response = services.auth.login(&LoginCredentials { username, password }).await?;
            info!(username = %response.user_data.username, "Logged in");
            println!(
                "Signed in as {} ({})",
                response.user_data.full_name(),
                role_label(&response.user_data.role)
            );
        }
        Command::Logout => {
            services.auth.logout().await?;
            println!("Signed out");
        }
        Command::Whoami => match services.auth.current_user().await? {
            Some(user) if json => print_json(&user)?,
            Some(user) => println!("{} <{}> {}", user.full_name(), user.username, role_label(&user.role)),
            None => println!("Not signed in"),
        },
        Command::Bulletins { page } => {
            require(services, table, Permission::ViewJournals).await?;
            let bulletins = queries.bulletins(&PageParams::page(page)).await?;
            if json {
                return print_json(&bulletins);
            }
            for bulletin in &bulletins.results {
                println!("{:>6}  {}", bulletin.id, truncate_text(&bulletin.name, 60));
            }
            let pages = bulletins.count.div_ceil(10).max(1) as u32;
            println!("{}", create_pagination_info(page, pages, bulletins.count));
        }
        Command::Bulletin { id } => {
            require(services, table, Permission::ViewJournalDetail).await?;
            let bulletin = queries.bulletin_detail(&id).await?;
            if json {
                return print_json(&bulletin);
            }
            let mut grid = BulletinGrid::new(&bulletin);
            for classificator_id in grid.classificator_ids() {
                if let Ok(classificator) = queries.classificator_detail(&classificator_id).await {
                    grid.set_classificator(classificator);
                }
            }

            println!("{}", bulletin.name);
            let header: Vec<&str> = grid.columns().iter().map(|c| c.name.as_str()).collect();
            println!("{}", header.join(" | "));
            for row in grid.rows() {
                let cells: Vec<String> = grid
                    .columns()
                    .iter()
                    .map(|column| grid.display_value(row.id(), &column.id))
                    .collect();
                println!("{}", cells.join(" | "));
            }
        }
        Command::Organizations => {
            require(services, table, Permission::ViewOrganizations).await?;
            let organizations = queries.organizations(&PageParams::all()).await?;
            if json {
                return print_json(&organizations);
            }
            for organization in &organizations.results {
                let kind = organization.org_type.map(|t| t.to_string()).unwrap_or_default();
                println!("{:>6}  {:<16} {}", organization.id, kind, organization.name);
            }
        }
        Command::Departments => {
            require(services, table, Permission::ViewDepartments).await?;
            let stream = services
                .client
                .stream_all::<Department>("/secondary-organizations/all/", Vec::new());
            pin_mut!(stream);
            let mut departments = Vec::new();
            while let Some(department) = stream.next().await {
                departments.push(department?);
            }
            if json {
                return print_json(&departments);
            }
            for department in &departments {
                println!(
                    "{:>6}  {} ({})",
                    department.id,
                    department.name,
                    department.organization.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Users { page } => {
            require(services, table, Permission::ViewUsers).await?;
            let users = queries.users(&PageParams::page(page)).await?;
            if json {
                return print_json(&users);
            }
            for user in &users.results {
                println!("{:>6}  {:<20} {:<30} {}", user.id, user.username, user.full_name(), role_label(&user.role));
            }
        }
        Command::Classificators => {
            require(services, table, Permission::ViewClassificators).await?;
            let classificators = queries.classificators(&PageParams::all()).await?;
            if json {
                return print_json(&classificators);
            }
            for classificator in &classificators.results {
                println!("{:>6}  {} ({} elements)", classificator.id, classificator.name, classificator.elements.len());
            }
        }
        Command::Monitoring => {
            require(services, table, Permission::ViewDashboard).await?;
            let monitoring = queries.monitoring(&PageParams::all()).await?;
            if json {
                return print_json(&monitoring);
            }
            let total = &monitoring.results.total_stats;
            println!(
                "Total: {}  on time {} ({:.1}%)  late {} ({:.1}%)  missed {} ({:.1}%)",
                total.total_count,
                total.on_time_count,
                total.on_time_percentage,
                total.late_count,
                total.late_percentage,
                total.missed_count,
                total.missed_percentage
            );
            for organization in &monitoring.results.organizations {
                let stats = &organization.stats;
                println!(
                    "{:>6}  {:<40} {:>4} {:>4} {:>4}",
                    organization.id,
                    truncate_text(&organization.name, 40),
                    stats.on_time_count,
                    stats.late_count,
                    stats.missed_count
                );
            }
        }
        Command::Logs { page, user, content_type, action } => {
            require(services, table, Permission::ViewDashboard).await?;
            let filter = LogFilter {
                page: Some(page),
                user,
                content_type: content_type
                    .map(|name| ContentType::parse(&name).with_context(|| format!("unknown content type: {}", name)))
                    .transpose()?,
                action: action
                    .map(|name| LogAction::parse(&name).with_context(|| format!("unknown action: {}", name)))
                    .transpose()?,
            };
            let logs = queries.logs(&filter).await?;
            if json {
                return print_json(&logs);
            }
            for item in &logs.results {
                println!(
                    "{:<25} {:<25} {:<8} {:<20} {}",
                    item.created,
                    truncate_text(&item.actor(), 25),
                    item.action,
                    item.content_label(),
                    truncate_text(item.description.as_deref().unwrap_or_default(), 60)
                );
            }
        }
        Command::Nav => {
            let user = services.auth.current_user().await?;
            for entry in shell::navigation(table, user.as_ref()) {
                println!("{:<20} {}", entry.label, entry.path);
            }
        }
    }
    Ok(())
}

async fn require(services: &Services, table: &RolePermissions, permission: Permission) -> anyhow::Result<UserData> {
    let user = services.auth.current_user().await?;
    require_permission(table, user.as_ref(), permission)?;
    user.context("not signed in")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
