//! Command parsing and the command implementations.

use std::io::{self, Write};

use anyhow::{anyhow, bail, Result};

use talentdesk_core::auth::{guard, navigation, GuardDecision, Route, SessionManager};
use talentdesk_core::dashboard::StatsLoader;
use talentdesk_core::models::{DashboardStats, JobQuery, RegisterForm, Role};
use talentdesk_core::Config;

pub const USAGE: &str = "\
Usage: talentdesk <command> [args]

Commands:
  login [email]      Sign in (prompts for the password)
  register           Create an applicant or recruiter account
  whoami             Show the signed-in account
  logout             Sign out and forget the stored session
  jobs [search]      List open jobs, optionally filtered by a search term
  dashboard          Show dashboard statistics and recent activity
  routes [path...]   Show which routes the current session may open
  help               Show this message

Environment:
  TALENTDESK_API_URL  Backend base URL (overrides the config file)
  RUST_LOG            Log filter, e.g. RUST_LOG=talentdesk_core=debug";

/// Minimum password length accepted by the registration form.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Recent activity entries shown under the dashboard.
const ACTIVITY_LIMIT: u32 = 5;

/// Routes listed by `routes` when no path is given.
const DEFAULT_ROUTE_PATHS: &[&str] = &[
    "/",
    "/jobs",
    "/login",
    "/register",
    "/dashboard",
    "/profile",
    "/applications",
    "/applications/my-applications",
    "/interviews",
    "/jobs/my-jobs",
    "/jobs/create",
    "/analytics",
    "/chatbot",
    "/resume-parser",
    "/users",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: Option<String> },
    Register,
    Whoami,
    Logout,
    Jobs { search: Option<String> },
    Dashboard,
    Routes { paths: Vec<String> },
    Help,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };
        let joined = || {
            let text = rest.join(" ");
            (!text.trim().is_empty()).then(|| text.trim().to_string())
        };

        match name.as_str() {
            "login" => Ok(Command::Login {
                email: rest.first().cloned(),
            }),
            "register" => Ok(Command::Register),
            "whoami" => Ok(Command::Whoami),
            "logout" => Ok(Command::Logout),
            "jobs" => Ok(Command::Jobs { search: joined() }),
            "dashboard" => Ok(Command::Dashboard),
            "routes" => Ok(Command::Routes {
                paths: rest.to_vec(),
            }),
            "help" | "-h" | "--help" => Ok(Command::Help),
            other => Err(anyhow!("Unknown command: {}", other)),
        }
    }
}

pub async fn run(command: Command, manager: &SessionManager, config: &mut Config) -> Result<()> {
    match command {
        Command::Login { email } => login(manager, config, email).await,
        Command::Register => register(manager, config).await,
        Command::Whoami => {
            whoami(manager);
            Ok(())
        }
        Command::Logout => {
            manager.logout().await;
            println!("Signed out.");
            Ok(())
        }
        Command::Jobs { search } => jobs(manager, search).await,
        Command::Dashboard => dashboard(manager).await,
        Command::Routes { paths } => routes(manager, &paths),
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
    }
}

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(default) => print!("{} [{}]: ", label, default),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    match (input.is_empty(), default) {
        (true, Some(default)) => Ok(default.to_string()),
        _ => Ok(input.to_string()),
    }
}

fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(format!("{}: ", label))?;
    Ok(password)
}

async fn login(manager: &SessionManager, config: &mut Config, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt("Email", config.last_email.as_deref())?,
    };
    let password = prompt_password("Password")?;
    if email.is_empty() || password.is_empty() {
        bail!("Email and password required");
    }

    let session = manager.login(&email, &password).await;
    if !session.is_authenticated() {
        bail!("{}", session.last_error().unwrap_or("Login failed"));
    }

    config.last_email = Some(email);
    config.save()?;
    if let Some(user) = session.current_user() {
        println!("Signed in as {} ({}).", user.display_name(), user.role.display_name());
    }
    Ok(())
}

async fn register(manager: &SessionManager, config: &mut Config) -> Result<()> {
    let first_name = prompt("First name", None)?;
    let last_name = prompt("Last name", None)?;
    let email = prompt("Email", None)?;
    let role: Role = prompt("Role (applicant/recruiter)", Some("applicant"))?
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let password = prompt_password("Password")?;
    let confirm = prompt_password("Confirm password")?;

    if first_name.is_empty() || last_name.is_empty() || email.is_empty() {
        bail!("Name and email are required");
    }
    if password != confirm {
        bail!("Passwords do not match");
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        bail!("Password must be at least {} characters", MIN_PASSWORD_LENGTH);
    }

    let form = RegisterForm::new(first_name, last_name, email.clone(), password, role);
    let session = manager.register(&form).await;
    if !session.is_authenticated() {
        bail!("{}", session.last_error().unwrap_or("Registration failed"));
    }

    config.last_email = Some(email);
    config.save()?;
    if let Some(user) = session.current_user() {
        println!("Welcome, {}! Registered as {}.", user.display_name(), user.role.display_name());
    }
    Ok(())
}

fn whoami(manager: &SessionManager) {
    let session = manager.session().snapshot();
    match session.current_user() {
        Some(user) if session.is_authenticated() => {
            println!("{} <{}>", user.display_name(), user.email);
            println!("Role: {}", user.role.display_name());
        }
        _ => println!("Not signed in."),
    }
}

async fn jobs(manager: &SessionManager, search: Option<String>) -> Result<()> {
    let query = JobQuery {
        search,
        ..Default::default()
    };
    let page = manager.api().jobs(&query).await?;
    if !page.success {
        bail!("{}", page.message.as_deref().unwrap_or("Failed to fetch jobs"));
    }

    if page.data.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }
    for job in &page.data {
        let company = if job.company.name.is_empty() {
            "Unknown company"
        } else {
            job.company.name.as_str()
        };
        println!("{}  {} | {} | {}", job.id, job.title, company, job.location.formatted());
    }
    if let Some(total) = page.pagination.total() {
        println!(
            "\nPage {} of {} ({} jobs)",
            page.pagination.current_page, page.pagination.total_pages, total
        );
    }
    Ok(())
}

async fn dashboard(manager: &SessionManager) -> Result<()> {
    let session = manager.session().snapshot();
    if guard(&session, &Route::Dashboard) != GuardDecision::Allow {
        bail!("Sign in to view the dashboard");
    }

    let loader = StatsLoader::new(manager.api().clone());
    let activity = loader.refresh_with_activity(Some(ACTIVITY_LIMIT)).await;
    let view = loader.view();

    if let Some(error) = view.error {
        bail!("{}", error);
    }
    if let Some(stats) = view.stats {
        print_stats(&stats);
    }

    if !activity.is_empty() {
        println!("\nRecent activity:");
        for entry in activity {
            let when = entry
                .timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  {:<16}  {}", when, entry.kind);
        }
    }
    Ok(())
}

fn print_stats(stats: &DashboardStats) {
    let overview = &stats.overview;
    let counts = [
        ("Total jobs", overview.total_jobs),
        ("Active jobs", overview.active_jobs),
        ("Applications", overview.total_applications),
        ("Pending applications", overview.pending_applications),
        ("Interviews", overview.total_interviews),
        ("Upcoming interviews", overview.upcoming_interviews),
        ("Users", overview.total_users),
        ("Recruiters", overview.total_recruiters),
        ("Applicants", overview.total_applicants),
    ];
    for (label, count) in counts {
        if let Some(count) = count {
            println!("{:<22}{}", label, count);
        }
    }

    if !stats.breakdown.applications_by_status.is_empty() {
        println!("\nApplications by status:");
        for (status, count) in &stats.breakdown.applications_by_status {
            println!("  {:<20}{}", status, count);
        }
    }
    if !stats.top_jobs.is_empty() {
        println!("\nTop jobs:");
        for job in &stats.top_jobs {
            println!("  {:<40}{} applications", job.title, job.application_count);
        }
    }
}

fn routes(manager: &SessionManager, paths: &[String]) -> Result<()> {
    let session = manager.session().snapshot();
    let paths: Vec<&str> = if paths.is_empty() {
        DEFAULT_ROUTE_PATHS.to_vec()
    } else {
        paths.iter().map(String::as_str).collect()
    };

    for path in paths {
        let Some(route) = Route::parse(path) else {
            println!("{:<32}unknown route", path);
            continue;
        };
        let decision = guard(&session, &route);
        match decision.redirect_path() {
            Some(target) => println!("{:<32}redirect to {}", route.path(), target),
            None => println!("{:<32}{:?}", route.path(), decision),
        }
    }

    println!("\nNavigation:");
    for item in navigation(&session) {
        println!("  {:<18}{}", item.label, item.route.path());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(&[]).expect("parse"), Command::Help);
        assert_eq!(
            Command::parse(&args(&["login", "ada@example.com"])).expect("parse"),
            Command::Login {
                email: Some("ada@example.com".to_string())
            }
        );
        assert_eq!(
            Command::parse(&args(&["jobs", "rust", "engineer"])).expect("parse"),
            Command::Jobs {
                search: Some("rust engineer".to_string())
            }
        );
        assert_eq!(
            Command::parse(&args(&["jobs"])).expect("parse"),
            Command::Jobs { search: None }
        );
        assert!(Command::parse(&args(&["deploy"])).is_err());
    }

    #[test]
    fn test_default_routes_all_parse() {
        for path in DEFAULT_ROUTE_PATHS {
            let route = Route::parse(path).expect("known route");
            assert_eq!(route.path(), *path);
        }
    }
}
