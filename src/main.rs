mod analytics;
mod api;
mod auth;
mod bookmarks;
mod config;
mod db;
mod directory;
mod feedback;
mod filter;
mod models;
mod profile;
mod tui;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use api::DirectoryClient;
use bookmarks::BookmarkStore;
use config::Config;
use db::Database;
use directory::Directory;
use filter::DirectoryView;
use models::Employee;

#[derive(Parser)]
#[command(name = "staffdeck")]
#[command(about = "HR directory - browse, filter, and bookmark employees")]
struct Cli {
    /// Base URL of the employee API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Number of employees to fetch
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Employees per page
    #[arg(long, global = true)]
    page_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with the demo account
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List employees
    List {
        /// Case-insensitive match on name, email, or department
        #[arg(short, long)]
        search: Option<String>,

        /// Only these departments (repeatable, exact match)
        #[arg(short, long)]
        department: Vec<String>,

        /// Only these ratings, 1-5 (repeatable)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Vec<u8>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: usize,
    },

    /// Show an employee profile
    Show {
        /// Employee ID
        id: i64,
    },

    /// Bookmark an employee, or remove the bookmark if already set
    Bookmark {
        /// Employee ID
        id: i64,
    },

    /// List bookmarked employees
    Bookmarks,

    /// List departments
    Departments,

    /// Show the analytics dashboard
    Analytics,

    /// Send feedback
    Feedback {
        text: String,
    },

    /// Browse employees interactively
    Browse,
}

fn load_directory(client: &DirectoryClient, config: &Config) -> Result<Directory> {
    let employees = client
        .fetch_employees(config.fetch_limit)
        .context("Failed to load employees")?;
    let mut directory = Directory::new();
    directory.initialize(employees)?;
    Ok(directory)
}

fn print_employee_table(employees: &[&Employee], bookmarks: &BookmarkStore) {
    println!(
        "{:<6} {:<2} {:<24} {:<32} {:<20} {:<6}",
        "ID", "", "NAME", "EMAIL", "DEPARTMENT", "RATING"
    );
    println!("{}", "-".repeat(94));
    for employee in employees {
        let marker = if bookmarks.is_bookmarked(employee.id) { "+" } else { "" };
        println!(
            "{:<6} {:<2} {:<24} {:<32} {:<20} {:<6}",
            employee.id,
            marker,
            truncate(&employee.full_name(), 22),
            truncate(&employee.email, 30),
            truncate(&employee.department, 18),
            profile::stars(employee.rating())
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::from_env().with_overrides(cli.api_url, cli.limit, cli.page_size);
    let db = Database::open(&config.db_path)?;
    log::debug!("Using database at {}", db.path().display());

    let client = DirectoryClient::new(&config.api_url)?;

    match cli.command {
        Commands::Login { email, password } => {
            let session = auth::login(&db, &email, &password)?;
            println!(
                "Signed in as {} <{}> until {}",
                session.name,
                session.email,
                session.expires_at.format("%Y-%m-%d")
            );
        }

        Commands::Logout => {
            auth::logout(&db)?;
            println!("Signed out.");
        }

        Commands::Whoami => {
            let session = auth::require_session(&db)?;
            println!("{} <{}>", session.name, session.email);
            println!("Session expires: {}", session.expires_at.format("%Y-%m-%d %H:%M"));
        }

        Commands::List {
            search,
            department,
            rating,
            page,
        } => {
            auth::require_session(&db)?;
            let directory = load_directory(&client, &config)?;
            let bookmarks = BookmarkStore::hydrate(&db);

            let mut view = DirectoryView::new(config.page_size);
            if let Some(search) = search {
                view.set_search(search);
            }
            for d in &department {
                view.toggle_department(d);
            }
            for r in rating {
                view.toggle_rating(r);
            }
            view.go_to_page(page, directory.list());

            let filtered = view.filtered(directory.list()).len();
            let current = view.current_page(directory.list());
            if directory.is_empty() {
                println!("No employees available.");
            } else if current.is_empty() {
                println!("No employees found. Try adjusting your search or filter criteria.");
            } else {
                print_employee_table(&current, &bookmarks);
                println!(
                    "\n{} of {} employees | page {} of {}",
                    filtered,
                    directory.len(),
                    view.pager().current(),
                    view.pager().total_pages(filtered)
                );
            }
        }

        Commands::Show { id } => {
            auth::require_session(&db)?;
            let employee = client
                .fetch_employee(id)
                .with_context(|| format!("Failed to load employee #{}", id))?;
            let bookmarked = BookmarkStore::hydrate(&db).is_bookmarked(id);
            let card = profile::build_profile(employee, &mut rand::thread_rng());
            let e = &card.employee;

            println!("{} (#{}){}", e.full_name(), e.id, if bookmarked { " [bookmarked]" } else { "" });
            if let Some(title) = &e.title {
                println!("Title: {}", title);
            }
            println!("Email: {}", e.email);
            println!("Department: {}", e.department);
            if let Some(phone) = &e.phone {
                println!("Phone: {}", phone);
            }
            if let Some(age) = e.age {
                println!("Age: {}", age);
            }
            println!("Rating: {} ({}/5)", profile::stars(e.rating()), e.rating());
            println!(
                "Performance: {} ({})",
                profile::stars(card.performance_rating),
                profile::performance_badge(card.performance_rating)
            );

            println!("\n--- Bio ---");
            println!("{}", textwrap::fill(&card.bio, 78));

            println!("\n--- Performance History ---");
            for q in &card.history {
                println!("  {:<8} {}  {}", q.period, profile::stars(q.rating), q.achievement);
            }

            println!("\n--- Projects ---");
            for p in &card.projects {
                println!("  {:<36} {:<12} {:>3}%", p.name, p.status, p.completion);
            }

            println!("\n--- Feedback ---");
            for f in &card.feedback {
                println!("  {} ({}):", f.source, profile::stars(f.rating));
                for line in textwrap::fill(f.content, 72).lines() {
                    println!("    {}", line);
                }
            }
        }

        Commands::Bookmark { id } => {
            auth::require_session(&db)?;
            let mut bookmarks = BookmarkStore::hydrate(&db);
            let (employee, now_bookmarked) = bookmarks.toggle_id(id, |id| {
                let directory = load_directory(&client, &config)?;
                match directory.get(id) {
                    Some(e) => Ok(e.clone()),
                    None => client
                        .fetch_employee(id)
                        .map_err(|e| anyhow!("Employee #{} not found: {}", id, e)),
                }
            })?;
            if now_bookmarked {
                println!("Bookmarked #{} {}.", employee.id, employee.full_name());
            } else {
                println!("Removed bookmark for #{} {}.", employee.id, employee.full_name());
            }
        }

        Commands::Bookmarks => {
            auth::require_session(&db)?;
            let bookmarks = BookmarkStore::hydrate(&db);
            if bookmarks.is_empty() {
                println!("No bookmarks yet.");
            } else {
                let entries: Vec<&Employee> = bookmarks.list().iter().collect();
                print_employee_table(&entries, &bookmarks);
                println!("\n{} bookmarked", bookmarks.len());
            }
        }

        Commands::Departments => {
            auth::require_session(&db)?;
            let directory = load_directory(&client, &config)?;
            let departments = directory.departments();
            if departments.is_empty() {
                println!("No departments available.");
            }
            for d in departments {
                let count = directory.list().iter().filter(|e| e.department == d).count();
                println!("{:<24} {:>3}", d, count);
            }
        }

        Commands::Analytics => {
            auth::require_session(&db)?;
            let directory = load_directory(&client, &config)?;
            let summary = analytics::summarize(directory.list());

            println!("Total employees:  {}", summary.total_employees);
            println!("Average rating:   {:.1}", summary.average_rating);
            println!("Total bookmarks:  {}", summary.total_bookmarks);
            println!(
                "Top department:   {}",
                summary.top_department.as_deref().unwrap_or("-")
            );

            println!("\n--- Department Performance (avg rating) ---");
            let rows: Vec<(String, f64)> = summary
                .departments
                .iter()
                .map(|d| (format!("{} ({})", d.department, d.headcount), d.average_rating))
                .collect();
            for line in analytics::bar_chart(&rows, 30) {
                println!("{}", line);
            }

            println!("\n--- Bookmark Distribution ---");
            let weekly: Vec<(&str, f64)> = analytics::WEEKLY_BOOKMARKS
                .iter()
                .map(|(label, n)| (*label, *n as f64))
                .collect();
            for line in analytics::bar_chart(&weekly, 30) {
                println!("{}", line);
            }

            println!("\n--- Bookmark Trends ---");
            let monthly: Vec<(&str, f64)> = analytics::MONTHLY_BOOKMARKS
                .iter()
                .map(|(label, n)| (*label, *n as f64))
                .collect();
            for line in analytics::bar_chart(&monthly, 30) {
                println!("{}", line);
            }
        }

        Commands::Feedback { text } => {
            auth::require_session(&db)?;
            let received = feedback::submit(&text)?;
            println!("Thank you for your feedback!");
            println!("  \"{}\"", received);
        }

        Commands::Browse => {
            auth::require_session(&db)?;
            let bookmarks = BookmarkStore::hydrate(&db);
            tui::run_browse(&client, config.fetch_limit, bookmarks, config.page_size)?;
        }
    }

    Ok(())
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
