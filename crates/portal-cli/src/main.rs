use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::debug;
use portal_client::{
    connect, Config, FilePart, Notification, NotificationLevel, Notifier, RegistrationOutcome,
    SessionManager,
};
use portal_core::{CalculationRequest, DocumentQuery, DocumentStatus};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "insuredocs")]
#[command(about = "Command-line client for the InsureDocs document portal")]
#[command(version)]
struct Cli {
    /// Backend base address, overriding config and environment
    #[arg(long)]
    api_base: Option<String>,

    /// Re-check the stored session against the backend before running
    #[arg(long)]
    verify_session: bool,

    /// Enable debug mode
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        email: String,
        /// Prompted for on stdin when omitted; the prompt echoes input
        #[arg(long, env = "INSUREDOCS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        full_name: String,
        email: String,
        /// Prompted for on stdin when omitted; the prompt echoes input
        #[arg(long, env = "INSUREDOCS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Check that the backend is reachable
    Status,
    /// Work with uploaded documents
    #[command(subcommand)]
    Documents(DocumentCommands),
    /// Manage user accounts (administrator)
    #[command(subcommand)]
    Users(UserCommands),
    /// Run a calculation on the backend
    Calculate {
        /// sum, average, min or max
        operation: String,
        #[arg(required = true, allow_negative_numbers = true)]
        numbers: Vec<f64>,
    },
    /// Send a file through the backend's processing endpoint
    ProcessFile { path: PathBuf },
}

#[derive(Subcommand)]
enum DocumentCommands {
    /// List your documents
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<DocumentStatus>,
    },
    /// Show one document with its extracted metadata
    Show { id: i64 },
    /// Upload a PDF or image
    Upload { path: PathBuf },
    /// Delete a document (administrator)
    Delete { id: i64 },
    /// Change a document's status (administrator)
    SetStatus { id: i64, status: DocumentStatus },
    /// Dashboard counters
    Stats,
}

#[derive(Subcommand)]
enum UserCommands {
    /// List accounts
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
}

/// Prints notifications to stderr and counts the failures it has shown.
#[derive(Default)]
struct TerminalNotifier {
    errors_shown: AtomicUsize,
}

impl TerminalNotifier {
    fn errors_shown(&self) -> usize {
        self.errors_shown.load(Ordering::SeqCst)
    }

    /// Whether an error was shown after `mark` was taken.
    fn reported_since(&self, mark: usize) -> bool {
        self.errors_shown() > mark
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                self.errors_shown.fetch_add(1, Ordering::SeqCst);
                eprintln!("{}", format!("❌ {}", notification.message).red());
            }
            NotificationLevel::Success => {
                eprintln!("{}", format!("✅ {}", notification.message).green());
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = Config::new();
    if let Some(base) = cli.api_base.clone() {
        config.api_base = Some(base);
    }
    if cli.verify_session {
        config.verify_session = true;
    }

    if cli.debug {
        eprintln!("{}", "[DEBUG] Debug mode enabled".dimmed());
        eprintln!(
            "{}",
            format!("[DEBUG] Backend: {}", config.api_base_url()).dimmed()
        );
        eprintln!(
            "{}",
            format!("[DEBUG] Session dir: {}", config.session_dir().display()).dimmed()
        );
    }

    let notifier = Arc::new(TerminalNotifier::default());
    let manager = connect(&config, notifier.clone())?;
    manager.restore().await;

    // A failed verified restore is shown too; only failures from the command count.
    let mark = notifier.errors_shown();
    match run(&manager, notifier.as_ref(), cli.command).await {
        Ok(()) => Ok(()),
        // Already shown by the notifier.
        Err(e) if notifier.reported_since(mark) => {
            debug!("Command failed: {e:?}");
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}

async fn run(
    manager: &SessionManager,
    notifier: &TerminalNotifier,
    command: Commands,
) -> anyhow::Result<()> {
    let gateway = manager.gateway();

    match command {
        Commands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let session = manager.login(&email, &password).await?;
            notifier.success(&format!("Logged in as {} ({})", session.name, session.role));
        }
        Commands::Register {
            full_name,
            email,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let outcome = manager.register(&full_name, &email, &password).await?;
            notifier.success(&outcome.message());
            if outcome == RegistrationOutcome::LoginRequired {
                println!("{}", format!("Run `insuredocs login {email}` next.").dimmed());
            }
        }
        Commands::Logout => {
            manager.logout().await?;
            println!("{}", "👋 Logged out".cyan());
        }
        Commands::Whoami => match manager.session().await {
            Some(session) => print_json(&session)?,
            None => println!("{}", "Not logged in".yellow()),
        },
        Commands::Status => print_json(&gateway.backend_status().await?)?,
        Commands::Documents(command) => {
            require_login(manager).await?;
            run_documents(manager, command).await?;
        }
        Commands::Users(UserCommands::List { skip, limit }) => {
            require_admin(manager).await?;
            print_json(&gateway.list_users(skip, limit).await?)?;
        }
        Commands::Calculate { operation, numbers } => {
            require_login(manager).await?;
            let result = gateway
                .calculate(&CalculationRequest { numbers, operation })
                .await?;
            println!("{}", result.result);
        }
        Commands::ProcessFile { path } => {
            require_login(manager).await?;
            let file = FilePart::from_path(&path).await?;
            print_json(&gateway.process_file(file).await?)?;
        }
    }
    Ok(())
}

async fn run_documents(manager: &SessionManager, command: DocumentCommands) -> anyhow::Result<()> {
    let gateway = manager.gateway();

    match command {
        DocumentCommands::List {
            skip,
            limit,
            search,
            status,
        } => {
            let query = DocumentQuery {
                search_term: search,
                status,
                ..DocumentQuery::page(skip, limit)
            };
            let documents = gateway.list_documents(&query).await?;
            if documents.is_empty() {
                println!("{}", "No documents".dimmed());
            }
            for document in documents {
                let status = if document.status.is_failed()
                    || document.status == DocumentStatus::Rejected
                {
                    document.status.to_string().red()
                } else {
                    document.status.to_string().green()
                };
                println!(
                    "{:>6}  {:<40}  {:<22}  {}",
                    document.id,
                    document.original_filename,
                    status,
                    document.upload_date.format("%Y-%m-%d %H:%M")
                );
            }
        }
        DocumentCommands::Show { id } => print_json(&gateway.get_document(id).await?)?,
        DocumentCommands::Upload { path } => {
            let file = FilePart::from_path(&path).await?;
            println!("{}", format!("🚀 Uploading {}", file.file_name).cyan());
            let document = gateway.upload_document(file).await?;
            println!(
                "{}",
                format!("✅ Uploaded document {} ({})", document.id, document.status).green()
            );
        }
        DocumentCommands::Delete { id } => {
            require_admin(manager).await?;
            gateway.delete_document(id).await?;
            println!("{}", format!("🗑  Deleted document {id}").cyan());
        }
        DocumentCommands::SetStatus { id, status } => {
            require_admin(manager).await?;
            let document = gateway.update_document_status(id, status).await?;
            println!(
                "{}",
                format!("✅ Document {} is now {}", document.id, document.status).green()
            );
        }
        DocumentCommands::Stats => print_json(&gateway.dashboard_stats().await?)?,
    }
    Ok(())
}

async fn require_login(manager: &SessionManager) -> anyhow::Result<()> {
    if !manager.is_authenticated().await {
        bail!("Not logged in. Run `insuredocs login <email>` first.");
    }
    Ok(())
}

async fn require_admin(manager: &SessionManager) -> anyhow::Result<()> {
    require_login(manager).await?;
    if !manager.is_administrator().await {
        bail!("This command requires an administrator account.");
    }
    Ok(())
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("{}", "Password: ".green());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("failed to read password from stdin")?;
    let password = input.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("A password is required.");
    }
    Ok(password)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
