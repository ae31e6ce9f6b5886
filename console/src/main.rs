//! Command-line front end for the blood-bank admin console.
//!
//! Every command prints JSON lines on stdout; logs go to stderr.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use bloodbank_console::config::ConsoleSettings;
use bloodbank_console::domain::bootstrap::{BootstrapHalt, PageLifecycle, SessionBootstrapper};
use bloodbank_console::domain::list_view::{FacilityApprovals, ListViewModel, ViewOutcome};
use bloodbank_console::domain::records::{
    AdminResource, BLOOD_GROUP_FIELD, Donor, ELIGIBILITY_FIELD, FACILITY_TYPE_FIELD, Facility,
    STATUS_FIELD,
};
use bloodbank_console::domain::{
    AdminApi, Credential, CredentialStore, Error, Role, SessionContext,
};
use bloodbank_console::outbound::http::{HttpIdentity, ReqwestResourceFetcher};
use bloodbank_console::outbound::storage::FileTokenStorage;
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use serde::Serialize;
use serde_json::json;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `bloodbank-console` arguments.
#[derive(Debug, Parser)]
#[command(
    name = "bloodbank-console",
    about = "Admin console for the blood-bank backend",
    version
)]
struct Cli {
    /// Backend API base; overrides `BLOODBANK_API_BASE_URL`.
    #[arg(long = "api-base-url", value_name = "url", global = true)]
    api_base_url: Option<String>,
    /// Token storage directory; overrides `BLOODBANK_STORAGE_DIR`.
    #[arg(long = "storage-dir", value_name = "path", global = true)]
    storage_dir: Option<std::path::PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store a bearer token for later commands.
    Login {
        /// Token issued by the backend login endpoint.
        #[arg(long)]
        token: String,
    },
    /// Forget the stored token.
    Logout,
    /// Validate the session and print the profile.
    Whoami {
        /// Role the session must carry.
        #[arg(long, default_value = "admin")]
        role: String,
    },
    /// List donors.
    Donors {
        /// Free-text search over name, email and phone.
        #[arg(long, default_value = "")]
        search: String,
        /// Blood group, or `all`.
        #[arg(long = "blood-group", default_value = "all")]
        blood_group: String,
        /// Eligibility bucket.
        #[arg(long, default_value = "all", value_parser = ["eligible", "ineligible", "all"])]
        eligibility: String,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = DonorSort::Name)]
        sort: DonorSort,
        /// Sort descending.
        #[arg(long)]
        desc: bool,
    },
    /// List facilities.
    Facilities {
        /// Free-text search over name, email, phone and registration number.
        #[arg(long, default_value = "")]
        search: String,
        /// Review status.
        #[arg(
            long,
            default_value = "all",
            value_parser = ["pending", "approved", "rejected", "unknown", "all"]
        )]
        status: String,
        /// Facility type, or `all`.
        #[arg(long = "type", default_value = "all")]
        facility_type: String,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = FacilitySort::Name)]
        sort: FacilitySort,
        /// Sort descending.
        #[arg(long)]
        desc: bool,
    },
    /// List facilities awaiting review.
    Pending,
    /// Approve a pending facility.
    Approve {
        /// Facility identifier.
        id: String,
    },
    /// Reject a pending facility.
    Reject {
        /// Facility identifier.
        id: String,
        /// Reason shown to the facility.
        #[arg(long)]
        reason: String,
    },
    /// Print dashboard counters.
    Dashboard,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DonorSort {
    Name,
    Age,
    Donations,
}

impl DonorSort {
    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Age => "age",
            Self::Donations => "donations",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FacilitySort {
    Name,
    Type,
    #[value(name = "createdAt")]
    CreatedAt,
}

impl FacilitySort {
    fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Type => "type",
            Self::CreatedAt => "createdAt",
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let settings = ConsoleSettings::load_from_iter([OsString::from("bloodbank-console")])
        .map_err(|error| eyre!("load configuration: {error}"))?;
    init_tracing(settings.log_json);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(cli, settings))
}

fn init_tracing(json_output: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let result = if json_output {
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .try_init()
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init()
    };
    if let Err(error) = result {
        warn!(error = %error, "tracing init failed");
    }
}

async fn run(cli: Cli, settings: ConsoleSettings) -> Result<ExitCode> {
    let Cli {
        api_base_url,
        storage_dir,
        command,
    } = cli;
    let settings = ConsoleSettings {
        api_base_url: api_base_url.or(settings.api_base_url),
        storage_dir: storage_dir.or(settings.storage_dir),
        ..settings
    };

    let storage = Arc::new(FileTokenStorage::new(settings.storage_dir()));
    let credentials = CredentialStore::restore(storage);
    let identity = settings
        .user_agent()
        .map(|user_agent| HttpIdentity {
            user_agent: user_agent.to_owned(),
        })
        .unwrap_or_default();
    let fetcher = ReqwestResourceFetcher::with_identity(
        settings.api_base_url()?,
        settings.request_timeout(),
        identity,
    )
    .wrap_err("build HTTP client")?;
    let context = Arc::new(SessionContext::new(credentials, Arc::new(fetcher)));

    let lifecycle = PageLifecycle::new();
    let interrupt = lifecycle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; tearing down");
            interrupt.teardown();
        }
    });

    let mut bootstrapper =
        SessionBootstrapper::new(context.clone(), settings.retry_policy(), lifecycle.clone());
    let api = AdminApi::new(context.clone());
    let admin = Role::admin();

    match command {
        Command::Login { token } => {
            let credential =
                Credential::new(&token).map_err(|error| eyre!("invalid token: {error}"))?;
            context
                .credentials()
                .set(credential)
                .wrap_err("store token")?;
            emit(&json!({ "event": "login", "stored": true }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Logout => {
            context.logout();
            emit(&json!({ "event": "logout" }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Whoami { role } => {
            let role = Role::new(role).map_err(|error| eyre!("invalid role: {error}"))?;
            match bootstrapper.bootstrap(&role).await {
                Ok(profile) => {
                    emit(&profile)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(halt) => report_halt(&halt),
            }
        }
        Command::Donors {
            search,
            blood_group,
            eligibility,
            sort,
            desc,
        } => {
            let mut view: ListViewModel<Donor> = ListViewModel::new(api, lifecycle);
            view.set_search(search);
            view.set_category(BLOOD_GROUP_FIELD, &blood_group);
            view.set_category(ELIGIBILITY_FIELD, &eligibility);
            view.set_sort_key(sort.key());
            if desc {
                view.toggle_sort_direction();
            }
            match view.mount(&mut bootstrapper, &admin).await {
                Ok(ViewOutcome::Ready(_)) => {
                    emit_visible(&view)?;
                    emit(&json!({ "summary": view.summary() }))?;
                    Ok(ExitCode::SUCCESS)
                }
                Ok(outcome) => report_outcome(&outcome),
                Err(error) => report_error(&error),
            }
        }
        Command::Facilities {
            search,
            status,
            facility_type,
            sort,
            desc,
        } => {
            let mut view: ListViewModel<Facility> = ListViewModel::new(api, lifecycle);
            view.set_search(search);
            view.set_category(STATUS_FIELD, &status);
            view.set_category(FACILITY_TYPE_FIELD, &facility_type);
            view.set_sort_key(sort.key());
            if desc {
                view.toggle_sort_direction();
            }
            match view.mount(&mut bootstrapper, &admin).await {
                Ok(ViewOutcome::Ready(_)) => {
                    emit_visible(&view)?;
                    Ok(ExitCode::SUCCESS)
                }
                Ok(outcome) => report_outcome(&outcome),
                Err(error) => report_error(&error),
            }
        }
        Command::Pending => {
            let mut queue = FacilityApprovals::new(api, lifecycle);
            match queue.mount(&mut bootstrapper, &admin).await {
                Ok(ViewOutcome::Ready(_)) => {
                    emit_visible(queue.view())?;
                    Ok(ExitCode::SUCCESS)
                }
                Ok(outcome) => report_outcome(&outcome),
                Err(error) => report_error(&error),
            }
        }
        Command::Approve { id } => {
            if let Err(halt) = bootstrapper.bootstrap(&admin).await {
                return report_halt(&halt);
            }
            match api.approve_facility(&id).await {
                Ok(message) => {
                    emit(&json!({ "facility": id.trim(), "action": "approve", "message": message }))?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(error) => report_error(&error),
            }
        }
        Command::Reject { id, reason } => {
            if let Err(halt) = bootstrapper.bootstrap(&admin).await {
                return report_halt(&halt);
            }
            match api.reject_facility(&id, &reason).await {
                Ok(message) => {
                    emit(&json!({ "facility": id.trim(), "action": "reject", "message": message }))?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(error) => report_error(&error),
            }
        }
        Command::Dashboard => {
            if let Err(halt) = bootstrapper.bootstrap(&admin).await {
                return report_halt(&halt);
            }
            match api.dashboard().await {
                Ok(stats) => {
                    emit(&stats)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(error) => report_error(&error),
            }
        }
    }
}

fn emit_visible<R: AdminResource>(view: &ListViewModel<R>) -> Result<()> {
    for record in view.visible() {
        emit(record)?;
    }
    let (shown, total) = view.counts();
    emit(&json!({ "shown": shown, "total": total }))
}

fn emit<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let line = serde_json::to_string(value).wrap_err("serialise output")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{line}").wrap_err("write output")?;
    Ok(())
}

fn report_halt(halt: &BootstrapHalt) -> Result<ExitCode> {
    match halt {
        BootstrapHalt::Redirect { reason } => {
            emit(&json!({ "redirect": "login", "reason": reason.to_string() }))?;
            Ok(ExitCode::from(2))
        }
        BootstrapHalt::Cancelled => {
            emit(&json!({ "cancelled": true }))?;
            Ok(ExitCode::from(130))
        }
    }
}

fn report_outcome(outcome: &ViewOutcome) -> Result<ExitCode> {
    match outcome {
        ViewOutcome::Ready(_) => Ok(ExitCode::SUCCESS),
        ViewOutcome::RedirectToLogin => {
            emit(&json!({ "redirect": "login" }))?;
            Ok(ExitCode::from(2))
        }
        ViewOutcome::Cancelled => {
            emit(&json!({ "cancelled": true }))?;
            Ok(ExitCode::from(130))
        }
    }
}

fn report_error(error: &Error) -> Result<ExitCode> {
    emit(&json!({ "error": error }))?;
    if error.requires_login() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::FAILURE)
    }
}
