// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use support_relay::app::{create_router, AppState, VERSION};
use support_relay::config::{ClientConfig, RelayConfig};
use support_relay::models::duration::DurationConfig;
use support_relay::models::request::{Section, ServiceType};
use support_relay::services::admin::{load_allowed_domains, AdminConsole};
use support_relay::services::form::{FeedbackMode, FormController, FormFields};
use support_relay::services::local_storage::LocalStorage;
use support_relay::services::logging::init_tracing;
use support_relay::services::relay_client::HttpRelayClient;
use support_relay::services::store::RestTableStore;
use tracing::info;

#[derive(Parser)]
#[command(name = "support-relay", version = VERSION, about = "Maintenance page support-request relay")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the `/send-email` relay server
    Serve {
        #[arg(long, env = "RELAY_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,
    },
    /// Submit a support request the way the maintenance page form does
    Submit(SubmitArgs),
    /// Edit the locally stored allow-list and maintenance duration
    Admin(AdminArgs),
}

#[derive(Args)]
struct SubmitArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    company: String,
    #[arg(long, default_value = "Hosting", value_parser = parse_service_type)]
    service_type: ServiceType,
    #[arg(long, default_value = "Support", value_parser = parse_section)]
    section: Section,
    #[arg(long, default_value = "")]
    domain: String,
    #[arg(long)]
    message: String,
    /// Token obtained from the Turnstile widget
    #[arg(long, env = "CAPTCHA_TOKEN")]
    captcha_token: Option<String>,
}

#[derive(Args)]
struct AdminArgs {
    /// Admin password; required for edits
    #[arg(long, env = "ADMIN_PASSWORD")]
    password: Option<String>,
    #[command(subcommand)]
    action: AdminAction,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Show the allow-list and duration
    Show,
    AddDomain { domain: String },
    RemoveDomain { domain: String },
    SetDuration {
        #[arg(long, default_value_t = 0)]
        days: u32,
        #[arg(long, default_value_t = 0)]
        hours: u32,
        #[arg(long, default_value_t = 0)]
        minutes: u32,
        #[arg(long, default_value_t = 0)]
        seconds: u32,
    },
}

fn parse_service_type(s: &str) -> Result<ServiceType, String> {
    ServiceType::parse(s).ok_or_else(|| format!("unknown service type: {s}"))
}

fn parse_section(s: &str) -> Result<Section, String> {
    Section::parse(s).ok_or_else(|| format!("unknown section: {s}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    match Cli::parse().command {
        Command::Serve { bind } => serve(bind).await,
        Command::Submit(args) => submit(args).await,
        Command::Admin(args) => admin(args),
    }
}

async fn serve(bind: SocketAddr) -> Result<()> {
    let config = RelayConfig::from_env()?;
    let app = create_router(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;

    info!("support-relay v{} listening on {}", VERSION, bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn submit(args: SubmitArgs) -> Result<()> {
    let config = ClientConfig::from_env()?;
    let mut storage = LocalStorage::open(&config.local_storage_path)?;
    let allowed = load_allowed_domains(&mut storage)?;

    let client = reqwest::Client::new();
    let store = RestTableStore::new(
        client.clone(),
        &config.datastore_url,
        config.datastore_key.clone(),
        &config.submissions_table,
    )?;
    let relay = HttpRelayClient::new(client, &config.relay_url, Some(config.datastore_key))?;

    let mut form = FormController::new(store, relay, allowed, FeedbackMode::Modal);
    form.fields = FormFields {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        company_name: args.company,
        service_type: args.service_type,
        section: args.section,
        related_domain: args.domain,
        message: args.message,
    };
    if let Some(token) = args.captcha_token {
        form.set_captcha_token(token);
    }

    let request_id = form.submit().await?;
    println!("Request submitted. Your ticket ID is {request_id}");
    Ok(())
}

fn admin(args: AdminArgs) -> Result<()> {
    let config = ClientConfig::from_env()?;
    let storage = LocalStorage::open(&config.local_storage_path)?;
    let mut console = AdminConsole::load(storage, config.admin_credentials)?;

    if let AdminAction::Show = args.action {
        let duration = console.duration();
        println!("Allowed domains: {}", console.domains().domains().join(", "));
        println!(
            "Maintenance duration: {}d {}h {}m {}s",
            duration.days, duration.hours, duration.minutes, duration.seconds
        );
        match duration.target_from(Utc::now()) {
            Some(target) => println!("Countdown from now ends at {}", target.to_rfc2822()),
            None => println!("Countdown target is out of range; set a shorter duration"),
        }
        return Ok(());
    }

    let password = args
        .password
        .context("--password (or ADMIN_PASSWORD) is required for edits")?;
    console.login(&password)?;

    match args.action {
        AdminAction::Show => {}
        AdminAction::AddDomain { domain } => {
            console.add_domain(&domain)?;
            println!("Added {}", domain.trim().to_lowercase());
        }
        AdminAction::RemoveDomain { domain } => {
            console.remove_domain(&domain)?;
            println!("Removed {}", domain.trim().to_lowercase());
        }
        AdminAction::SetDuration {
            days,
            hours,
            minutes,
            seconds,
        } => {
            console.set_duration(DurationConfig {
                days,
                hours,
                minutes,
                seconds,
            })?;
            println!("Maintenance duration set to {days}d {hours}h {minutes}m {seconds}s");
        }
    }

    console.logout();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
