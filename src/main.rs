// SPDX-License-Identifier: PMPL-1.0-or-later
//! Auditbot CLI - accessibility and design-system audits for Figma frames

use anyhow::Context;
use auditbot::api::{self, AppState};
use auditbot::config::Config;
use auditbot::design_system::validate_design_system_url;
use auditbot::report::{self, generate_report, OutputFormat};
use auditbot::scanner::{self, FrameAudit};
use auditbot::{AuditRequest, AuditService, AuditType, WcagLevel};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// WCAG accessibility and design-system auditor for Figma frames
#[derive(Parser)]
#[command(name = "auditbot")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a frame export or a directory of exports
    Audit {
        /// Frame JSON file or directory
        path: PathBuf,

        /// Which audits to run
        #[arg(long = "type", default_value = "accessibility")]
        audit_type: AuditTypeArg,

        /// WCAG conformance level (defaults to team or config setting)
        #[arg(long)]
        level: Option<WcagLevelArg>,

        /// Team whose configuration applies
        #[arg(long)]
        team: Option<String>,

        /// Configuration file
        #[arg(long, default_value = "auditbot.toml")]
        config: String,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Validate a design-system documentation URL
    CheckUrl {
        url: String,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },

    /// Start the HTTP API
    Serve {
        /// Configuration file
        #[arg(long, default_value = "auditbot.toml")]
        config: String,

        /// Enable verbose logging
        #[arg(long, short)]
        verbose: bool,
    },
}

/// Audit type CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AuditTypeArg {
    Accessibility,
    DesignSystem,
    Both,
}

impl From<AuditTypeArg> for AuditType {
    fn from(arg: AuditTypeArg) -> Self {
        match arg {
            AuditTypeArg::Accessibility => AuditType::Accessibility,
            AuditTypeArg::DesignSystem => AuditType::DesignSystem,
            AuditTypeArg::Both => AuditType::Both,
        }
    }
}

/// WCAG conformance level CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum WcagLevelArg {
    /// Level A - minimum
    A,
    /// Level AA - standard
    Aa,
    /// Level AAA - enhanced
    Aaa,
}

impl From<WcagLevelArg> for WcagLevel {
    fn from(arg: WcagLevelArg) -> Self {
        match arg {
            WcagLevelArg::A => WcagLevel::A,
            WcagLevelArg::Aa => WcagLevel::AA,
            WcagLevelArg::Aaa => WcagLevel::AAA,
        }
    }
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "auditbot=debug" } else { "auditbot=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Audit {
            path,
            audit_type,
            level,
            team,
            config,
            format,
            output,
            verbose,
        } => {
            init_logging(verbose);
            let config = Config::load(&config)?;
            let service = AuditService::from_config(&config)?;

            let frames = scanner::collect_frames(&path, config.audit.max_depth)
                .with_context(|| format!("failed to read frames from {}", path.display()))?;

            let mut audits = Vec::with_capacity(frames.len());
            for source in frames {
                let request = AuditRequest {
                    audit_type: Some(AuditType::from(audit_type).to_string()),
                    frame_data: Some(source.frame),
                    team_id: team.clone(),
                    user_id: None,
                    custom_rules: Vec::new(),
                    wcag_level: level.map(WcagLevel::from),
                };
                let envelope = service.run(&request).await?;
                audits.push(FrameAudit {
                    path: source.path,
                    envelope,
                });
            }

            let rendered = generate_report(&audits, format.into());
            write_output(&rendered, output.as_deref())?;

            if report::has_errors(&audits) {
                std::process::exit(1);
            }
        }

        Commands::CheckUrl { url, verbose } => {
            init_logging(verbose);
            match validate_design_system_url(&url) {
                Ok(validation) => {
                    println!("Valid design system URL: {}", url);
                    if let Some(warning) = validation.warning() {
                        println!("Warning: {}", warning);
                    }
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Serve { config, verbose } => {
            init_logging(verbose);
            let config = Config::load(&config)?;
            let state = AppState {
                service: AuditService::from_config(&config)?,
            };
            let app = api::router(state);

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);

            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
