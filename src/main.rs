//! CLI entry point for `dispatchmail`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use dispatchmail::config::{self, Config};
use dispatchmail::import::{self, batch, sync};
use dispatchmail::model::status::StatusUpdate;
use dispatchmail::model::work_order::WorkOrderDraft;
use dispatchmail::notify;
use dispatchmail::parser::{dispatch, eml, status, ParseOptions};

#[derive(Parser)]
#[command(
    name = "dispatchmail",
    version,
    about = "Turn CBRE dispatch and status-update emails into work-order records"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse dispatch emails into work-order drafts
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Interpret status-update emails filed under a label
    Status {
        #[arg(short, long)]
        label: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Import every dispatch email in a directory
    Import {
        dir: PathBuf,
        /// File with already-stored work-order numbers, one per line
        #[arg(long)]
        existing: Option<PathBuf>,
        /// Lift the automatic-import batch limit
        #[arg(long)]
        manual: bool,
        /// Write the report as JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Interpret status emails stored as <DIR>/<label>/*.eml
    Sync {
        dir: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List recognized status labels
    Labels,
    /// Write the default configuration file
    Config {
        #[arg(long)]
        init: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Parse { files, json } => cmd_parse(&files, json, &config),
        Commands::Status { label, files, json } => cmd_status(&label, &files, json),
        Commands::Import {
            dir,
            existing,
            manual,
            output,
        } => cmd_import(&dir, existing.as_deref(), manual, output.as_deref(), &config),
        Commands::Sync { dir, json } => cmd_sync(&dir, json),
        Commands::Labels => cmd_labels(),
        Commands::Config { init } => cmd_config(init, &config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "dispatchmail.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

fn parse_options(config: &Config) -> ParseOptions {
    ParseOptions::from_config(&config.parse, chrono::Utc::now())
}

/// Parse dispatch emails and print the drafts.
fn cmd_parse(files: &[PathBuf], json: bool, config: &Config) -> anyhow::Result<()> {
    let options = parse_options(config);
    let mut drafts = Vec::new();

    for path in files {
        let email = eml::read_eml(path)?;
        match dispatch::parse_email(&email, &options) {
            Ok(draft) => drafts.push(draft),
            Err(rejection) => eprintln!("  {}: skipped ({rejection})", path.display()),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&drafts)?);
    } else {
        for draft in &drafts {
            print_draft(draft);
        }
    }
    Ok(())
}

/// Interpret status emails under one label.
fn cmd_status(label: &str, files: &[PathBuf], json: bool) -> anyhow::Result<()> {
    if status::rule_for(label).is_none() {
        anyhow::bail!("Unknown label '{label}'. Run `dispatchmail labels` for the list.");
    }

    let emails = files
        .iter()
        .map(eml::read_eml)
        .collect::<Result<Vec<_>, _>>()?;
    let report = sync::sync_statuses(emails.iter().map(|e| (label, e)));

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_sync_report(&report);
    }
    Ok(())
}

/// Import all dispatch emails in a directory.
fn cmd_import(
    dir: &Path,
    existing: Option<&Path>,
    manual: bool,
    output: Option<&Path>,
    config: &Config,
) -> anyhow::Result<()> {
    let known = match existing {
        Some(path) => read_existing(path)?,
        None => HashSet::new(),
    };

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Reading [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );
    let emails = import::load_dir(dir, &|done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    })?;
    pb.finish_and_clear();

    let options = parse_options(config);
    let report = batch::import_batch(&emails, &known, &options, &config.import, manual);

    match output {
        Some(path) => {
            batch::write_report(&report, path)?;
            println!("  Report written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    eprintln!();
    eprintln!("  {:<12} {}", "Imported", report.imported);
    eprintln!("  {:<12} {}", "Duplicates", report.duplicates);
    eprintln!("  {:<12} {}", "Skipped", report.skipped);
    if !report.drafts.is_empty() {
        eprintln!();
        eprintln!("  {}", notify::import_subject(&report.drafts));
        for line in notify::import_lines(&report.drafts) {
            eprintln!("    {line}");
        }
    }
    eprintln!();

    if !report.success {
        anyhow::bail!("{}", report.message);
    }
    Ok(())
}

/// Interpret every `<dir>/<label>/*.eml`.
fn cmd_sync(dir: &Path, json: bool) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {}", dir.display());
    }

    let mut labeled: Vec<(String, dispatchmail::model::email::RawEmail)> = Vec::new();
    let mut subdirs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    subdirs.sort();

    for sub in subdirs {
        let label = sub
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if status::rule_for(&label).is_none() {
            tracing::info!(label = %label, "Ignoring directory with unknown label");
            continue;
        }
        for email in import::load_dir(&sub, &|_, _| {})? {
            labeled.push((label.clone(), email));
        }
    }

    let report = sync::sync_statuses(labeled.iter().map(|(l, e)| (l.as_str(), e)));

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_sync_report(&report);
    }
    Ok(())
}

fn cmd_labels() -> anyhow::Result<()> {
    println!();
    println!("  {:<18} {:<18} {:<8} Amount", "Label", "Status", "Notify");
    println!("  {}", "-".repeat(60));
    for rule in status::LABEL_RULES {
        let amount = match rule.amount {
            Some(kind) => serde_json::to_value(kind)?
                .as_str()
                .unwrap_or_default()
                .to_string(),
            None => "-".to_string(),
        };
        println!(
            "  {:<18} {:<18} {:<8} {}",
            rule.label,
            rule.status.as_str(),
            if rule.notify { "yes" } else { "no" },
            amount
        );
    }
    println!();
    Ok(())
}

fn cmd_config(init: bool, config: &Config) -> anyhow::Result<()> {
    if init {
        let path = config::save_config(&Config::default())?;
        println!("  Wrote default configuration to {}", path.display());
    } else {
        print!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "dispatchmail", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Stored work-order numbers, one per line; blank lines ignored.
fn read_existing(path: &Path) -> anyhow::Result<HashSet<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Print a draft as a human-readable block.
fn print_draft(draft: &WorkOrderDraft) {
    println!();
    println!("  {:<14} {}", "Work order", draft.wo_number);
    if draft.is_pm {
        println!("  {:<14} preventive maintenance", "Kind");
    }
    println!("  {:<14} {}", "Priority", draft.priority);
    println!(
        "  {:<14} {}",
        "Entered",
        draft.date_entered.format("%Y-%m-%d %H:%M UTC")
    );
    println!("  {:<14} {}", "Building", draft.building);
    println!("  {:<14} {}", "Address", draft.address);
    if !draft.city.is_empty() {
        println!("  {:<14} {}, {}", "City", draft.city, draft.state);
    }
    println!(
        "  {:<14} {} {}",
        "Requestor", draft.requestor, draft.requestor_phone
    );
    println!("  {:<14} {:.2}", "NTE", draft.nte);
    let description: String = draft.description.chars().take(120).collect();
    println!("  {:<14} {}", "Description", description);
    println!();
}

/// Print a sync report as a table.
fn print_sync_report(report: &sync::SyncReport) {
    println!();
    println!(
        "  {} email(s) processed, {} update(s)",
        report.processed,
        report.updates.len()
    );
    println!();
    if !report.updates.is_empty() {
        println!(
            "  {:<12} {:<18} {:>12} {:<6}",
            "WO", "Status", "Amount", "Notify"
        );
        println!("  {}", "-".repeat(52));
        for update in &report.updates {
            print_update_row(update);
        }
        println!();
    }
    for error in &report.errors {
        println!("  ! {error}");
    }
}

fn print_update_row(update: &StatusUpdate) {
    let amount = update
        .extracted_amount
        .map(|a| format!("{a:.2}"))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {:<12} {:<18} {:>12} {:<6}",
        update.wo_number,
        update.new_status.as_str(),
        amount,
        if update.should_notify() { "yes" } else { "no" }
    );
}
