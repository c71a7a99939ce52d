//! Focusgate CLI
//!
//! CLI tool for checking URLs against a rule list and maintaining rule files
//! exported from extension storage.

mod rules_file;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, NaiveTime, Timelike};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use fg_core::{BlockDecision, EvalError, TimeOfDay};
use fg_rules::{validate_rules, RuleSet, StorageKey};

use rules_file::{read_document, read_rule_list, read_rules, rules_from_document, write_rules};

#[derive(Parser)]
#[command(name = "fg-cli")]
#[command(about = "Focusgate site blocking rule tools")]
struct Cli {
    /// Verbose logging (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a URL is blocked at a given time
    Check {
        /// Rules file (storage export or bare array)
        #[arg(short, long)]
        rules: PathBuf,

        /// URL being navigated to
        #[arg(short, long)]
        url: String,

        /// Local time as HH:MM (defaults to now)
        #[arg(short, long)]
        at: Option<String>,

        /// Storage key holding the rules
        #[arg(short, long, default_value = "focusRules")]
        key: StorageKey,
    },

    /// Report malformed or ineffective rules
    Validate {
        #[arg(short, long)]
        rules: PathBuf,

        #[arg(short, long, default_value = "focusRules")]
        key: StorageKey,
    },

    /// Print a summary of every rule
    List {
        #[arg(short, long)]
        rules: PathBuf,

        #[arg(short, long, default_value = "focusRules")]
        key: StorageKey,
    },

    /// Add a rule to a rules file
    Add {
        #[arg(short, long)]
        rules: PathBuf,

        /// Pattern(s) matched against hostname or full URL
        #[arg(short, long, required = true)]
        pattern: Vec<String>,

        #[arg(long, default_value = "09:00")]
        start: String,

        #[arg(long, default_value = "17:00")]
        end: String,

        #[arg(short, long, default_value = "focusRules")]
        key: StorageKey,
    },

    /// Increment a rule's blocked-navigation counter
    Record {
        #[arg(short, long)]
        rules: PathBuf,

        /// Rule id
        #[arg(short, long)]
        id: String,

        #[arg(short, long, default_value = "focusRules")]
        key: StorageKey,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { rules, url, at, key } => cmd_check(&rules, &url, at.as_deref(), key),
        Commands::Validate { rules, key } => cmd_validate(&rules, key),
        Commands::List { rules, key } => cmd_list(&rules, key),
        Commands::Add {
            rules,
            pattern,
            start,
            end,
            key,
        } => cmd_add(&rules, pattern, &start, &end, key),
        Commands::Record { rules, id, key } => cmd_record(&rules, &id, key),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn parse_at(at: Option<&str>) -> Result<NaiveTime, String> {
    let time = match at {
        Some(value) => value
            .parse::<TimeOfDay>()
            .map_err(|e| format!("Invalid --at '{}': {}", value, e))?,
        None => TimeOfDay::from_timelike(&Local::now()),
    };
    NaiveTime::from_hms_opt(time.hour() as u32, time.minute() as u32, 0)
        .ok_or_else(|| format!("Invalid time {}", time))
}

fn cmd_check(path: &Path, url: &str, at: Option<&str>, key: StorageKey) -> Result<(), String> {
    let rules = read_rules(path, key)?;
    let now = parse_at(at)?;

    if !rules.is_enabled() {
        println!("not blocked (focus mode off)");
        return Ok(());
    }

    match rules.check(url, &now) {
        Ok(BlockDecision::Blocked(id)) => println!("blocked by {} at {:02}:{:02}", id, now.hour(), now.minute()),
        Ok(BlockDecision::NotBlocked) => println!("not blocked at {:02}:{:02}", now.hour(), now.minute()),
        Err(EvalError::InvalidUrl(_)) => println!("not blocked (invalid url)"),
        Err(e) => return Err(e.to_string()),
    }

    Ok(())
}

fn cmd_validate(path: &Path, key: StorageKey) -> Result<(), String> {
    let rules = read_rule_list(path, key)?;

    let report = validate_rules(&rules);
    for issue in &report.issues {
        println!("  {:?}: {}", issue.kind.severity(), issue);
    }

    let errors = report.errors().count();
    let warnings = report.warnings().count();
    println!(
        "Checked {} rules in '{}': {} errors, {} warnings",
        rules.len(),
        path.display(),
        errors,
        warnings
    );

    if report.has_errors() {
        return Err(format!("{} rule(s) can never block", errors));
    }
    Ok(())
}

fn cmd_list(path: &Path, key: StorageKey) -> Result<(), String> {
    let rules = read_rules(path, key)?;

    println!("Rules in '{}' ({}):", path.display(), key);
    if !rules.is_enabled() {
        println!("  focus mode is off; no rule blocks");
    }
    for rule in rules.rules() {
        println!(
            "  [{}] {:<32} {}-{}  {:<8} blocked {}x",
            rule.id,
            rule.patterns.join(", "),
            rule.start_time,
            rule.end_time,
            if rule.is_active { "active" } else { "inactive" },
            rule.time_spent
        );
    }

    Ok(())
}

fn cmd_add(path: &Path, patterns: Vec<String>, start: &str, end: &str, key: StorageKey) -> Result<(), String> {
    let document = if path.exists() {
        read_document(path)?
    } else {
        RuleSet::new()
            .to_value(key)
            .map_err(|e| format!("Failed to encode rules: {}", e))?
    };
    let mut rules = rules_from_document(path, document.clone(), key)?;

    let now_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("System clock before epoch: {}", e))?
        .as_millis() as u64;

    let id = rules
        .add(patterns, start, end, now_millis)
        .map_err(|e| e.to_string())?;
    write_rules(path, document, &rules, key)?;

    println!("Added rule {}", id);
    Ok(())
}

fn cmd_record(path: &Path, id: &str, key: StorageKey) -> Result<(), String> {
    let document = read_document(path)?;
    let mut rules = rules_from_document(path, document.clone(), key)?;
    let count = rules.record_block(id).map_err(|e| e.to_string())?;
    write_rules(path, document, &rules, key)?;

    println!("Rule {} has blocked {} navigations", id, count);
    Ok(())
}
