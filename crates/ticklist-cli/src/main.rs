mod cli;
mod config;
mod drafts;
mod overview;
mod prompt;
mod storage;
mod tasks;

use std::io::{self, Write};
use std::path::Path;

use crate::cli::{Command, ConfigCommand};
use clap::Parser;
use color_eyre::Result;
use serde_json::Value;
use ticklist_core::storage::CollectionStore;
use ticklist_storage::JsonFileStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Entry point wiring the CLI to the task manager.
fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let file_config = config::load()?;
    let config = file_config.with_data_dir(cli.data_dir);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command.unwrap_or(Command::Overview) {
        Command::Overview => overview::show(&storage::open_manager(&config)?, &mut out)?,
        Command::Stats { json } => overview::stats(&storage::open_manager(&config)?, &mut out, json)?,
        Command::Task(cmd) => {
            let mut repo = storage::open_manager(&config)?;
            tasks::handle(cmd, &mut repo, &mut out)?;
            warn_if_unsaved(&repo);
        }
        Command::Draft(cmd) => {
            let mut repo = storage::open_manager(&config)?;
            drafts::handle(cmd, &mut repo, &mut out)?;
            warn_if_unsaved(&repo);
        }
        Command::Version => print_version(&mut out)?,
        Command::Health => run_health_check(&config, &mut out)?,
        Command::Config(ConfigCommand::Init) => {
            init_config(&file_config, &config::default_path()?, &mut out)?
        }
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to warn so command output stays clean.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn warn_if_unsaved(repo: &storage::FileTaskManager) {
    if repo.has_unsaved_changes() {
        eprintln!("warning: changes could not be written to disk; see the log above");
    }
}

fn print_version(out: &mut impl Write) -> Result<()> {
    writeln!(out, "ticklist {}", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}

/// Loads both collections and round-trips a probe file in the data directory.
fn run_health_check(config: &config::Config, out: &mut impl Write) -> Result<()> {
    let repo = storage::open_manager(config)?;
    writeln!(
        out,
        "Tasks:   {} ({} loaded)",
        config.tasks_path()?.display(),
        repo.list_tasks().len()
    )?;
    writeln!(
        out,
        "Drafts:  {} ({} loaded)",
        config.drafts_path()?.display(),
        repo.list_drafts().len()
    )?;
    run_store_health(&config.data_dir()?)?;
    writeln!(out, "Storage: ok")?;
    Ok(())
}

fn run_store_health(data_dir: &Path) -> Result<()> {
    let probe_path = data_dir.join(".health-probe.json");
    let store: JsonFileStore<Value> = JsonFileStore::new(&probe_path);
    let payload = vec![Value::String("ok".into())];
    store.save(&payload)?;
    let round_trip = store.load();
    std::fs::remove_file(&probe_path)?;

    if round_trip != payload {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    Ok(())
}

/// Writes the on-disk config, without command-line overrides, to `path`.
fn init_config(file_config: &config::Config, path: &Path, out: &mut impl Write) -> Result<()> {
    let path = config::write_if_missing(file_config, path)?;
    writeln!(out, "Config initialized at {}", path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_with_temp_dir_succeeds() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_store_health(dir.path()).expect("health check should succeed");
        assert!(!dir.path().join(".health-probe.json").exists());
    }

    #[test]
    fn health_check_reports_collection_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config::Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..config::Config::default()
        };
        let mut out = Vec::new();
        run_health_check(&config, &mut out).expect("health check");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("todos.json (0 loaded)"));
        assert!(text.contains("drafts.json (0 loaded)"));
        assert!(text.ends_with("Storage: ok\n"));
    }

    #[test]
    fn health_check_fails_when_data_dir_is_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("occupied");
        std::fs::write(&file, "x").expect("seed");
        assert!(run_store_health(&file).is_err());
    }

    #[test]
    fn config_init_ignores_data_dir_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let file_config = config::load_from_path(&path).expect("load");
        let run_config = file_config.with_data_dir(Some(dir.path().join("scratch")));
        assert!(run_config.data_dir.is_some());

        let mut out = Vec::new();
        init_config(&file_config, &path, &mut out).expect("init");
        let written = config::load_from_path(&path).expect("reload");
        assert_eq!(written.data_dir, None);
        assert!(String::from_utf8(out).unwrap().starts_with("Config initialized at "));
    }

    #[test]
    fn prints_version() {
        let mut out = Vec::new();
        print_version(&mut out).expect("version");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("ticklist {}\n", env!("CARGO_PKG_VERSION"))
        );
    }
}
