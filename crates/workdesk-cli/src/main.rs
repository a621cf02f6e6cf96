// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::{Config, PASSWORD_ENV, TOKEN_ENV};
use runtime::ApiRuntime;
use std::env;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;
use workdesk_api::Client;
use workdesk_app::{AppState, LocalClock, Role, Session};
use workdesk_tui::UiOptions;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Read while this is still the only thread.
    let clock = LocalClock::detect();
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `workdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    init_logging(&config)?;

    let client = Client::new(config.base_url(), config.timeout()?).with_context(|| {
        format!(
            "invalid [server] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;
    let session = resolve_session(&config, &client)?;
    info!(
        server = client.base_url(),
        role = session.role.as_str(),
        employee = session.employee_number,
        utc_offset = %clock.offset(),
        "session resolved"
    );

    if options.check_only {
        client
            .with_token(&session.token)
            .ping(&session)
            .context("backend check failed")?;
        println!("ok: {} accepted the session", config.base_url());
        return Ok(());
    }

    let mut state = AppState::for_role(session.role);
    let start_view = config.start_view();
    if state.views().contains(&start_view) {
        state.active_view = start_view;
    }

    let ui = UiOptions {
        refresh_interval: config.refresh_interval()?,
        clock,
    };
    let mut runtime = ApiRuntime::new(client, session);
    workdesk_tui::run_app(&mut state, &mut runtime, ui)
}

/// A token from config or the environment is used as-is; otherwise log in
/// with the configured employee number and `WORKDESK_PASSWORD`.
fn resolve_session(config: &Config, client: &Client) -> Result<Session> {
    let employee_number = config.employee_number();
    if let Some(token) = config.token() {
        let role = config.role();
        if role == Role::User && employee_number.is_none() {
            bail!("[auth].role = \"USER\" needs [auth].employee_number to find the user's tasks");
        }
        return Ok(Session {
            token,
            role,
            employee_number,
            name: String::new(),
        });
    }

    let Some(number) = employee_number else {
        bail!("no credentials: set {TOKEN_ENV}, [auth].token, or [auth].employee_number");
    };
    let password = env::var(PASSWORD_ENV)
        .map_err(|_| anyhow!("set {PASSWORD_ENV} to log in as employee {number}"))?;
    client
        .login(number, &password)
        .with_context(|| format!("log in as employee {number}"))
}

fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = EnvFilter::try_new(config.log_filter())
        .with_context(|| format!("invalid log filter {:?}", config.log_filter()))?;
    // The terminal belongs to the UI, so everything goes to the file.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("workdesk: terminal client for the workforce portal");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config, credentials and backend reachability");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args, resolve_session};
    use crate::config::Config;
    use anyhow::Result;
    use std::path::PathBuf;
    use std::time::Duration;
    use workdesk_api::Client;
    use workdesk_app::Role;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/workdesk-config.toml")
    }

    fn config_from(body: &str) -> Result<Config> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body)?;
        Config::load(&path)
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--demo"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn configured_token_builds_a_session_without_login() -> Result<()> {
        let _guard = crate::config::tests::env_lock();
        let config = config_from(
            "version = 1\n[auth]\ntoken = \"abc\"\nrole = \"USER\"\nemployee_number = 12\n",
        )?;
        let client = Client::new("http://127.0.0.1:1", Duration::from_millis(200))?;
        let session = resolve_session(&config, &client)?;
        assert_eq!(session.token, "abc");
        assert_eq!(session.role, Role::User);
        assert_eq!(session.employee_id().map(|id| id.to_string()), Some("0012".into()));
        Ok(())
    }

    #[test]
    fn user_token_without_employee_number_is_rejected() -> Result<()> {
        let _guard = crate::config::tests::env_lock();
        let config = config_from("version = 1\n[auth]\ntoken = \"abc\"\nrole = \"USER\"\n")?;
        let client = Client::new("http://127.0.0.1:1", Duration::from_millis(200))?;
        let error = resolve_session(&config, &client).expect_err("user needs a number");
        assert!(error.to_string().contains("employee_number"));
        Ok(())
    }

    #[test]
    fn missing_credentials_are_reported() -> Result<()> {
        let _guard = crate::config::tests::env_lock();
        let config = config_from("version = 1\n")?;
        let client = Client::new("http://127.0.0.1:1", Duration::from_millis(200))?;
        let error = resolve_session(&config, &client).expect_err("no credentials");
        assert!(error.to_string().contains("no credentials"));
        Ok(())
    }
}
