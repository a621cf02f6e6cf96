// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use workdesk_app::{Role, ViewKind};

pub const APP_NAME: &str = "workdesk";
pub const CONFIG_PATH_ENV: &str = "WORKDESK_CONFIG_PATH";
pub const TOKEN_ENV: &str = "WORKDESK_TOKEN";
pub const PASSWORD_ENV: &str = "WORKDESK_PASSWORD";
pub const LOG_ENV: &str = "WORKDESK_LOG";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_REFRESH_INTERVAL: &str = "5m";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            auth: Auth::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Auth {
    pub token: Option<String>,
    pub employee_number: Option<i64>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub refresh_interval: Option<String>,
    pub start_view: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            refresh_interval: Some(DEFAULT_REFRESH_INTERVAL.to_owned()),
            start_view: Some(ViewKind::Dashboard.label().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [server], [auth], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let base_url = self.base_url();
        let parsed = Url::parse(base_url).with_context(|| {
            format!(
                "server.base_url in {} is not a valid URL: {base_url:?}",
                path.display()
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "server.base_url in {} must use http or https, got {:?}",
                path.display(),
                parsed.scheme()
            );
        }

        for (key, raw) in [
            ("server.timeout", self.server.timeout.as_deref()),
            ("ui.refresh_interval", self.ui.refresh_interval.as_deref()),
        ] {
            let Some(raw) = raw else {
                continue;
            };
            if parse_duration(raw)? <= Duration::ZERO {
                bail!("{key} in {} must be positive, got {raw}", path.display());
            }
        }

        if let Some(view) = &self.ui.start_view
            && ViewKind::parse(view).is_none()
        {
            bail!(
                "ui.start_view in {} names unknown view {view:?}; use one of: {}",
                path.display(),
                ViewKind::ALL
                    .iter()
                    .map(|view| view.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        if let Some(role) = &self.auth.role
            && Role::parse(role).is_none()
        {
            bail!(
                "auth.role in {} must be ADMIN or USER, got {role:?}",
                path.display()
            );
        }

        if let Some(number) = self.auth.employee_number
            && number <= 0
        {
            bail!(
                "auth.employee_number in {} must be positive, got {number}",
                path.display()
            );
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.server
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.server.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn refresh_interval(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .refresh_interval
                .as_deref()
                .unwrap_or(DEFAULT_REFRESH_INTERVAL),
        )
    }

    pub fn start_view(&self) -> ViewKind {
        self.ui
            .start_view
            .as_deref()
            .and_then(ViewKind::parse)
            .unwrap_or(ViewKind::Dashboard)
    }

    /// `WORKDESK_TOKEN` wins over `[auth].token`.
    pub fn token(&self) -> Option<String> {
        env::var(TOKEN_ENV)
            .ok()
            .or_else(|| self.auth.token.clone())
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty())
    }

    pub fn role(&self) -> Role {
        self.auth
            .role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or_default()
    }

    pub fn employee_number(&self) -> Option<i64> {
        self.auth.employee_number
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let root = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .ok_or_else(|| anyhow!("cannot resolve a log directory; set [log].path"))?;
        Ok(root.join(APP_NAME).join("workdesk.log"))
    }

    /// `WORKDESK_LOG` wins over `[log].level`.
    pub fn log_filter(&self) -> String {
        env::var(LOG_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.log.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned())
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# workdesk config\n# Place this file at: {}\n\nversion = 1\n\n[server]\nbase_url = \"{}\"\ntimeout = \"{}\"\n\n[auth]\n# Pre-issued token; {} overrides it.\n# token = \"...\"\n# Without a token, log in as this employee using {}.\n# employee_number = 1\n# Role behind a pre-issued token: ADMIN or USER.\n# role = \"USER\"\n\n[ui]\nrefresh_interval = \"{}\"\nstart_view = \"dashboard\"\n\n[log]\n# path = \"/absolute/path/workdesk.log\"\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            TOKEN_ENV,
            PASSWORD_ENV,
            DEFAULT_REFRESH_INTERVAL,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{Config, LOG_ENV, TOKEN_ENV, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;
    use workdesk_app::{Role, ViewKind};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.timeout()?, Duration::from_secs(10));
        assert_eq!(config.refresh_interval()?, Duration::from_secs(300));
        assert_eq!(config.start_view(), ViewKind::Dashboard);
        assert_eq!(config.role(), Role::User);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[server]\nbase_url = \"http://portal\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[server], [auth], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn full_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[server]\nbase_url = \"https://portal.example/\"\ntimeout = \"750ms\"\n[auth]\ntoken = \"abc\"\nemployee_number = 7\nrole = \"admin\"\n[ui]\nrefresh_interval = \"30s\"\nstart_view = \"my-tasks\"\n[log]\npath = \"/tmp/workdesk-test.log\"\nlevel = \"debug\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.base_url(), "https://portal.example");
        assert_eq!(config.timeout()?, Duration::from_millis(750));
        assert_eq!(config.refresh_interval()?, Duration::from_secs(30));
        assert_eq!(config.start_view(), ViewKind::MyTasks);
        assert_eq!(config.role(), Role::Admin);
        assert_eq!(config.employee_number(), Some(7));
        assert_eq!(config.log_path()?, PathBuf::from("/tmp/workdesk-test.log"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn base_url_must_be_http() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[server]\nbase_url = \"ftp://portal\"\n")?;
        let error = Config::load(&path).expect_err("ftp base url should fail");
        assert!(error.to_string().contains("must use http or https"));

        let (_temp, path) = write_config("version = 1\n[server]\nbase_url = \"not a url\"\n")?;
        let error = Config::load(&path).expect_err("garbage base url should fail");
        assert!(error.to_string().contains("not a valid URL"));
        Ok(())
    }

    #[test]
    fn durations_must_be_positive() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nrefresh_interval = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero interval should fail");
        let message = error.to_string();
        assert!(message.contains("ui.refresh_interval"));
        assert!(message.contains("must be positive"));
        Ok(())
    }

    #[test]
    fn unknown_start_view_and_role_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\nstart_view = \"inbox\"\n")?;
        let error = Config::load(&path).expect_err("unknown view should fail");
        assert!(error.to_string().contains("unknown view"));

        let (_temp, path) = write_config("version = 1\n[auth]\nrole = \"owner\"\n")?;
        let error = Config::load(&path).expect_err("unknown role should fail");
        assert!(error.to_string().contains("ADMIN or USER"));
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        let error = parse_duration("oops").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid duration"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(super::CONFIG_PATH_ENV, &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(super::CONFIG_PATH_ENV);
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn token_env_overrides_config_token() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[auth]\ntoken = \"from-config\"\n")?;
        let config = Config::load(&path)?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var(TOKEN_ENV);
        }
        assert_eq!(config.token().as_deref(), Some("from-config"));
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(TOKEN_ENV, "from-env");
        }
        let token = config.token();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(TOKEN_ENV);
        }
        assert_eq!(token.as_deref(), Some("from-env"));
        Ok(())
    }

    #[test]
    fn log_env_overrides_configured_level() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"warn\"\n")?;
        let config = Config::load(&path)?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(LOG_ENV, "workdesk_api=trace");
        }
        let filter = config.log_filter();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(LOG_ENV);
        }
        assert_eq!(filter, "workdesk_api=trace");
        assert_eq!(config.log_filter(), "warn");
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("[server]"));
        assert!(example.contains("[auth]"));
        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.start_view(), ViewKind::Dashboard);
        Ok(())
    }
}
