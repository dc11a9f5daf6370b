use anyhow::{Context, bail};
use log::LevelFilter;
use scoreboard_api::UserMode;
use serde_json::Value;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 300_000;

pub const ENV_URL: &str = "SCOREBOARD_URL";
pub const ENV_MODE: &str = "SCOREBOARD_MODE";
pub const ENV_CHART_OPTIONS: &str = "SCOREBOARD_CHART_OPTIONS";
pub const ENV_INTERVAL_MS: &str = "SCOREBOARD_INTERVAL_MS";
pub const ENV_SESSION: &str = "SCOREBOARD_SESSION";
pub const ENV_LOG: &str = "SCOREBOARD_LOG";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub base_url: String,
    pub mode: UserMode,
    /// Merged over every generated chart option.
    pub chart_overrides: Option<Value>,
    pub update_interval: Duration,
    pub session: Option<String>,
    pub full_screen: bool,
    pub log_level: LevelFilter,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            mode: UserMode::Users,
            chart_overrides: None,
            update_interval: Duration::from_millis(DEFAULT_UPDATE_INTERVAL_MS),
            session: None,
            full_screen: false,
            log_level: LevelFilter::Error,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, PartialEq)]
pub enum CliCommand {
    Help,
    Version,
    Run(CliArgs),
}

#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub base_url: Option<String>,
    pub mode: Option<UserMode>,
    pub chart_options: Option<PathBuf>,
    pub interval_ms: Option<String>,
    pub log_level: Option<String>,
}

impl CliCommand {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(CliCommand::Help),
                "-V" | "--version" => return Ok(CliCommand::Version),
                "--teams" => parsed.mode = Some(UserMode::Teams),
                "--users" => parsed.mode = Some(UserMode::Users),
                "--chart-options" => parsed.chart_options = Some(value_for(&arg, args.next())?.into()),
                "--interval" => parsed.interval_ms = Some(value_for(&arg, args.next())?),
                "--log-level" => parsed.log_level = Some(value_for(&arg, args.next())?),
                flag if flag.starts_with('-') => return Err(format!("Unknown argument: {flag}")),
                url => {
                    if parsed.base_url.is_some() {
                        return Err(format!("Unexpected extra argument: {url}"));
                    }
                    parsed.base_url = Some(url.to_string());
                }
            }
        }

        Ok(CliCommand::Run(parsed))
    }
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, String> {
    value
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| format!("{flag} needs a value"))
}

impl AppSettings {
    /// Resolve settings from the command line first, then `env`.
    ///
    /// Any invalid value is an error: the scoreboard does not start half
    /// configured.
    pub fn resolve(cli: CliArgs, env: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let mut settings = AppSettings::default();

        let Some(base_url) = cli.base_url.or_else(|| env(ENV_URL)) else {
            bail!("no scoreboard URL given (pass it as an argument or set {ENV_URL})");
        };
        let parsed = url::Url::parse(&base_url).with_context(|| format!("invalid scoreboard URL '{base_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("scoreboard URL must be http or https, got '{base_url}'");
        }
        settings.base_url = base_url.trim_end_matches('/').to_string();

        settings.mode = match (cli.mode, env(ENV_MODE)) {
            (Some(mode), _) => mode,
            (None, Some(raw)) => UserMode::from_str(&raw).map_err(anyhow::Error::msg)?,
            (None, None) => UserMode::default(),
        };

        if let Some(path) = cli.chart_options.or_else(|| env(ENV_CHART_OPTIONS).map(PathBuf::from)) {
            settings.chart_overrides = Some(load_chart_overrides(&path)?);
        }

        if let Some(raw) = cli.interval_ms.or_else(|| env(ENV_INTERVAL_MS)) {
            settings.update_interval = parse_interval(&raw)?;
        }

        settings.session = env(ENV_SESSION);

        if let Some(raw) = cli.log_level.or_else(|| env(ENV_LOG)) {
            settings.log_level = LevelFilter::from_str(raw.trim())
                .map_err(|_| anyhow::anyhow!("invalid log level '{raw}'"))?;
        }

        Ok(settings)
    }
}

fn parse_interval(raw: &str) -> anyhow::Result<Duration> {
    let ms: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid update interval '{raw}' (milliseconds)"))?;
    if ms == 0 {
        bail!("update interval must be greater than zero");
    }
    Ok(Duration::from_millis(ms))
}

pub fn load_chart_overrides(path: &std::path::Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("could not read chart options {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("invalid chart options json at {}", path.display()))?;
    if !value.is_object() {
        bail!("chart options in {} must be a JSON object", path.display());
    }
    Ok(value)
}
