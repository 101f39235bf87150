use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use eyre::{Context as _, Result};
use serde::Deserialize;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};

static CONFIG: OnceLock<Config> = OnceLock::new();

static DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const DEFAULT_BASE_URL: &str = "https://trackmania.io/api";
const DEFAULT_PAGE_LIMIT: usize = 100;
const DEFAULT_CACHE_PATH: &str = "cached.yml";
const DEFAULT_RACE_PLAYERS: [&str; 2] = ["jmal", "sampleses"];

#[derive(Debug)]
pub struct Config {
    /// Display name mapped to the provider's player id
    pub players: BTreeMap<String, String>,
    pub api: ApiConfig,
    pub plot: PlotSettings,
    pub cache_path: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug)]
pub struct ApiConfig {
    pub base_url: Box<str>,
    pub user_agent: Box<str>,
    /// Maximum amount of pages requested per player
    pub page_limit: usize,
}

#[derive(Debug)]
pub struct PlotSettings {
    /// Trophies earned before this point are ignored by the categorized chart
    pub start_date: OffsetDateTime,
    pub race_players: [String; 2],
}

impl Config {
    pub fn get() -> &'static Self {
        CONFIG.get().expect("CONFIG not yet initialized")
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).context("invalid TOML")?;

        ensure!(!file.players.is_empty(), "`players` must not be empty");

        let categorized = file
            .plot_settings
            .categorized
            .ok_or_else(|| eyre!("missing `plot_settings.categorized` section"))?;

        let start_date = parse_start_date(&categorized.start_date)?;

        let race_players = match file.plot_settings.race {
            Some(race) => race.players.into(),
            None => DEFAULT_RACE_PLAYERS.map(str::to_owned),
        };

        let page_limit = file.api.page_limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        ensure!(page_limit > 0, "`api.page_limit` must be positive");

        Ok(Self {
            players: file.players.into_iter().collect(),
            api: ApiConfig {
                base_url: file.api.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL).into(),
                user_agent: file
                    .api
                    .user_agent
                    .as_deref()
                    .unwrap_or(DEFAULT_USER_AGENT)
                    .into(),
                page_limit,
            },
            plot: PlotSettings {
                start_date,
                race_players,
            },
            cache_path: file
                .cache
                .path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
            output_dir: file.output.directory.unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(base_url) = env_var("TROPHY_API_BASE_URL")? {
            self.api.base_url = base_url;
        }

        if let Some(user_agent) = env_var("TROPHY_USER_AGENT")? {
            self.api.user_agent = user_agent;
        }

        if let Some(page_limit) = env_var::<usize>("TROPHY_PAGE_LIMIT")? {
            ensure!(page_limit > 0, "env variable `TROPHY_PAGE_LIMIT` must be positive");
            self.api.page_limit = page_limit;
        }

        Ok(())
    }
}

pub fn init(path: &Path) -> Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        debug!("no .env file loaded: {err}");
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file `{}`", path.display()))?;

    let mut config = Config::from_toml(&content)
        .with_context(|| format!("failed to parse config file `{}`", path.display()))?;

    config.apply_env_overrides()?;

    CONFIG
        .set(config)
        .map_err(|_| eyre!("`Config::init` has already been called"))
}

fn parse_start_date(value: &toml::Value) -> Result<OffsetDateTime> {
    let s = match value {
        toml::Value::String(s) => s.to_owned(),
        toml::Value::Datetime(datetime) => datetime.to_string(),
        other => bail!("`plot_settings.categorized.start_date` must be a date, got `{other}`"),
    };

    if let Ok(datetime) = OffsetDateTime::parse(&s, &Rfc3339) {
        return Ok(datetime);
    }

    Date::parse(&s, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_utc())
        .with_context(|| {
            format!(
                "failed to parse `plot_settings.categorized.start_date=\"{s}\"`; \
                expected `YYYY-MM-DD` or an RFC 3339 datetime"
            )
        })
}

#[derive(Deserialize)]
struct ConfigFile {
    players: Vec<(String, String)>,
    #[serde(default)]
    plot_settings: PlotSettingsFile,
    #[serde(default)]
    api: ApiFile,
    #[serde(default)]
    cache: CacheFile,
    #[serde(default)]
    output: OutputFile,
}

#[derive(Default, Deserialize)]
struct PlotSettingsFile {
    categorized: Option<CategorizedFile>,
    race: Option<RaceFile>,
}

#[derive(Deserialize)]
struct CategorizedFile {
    start_date: toml::Value,
}

#[derive(Deserialize)]
struct RaceFile {
    players: (String, String),
}

#[derive(Default, Deserialize)]
struct ApiFile {
    base_url: Option<String>,
    user_agent: Option<String>,
    page_limit: Option<usize>,
}

#[derive(Default, Deserialize)]
struct CacheFile {
    path: Option<PathBuf>,
}

#[derive(Default, Deserialize)]
struct OutputFile {
    directory: Option<PathBuf>,
}

trait EnvKind: Sized {
    const EXPECTED: &'static str;

    fn from_str(s: String) -> Result<Self, String>;
}

macro_rules! env_kind {
    ($($ty:ty: $arg:ident => $impl:block,)*) => {
        $(
            impl EnvKind for $ty {
                const EXPECTED: &'static str = stringify!($ty);

                fn from_str($arg: String) -> Result<Self, String> {
                    $impl
                }
            }
        )*
    };
}

env_kind! {
    Box<str>: s => { Ok(s.into_boxed_str()) },
    usize: s => { s.trim().parse().map_err(|_| s) },
}

/// Reads an optional env variable, failing only if it's present but invalid.
fn env_var<T: EnvKind>(name: &'static str) -> Result<Option<T>> {
    let Ok(value) = env::var(name) else {
        return Ok(None);
    };

    T::from_str(value).map(Some).map_err(|value| {
        eyre!(
            "failed to parse env variable `{name}={value}`; expected {expected}",
            expected = T::EXPECTED
        )
    })
}
