use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::riot_api::RoutingRegion;
use crate::schema::AttributeSchema;

pub const DEFAULT_OUTPUT: &str = "all_matches_data.xlsx";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "lol_match_export",
    about = "Exports a League of Legends player's match history to a spreadsheet",
    long_about = "Resolves a Riot ID to its PUUID, pages through the player's match history \
    and writes one row per participant per match to an .xlsx workbook"
)]
pub struct Args {
    /// Riot ID game name, the part before '#'
    #[arg(short, long, env = "GAME_NAME")]
    pub game_name: String,

    /// Riot ID tag line, the part after '#'
    #[arg(short, long, env = "TAG_LINE")]
    pub tag_line: String,

    /// Regional routing cluster that serves the account and match endpoints
    #[arg(short, long, env = "RIOT_ROUTING_REGION", value_enum, default_value_t = RoutingRegion::Europe)]
    pub region: RoutingRegion,

    #[arg(long, env = "RIOT_API_KEY", hide_env_values = true, help = "Riot developer api key")]
    pub api_key: Option<String>,

    #[arg(short, long, default_value = DEFAULT_OUTPUT, help = "Workbook to write")]
    pub output: PathBuf,

    /// Stop collecting match ids once this many are known
    #[arg(long)]
    pub max_matches: Option<usize>,

    /// Only list matches of this queue id (420 = ranked solo/duo)
    #[arg(long)]
    pub queue: Option<u32>,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, help = "Per-request timeout in seconds")]
    pub timeout_secs: u64,

    /// Comma separated attribute list. `challenges.<name>` reads from the
    /// participant's challenges object, `info.<name>` from the match info.
    #[arg(long, env = "MATCH_EXPORT_ATTRIBUTES")]
    pub attributes: Option<String>,

    /// Log filter: a bare level or any `tracing` directive such as
    /// `lol_match_export=debug,reqwest=warn`
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        help = "Sets the logging verbosity"
    )]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerId {
    pub game_name: String,
    pub tag_line: String,
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.game_name, self.tag_line)
    }
}

#[derive(Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub region: RoutingRegion,
    pub timeout: Duration,
    pub queue: Option<u32>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &mask_key(&self.api_key))
            .field("region", &self.region)
            .field("timeout", &self.timeout)
            .field("queue", &self.queue)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub player: PlayerId,
    pub api: ApiConfig,
    pub output: PathBuf,
    pub max_matches: Option<usize>,
    pub schema: AttributeSchema,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let api_key = args
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow!("RIOT_API_KEY is not set; export it or add it to .env before running")
            })?
            .to_string();

        let game_name = non_empty(&args.game_name)
            .ok_or_else(|| anyhow!("game name must not be empty"))?
            .to_string();
        let tag_line = non_empty(args.tag_line.trim_start_matches('#'))
            .ok_or_else(|| anyhow!("tag line must not be empty"))?
            .to_string();

        if args.timeout_secs == 0 {
            return Err(anyhow!("timeout must be at least one second"));
        }
        if args.max_matches == Some(0) {
            return Err(anyhow!("--max-matches must be greater than zero"));
        }

        let schema = match args.attributes.as_deref().and_then(non_empty) {
            Some(raw) => AttributeSchema::parse_list(raw)?,
            None => AttributeSchema::default(),
        };

        Ok(Self {
            player: PlayerId {
                game_name,
                tag_line,
            },
            api: ApiConfig {
                api_key,
                region: args.region,
                timeout: Duration::from_secs(args.timeout_secs),
                queue: args.queue,
            },
            output: args.output,
            max_matches: args.max_matches,
            schema,
        })
    }
}

/// Keeps the first and last four characters of a key, for log lines.
pub fn mask_key(key: &str) -> String {
    let chars = key.chars().collect::<Vec<_>>();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head = chars[..4].iter().collect::<String>();
    let tail = chars[chars.len() - 4..].iter().collect::<String>();
    format!("{head}...{tail}")
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
