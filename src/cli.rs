use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for exercising recommendation sources by hand
#[derive(Parser)]
#[command(name = "wikirec")]
#[command(about = "Fetch recommended content from history, searches and remote sources", long_about = None)]
pub struct Cli {
    /// Config file (TOML); defaults to the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Wiki language or variant code, e.g. `en` or `zh-hant`
    #[arg(long, global = true, default_value = "en")]
    pub lang: String,

    /// Fallback language for a variant code missing from the built-in table
    #[arg(long, global = true)]
    pub parent_lang: Option<String>,

    /// Last known location as `lat,lon` for the places source
    #[arg(long, global = true, value_parser = parse_coordinate)]
    pub location: Option<(f64, f64)>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reading history, newest first
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Recent search terms
    Searches {
        #[command(subcommand)]
        action: Option<SearchAction>,
    },
    /// Today's most read articles
    TopRead,
    /// The whole featured feed for a date (YYYY-MM-DD, default today UTC)
    Feed {
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    /// Pages similar to a term
    Explore {
        term: String,
    },
    /// Pages similar to something read earlier
    BecauseYouRead {
        /// 0 = most recent engaged entry
        #[arg(long, default_value_t = 0)]
        age: usize,
    },
    /// Pages near `--location`
    Places,
    /// A handful of random pages
    Random,
    /// Every parameterless source at once
    All,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Record a page visit
    Add {
        title: String,
        #[arg(long)]
        display: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Reading time in seconds
        #[arg(long, default_value_t = 0)]
        time_spent: i64,
    },
    /// Forget all history
    Clear,
}

#[derive(Subcommand)]
pub enum SearchAction {
    /// Record a search term
    Add { text: String },
    /// Forget all recent searches
    Clear,
}

fn parse_coordinate(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s.split_once(',').ok_or_else(|| format!("expected lat,lon but got {s:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinate out of range: {lat},{lon}"));
    }
    Ok((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_location() {
        assert_eq!(parse_coordinate("51.5, -0.12"), Ok((51.5, -0.12)));
        assert!(parse_coordinate("91,0").is_err());
        assert!(parse_coordinate("north").is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["wikirec", "explore", "Rust", "--lang", "zh-hant"]).unwrap();
        assert_eq!(cli.lang, "zh-hant");
        assert!(matches!(cli.command, Commands::Explore { ref term } if term == "Rust"));
    }
}
