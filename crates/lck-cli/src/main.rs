// LCK analytics command line.
//
// Startup sequence:
// 1. Initialize tracing (log to file, stdout carries page output)
// 2. Load config, copying defaults on first run
// 3. Load the dataset once
// 4. Validate the filter selection against observed values
// 5. Build the requested page and print it

use lck_core::config;
use lck_core::filter::{FilterOptions, FilterSelection};
use lck_core::loader;
use lck_core::model::Position;
use lck_core::pages::{self, Page, PageContext};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "lck", version, about = "LCK esports analytics")]
struct Cli {
    /// Project root holding config/, defaults/ and the data files.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

/// Every flag may repeat; an absent flag leaves its dimension open.
#[derive(Debug, clap::Args)]
struct FilterArgs {
    #[arg(long = "year", global = true)]
    years: Vec<i32>,

    #[arg(long = "split", global = true)]
    splits: Vec<String>,

    #[arg(long = "playoffs", global = true)]
    playoffs: Vec<bool>,

    #[arg(long = "patch", global = true)]
    patches: Vec<String>,

    #[arg(long = "position", global = true, value_parser = parse_position)]
    positions: Vec<Position>,

    #[arg(long = "champion", global = true)]
    champions: Vec<String>,

    #[arg(long = "player", global = true)]
    players: Vec<String>,

    #[arg(long = "team", global = true)]
    teams: Vec<String>,
}

impl FilterArgs {
    fn selection(&self) -> FilterSelection {
        FilterSelection::new()
            .with_years(self.years.iter().copied())
            .with_splits(self.splits.iter().cloned())
            .with_playoffs(self.playoffs.iter().copied())
            .with_patches(self.patches.iter().cloned())
            .with_positions(self.positions.iter().copied())
            .with_champions(self.champions.iter().cloned())
            .with_players(self.players.iter().cloned())
            .with_teams(self.teams.iter().cloned())
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the observed values of every filter dimension.
    Options,
    /// League-wide draft, side, duration, and objective trends.
    Overview,
    /// Pick, ban, and win rates per champion.
    Champions,
    /// Profile of one player.
    Player { name: String },
    /// Profile of one team.
    Team { name: String },
    /// Two players of the same position side by side.
    ComparePlayers { a: String, b: String },
    /// Two teams side by side.
    CompareTeams { a: String, b: String },
}

fn parse_position(s: &str) -> Result<Position, String> {
    Position::from_str_pos(s).ok_or_else(|| format!("unknown position '{s}'"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Initialize tracing
    init_tracing(&cli.root)?;
    info!("LCK analytics starting up");

    // 2. Load config
    let config = config::load_config(&cli.root).context("failed to load configuration")?;
    info!("Config loaded: matches={}", config.data.matches);

    // 3. Load the dataset
    let dataset = loader::load_dataset(&config.data, &cli.root).context("failed to load dataset")?;

    // 4. Validate the selection
    let selection = cli.filters.selection();
    selection
        .validate(&FilterOptions::from_rows(&dataset.players))
        .context("invalid filter")?;

    // 5. Build and print the page
    let ctx = PageContext {
        dataset: &dataset,
        config: &config,
        selection: &selection,
    };
    let page = build_page(ctx, &cli.command);
    print_page(&page, cli.format)?;

    Ok(())
}

fn build_page(ctx: PageContext<'_>, command: &Command) -> Page {
    match command {
        Command::Options => pages::options(ctx),
        Command::Overview => pages::recover("LCK Overview", pages::overview(ctx)),
        Command::Champions => pages::recover("Champion Stats", pages::champions(ctx)),
        Command::Player { name } => pages::recover(
            &format!("Player Profile: {name}"),
            pages::player_profile(ctx, name),
        ),
        Command::Team { name } => pages::recover(
            &format!("Team Profile: {name}"),
            pages::team_profile(ctx, name),
        ),
        Command::ComparePlayers { a, b } => {
            pages::recover(&format!("{a} vs {b}"), pages::compare_players(ctx, a, b))
        }
        Command::CompareTeams { a, b } => {
            pages::recover(&format!("{a} vs {b}"), pages::compare_teams(ctx, a, b))
        }
    }
}

fn print_page(page: &Page, format: Format) -> anyhow::Result<()> {
    match format {
        Format::Table => print!("{}", page.render_text()),
        Format::Json => {
            let json = serde_json::to_string_pretty(page).context("failed to serialize page")?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Initialize tracing to log to a file under `root/logs`.
fn init_tracing(root: &std::path::Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = root.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("lck.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lck_core=info,lck_cli=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_flags_build_a_multi_select() {
        let cli = Cli::try_parse_from([
            "lck", "--year", "2023", "--year", "2024", "--position", "jng", "overview",
        ])
        .unwrap();
        let selection = cli.filters.selection();
        assert_eq!(selection.years().len(), 2);
        assert!(selection.positions().contains(&Position::Jungle));
    }

    #[test]
    fn filters_may_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["lck", "player", "Faker", "--team", "T1"]).unwrap();
        assert!(matches!(cli.command, Command::Player { ref name } if name == "Faker"));
        assert!(cli.filters.selection().teams().contains("T1"));
    }

    #[test]
    fn bad_position_is_rejected() {
        assert!(Cli::try_parse_from(["lck", "--position", "coach", "overview"]).is_err());
    }

    #[test]
    fn json_format_parses() {
        let cli = Cli::try_parse_from(["lck", "--format", "json", "compare-teams", "T1", "GEN"])
            .unwrap();
        assert_eq!(cli.format, Format::Json);
    }
}
