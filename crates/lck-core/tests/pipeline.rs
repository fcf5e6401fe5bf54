// End-to-end tests: config on disk, dataset loading, filtering, and page
// building through the public API.

use std::fs;
use std::path::Path;

use lck_core::config::{load_config, Config};
use lck_core::filter::{FilterError, FilterOptions, FilterSelection};
use lck_core::loader::{load_dataset, DataFormatError, Dataset};
use lck_core::pages::{self, PageContext, PageError};
use lck_core::present::{Cell, ChartKind};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

// ===========================================================================
// Test helpers
// ===========================================================================

/// Lay out a project root with `defaults/dashboard.toml` and the fixture
/// tables under `data/`.
fn project(toml: &str) -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("defaults")).unwrap();
    fs::create_dir_all(root.path().join("data")).unwrap();
    fs::write(root.path().join("defaults/dashboard.toml"), toml).unwrap();
    for (src, dst) in [
        ("lck_sample.csv", "lck_matches.csv"),
        ("clusters.csv", "player_clusters.csv"),
        ("factors.csv", "player_factors.csv"),
    ] {
        fs::copy(
            Path::new(FIXTURES).join(src),
            root.path().join("data").join(dst),
        )
        .unwrap();
    }
    root
}

const FULL_TOML: &str = r#"
[data]
matches = "data/lck_matches.csv"
clusters = "data/player_clusters.csv"
factors = "data/player_factors.csv"

[champions]
min_games = 1
top_n = 3

[factors.labels]
"Laning" = "Lane Control"
"#;

fn load(root: &Path) -> (Config, Dataset) {
    let config = load_config(root).unwrap();
    let dataset = load_dataset(&config.data, root).unwrap();
    (config, (*dataset).clone())
}

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn first_run_copies_defaults_and_loads_every_table() {
    let root = project(FULL_TOML);
    let (config, dataset) = load(root.path());

    assert!(root.path().join("config/dashboard.toml").exists());
    assert_eq!(config.champions.top_n, 3);
    assert_eq!(dataset.players.len(), 12);
    assert_eq!(dataset.teams.len(), 6);
    assert_eq!(dataset.clusters.len(), 4);
    assert_eq!(dataset.factors.len(), 3);
}

#[test]
fn optional_tables_may_be_omitted() {
    let root = project("[data]\nmatches = \"data/lck_matches.csv\"\n");
    let (config, dataset) = load(root.path());

    assert_eq!(config.champions.min_games, 18);
    assert!(dataset.clusters.is_empty());
    assert!(dataset.factors.is_empty());
}

#[test]
fn missing_match_file_is_a_load_error() {
    let root = project("[data]\nmatches = \"data/nope.csv\"\n");
    let config = load_config(root.path()).unwrap();
    let err = load_dataset(&config.data, root.path()).unwrap_err();
    assert!(matches!(err, DataFormatError::Io { .. }));
}

// ===========================================================================
// Filtering and pages
// ===========================================================================

#[test]
fn unknown_filter_value_is_rejected_before_any_page() {
    let root = project(FULL_TOML);
    let (_, dataset) = load(root.path());
    let options = FilterOptions::from_rows(&dataset.players);

    let err = FilterSelection::new()
        .with_teams(["DRX"])
        .validate(&options)
        .unwrap_err();
    assert!(matches!(err, FilterError::UnknownValue { .. }));
    assert!(FilterSelection::new()
        .with_years([2023])
        .validate(&options)
        .is_ok());
}

#[test]
fn overview_ranks_win_rates_when_threshold_is_met() {
    let root = project(FULL_TOML);
    let (config, dataset) = load(root.path());
    let selection = FilterSelection::new();
    let ctx = PageContext {
        dataset: &dataset,
        config: &config,
        selection: &selection,
    };

    let page = pages::overview(ctx).unwrap();
    assert!(page.notices.is_empty());
    assert!(page
        .tables
        .iter()
        .any(|t| t.title == "Highest Win Rate (Min 1 Games)" && t.rows.len() == 3));
    let picked = &page.charts[0];
    assert_eq!(picked.kind, ChartKind::HorizontalBar);
    assert_eq!(picked.categories.len(), 3);
}

#[test]
fn team_filter_narrows_overview_to_that_team() {
    let root = project(FULL_TOML);
    let (config, dataset) = load(root.path());
    let standings = |selection: &FilterSelection| {
        let ctx = PageContext {
            dataset: &dataset,
            config: &config,
            selection,
        };
        let page = pages::overview(ctx).unwrap();
        page.tables
            .into_iter()
            .find(|t| t.title == "Team Standings")
            .unwrap()
    };

    assert_eq!(standings(&FilterSelection::new()).rows.len(), 3);

    let only_t1 = standings(&FilterSelection::new().with_teams(["T1"]));
    assert_eq!(only_t1.rows.len(), 1);
    assert_eq!(only_t1.rows[0][0], Cell::text("T1"));
    assert_eq!(only_t1.rows[0][1], Cell::Count(3));

    let both = standings(&FilterSelection::new().with_teams(["GEN", "HLE"]));
    let teams: Vec<&Cell> = both.rows.iter().map(|r| &r[0]).collect();
    assert_eq!(teams, vec![&Cell::text("GEN"), &Cell::text("HLE")]);
}

#[test]
fn player_profile_uses_configured_factor_labels() {
    let root = project(FULL_TOML);
    let (config, dataset) = load(root.path());
    let selection = FilterSelection::new();
    let ctx = PageContext {
        dataset: &dataset,
        config: &config,
        selection: &selection,
    };

    let page = pages::player_profile(ctx, "Faker").unwrap();
    let radar = &page.charts[0];
    assert!(radar.categories.contains(&"Lane Control".to_string()));
    assert!(radar.categories.contains(&"Teamfight".to_string()));
}

#[test]
fn season_filter_narrows_comparisons() {
    let root = project(FULL_TOML);
    let (config, dataset) = load(root.path());
    let selection = FilterSelection::new().with_years([2024]);
    let ctx = PageContext {
        dataset: &dataset,
        config: &config,
        selection: &selection,
    };

    let err = pages::compare_teams(ctx, "T1", "GEN").unwrap_err();
    assert!(matches!(err, PageError::EmptySelection(_)));

    let page = pages::compare_teams(ctx, "T1", "HLE").unwrap();
    let h2h = page.tables.last().unwrap();
    assert_eq!(h2h.title, "T1 vs HLE: 1-0 in 1 games");
}

#[test]
fn pages_serialize_to_json() {
    let root = project(FULL_TOML);
    let (config, dataset) = load(root.path());
    let selection = FilterSelection::new();
    let ctx = PageContext {
        dataset: &dataset,
        config: &config,
        selection: &selection,
    };

    let page = pages::champions(ctx).unwrap();
    let json: serde_json::Value = serde_json::to_value(&page).unwrap();
    assert_eq!(json["title"], "Champion Stats");
    assert_eq!(json["charts"][0]["kind"], "bar");
    // Ban-only champions have no win rate.
    let rows = json["tables"][0]["rows"].as_array().unwrap();
    assert!(rows.iter().any(|r| r[0] == "Yuumi" && r[6].is_null()));
}
