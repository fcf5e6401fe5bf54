// Filter engine: selection values, row matching, and option lists.

use crate::model::{GameInfo, PlayerRow, Position, TeamRow};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// A filterable dimension of the match tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    Year,
    Split,
    Playoffs,
    Patch,
    Position,
    Champion,
    Player,
    Team,
}

impl Dimension {
    pub fn display_str(&self) -> &'static str {
        match self {
            Dimension::Year => "year",
            Dimension::Split => "split",
            Dimension::Playoffs => "playoffs",
            Dimension::Patch => "patch",
            Dimension::Position => "position",
            Dimension::Champion => "champion",
            Dimension::Player => "player",
            Dimension::Team => "team",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("unknown {dimension} '{value}': not present in the loaded data")]
    UnknownValue { dimension: Dimension, value: String },
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The set of selected values per dimension. An empty set leaves that
/// dimension unconstrained.
///
/// Built with the `with_*` methods; each returns a new selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    years: BTreeSet<i32>,
    splits: BTreeSet<String>,
    playoffs: BTreeSet<bool>,
    patches: BTreeSet<String>,
    positions: BTreeSet<Position>,
    champions: BTreeSet<String>,
    players: BTreeSet<String>,
    teams: BTreeSet<String>,
}

fn strings<I, S>(values: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into)
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_years(mut self, years: impl IntoIterator<Item = i32>) -> Self {
        self.years.extend(years);
        self
    }

    pub fn with_splits<S: Into<String>>(mut self, splits: impl IntoIterator<Item = S>) -> Self {
        self.splits.extend(strings(splits));
        self
    }

    pub fn with_playoffs(mut self, playoffs: impl IntoIterator<Item = bool>) -> Self {
        self.playoffs.extend(playoffs);
        self
    }

    pub fn with_patches<S: Into<String>>(mut self, patches: impl IntoIterator<Item = S>) -> Self {
        self.patches.extend(strings(patches));
        self
    }

    pub fn with_positions(mut self, positions: impl IntoIterator<Item = Position>) -> Self {
        self.positions.extend(positions);
        self
    }

    pub fn with_champions<S: Into<String>>(
        mut self,
        champions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.champions.extend(strings(champions));
        self
    }

    pub fn with_players<S: Into<String>>(mut self, players: impl IntoIterator<Item = S>) -> Self {
        self.players.extend(strings(players));
        self
    }

    pub fn with_teams<S: Into<String>>(mut self, teams: impl IntoIterator<Item = S>) -> Self {
        self.teams.extend(strings(teams));
        self
    }

    /// Replace the player dimension with a single player.
    pub fn only_player(mut self, player: &str) -> Self {
        self.players = BTreeSet::from([player.to_string()]);
        self
    }

    /// The same selection with only the session-wide dimensions (year,
    /// split, playoffs, patch) kept.
    pub fn global_only(&self) -> Self {
        FilterSelection {
            years: self.years.clone(),
            splits: self.splits.clone(),
            playoffs: self.playoffs.clone(),
            patches: self.patches.clone(),
            ..Default::default()
        }
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    pub fn positions(&self) -> &BTreeSet<Position> {
        &self.positions
    }

    pub fn players(&self) -> &BTreeSet<String> {
        &self.players
    }

    pub fn teams(&self) -> &BTreeSet<String> {
        &self.teams
    }

    /// True when no dimension carries a constraint.
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `row` satisfies every active dimension. Player-level
    /// dimensions pass through for rows that do not carry them.
    pub fn matches<R: Filterable>(&self, row: &R) -> bool {
        let g = row.game();
        let global = in_set(&self.years, g.year.as_ref())
            && in_str_set(&self.splits, g.split.as_deref())
            && in_set(&self.playoffs, g.playoffs.as_ref())
            && in_str_set(&self.patches, g.patch.as_deref())
            && in_str_set(&self.teams, Some(g.team.as_str()));
        if !global {
            return false;
        }
        if !R::PLAYER_LEVEL {
            return true;
        }
        in_set(&self.positions, row.position().as_ref())
            && in_str_set(&self.champions, row.champion())
            && in_str_set(&self.players, row.player())
    }

    /// Check every selected value against the observed options.
    pub fn validate(&self, options: &FilterOptions) -> Result<(), FilterError> {
        check_known(Dimension::Year, &self.years, &options.years)?;
        check_known(Dimension::Split, &self.splits, &options.splits)?;
        check_known(Dimension::Playoffs, &self.playoffs, &options.playoffs)?;
        check_known(Dimension::Patch, &self.patches, &options.patches)?;
        check_known(Dimension::Position, &self.positions, &options.positions)?;
        check_known(Dimension::Champion, &self.champions, &options.champions)?;
        check_known(Dimension::Player, &self.players, &options.players)?;
        check_known(Dimension::Team, &self.teams, &options.teams)?;
        Ok(())
    }
}

fn in_set<T: Ord>(set: &BTreeSet<T>, value: Option<&T>) -> bool {
    set.is_empty() || value.is_some_and(|v| set.contains(v))
}

fn in_str_set(set: &BTreeSet<String>, value: Option<&str>) -> bool {
    set.is_empty() || value.is_some_and(|v| set.contains(v))
}

fn check_known<T: PartialEq + fmt::Display>(
    dimension: Dimension,
    selected: &BTreeSet<T>,
    known: &[T],
) -> Result<(), FilterError> {
    match selected.iter().find(|v| !known.contains(v)) {
        Some(value) => Err(FilterError::UnknownValue {
            dimension,
            value: value.to_string(),
        }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Row access
// ---------------------------------------------------------------------------

/// Row types the filter engine can match against.
pub trait Filterable {
    /// Whether rows carry the position, champion and player dimensions.
    const PLAYER_LEVEL: bool;

    fn game(&self) -> &GameInfo;

    fn position(&self) -> Option<Position> {
        None
    }

    fn champion(&self) -> Option<&str> {
        None
    }

    fn player(&self) -> Option<&str> {
        None
    }
}

impl Filterable for PlayerRow {
    const PLAYER_LEVEL: bool = true;

    fn game(&self) -> &GameInfo {
        &self.game
    }

    fn position(&self) -> Option<Position> {
        Some(self.position)
    }

    fn champion(&self) -> Option<&str> {
        self.champion.as_deref()
    }

    fn player(&self) -> Option<&str> {
        Some(&self.player)
    }
}

impl Filterable for TeamRow {
    const PLAYER_LEVEL: bool = false;

    fn game(&self) -> &GameInfo {
        &self.game
    }
}

/// Rows of `rows` matching `selection`, in input order.
pub fn apply<'a, R: Filterable>(rows: &'a [R], selection: &FilterSelection) -> Vec<&'a R> {
    let kept: Vec<&R> = rows.iter().filter(|r| selection.matches(*r)).collect();
    debug!("Filter kept {} of {} rows", kept.len(), rows.len());
    kept
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Distinct observed values per dimension, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub years: Vec<i32>,
    pub splits: Vec<String>,
    pub playoffs: Vec<bool>,
    pub patches: Vec<String>,
    pub positions: Vec<Position>,
    pub champions: Vec<String>,
    pub players: Vec<String>,
    pub teams: Vec<String>,
}

impl FilterOptions {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a PlayerRow>) -> Self {
        let mut years = BTreeSet::new();
        let mut splits = BTreeSet::new();
        let mut playoffs = BTreeSet::new();
        let mut patches = BTreeSet::new();
        let mut positions = BTreeSet::new();
        let mut champions = BTreeSet::new();
        let mut players = BTreeSet::new();
        let mut teams = BTreeSet::new();

        for row in rows {
            let g = &row.game;
            years.extend(g.year);
            splits.extend(g.split.clone());
            playoffs.extend(g.playoffs);
            patches.extend(g.patch.clone());
            positions.insert(row.position);
            champions.extend(row.champion.clone());
            players.insert(row.player.clone());
            teams.insert(g.team.clone());
        }

        FilterOptions {
            years: years.into_iter().collect(),
            splits: splits.into_iter().collect(),
            playoffs: playoffs.into_iter().collect(),
            patches: patches.into_iter().collect(),
            positions: positions.into_iter().collect(),
            champions: champions.into_iter().collect(),
            players: players.into_iter().collect(),
            teams: teams.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
