// Dashboard pages: each composes filter, aggregation and presentation into
// the charts and tables of one view.

use crate::aggregate::champions::{champion_stats, most_contested};
use crate::aggregate::compare::{
    eligible_opponents, metric_deltas, player_head_to_head, team_head_to_head,
};
use crate::aggregate::draft::draft_summary;
use crate::aggregate::games::{duration_histogram, first_objective_win_rates, side_win_rates};
use crate::aggregate::player::{player_rows, player_summary, PlayerSummary};
use crate::aggregate::team::{laning_phase, league_radar, objective_control, team_summary};
use crate::aggregate::{aggregate, AggregationSpec, EmptySelection, GroupKey, Metric};
use crate::config::Config;
use crate::filter::{apply, FilterOptions, FilterSelection};
use crate::loader::Dataset;
use crate::model::{PlayerRow, Position, TeamRow};
use crate::present::{
    champion_table, count_win_rate_table, delta_table, diverging_chart, draft_chart,
    draft_table, first_objective_chart, head_to_head_table, histogram_chart, laning_chart,
    metric_table, most_played_table, normalized_radar, paired_bar_chart, radar_chart,
    side_chart, summary_table, Cell, ChartData, ChartError, ChartKind, Series, TableData,
    LOSS_COLOR,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything a page reads: the shared dataset, settings, and the current
/// filter selection.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub dataset: &'a Dataset,
    pub config: &'a Config,
    pub selection: &'a FilterSelection,
}

/// The rendered content of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub title: String,
    pub charts: Vec<ChartData>,
    pub tables: Vec<TableData>,
    /// Empty-state and informational messages.
    pub notices: Vec<String>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Page {
            title: title.into(),
            charts: Vec::new(),
            tables: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty() && self.tables.is_empty()
    }

    /// Text rendering: notices, then tables, then charts as tables.
    pub fn render_text(&self) -> String {
        let mut out = format!("== {} ==\n", self.title);
        for notice in &self.notices {
            out.push_str(&format!("! {notice}\n"));
        }
        for table in &self.tables {
            out.push('\n');
            out.push_str(&table.render_text());
        }
        for chart in &self.charts {
            out.push('\n');
            out.push_str(&chart.to_table().render_text());
        }
        out
    }
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    EmptySelection(#[from] EmptySelection),

    #[error("cannot compare '{0}' with itself")]
    SameSelection(String),

    #[error(
        "{a} plays {a_position} but {b} plays {b_position}; {}",
        same_position_hint(.a, .a_position, .peers)
    )]
    PositionMismatch {
        a: String,
        a_position: Position,
        b: String,
        b_position: Position,
        /// Players sharing `a`'s position under the session-wide filters.
        peers: Vec<String>,
    },

    #[error("no games match the current filter")]
    NoData,

    #[error(transparent)]
    Chart(#[from] ChartError),
}

fn same_position_hint(a: &str, position: &Position, peers: &[String]) -> String {
    if peers.is_empty() {
        format!("no other {position} players to compare {a} with")
    } else {
        format!("{a} can be compared with: {}", peers.join(", "))
    }
}

/// Turn a page error into an empty page carrying the message.
pub fn recover(title: &str, result: Result<Page, PageError>) -> Page {
    match result {
        Ok(page) => page,
        Err(e) => {
            warn!("{title}: {e}");
            let mut page = Page::new(title);
            page.notices.push(e.to_string());
            page
        }
    }
}

fn team_rows<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> Vec<&'a TeamRow> {
    apply(&dataset.teams, selection)
}

// ---------------------------------------------------------------------------
// Filter options
// ---------------------------------------------------------------------------

/// Observed values per filter dimension. Player, team and champion lists
/// follow the session-wide filters.
pub fn options(ctx: PageContext<'_>) -> Page {
    let all = FilterOptions::from_rows(&ctx.dataset.players);
    let scoped = FilterOptions::from_rows(apply(
        &ctx.dataset.players,
        &ctx.selection.global_only(),
    ));

    let join = |values: Vec<String>| values.join(", ");
    let entries: Vec<(&str, String)> = vec![
        ("year", join(all.years.iter().map(|y| y.to_string()).collect())),
        ("split", join(all.splits.clone())),
        (
            "playoffs",
            join(all.playoffs.iter().map(|p| p.to_string()).collect()),
        ),
        ("patch", join(all.patches.clone())),
        (
            "position",
            join(scoped.positions.iter().map(|p| p.to_string()).collect()),
        ),
        ("team", join(scoped.teams.clone())),
        ("player", join(scoped.players.clone())),
        ("champion", join(scoped.champions.clone())),
    ];

    let mut table = TableData::new("Filter Options", &["Dimension", "Values"]);
    table.rows = entries
        .into_iter()
        .map(|(dim, values)| vec![Cell::text(dim), Cell::text(values)])
        .collect();

    let mut page = Page::new("Filter Options");
    page.tables.push(table);
    page
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// League overview: draft trends, side and duration distributions, first
/// objectives, and team standings.
pub fn overview(ctx: PageContext<'_>) -> Result<Page, PageError> {
    let rows = team_rows(ctx.dataset, ctx.selection);
    if rows.is_empty() {
        return Err(PageError::NoData);
    }
    info!("Building overview over {} team rows", rows.len());

    let champs = &ctx.config.champions;
    let draft = draft_summary(&rows, champs.top_n, champs.min_games);
    let mut page = Page::new("LCK Overview");

    page.charts.push(draft_chart(
        &format!("Top {} Most Picked", champs.top_n),
        &draft.most_picked,
        |s| s.picks as f64,
    ));
    page.charts.push(draft_chart(
        &format!("Top {} Most Banned", champs.top_n),
        &draft.most_banned,
        |s| s.bans as f64,
    ));
    if draft.highest_win_rate.is_empty() {
        page.notices
            .push(format!("No champions with >= {} games.", draft.min_games));
    } else {
        page.tables.push(draft_table(
            &format!("Highest Win Rate (Min {} Games)", draft.min_games),
            &draft.highest_win_rate,
        ));
        page.tables.push(draft_table(
            &format!("Highest Loss Rate (Min {} Games)", draft.min_games),
            &draft.highest_loss_rate,
        ));
    }

    page.charts
        .push(side_chart("Win Rate by Side", &side_win_rates(&rows)));

    let bins = duration_histogram(&rows, ctx.config.distribution.bins);
    if bins.is_empty() {
        page.notices.push("No game length recorded.".into());
    } else {
        page.charts
            .push(histogram_chart("Game Duration (minutes)", &bins));
    }

    let firsts = first_objective_win_rates(&rows);
    if !firsts.is_empty() {
        page.charts.push(first_objective_chart(
            "Win Rate After First Objective",
            &firsts,
        ));
    }

    let standings_metrics = [Metric::Wins, Metric::WinRate, Metric::PooledKda, Metric::Dpm];
    let spec =
        AggregationSpec::new(GroupKey::Team, standings_metrics.to_vec()).sorted_by(Metric::WinRate);
    page.tables.push(summary_table(
        "Team Standings",
        "Team",
        &standings_metrics,
        &aggregate(&rows, &spec),
    ));

    Ok(page)
}

// ---------------------------------------------------------------------------
// Champion stats
// ---------------------------------------------------------------------------

pub fn champions(ctx: PageContext<'_>) -> Result<Page, PageError> {
    let rows: Vec<&PlayerRow> = apply(&ctx.dataset.players, ctx.selection);
    if rows.is_empty() {
        return Err(PageError::NoData);
    }
    let stats = champion_stats(&rows);
    info!("Champion stats for {} champions", stats.len());

    let mut page = Page::new("Champion Stats");
    page.tables
        .push(champion_table("Champion Statistics", &stats));

    let top = most_contested(&stats, ctx.config.champions.top_n);
    let categories = top.iter().map(|s| s.champion.clone()).collect();
    page.charts.push(
        ChartData::new("Most Contested Champions", ChartKind::Bar, categories)
            .push(Series::new("Pick%", top.iter().map(|s| s.pick_rate).collect()))
            .push(
                Series::new("Ban%", top.iter().map(|s| s.ban_rate).collect())
                    .with_color(LOSS_COLOR),
            ),
    );
    Ok(page)
}

// ---------------------------------------------------------------------------
// Player profile
// ---------------------------------------------------------------------------

fn labeled_factors(config: &Config, factors: &[(String, f64)]) -> Vec<(String, f64)> {
    factors
        .iter()
        .map(|(name, v)| (config.factors.label(name).to_string(), *v))
        .collect()
}

pub fn player_profile(ctx: PageContext<'_>, player: &str) -> Result<Page, PageError> {
    let summary = player_summary(
        ctx.dataset,
        ctx.selection,
        player,
        ctx.config.profile.most_played,
    )?;
    info!("Player profile for {player}: {} games", summary.games);

    let mut page = Page::new(format!("Player Profile: {player}"));

    let mut info = TableData::new("Overview", &["Field", "Value"]);
    info.rows = vec![
        vec![Cell::text("Team"), Cell::text(&summary.team)],
        vec![Cell::text("Position"), Cell::text(summary.position.to_string())],
        vec![Cell::text("Games"), Cell::Count(summary.games)],
        vec![Cell::text("Win%"), Cell::Percent(summary.win_rate)],
        vec![
            Cell::text("Cluster"),
            match summary.cluster {
                Some(c) => Cell::Count(c as usize),
                None => Cell::text("N/A"),
            },
        ],
    ];
    page.tables.push(info);

    let headline: Vec<(Metric, Option<f64>)> = summary
        .headline
        .iter()
        .map(|(m, v)| (*m, Some(*v)))
        .collect();
    page.tables.push(metric_table("Key Metrics", &headline));
    page.tables.push(most_played_table(
        &format!("Most {} Champions", ctx.config.profile.most_played),
        &summary.most_played,
    ));

    match &summary.factors {
        Some(factors) if !factors.is_empty() => {
            let stats = vec![labeled_factors(ctx.config, factors)];
            page.charts
                .push(radar_chart("Play Style", &stats, None, None)?);
        }
        _ => page
            .notices
            .push(format!("No factor scores for {player}.")),
    }

    Ok(page)
}

// ---------------------------------------------------------------------------
// Team profile
// ---------------------------------------------------------------------------

pub fn team_profile(ctx: PageContext<'_>, team: &str) -> Result<Page, PageError> {
    let league = team_rows(ctx.dataset, &ctx.selection.global_only());
    let summary = team_summary(&league, team)?;
    info!("Team profile for {team}: {} games", summary.games);

    let mut page = Page::new(format!("Team Profile: {team}"));

    let mut metrics = vec![
        (Metric::Games, Some(summary.games as f64)),
        (Metric::WinRate, summary.win_rate),
    ];
    metrics.extend(summary.metrics.iter().copied());
    metrics.extend(summary.objectives.iter().copied());
    page.tables.push(metric_table("Team Metrics", &metrics));

    let mut firsts = TableData::new("First Objectives", &["Objective", "Rate"]);
    firsts.rows = summary
        .first_rates
        .iter()
        .map(|(obj, rate)| vec![Cell::text(obj.label()), Cell::Percent(*rate)])
        .collect();
    page.tables.push(firsts);

    let radar = league_radar(&league, team);
    page.charts.push(normalized_radar(
        "League-Normalized Radar",
        &[(team, radar.as_slice())],
    ));

    let laning = laning_phase(&league, team);
    page.charts
        .push(laning_chart("Gold Difference", team, &laning, true));
    page.charts
        .push(laning_chart("CS Difference", team, &laning, false));

    let control = objective_control(&league, team);
    if !control.first_objectives.is_empty() {
        page.charts.push(first_objective_chart(
            "Win Rate After First Objective",
            &control.first_objectives,
        ));
    }
    for (metric, counts) in &control.by_count {
        let label = metric.label();
        page.tables.push(count_win_rate_table(
            &format!("Win Rate by {label} Taken"),
            &label,
            counts,
        ));
    }

    Ok(page)
}

// ---------------------------------------------------------------------------
// Comparisons
// ---------------------------------------------------------------------------

fn player_pair(
    ctx: PageContext<'_>,
    a: &str,
    b: &str,
) -> Result<(PlayerSummary, PlayerSummary), PageError> {
    if a == b {
        return Err(PageError::SameSelection(a.to_string()));
    }
    let n = ctx.config.profile.most_played;
    let sa = player_summary(ctx.dataset, ctx.selection, a, n)?;
    let sb = player_summary(ctx.dataset, ctx.selection, b, n)?;
    if sa.position != sb.position {
        let global: Vec<&PlayerRow> = apply(&ctx.dataset.players, &ctx.selection.global_only());
        return Err(PageError::PositionMismatch {
            a: a.to_string(),
            a_position: sa.position,
            b: b.to_string(),
            b_position: sb.position,
            peers: eligible_opponents(&global, a, sa.position),
        });
    }
    Ok((sa, sb))
}

pub fn compare_players(ctx: PageContext<'_>, a: &str, b: &str) -> Result<Page, PageError> {
    let (sa, sb) = player_pair(ctx, a, b)?;

    let mut page = Page::new(format!("{a} vs {b}"));
    let deltas = metric_deltas(&sa.headline, &sb.headline);
    page.tables
        .push(delta_table("Key Metrics", &deltas, a, b));
    page.charts
        .push(paired_bar_chart("Key Metrics", &deltas, a, b));
    page.charts.push(diverging_chart(
        &format!("Difference ({a} - {b})"),
        &deltas,
        a,
        b,
    ));

    match (&sa.factors, &sb.factors) {
        (Some(fa), Some(fb)) if !fa.is_empty() && !fb.is_empty() => {
            let stats = vec![
                labeled_factors(ctx.config, fa),
                labeled_factors(ctx.config, fb),
            ];
            let labels = vec![a.to_string(), b.to_string()];
            page.charts.push(radar_chart(
                "Play Style",
                &stats,
                Some(labels.as_slice()),
                None,
            )?);
        }
        _ => page
            .notices
            .push("Factor scores are missing for one or both players.".into()),
    }

    let mut both = player_rows(ctx.dataset, ctx.selection, a);
    both.extend(player_rows(ctx.dataset, ctx.selection, b));
    let h2h = player_head_to_head(&both, a, b);
    if h2h.games == 0 {
        page.notices
            .push(format!("{a} and {b} have not met in the current filter."));
    }
    page.tables.push(head_to_head_table(&h2h));

    Ok(page)
}

pub fn compare_teams(ctx: PageContext<'_>, a: &str, b: &str) -> Result<Page, PageError> {
    if a == b {
        return Err(PageError::SameSelection(a.to_string()));
    }
    let league = team_rows(ctx.dataset, &ctx.selection.global_only());
    let sa = team_summary(&league, a)?;
    let sb = team_summary(&league, b)?;

    let filled = |metrics: &[(Metric, Option<f64>)]| -> Vec<(Metric, f64)> {
        metrics
            .iter()
            .map(|(m, v)| (*m, v.unwrap_or(0.0)))
            .collect()
    };
    let deltas = metric_deltas(&filled(&sa.metrics), &filled(&sb.metrics));

    let mut page = Page::new(format!("{a} vs {b}"));
    let mut record = TableData::new("Record", &["Team", "Games", "Win%"]);
    record.rows = [&sa, &sb]
        .iter()
        .map(|s| {
            vec![
                Cell::text(&s.team),
                Cell::Count(s.games),
                Cell::Percent(s.win_rate),
            ]
        })
        .collect();
    page.tables.push(record);
    page.tables
        .push(delta_table("Team Metrics", &deltas, a, b));

    let radar_a = league_radar(&league, a);
    let radar_b = league_radar(&league, b);
    page.charts.push(normalized_radar(
        "League-Normalized Radar",
        &[(a, radar_a.as_slice()), (b, radar_b.as_slice())],
    ));
    page.charts
        .push(paired_bar_chart("Team Metrics", &deltas, a, b));
    page.charts.push(diverging_chart(
        &format!("Difference ({a} - {b})"),
        &deltas,
        a,
        b,
    ));

    let h2h = team_head_to_head(&league, a, b);
    if h2h.games == 0 {
        page.notices
            .push(format!("{a} and {b} have not met in the current filter."));
    }
    page.tables.push(head_to_head_table(&h2h));

    Ok(page)
}
