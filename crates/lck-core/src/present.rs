// Presentation adapter: maps aggregation output to chart and table
// structures an external charting surface can render.
//
// Nothing here computes statistics. Undefined values serialize as `null` and
// render as "N/A" in text tables.

use crate::aggregate::champions::ChampionStat;
use crate::aggregate::compare::{HeadToHead, MetricDelta};
use crate::aggregate::draft::DraftStat;
use crate::aggregate::games::{Bin, FirstObjectiveRate, SideWinRate};
use crate::aggregate::player::ChampionUsage;
use crate::aggregate::team::{CountWinRate, LaningPoint, RadarAxis};
use crate::aggregate::{Metric, SummaryRow};
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Colors assigned to series in order.
pub const SERIES_COLORS: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#3498db", "#e67e22", "#17becf", "#9467bd", "#8c564b", "#e377c2",
];
pub const WIN_COLOR: &str = "#2ecc71";
pub const LOSS_COLOR: &str = "#e74c3c";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("chart '{title}' needs at least one series")]
    NoSeries { title: String },

    #[error("chart '{title}' has {labels} labels for {series} series")]
    LabelMismatch {
        title: String,
        labels: usize,
        series: usize,
    },

    #[error("series '{series}' of chart '{title}' has no numeric values")]
    NoValues { title: String, series: String },
}

// ---------------------------------------------------------------------------
// Chart structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    DivergingBar,
    Radar,
    Histogram,
    Line,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
    pub color: Option<String>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Series {
            name: name.into(),
            values,
            color: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }
}

/// Categories along one axis and one value per category per series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    /// Value-axis range, when the chart fixes one.
    pub range: Option<(f64, f64)>,
}

impl ChartData {
    pub fn new(title: impl Into<String>, kind: ChartKind, categories: Vec<String>) -> Self {
        ChartData {
            title: title.into(),
            kind,
            categories,
            series: Vec::new(),
            range: None,
        }
    }

    /// Append a series, coloring it from [`SERIES_COLORS`] unless it already
    /// has a color.
    pub fn push(mut self, mut series: Series) -> Self {
        if series.color.is_none() {
            let idx = self.series.len() % SERIES_COLORS.len();
            series.color = Some(SERIES_COLORS[idx].to_string());
        }
        self.series.push(series);
        self
    }

    /// One row per category, one column per series.
    pub fn to_table(&self) -> TableData {
        let mut columns = vec![String::new()];
        columns.extend(self.series.iter().map(|s| s.name.clone()));
        let rows = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, cat)| {
                let mut row = vec![Cell::text(cat)];
                row.extend(
                    self.series
                        .iter()
                        .map(|s| Cell::number(s.values.get(i).copied().flatten(), 2)),
                );
                row
            })
            .collect();
        TableData {
            title: self.title.clone(),
            columns,
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Table structures
// ---------------------------------------------------------------------------

/// One formatted table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Count(usize),
    Number { value: Option<f64>, decimals: usize },
    Percent(Option<f64>),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn number(value: Option<f64>, decimals: usize) -> Self {
        Cell::Number { value, decimals }
    }

    /// Format a metric value the way that metric is usually read.
    pub fn metric(metric: Metric, value: Option<f64>) -> Self {
        if metric.is_rate() {
            Cell::Percent(value)
        } else if metric.is_count() {
            Cell::number(value, 0)
        } else {
            Cell::number(value, 2)
        }
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Count(n) => n.to_string(),
            Cell::Number {
                value: Some(v),
                decimals,
            } => format!("{v:.prec$}", prec = *decimals),
            Cell::Percent(Some(v)) => format!("{v:.1}%"),
            Cell::Number { value: None, .. } | Cell::Percent(None) => "N/A".to_string(),
        }
    }

    fn is_numeric(&self) -> bool {
        !matches!(self, Cell::Text(_))
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Count(n) => serializer.serialize_u64(*n as u64),
            Cell::Number { value, .. } | Cell::Percent(value) => match value {
                Some(v) => serializer.serialize_f64(*v),
                None => serializer.serialize_none(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl TableData {
    pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        TableData {
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Plain-text rendering with aligned columns; numbers right-aligned.
    pub fn render_text(&self) -> String {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Cell::render).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &rendered {
            for (i, cell) in row.iter().enumerate() {
                if i >= widths.len() {
                    widths.push(0);
                }
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c:<w$}", w = widths[i]))
            .collect();
        out.push_str(header.join("  ").trim_end());
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');

        for (row, cells) in rendered.iter().zip(&self.rows) {
            let line: Vec<String> = row
                .iter()
                .zip(cells)
                .enumerate()
                .map(|(i, (text, cell))| {
                    if cell.is_numeric() {
                        format!("{text:>w$}", w = widths[i])
                    } else {
                        format!("{text:<w$}", w = widths[i])
                    }
                })
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        if self.rows.is_empty() {
            out.push_str("(no rows)\n");
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Chart builders
// ---------------------------------------------------------------------------

/// Radar chart over one or more named stat lists.
///
/// Categories are the union of stat names in first-seen order; a series
/// missing a category gets 0.0 there. Non-finite values are dropped. The
/// radial range is `[0, max * 1.1]`, or `[0, 1]` when every value is zero,
/// unless `range` overrides it. Labels default to the title for a single
/// series and to "Series N" otherwise.
pub fn radar_chart(
    title: &str,
    stats: &[Vec<(String, f64)>],
    labels: Option<&[String]>,
    range: Option<(f64, f64)>,
) -> Result<ChartData, ChartError> {
    if stats.is_empty() {
        return Err(ChartError::NoSeries {
            title: title.to_string(),
        });
    }
    let labels: Vec<String> = match labels {
        Some(l) => l.to_vec(),
        None if stats.len() == 1 => vec![title.to_string()],
        None => (1..=stats.len()).map(|i| format!("Series {i}")).collect(),
    };
    if labels.len() != stats.len() {
        return Err(ChartError::LabelMismatch {
            title: title.to_string(),
            labels: labels.len(),
            series: stats.len(),
        });
    }

    let cleaned: Vec<Vec<&(String, f64)>> = stats
        .iter()
        .map(|s| s.iter().filter(|(_, v)| v.is_finite()).collect())
        .collect();
    if let Some(idx) = cleaned.iter().position(|s| s.is_empty()) {
        return Err(ChartError::NoValues {
            title: title.to_string(),
            series: labels[idx].clone(),
        });
    }

    let mut categories: Vec<String> = Vec::new();
    for entry in cleaned.iter().flatten() {
        if !categories.contains(&entry.0) {
            categories.push(entry.0.clone());
        }
    }

    let mut chart = ChartData::new(title, ChartKind::Radar, categories.clone());
    let mut max = 0.0_f64;
    for (values, label) in cleaned.iter().zip(labels) {
        let row: Vec<Option<f64>> = categories
            .iter()
            .map(|cat| {
                let v = values
                    .iter()
                    .find(|(name, _)| name == cat)
                    .map_or(0.0, |(_, v)| *v);
                max = max.max(v);
                Some(v)
            })
            .collect();
        chart = chart.push(Series::new(label, row));
    }

    chart.range = Some(range.unwrap_or(if max > 0.0 { (0.0, max * 1.1) } else { (0.0, 1.0) }));
    Ok(chart)
}

/// Overlaid league-normalized radar for one or more teams, each axis on a
/// fixed `[0, 1]` range.
pub fn normalized_radar(title: &str, teams: &[(&str, &[RadarAxis])]) -> ChartData {
    let categories: Vec<String> = teams
        .first()
        .map(|(_, axes)| axes.iter().map(|a| a.metric.label()).collect())
        .unwrap_or_default();
    let mut chart = ChartData::new(title, ChartKind::Radar, categories);
    for (name, axes) in teams {
        chart = chart.push(Series::new(
            *name,
            axes.iter().map(|a| Some(a.team_normalized)).collect(),
        ));
    }
    if let Some((_, axes)) = teams.first() {
        chart = chart.push(
            Series::new(
                "League Avg",
                axes.iter().map(|a| Some(a.league_normalized)).collect(),
            )
            .with_color("#95a5a6"),
        );
    }
    chart.range = Some((0.0, 1.0));
    chart
}

/// Bar of `a - b` per metric, in the order given.
pub fn diverging_chart(title: &str, deltas: &[MetricDelta], a: &str, b: &str) -> ChartData {
    let categories = deltas.iter().map(|d| d.metric.label()).collect();
    ChartData::new(title, ChartKind::DivergingBar, categories).push(Series::new(
        format!("{a} - {b}"),
        deltas.iter().map(|d| Some(d.diff)).collect(),
    ))
}

/// Grouped bar of raw metric values for two sides.
pub fn paired_bar_chart(title: &str, deltas: &[MetricDelta], a: &str, b: &str) -> ChartData {
    let categories = deltas.iter().map(|d| d.metric.label()).collect();
    ChartData::new(title, ChartKind::Bar, categories)
        .push(Series::new(a, deltas.iter().map(|d| Some(d.a)).collect()))
        .push(Series::new(b, deltas.iter().map(|d| Some(d.b)).collect()))
}

pub fn histogram_chart(title: &str, bins: &[Bin]) -> ChartData {
    let categories = bins
        .iter()
        .map(|b| format!("{:.1}-{:.1}", b.lower, b.upper))
        .collect();
    ChartData::new(title, ChartKind::Histogram, categories).push(Series::new(
        "Games",
        bins.iter().map(|b| Some(b.count as f64)).collect(),
    ))
}

pub fn side_chart(title: &str, sides: &[SideWinRate]) -> ChartData {
    let categories = sides.iter().map(|s| s.side.to_string()).collect();
    ChartData::new(title, ChartKind::Pie, categories).push(Series::new(
        "Win%",
        sides.iter().map(|s| s.win_rate).collect(),
    ))
}

pub fn first_objective_chart(title: &str, rates: &[FirstObjectiveRate]) -> ChartData {
    let categories = rates.iter().map(|r| r.objective.label().to_string()).collect();
    let mut chart = ChartData::new(title, ChartKind::Bar, categories).push(
        Series::new("Win%", rates.iter().map(|r| r.win_rate).collect()).with_color(WIN_COLOR),
    );
    chart.range = Some((0.0, 100.0));
    chart
}

/// Horizontal bar of one count per champion, in list order.
pub fn draft_chart(title: &str, stats: &[DraftStat], value: fn(&DraftStat) -> f64) -> ChartData {
    let categories = stats.iter().map(|s| s.champion.clone()).collect();
    ChartData::new(title, ChartKind::HorizontalBar, categories).push(Series::new(
        title,
        stats.iter().map(|s| Some(value(s))).collect(),
    ))
}

/// Team gold or CS difference by minute against the league reference.
pub fn laning_chart(title: &str, team: &str, points: &[LaningPoint], gold: bool) -> ChartData {
    let categories = points.iter().map(|p| format!("{}m", p.minute)).collect();
    let (own, league): (Vec<_>, Vec<_>) = points
        .iter()
        .map(|p| {
            if gold {
                (p.gold_diff, p.league_gold)
            } else {
                (p.cs_diff, p.league_cs)
            }
        })
        .unzip();
    ChartData::new(title, ChartKind::Line, categories)
        .push(Series::new(team, own))
        .push(Series::new("League Avg Diff (Adj)", league).with_color("#95a5a6"))
}

// ---------------------------------------------------------------------------
// Table mappers
// ---------------------------------------------------------------------------

pub fn champion_table(title: &str, stats: &[ChampionStat]) -> TableData {
    let mut table = TableData::new(
        title,
        &["Champion", "Position", "Games", "Pick%", "Ban%", "P+B%", "Win%"],
    );
    table.rows = stats
        .iter()
        .map(|s| {
            vec![
                Cell::text(&s.champion),
                Cell::text(s.positions_label()),
                Cell::Count(s.games),
                Cell::Percent(s.pick_rate),
                Cell::Percent(s.ban_rate),
                Cell::Percent(s.pick_ban_rate),
                Cell::Percent(s.win_rate),
            ]
        })
        .collect();
    table
}

pub fn draft_table(title: &str, stats: &[DraftStat]) -> TableData {
    let mut table = TableData::new(
        title,
        &["Champion", "Picks", "Bans", "Wins", "Losses", "Win%", "Loss%"],
    );
    table.rows = stats
        .iter()
        .map(|s| {
            vec![
                Cell::text(&s.champion),
                Cell::Count(s.picks),
                Cell::Count(s.bans),
                Cell::Count(s.wins),
                Cell::Count(s.losses),
                Cell::Percent(s.win_rate),
                Cell::Percent(s.loss_rate),
            ]
        })
        .collect();
    table
}

pub fn most_played_table(title: &str, usage: &[ChampionUsage]) -> TableData {
    let mut columns = vec!["Champion", "Games", "Win%", "KDA"];
    let gd_labels: Vec<String> = usage
        .first()
        .map(|u| u.gold_diff.iter().map(|(m, _)| format!("GD@{m}")).collect())
        .unwrap_or_default();
    columns.extend(gd_labels.iter().map(String::as_str));
    columns.extend(["CSPM", "DPM", "Vision Score"]);

    let mut table = TableData::new(title, &columns);
    table.rows = usage
        .iter()
        .map(|u| {
            let mut row = vec![
                Cell::text(&u.champion),
                Cell::Count(u.games),
                Cell::Percent(u.win_rate),
                Cell::number(u.kda, 2),
            ];
            row.extend(u.gold_diff.iter().map(|(_, v)| Cell::number(*v, 0)));
            row.extend([
                Cell::number(u.cspm, 2),
                Cell::number(u.dpm, 0),
                Cell::number(u.vision_score, 1),
            ]);
            row
        })
        .collect();
    table
}

/// Two-column metric listing.
pub fn metric_table(title: &str, metrics: &[(Metric, Option<f64>)]) -> TableData {
    let mut table = TableData::new(title, &["Metric", "Value"]);
    table.rows = metrics
        .iter()
        .map(|(m, v)| vec![Cell::text(m.label()), Cell::metric(*m, *v)])
        .collect();
    table
}

pub fn delta_table(title: &str, deltas: &[MetricDelta], a: &str, b: &str) -> TableData {
    let mut table = TableData::new(title, &["Metric", a, b, "Diff"]);
    table.rows = deltas
        .iter()
        .map(|d| {
            vec![
                Cell::text(d.metric.label()),
                Cell::metric(d.metric, Some(d.a)),
                Cell::metric(d.metric, Some(d.b)),
                Cell::metric(d.metric, Some(d.diff)),
            ]
        })
        .collect();
    table
}

/// Per-game detail of a head-to-head record; the title carries the tally.
pub fn head_to_head_table(h2h: &HeadToHead) -> TableData {
    let title = format!(
        "{} vs {}: {}-{} in {} games",
        h2h.a, h2h.b, h2h.a_wins, h2h.b_wins, h2h.games
    );
    let a_champ = format!("{} Champion", h2h.a);
    let b_champ = format!("{} Champion", h2h.b);
    let mut table = TableData::new(
        title,
        &["Game", "Date", "Winner", a_champ.as_str(), b_champ.as_str()],
    );
    table.rows = h2h
        .fixtures
        .iter()
        .map(|f| {
            vec![
                Cell::text(&f.game_id),
                Cell::text(
                    f.date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "N/A".into()),
                ),
                Cell::text(if f.a_won { &h2h.a } else { &h2h.b }),
                Cell::text(f.a_champion.as_deref().unwrap_or("-")),
                Cell::text(f.b_champion.as_deref().unwrap_or("-")),
            ]
        })
        .collect();
    table
}

pub fn count_win_rate_table(title: &str, label: &str, counts: &[CountWinRate]) -> TableData {
    let mut table = TableData::new(title, &[label, "Win%", "Games"]);
    table.rows = counts
        .iter()
        .map(|c| {
            vec![
                Cell::Count(c.count as usize),
                Cell::Percent(c.win_rate),
                Cell::Count(c.games),
            ]
        })
        .collect();
    table
}

/// Rows of a generic aggregation, one column per metric.
pub fn summary_table(title: &str, key_label: &str, metrics: &[Metric], rows: &[SummaryRow]) -> TableData {
    let labels: Vec<String> = metrics.iter().map(Metric::label).collect();
    let mut columns: Vec<&str> = vec![key_label, "Games"];
    columns.extend(labels.iter().map(String::as_str));

    let mut table = TableData::new(title, &columns);
    table.rows = rows
        .iter()
        .map(|r| {
            let mut row = vec![Cell::text(&r.key), Cell::Count(r.games)];
            row.extend(metrics.iter().map(|m| Cell::metric(*m, r.get(*m))));
            row
        })
        .collect();
    table
}
