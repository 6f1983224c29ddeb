// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Statistics and plot screens.

use crossterm::event::KeyCode;
use ratatui::{
    prelude::*,
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table,
    },
};

use crate::analysis::{numeric_values, AnalysisError, Histogram, SliceSelection, Statistics};
use crate::backend::LoadError;
use crate::model::{DataTree, Variable};
use crate::render::text::{clip, columns, spread_indices};
use crate::render::{viridis, HeatmapGrid, HeatmapPlot, LinePlot, PlotError, PlotModel};

use super::theme::{Tone, TuiTheme};

const Y_TICK_MAX_WIDTH: usize = 12;
const SLICE_PAGE_STEP: isize = 10;

pub(super) fn lookup<'a>(
    data: &'a DataTree,
    group: &str,
    name: &str,
) -> Result<(&'a DataTree, &'a Variable), LoadError> {
    let tree = data.get(group).ok_or_else(|| LoadError::NotFound(format!("group '{group}'")))?;
    let var = tree.variable(name).ok_or_else(|| LoadError::NotFound(format!("variable '{name}'")))?;
    Ok((tree, var))
}

#[derive(Debug, Clone)]
pub(super) struct StatsView {
    pub(super) name: String,
    pub(super) stats: Statistics,
    pub(super) histogram: Histogram,
}

impl StatsView {
    pub(super) fn new(var: &Variable, bins: usize) -> Result<Self, AnalysisError> {
        let values = numeric_values(var)?;
        Ok(Self {
            name: var.name().to_owned(),
            stats: Statistics::compute(values),
            histogram: Histogram::compute(values.iter(), bins)?,
        })
    }
}

#[derive(Debug, Clone)]
pub(super) struct PlotView {
    pub(super) group: String,
    pub(super) name: String,
    pub(super) selection: Option<SliceSelection>,
    pub(super) model: PlotModel,
}

impl PlotView {
    pub(super) fn open(data: &DataTree, group: &str, name: &str) -> Result<Self, PlotError> {
        let (tree, var) = lookup(data, group, name)?;
        let selection = if var.ndim() > 2 { Some(SliceSelection::new(var)?) } else { None };
        let model = PlotModel::for_variable(tree, var, selection.as_ref())?;
        Ok(Self { group: group.to_owned(), name: name.to_owned(), selection, model })
    }

    pub(super) fn rebuild(&mut self, data: &DataTree) -> Result<(), PlotError> {
        let (tree, var) = lookup(data, &self.group, &self.name)?;
        self.model = PlotModel::for_variable(tree, var, self.selection.as_ref())?;
        Ok(())
    }

    /// Applies a slice key; returns whether the plot must be rebuilt.
    pub(super) fn handle_key(&mut self, code: KeyCode) -> bool {
        let Some(selection) = self.selection.as_mut() else {
            return false;
        };
        let before = selection.clone();
        match code {
            KeyCode::Char('y') => selection.cycle_y_dim(),
            KeyCode::Char('x') => selection.cycle_x_dim(),
            KeyCode::Tab => selection.cycle_active(),
            KeyCode::Left | KeyCode::Char('h') => selection.step_active(-1),
            KeyCode::Right | KeyCode::Char('l') => selection.step_active(1),
            KeyCode::PageDown => selection.step_active(SLICE_PAGE_STEP),
            KeyCode::PageUp => selection.step_active(-SLICE_PAGE_STEP),
            _ => return false,
        }
        // Tab only moves the marker; the matrix is unchanged.
        *selection != before && !matches!(code, KeyCode::Tab)
    }
}

pub(super) fn draw_statistics(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &StatsView,
    theme: &TuiTheme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border_style(true))
        .title(format!("─ Statistics for {} ", view.name))
        .style(theme.base_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner);
    draw_histogram(frame, panes[0], view, theme);
    draw_stats_table(frame, panes[1], view, theme);
}

fn draw_histogram(frame: &mut Frame<'_>, area: Rect, view: &StatsView, theme: &TuiTheme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border_style(false))
        .title(format!(" Histogram of {} ", view.name));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let histogram = view.histogram.regroup(usize::from(rows[0].width));
    let bar_width = histogram_bar_width(rows[0].width, histogram.bins());
    let bars: Vec<Bar<'_>> = histogram
        .counts
        .iter()
        .map(|count| Bar::default().value(*count).text_value(String::new()))
        .collect();
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(0)
        .bar_style(theme.base_style().fg(theme.chart_color()))
        .max(histogram.max_count().max(1));
    frame.render_widget(chart, rows[0]);

    let (lo, hi) = match (histogram.edges.first(), histogram.edges.last()) {
        (Some(lo), Some(hi)) => (format!("{lo:.4}"), format!("{hi:.4}")),
        _ => (String::new(), String::new()),
    };
    let width = usize::from(rows[1].width);
    let gap = width.saturating_sub(columns(&lo) + columns(&hi));
    let edges = format!("{lo}{}{hi}", " ".repeat(gap));
    frame.render_widget(Paragraph::new(clip(&edges, width)), rows[1]);

    let axis = Line::from(vec![
        Span::styled("Value", theme.tone_style(Tone::Key)),
        Span::styled(" vs ", theme.tone_style(Tone::Muted)),
        Span::styled(
            format!("Frequency (max {})", histogram.max_count()),
            theme.tone_style(Tone::Count),
        ),
    ]);
    frame.render_widget(Paragraph::new(axis).alignment(Alignment::Center), rows[2]);
}

/// Widest bars that still fit every bin into `width` columns.
fn histogram_bar_width(width: u16, bins: usize) -> u16 {
    if bins == 0 {
        return 1;
    }
    let per_bin = usize::from(width) / bins;
    per_bin.clamp(1, usize::from(u16::MAX)) as u16
}

fn draw_stats_table(frame: &mut Frame<'_>, area: Rect, view: &StatsView, theme: &TuiTheme) {
    let rows: Vec<Row<'_>> = view
        .stats
        .formatted_rows()
        .into_iter()
        .map(|(label, value)| {
            Row::new(vec![
                Cell::from(label).style(theme.tone_style(Tone::Key)),
                Cell::from(value),
            ])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Length(18), Constraint::Min(8)])
        .header(Row::new(vec!["Statistic", "Value"]).style(theme.header_style()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.panel_border_style(false))
                .title(" Summary "),
        );
    frame.render_widget(table, area);
}

pub(super) fn draw_plot(frame: &mut Frame<'_>, area: Rect, view: &PlotView, theme: &TuiTheme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border_style(true))
        .title(format!("─ {} ", view.model.title()))
        .style(theme.base_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let header_height = if view.selection.is_some() { 2 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(header_height), Constraint::Min(0)])
        .split(inner);
    if let Some(selection) = &view.selection {
        frame.render_widget(Paragraph::new(slice_header_lines(selection, theme)), rows[0]);
    }

    match &view.model {
        PlotModel::Line(plot) => draw_line_plot(frame, rows[1], plot, theme),
        PlotModel::Heatmap(plot) => draw_heatmap(frame, rows[1], plot, theme),
    }
}

fn slice_header_lines(selection: &SliceSelection, theme: &TuiTheme) -> Vec<Line<'static>> {
    let dim = |idx: usize| selection.dim_name(idx).unwrap_or_default().to_owned();
    let axes = Line::from(vec![
        Span::styled("Y Dimension: ", theme.footer_label_style()),
        Span::styled(dim(selection.y_dim()), theme.tone_style(Tone::Dims)),
        Span::styled("  X Dimension: ", theme.footer_label_style()),
        Span::styled(dim(selection.x_dim()), theme.tone_style(Tone::Dims)),
    ]);

    let mut spans = vec![Span::styled("Slice Position:", theme.footer_label_style())];
    for idx in selection.slice_dims() {
        let position = selection.position(idx).unwrap_or(0);
        let last = selection.size(idx).unwrap_or(1).saturating_sub(1);
        let text = format!(" {}={position}/{last}", dim(idx));
        let style = if selection.active_dim() == Some(idx) {
            theme.selection_style()
        } else {
            theme.tone_style(Tone::Count)
        };
        spans.push(Span::styled(text, style));
    }
    vec![axes, Line::from(spans)]
}

fn draw_line_plot(frame: &mut Frame<'_>, area: Rect, plot: &LinePlot, theme: &TuiTheme) {
    let points = plot.points();
    let [x_lo, x_hi] = plot.x_bounds();
    let [y_lo, y_hi] = plot.y_bounds();
    let dataset = Dataset::default()
        .name(plot.y_label.clone())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.base_style().fg(theme.chart_color()))
        .data(&points);
    let muted = theme.tone_style(Tone::Muted);
    let chart = Chart::new(vec![dataset])
        .style(theme.base_style())
        .x_axis(
            Axis::default()
                .title(plot.x_label.clone())
                .style(muted)
                .bounds([x_lo, x_hi])
                .labels(axis_labels(x_lo, x_hi)),
        )
        .y_axis(
            Axis::default()
                .title(plot.y_label.clone())
                .style(muted)
                .bounds([y_lo, y_hi])
                .labels(axis_labels(y_lo, y_hi)),
        );
    frame.render_widget(chart, area);
}

fn axis_labels(lo: f64, hi: f64) -> Vec<String> {
    let mid = (lo + hi) / 2.0;
    vec![format!("{lo:.4}"), format!("{mid:.4}"), format!("{hi:.4}")]
}

fn draw_heatmap(frame: &mut Frame<'_>, area: Rect, plot: &HeatmapPlot, theme: &TuiTheme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let tick_width = plot
        .y_ticks
        .iter()
        .map(|tick| columns(tick))
        .max()
        .unwrap_or(0)
        .min(Y_TICK_MAX_WIDTH) as u16;
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(tick_width + 1), Constraint::Min(0)])
        .split(rows[1]);
    let grid_area = panes[1];

    let muted = theme.tone_style(Tone::Muted);
    frame.render_widget(Paragraph::new(Span::styled(plot.y_label.clone(), muted)), rows[0]);

    let grid = HeatmapGrid::resample(
        &plot.z,
        usize::from(grid_area.width),
        usize::from(grid_area.height) * 2,
    );
    frame.render_widget(HeatmapWidget { grid: &grid }, grid_area);

    let y_lines: Vec<Line<'_>> = {
        let mut lines = vec![Line::from(""); usize::from(grid_area.height)];
        for (row, label) in axis_ticks(&plot.y_ticks, usize::from(grid_area.height), 1, true) {
            let label = clip(label, usize::from(tick_width));
            let label = format!("{label:>w$}", w = usize::from(tick_width));
            lines[row] = Line::from(Span::styled(label, muted));
        }
        lines
    };
    frame.render_widget(Paragraph::new(y_lines), panes[0]);

    let x_area = Rect { x: grid_area.x, width: grid_area.width, ..rows[2] };
    let x_line = x_tick_line(&plot.x_ticks, usize::from(grid_area.width));
    frame.render_widget(Paragraph::new(Span::styled(x_line, muted)), x_area);

    let mut legend = vec![
        Span::styled(plot.x_label.clone(), muted),
        Span::raw("   "),
        Span::styled(format!("{:.4} ", grid.min), muted),
    ];
    for step in 0..8 {
        let (r, g, b) = viridis(f64::from(step) / 7.0);
        legend.push(Span::styled("█", Style::default().fg(Color::Rgb(r, g, b))));
    }
    legend.push(Span::styled(format!(" {:.4}", grid.max), muted));
    frame.render_widget(Paragraph::new(Line::from(legend)).alignment(Alignment::Center), rows[3]);
}

/// `(cell, label)` pairs for tick labels along an axis of `cells` terminal cells.
///
/// `min_gap` is the number of cells one label needs; `flip` puts the first label at the end
/// of the axis (the bottom of a heatmap).
fn axis_ticks(labels: &[String], cells: usize, min_gap: usize, flip: bool) -> Vec<(usize, &str)> {
    let len = labels.len();
    if len == 0 || cells == 0 {
        return Vec::new();
    }
    let max = (cells / min_gap.max(1)).max(1);
    spread_indices(len, max)
        .into_iter()
        .map(|idx| {
            let slot = if flip { len - 1 - idx } else { idx };
            let cell = (slot * cells + cells / 2) / len;
            (cell.min(cells - 1), labels[idx].as_str())
        })
        .collect()
}

/// Tick labels laid out on one line of `width` cells, skipping labels that would overlap.
fn x_tick_line(labels: &[String], width: usize) -> String {
    let label_width = labels.iter().map(|label| columns(label)).max().unwrap_or(1);
    let mut line = vec![' '; width];
    let mut free_from = 0usize;
    for (cell, label) in axis_ticks(labels, width, label_width + 1, false) {
        let len = columns(label);
        let start = cell.saturating_sub(len / 2).min(width.saturating_sub(len));
        if start < free_from || start + len > width {
            continue;
        }
        for (offset, ch) in label.chars().enumerate() {
            line[start + offset] = ch;
        }
        free_from = start + len + 1;
    }
    line.into_iter().collect()
}

/// Draws a [`HeatmapGrid`] with upper half blocks, two grid rows per terminal row.
struct HeatmapWidget<'a> {
    grid: &'a HeatmapGrid,
}

impl Widget for HeatmapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let color = |value: Option<f64>| match value {
            Some(value) => {
                let (r, g, b) = viridis(value);
                Color::Rgb(r, g, b)
            }
            None => Color::Reset,
        };
        for row in 0..area.height {
            for col in 0..area.width {
                let top = self.grid.get(usize::from(col), usize::from(row) * 2);
                let bottom = self.grid.get(usize::from(col), usize::from(row) * 2 + 1);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_char('▀').set_fg(color(top)).set_bg(color(bottom));
                }
            }
        }
    }
}
