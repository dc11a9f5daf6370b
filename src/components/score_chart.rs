use chrono::{DateTime, Local};
use tui::buffer::Buffer;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::symbols::Marker;
use tui::text::{Line, Span};
use tui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget};

use crate::chart::ScoreChart;
use crate::chart::option::Series;

const LEGEND_SYMBOL: &str = "■ ";
const SLIDER_FILL: &str = "█";
const SLIDER_TRACK: &str = "─";
const ONE_DAY_SECS: f64 = 86_400.0;

/// Renders a [`ScoreChart`]: title, scrollable legend, the line chart itself
/// and a one-row zoom slider.
pub struct ScoreChartWidget<'a> {
    pub chart: &'a ScoreChart,
}

impl Widget for ScoreChartWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 10 || area.height < 5 {
            return;
        }
        let [title_area, legend_area, plot_area, slider_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let option = self.chart.option();
        Paragraph::new(option.title.text.as_str())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(title_alignment(&option.title.left))
            .render(title_area, buf);

        legend_line(&option.series, self.chart.legend_offset()).render(legend_area, buf);
        self.render_plot(plot_area, buf);
        slider_line(self.chart, slider_area.width).render(slider_area, buf);
    }
}

impl ScoreChartWidget<'_> {
    fn render_plot(&self, area: Rect, buf: &mut Buffer) {
        let Some(x_bounds) = self.chart.visible_x_range() else {
            Paragraph::new("No dated solves yet")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        };
        let y_bounds = self.chart.y_range();
        let option = self.chart.option();

        let points: Vec<Vec<(f64, f64)>> = option
            .series
            .iter()
            .map(|s| s.data.iter().map(|(date, total)| (date.timestamp() as f64, *total as f64)).collect())
            .collect();

        let datasets = option
            .series
            .iter()
            .zip(&points)
            .map(|(series, data)| {
                Dataset::default()
                    .name(series.name.clone())
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(parse_color(&series.item_style.color)))
                    .data(data)
            })
            .collect();

        let mut y_axis = Axis::default()
            .style(Style::default().fg(Color::DarkGray))
            .bounds(y_bounds)
            .labels(value_labels(y_bounds));
        if let Some(name) = option.y_axis.first().and_then(|a| a.name.clone()) {
            y_axis = y_axis.title(name);
        }

        let chart = Chart::new(datasets)
            .legend_position(None)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::DarkGray))
                    .bounds(x_bounds)
                    .labels(time_labels(x_bounds)),
            )
            .y_axis(y_axis);
        chart.render(area, buf);
    }
}

fn title_alignment(left: &str) -> Alignment {
    match left {
        "left" => Alignment::Left,
        "right" => Alignment::Right,
        _ => Alignment::Center,
    }
}

/// One row of legend entries, starting at `offset`.
fn legend_line(series: &[Series], offset: usize) -> Line<'static> {
    let mut spans = Vec::with_capacity(series.len() * 2 + 1);
    if offset > 0 {
        spans.push(Span::styled("‹ ", Style::default().fg(Color::DarkGray)));
    }
    for s in series.iter().skip(offset) {
        spans.push(Span::styled(LEGEND_SYMBOL, Style::default().fg(parse_color(&s.item_style.color))));
        spans.push(Span::raw(format!("{}  ", s.name)));
    }
    Line::from(spans)
}

/// The zoom window drawn as a filled segment over the full range.
fn slider_line(chart: &ScoreChart, width: u16) -> Line<'static> {
    let width = usize::from(width);
    let zoom = chart.zoom();
    let width = width.max(1);
    let start = (((zoom.start / 100.0) * width as f64).floor() as usize).min(width - 1);
    let end = (((zoom.end / 100.0) * width as f64).ceil() as usize).clamp(start + 1, width);

    let track = Style::default().fg(Color::DarkGray);
    Line::from(vec![
        Span::styled(SLIDER_TRACK.repeat(start), track),
        Span::styled(SLIDER_FILL.repeat(end - start), Style::default().fg(Color::Gray)),
        Span::styled(SLIDER_TRACK.repeat(width.saturating_sub(end)), track),
    ])
}

fn time_labels([min, max]: [f64; 2]) -> Vec<Span<'static>> {
    let format = if max - min > ONE_DAY_SECS { "%m-%d %H:%M" } else { "%H:%M" };
    [min, (min + max) / 2.0, max]
        .into_iter()
        .map(|secs| {
            let label = DateTime::from_timestamp(secs as i64, 0)
                .map(|utc| utc.with_timezone(&Local).format(format).to_string())
                .unwrap_or_default();
            Span::raw(label)
        })
        .collect()
}

fn value_labels([min, max]: [f64; 2]) -> Vec<Span<'static>> {
    [min, (min + max) / 2.0, max]
        .into_iter()
        .map(|v| Span::raw(format!("{}", v.round() as i64)))
        .collect()
}

/// Accepts the `hsl(h, s%, l%)` colors the chart generates, plus anything
/// ratatui can parse itself (`#rrggbb`, named colors).
pub fn parse_color(raw: &str) -> Color {
    parse_hsl(raw)
        .or_else(|| raw.trim().parse::<Color>().ok())
        .unwrap_or(Color::White)
}

fn parse_hsl(raw: &str) -> Option<Color> {
    let inner = raw.trim().strip_prefix("hsl(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().trim_end_matches('%').trim());
    let h: f64 = parts.next()?.parse().ok()?;
    let s: f64 = parts.next()?.parse().ok()?;
    let l: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let (r, g, b) = hsl_to_rgb(h, s / 100.0, l / 100.0);
    Some(Color::Rgb(r, g, b))
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let channel = |v: f64| ((v + m) * 255.0).round() as u8;
    (channel(r), channel(g), channel(b))
}
