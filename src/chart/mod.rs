pub mod merge;
pub mod option;

use crate::chart::option::ChartOption;
use chrono::{DateTime, Utc};

const MIN_ZOOM_SPAN: f64 = 5.0;
const ZOOM_STEP: f64 = 0.8;
const PAN_STEP: f64 = 0.1;

/// Visible slice of the x range, in percent of the full range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomWindow {
    pub start: f64,
    pub end: f64,
}

impl Default for ZoomWindow {
    fn default() -> Self {
        Self { start: 0.0, end: 100.0 }
    }
}

impl ZoomWindow {
    fn clamped(start: f64, end: f64) -> Self {
        let start = start.clamp(0.0, 100.0);
        let end = end.clamp(0.0, 100.0);
        if end - start < MIN_ZOOM_SPAN {
            let start = start.min(100.0 - MIN_ZOOM_SPAN);
            return Self { start, end: start + MIN_ZOOM_SPAN };
        }
        Self { start, end }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Apply the window to an absolute `[min, max]` range.
    pub fn apply(&self, [min, max]: [f64; 2]) -> [f64; 2] {
        let width = max - min;
        [min + width * self.start / 100.0, min + width * self.end / 100.0]
    }
}

/// The long-lived chart instance.
///
/// Each refresh replaces the whole option set; the zoom window and legend
/// scroll position are viewer state and survive replacement and clearing.
#[derive(Debug, Default)]
pub struct ScoreChart {
    option: ChartOption,
    zoom: Option<ZoomWindow>,
    legend_offset: usize,
}

impl ScoreChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_option(&mut self, option: ChartOption) {
        if self.zoom.is_none() {
            // The first option seeds the window from its slider settings.
            self.zoom = option
                .data_zoom
                .first()
                .map(|dz| ZoomWindow::clamped(dz.start, dz.end));
        }
        self.legend_offset = self
            .legend_offset
            .min(option.series.len().saturating_sub(1));
        self.option = option;
    }

    /// Drop everything plotted. The instance itself stays usable.
    pub fn clear(&mut self) {
        self.option = ChartOption::default();
    }

    pub fn option(&self) -> &ChartOption {
        &self.option
    }

    pub fn is_empty(&self) -> bool {
        self.option.series.is_empty()
    }

    pub fn zoom(&self) -> ZoomWindow {
        self.zoom.unwrap_or_default()
    }

    pub fn legend_offset(&self) -> usize {
        self.legend_offset
    }

    pub fn zoom_in(&mut self) {
        self.rescale(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.rescale(1.0 / ZOOM_STEP);
    }

    pub fn pan_left(&mut self) {
        self.pan(-PAN_STEP);
    }

    pub fn pan_right(&mut self) {
        self.pan(PAN_STEP);
    }

    /// The legend lists one entry per series.
    pub fn scroll_legend(&mut self, delta: isize) {
        let max = self.option.series.len().saturating_sub(1);
        self.legend_offset = self.legend_offset.saturating_add_signed(delta).min(max);
    }

    fn rescale(&mut self, factor: f64) {
        let zoom = self.zoom();
        let center = (zoom.start + zoom.end) / 2.0;
        let half = zoom.span() * factor / 2.0;
        if half >= 50.0 {
            self.zoom = Some(ZoomWindow::default());
            return;
        }
        let (mut start, mut end) = (center - half, center + half);
        if start < 0.0 {
            end -= start;
            start = 0.0;
        }
        if end > 100.0 {
            start -= end - 100.0;
            end = 100.0;
        }
        self.zoom = Some(ZoomWindow::clamped(start, end));
    }

    fn pan(&mut self, fraction: f64) {
        let zoom = self.zoom();
        let span = zoom.span();
        let start = (zoom.start + span * fraction).clamp(0.0, 100.0 - span);
        self.zoom = Some(ZoomWindow { start, end: start + span });
    }

    /// Full time range in seconds since the epoch: every series, narrowed or
    /// widened by the x axis `min`/`max`, which are epoch milliseconds.
    pub fn x_range(&self) -> Option<[f64; 2]> {
        let mut points = self.points().map(|(x, _)| x);
        let first = points.next()?;
        let (data_min, data_max) = points.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)));

        let axis = self.option.x_axis.first();
        let min = axis.and_then(|a| a.min).map_or(data_min, |ms| ms / 1000.0);
        let max = axis.and_then(|a| a.max).map_or(data_max, |ms| ms / 1000.0);
        if max <= min {
            return Some([min - 60.0, min + 60.0]);
        }
        Some([min, max])
    }

    /// Time range currently shown after zooming.
    pub fn visible_x_range(&self) -> Option<[f64; 2]> {
        self.x_range().map(|range| self.zoom().apply(range))
    }

    /// Value range of what is on screen, starting at zero unless the y axis
    /// says otherwise. Points just outside the window count when a line
    /// segment from them crosses into it.
    pub fn y_range(&self) -> [f64; 2] {
        let window = self.visible_x_range();
        let (data_min, data_max) = self
            .option
            .series
            .iter()
            .flat_map(|s| visible_values(&s.data, window))
            .fold((0f64, 0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));

        let axis = self.option.y_axis.first();
        let min = axis.and_then(|a| a.min).unwrap_or(data_min);
        let max = axis.and_then(|a| a.max).unwrap_or(data_max);
        if max <= min {
            return [min, min + 1.0];
        }
        [min, max]
    }

    fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.option
            .series
            .iter()
            .flat_map(|s| s.data.iter())
            .map(|(date, v)| (date.timestamp() as f64, *v as f64))
    }
}

fn visible_values(
    data: &[(DateTime<Utc>, i64)],
    window: Option<[f64; 2]>,
) -> impl Iterator<Item = f64> + '_ {
    let x = move |i: usize| data[i].0.timestamp() as f64;
    let overlaps = move |a: f64, b: f64| match window {
        Some([lo, hi]) => a.min(b) <= hi && a.max(b) >= lo,
        None => true,
    };
    (0..data.len())
        .filter(move |&i| {
            overlaps(x(i), x(i))
                || (i > 0 && overlaps(x(i - 1), x(i)))
                || (i + 1 < data.len() && overlaps(x(i), x(i + 1)))
        })
        .map(move |i| data[i].1 as f64)
}
