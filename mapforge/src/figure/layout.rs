//! Placement of the axes, ticks, title and legend in the figure.

use mapforge_types::Rect;
use nalgebra::Point2;

use super::artist::LegendHandle;
use super::{Decorations, Figure};
use crate::error::MapError;
use crate::render::text::{
    HorizontalAlignment, PlacedText, TextShaper, TextStyle, VerticalAlignment,
};
use crate::static_map::StaticMapOptions;
use crate::view::FigureView;

/// Subplot area as fractions of the figure: left, bottom, right, top (measured from the bottom).
const SUBPLOT: [f64; 4] = [0.125, 0.11, 0.9, 0.88];
/// Fraction of the data range added on each side of the data extent.
const MARGIN: f64 = 0.05;
/// Maximum number of intervals between ticks.
const MAX_BINS: usize = 9;
const TICK_STEPS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];
/// Largest canvas side in pixels.
pub(crate) const MAX_CANVAS_SIDE: f64 = 32768.0;
/// Largest canvas area in pixels.
const MAX_CANVAS_PIXELS: f64 = 1.0e8;
/// Smallest data extent side the figure transform can resolve.
const MIN_EXTENT: f64 = 1.0e-290;

pub(crate) const TITLE_SIZE: f64 = 14.0;
pub(crate) const LABEL_SIZE: f64 = 10.0;
pub(crate) const TITLE_PAD: f64 = 6.0;
pub(crate) const TICK_LENGTH: f64 = 3.5;
pub(crate) const TICK_PAD: f64 = 3.5;

/// Tick on one of the axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Pixel coordinate along the axis (x for the horizontal axis, y for the vertical one).
    pub position: f64,
    /// Tick label.
    pub label: PlacedText,
}

/// Legend row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntryLayout {
    /// Sample to draw.
    pub handle: LegendHandle,
    /// Area of the handle sample.
    pub handle_area: Rect,
    /// Row label.
    pub label: PlacedText,
}

/// Legend box in the upper right corner of the axes.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    /// Legend frame.
    pub frame: Rect,
    /// Rows, top to bottom.
    pub entries: Vec<LegendEntryLayout>,
}

/// Positions of every figure element in pixels of the output canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Output size in pixels.
    pub canvas_size: (u32, u32),
    /// Mapping of data coordinates into the axes area.
    pub view: FigureView,
    /// Ticks along the bottom axis.
    pub x_ticks: Vec<Tick>,
    /// Ticks along the left axis.
    pub y_ticks: Vec<Tick>,
    /// Title above the axes.
    pub title: Option<PlacedText>,
    /// Legend, if requested and not empty.
    pub legend: Option<LegendLayout>,
    /// Pixels per typographic point.
    pub px_per_pt: f64,
}

impl Layout {
    /// Lays the figure out on a page of `options.figure_size` and crops the page to the drawn
    /// content plus `options.pad_inches`.
    pub fn compute(
        figure: &Figure,
        decorations: &Decorations,
        options: &StaticMapOptions,
        shaper: &TextShaper,
    ) -> Result<Self, MapError> {
        let px_per_pt = options.dpi / 72.0;
        let page_width = options.figure_size[0] * options.dpi;
        let page_height = options.figure_size[1] * options.dpi;

        let subplot = Rect::new(
            SUBPLOT[0] * page_width,
            (1.0 - SUBPLOT[3]) * page_height,
            SUBPLOT[2] * page_width,
            (1.0 - SUBPLOT[1]) * page_height,
        );
        let limits = data_limits(figure.data_bounds());
        let axes = equal_aspect_box(subplot, limits);
        if !is_drawable(limits) || !is_drawable(axes) {
            return Err(MapError::Encode(format!(
                "data extent {limits:?} cannot be mapped onto the figure"
            )));
        }
        let view = FigureView::new(limits, axes);

        let label_style = TextStyle::new(LABEL_SIZE * px_per_pt);
        let tick_offset = (TICK_LENGTH + TICK_PAD) * px_per_pt;

        let x_bins = tick_bins(axes.width() / px_per_pt, LABEL_SIZE * 3.0);
        let x_ticks = tick_labels(nice_ticks(limits.x_min(), limits.x_max(), x_bins))
            .into_iter()
            .map(|(value, text)| {
                let position = view
                    .map_to_screen(geo_types::Coord {
                        x: value,
                        y: limits.y_min(),
                    })
                    .x;
                let style = label_style
                    .clone()
                    .with_alignment(HorizontalAlignment::Center, VerticalAlignment::Top);
                let anchor = Point2::new(position, axes.y_max() + tick_offset);
                Tick {
                    position,
                    label: shaper.place(&text, anchor, &style),
                }
            })
            .collect::<Vec<_>>();

        let y_bins = tick_bins(axes.height() / px_per_pt, LABEL_SIZE * 2.0);
        let y_ticks = tick_labels(nice_ticks(limits.y_min(), limits.y_max(), y_bins))
            .into_iter()
            .map(|(value, text)| {
                let position = view
                    .map_to_screen(geo_types::Coord {
                        x: limits.x_min(),
                        y: value,
                    })
                    .y;
                let style = label_style
                    .clone()
                    .with_alignment(HorizontalAlignment::Right, VerticalAlignment::Middle);
                let anchor = Point2::new(axes.x_min() - tick_offset, position);
                Tick {
                    position,
                    label: shaper.place(&text, anchor, &style),
                }
            })
            .collect::<Vec<_>>();

        let title = decorations.title.as_deref().map(|title| {
            let style = TextStyle::new(TITLE_SIZE * px_per_pt)
                .with_alignment(HorizontalAlignment::Center, VerticalAlignment::Baseline);
            let anchor = Point2::new(axes.center().x, axes.y_min() - TITLE_PAD * px_per_pt);
            shaper.place(title, anchor, &style)
        });

        let legend = (decorations.add_legend && !figure.legend_handles().is_empty())
            .then(|| legend_layout(figure.legend_handles(), axes, px_per_pt, shaper));

        let tick_length = TICK_LENGTH * px_per_pt;
        let content = Rect::merge_all(
            [Rect::new(
                axes.x_min() - tick_length,
                axes.y_min(),
                axes.x_max(),
                axes.y_max() + tick_length,
            )]
            .into_iter()
            .chain(x_ticks.iter().chain(&y_ticks).map(|tick| tick.label.bounds))
            .chain(title.iter().map(|title| title.bounds))
            .chain(legend.iter().map(|legend| legend.frame)),
        )
        .unwrap_or(axes);

        let crop = content.expand(options.pad_inches * options.dpi);
        let origin = (crop.x_min().floor(), crop.y_min().floor());
        let width = (crop.x_max() - origin.0).ceil().max(1.0);
        let height = (crop.y_max() - origin.1).ceil().max(1.0);
        if !(width <= MAX_CANVAS_SIDE && height <= MAX_CANVAS_SIDE)
            || width * height > MAX_CANVAS_PIXELS
        {
            return Err(MapError::Encode(format!(
                "figure of {width}x{height} px exceeds the {MAX_CANVAS_SIDE} px side and \
                 {MAX_CANVAS_PIXELS} px area limits"
            )));
        }
        let canvas_size = (width as u32, height as u32);

        Ok(Self {
            canvas_size,
            view,
            x_ticks,
            y_ticks,
            title,
            legend,
            px_per_pt,
        }
        .translate(-origin.0, -origin.1))
    }

    fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            canvas_size: self.canvas_size,
            view: self.view.translate(dx, dy),
            x_ticks: self
                .x_ticks
                .into_iter()
                .map(|tick| Tick {
                    position: tick.position + dx,
                    label: translate_text(tick.label, dx, dy),
                })
                .collect(),
            y_ticks: self
                .y_ticks
                .into_iter()
                .map(|tick| Tick {
                    position: tick.position + dy,
                    label: translate_text(tick.label, dx, dy),
                })
                .collect(),
            title: self.title.map(|title| translate_text(title, dx, dy)),
            legend: self.legend.map(|legend| LegendLayout {
                frame: legend.frame.translate(dx, dy),
                entries: legend
                    .entries
                    .into_iter()
                    .map(|entry| LegendEntryLayout {
                        handle: entry.handle,
                        handle_area: entry.handle_area.translate(dx, dy),
                        label: translate_text(entry.label, dx, dy),
                    })
                    .collect(),
            }),
            px_per_pt: self.px_per_pt,
        }
    }

    /// Pixel rectangle of the axes.
    pub fn axes(&self) -> Rect {
        self.view.screen_rect()
    }
}

fn translate_text(text: PlacedText, dx: f64, dy: f64) -> PlacedText {
    PlacedText {
        origin: Point2::new(text.origin.x + dx, text.origin.y + dy),
        bounds: text.bounds.translate(dx, dy),
        ..text
    }
}

/// Legend box in the upper right corner of the axes. Sizes are in font size units.
fn legend_layout(
    handles: &[LegendHandle],
    axes: Rect,
    px_per_pt: f64,
    shaper: &TextShaper,
) -> LegendLayout {
    let font_size = LABEL_SIZE * px_per_pt;
    let border_pad = 0.4 * font_size;
    let border_axes_pad = 0.5 * font_size;
    let label_spacing = 0.5 * font_size;
    let handle_length = 2.0 * font_size;
    let handle_height = 0.7 * font_size;
    let handle_text_pad = 0.8 * font_size;

    let style = TextStyle::new(font_size)
        .with_alignment(HorizontalAlignment::Left, VerticalAlignment::Middle);
    let metrics: Vec<_> = handles
        .iter()
        .map(|handle| shaper.measure(&handle.label, &style))
        .collect();

    let row_height = metrics
        .iter()
        .map(|m| m.height())
        .fold(handle_height, f64::max);
    let label_width = metrics.iter().map(|m| m.width).fold(0.0, f64::max);

    let width = 2.0 * border_pad + handle_length + handle_text_pad + label_width;
    let rows = handles.len() as f64;
    let height = 2.0 * border_pad + rows * row_height + (rows - 1.0).max(0.0) * label_spacing;

    let x_max = axes.x_max() - border_axes_pad;
    let y_min = axes.y_min() + border_axes_pad;
    let frame = Rect::new(x_max - width, y_min, x_max, y_min + height);

    let entries = handles
        .iter()
        .enumerate()
        .map(|(index, handle)| {
            let row_center = frame.y_min()
                + border_pad
                + index as f64 * (row_height + label_spacing)
                + row_height / 2.0;
            let handle_x = frame.x_min() + border_pad;
            let handle_area = Rect::new(
                handle_x,
                row_center - handle_height / 2.0,
                handle_x + handle_length,
                row_center + handle_height / 2.0,
            );
            let anchor = Point2::new(handle_area.x_max() + handle_text_pad, row_center);

            LegendEntryLayout {
                handle: handle.clone(),
                handle_area,
                label: shaper.place(&handle.label, anchor, &style),
            }
        })
        .collect();

    LegendLayout { frame, entries }
}

/// Visible data extent: the data bounds with margins, or the unit square for an empty figure.
pub(crate) fn data_limits(bounds: Option<Rect>) -> Rect {
    let Some(bounds) = bounds else {
        return Rect::new(0.0, 0.0, 1.0, 1.0);
    };

    let (x_min, x_max) = axis_limits(bounds.x_min(), bounds.x_max());
    let (y_min, y_max) = axis_limits(bounds.y_min(), bounds.y_max());
    Rect::new(x_min, y_min, x_max, y_max)
}

fn is_drawable(rect: Rect) -> bool {
    [rect.x_min(), rect.y_min(), rect.x_max(), rect.y_max()]
        .into_iter()
        .all(f64::is_finite)
        && rect.width() >= MIN_EXTENT
        && rect.height() >= MIN_EXTENT
        && rect.width().is_finite()
        && rect.height().is_finite()
}

fn axis_limits(min: f64, max: f64) -> (f64, f64) {
    let range = max - min;
    let largest = min.abs().max(max.abs());
    if range <= largest * 1e-12 {
        if largest == 0.0 {
            return (-MARGIN, MARGIN);
        }

        return (min - MARGIN * min.abs(), max + MARGIN * max.abs());
    }

    (min - MARGIN * range, max + MARGIN * range)
}

/// Shrinks the subplot box around its center so that one data unit has the same length on both
/// axes.
pub(crate) fn equal_aspect_box(subplot: Rect, limits: Rect) -> Rect {
    let scale = (subplot.width() / limits.width()).min(subplot.height() / limits.height());
    let width = limits.width() * scale;
    let height = limits.height() * scale;
    let center = subplot.center();

    Rect::new(
        center.x - width / 2.0,
        center.y - height / 2.0,
        center.x + width / 2.0,
        center.y + height / 2.0,
    )
}

fn tick_bins(axis_length_pt: f64, label_space_pt: f64) -> usize {
    ((axis_length_pt / label_space_pt).floor() as usize).clamp(1, MAX_BINS)
}

/// Tick values at "nice" steps (1, 2, 2.5, 5 times a power of ten) inside `min..=max`, with at
/// most `bins` intervals.
pub(crate) fn nice_ticks(min: f64, max: f64, bins: usize) -> Vec<f64> {
    if !(max > min) || !min.is_finite() || !max.is_finite() || bins == 0 {
        return vec![];
    }

    let raw_step = (max - min) / bins as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    if !magnitude.is_normal() {
        return vec![];
    }
    let step = TICK_STEPS
        .iter()
        .map(|s| s * magnitude)
        .find(|s| *s >= raw_step * (1.0 - 1e-9))
        .unwrap_or(10.0 * magnitude);

    let first = (min / step - 1e-9).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Formats tick values with the number of decimals the tick step needs.
pub(crate) fn tick_labels(values: Vec<f64>) -> Vec<(f64, String)> {
    let decimals = match values.as_slice() {
        [first, second, ..] => decimals_for(second - first),
        _ => values.first().map_or(0, |v| decimals_for(*v)),
    };

    values
        .into_iter()
        .map(|value| (value, format_tick(value, decimals)))
        .collect()
}

fn decimals_for(step: f64) -> usize {
    let step = step.abs();
    (0..=12)
        .find(|d| {
            let scaled = step * 10f64.powi(*d as i32);
            (scaled - scaled.round()).abs() <= 1e-6 * scaled.max(1.0)
        })
        .unwrap_or(12)
}

fn format_tick(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$}");
    let is_zero = formatted
        .chars()
        .all(|c| c == '-' || c == '0' || c == '.');
    match formatted.strip_prefix('-') {
        Some(_) if is_zero => formatted[1..].to_string(),
        Some(rest) => format!("\u{2212}{rest}"),
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn limits_with_margins() {
        let limits = data_limits(Some(Rect::new(0.0, 0.0, 10.0, 20.0)));
        assert_abs_diff_eq!(limits.x_min(), -0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(limits.x_max(), 10.5, epsilon = 1e-9);
        assert_abs_diff_eq!(limits.y_min(), -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(limits.y_max(), 21.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_limits() {
        let limits = data_limits(Some(Rect::new(1.0, 0.0, 1.0, 0.0)));
        assert_abs_diff_eq!(limits.x_min(), 0.95, epsilon = 1e-9);
        assert_abs_diff_eq!(limits.x_max(), 1.05, epsilon = 1e-9);
        assert_abs_diff_eq!(limits.y_min(), -0.05, epsilon = 1e-9);
        assert_abs_diff_eq!(limits.y_max(), 0.05, epsilon = 1e-9);

        assert_eq!(data_limits(None), Rect::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn equal_aspect() {
        let axes = equal_aspect_box(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(0.0, 0.0, 20.0, 10.0),
        );
        assert_eq!(axes, Rect::new(0.0, 25.0, 100.0, 75.0));
    }

    #[test]
    fn ticks() {
        assert_eq!(nice_ticks(-0.5, 10.5, 9), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(0.95, 1.05, 9).len(), 5);
        assert_eq!(nice_ticks(0.0, 1.0, 9), vec![0.0, 0.2, 0.4, 0.6000000000000001, 0.8, 1.0]);
        assert!(nice_ticks(1.0, 1.0, 9).is_empty());
    }

    #[test]
    fn tick_label_format() {
        let labels: Vec<_> = tick_labels(vec![-2.5, 0.0, 2.5])
            .into_iter()
            .map(|(_, label)| label)
            .collect();
        assert_eq!(labels, vec!["\u{2212}2.5", "0.0", "2.5"]);

        let labels: Vec<_> = tick_labels(vec![-0.0, 10.0])
            .into_iter()
            .map(|(_, label)| label)
            .collect();
        assert_eq!(labels, vec!["0", "10"]);

        let labels: Vec<_> = tick_labels(nice_ticks(0.95, 1.05, 9))
            .into_iter()
            .map(|(_, label)| label)
            .collect();
        assert_eq!(labels, vec!["0.96", "0.98", "1.00", "1.02", "1.04"]);
    }
}
