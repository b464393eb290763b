//! Static figure: layers plotted as artists on equal-aspect axes, with ticks, optional grid,
//! title and legend.

use geo_types::{Coord, Geometry};
use mapforge_types::{Color, Rect};
use nalgebra::Point2;

use crate::error::MapError;
use crate::raster::Raster;
use crate::render::text::{PlacedText, TextShaper};
use crate::render::{
    Canvas, LineCap, LinePaint, OutputFormat, Paint, PointPaint, RasterCanvas, SvgCanvas,
};
use crate::resolver::{ResolvedData, ResolvedLayer};
use crate::static_map::StaticMapOptions;
use crate::view::FigureView;

mod artist;
mod layout;
mod style;

pub use artist::{
    Artist, ArtistKind, HandleKind, LegendHandle, Stroke, GRID_ZORDER, IMAGE_ZORDER, LINE_ZORDER,
    PATCH_ZORDER,
};
pub(crate) use layout::MAX_CANVAS_SIDE;
pub use layout::{Layout, LegendEntryLayout, LegendLayout, Tick};
pub use style::{
    DrawStyle, LineStyle, DEFAULT_EDGE_WIDTH, DEFAULT_LINE_WIDTH, DEFAULT_MARKER_SIZE,
};

const AXES_LINE_WIDTH: f64 = 0.8;
const GRID_COLOR: Color = Color::from_hex("#b0b0b0");
const GRID_ALPHA: f64 = 0.5;
const LEGEND_EDGE_COLOR: Color = Color::from_hex("#cccccc");
const LEGEND_FACE_ALPHA: f64 = 0.8;
/// Legend marker diameter in points.
const LEGEND_MARKER_SIZE: f64 = 6.0;

/// Figure-level elements drawn around the layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decorations {
    /// Title above the axes.
    pub title: Option<String>,
    /// Draw grid lines at the ticks.
    pub show_grid: bool,
    /// Draw a legend of the labelled layers.
    pub add_legend: bool,
}

/// Collection of artists plotted on a single pair of axes.
#[derive(Debug, Default)]
pub struct Figure {
    artists: Vec<Artist>,
    legend_handles: Vec<LegendHandle>,
    color_index: usize,
}

/// Geometry of one layer split by the kind of artist that draws it.
#[derive(Default)]
struct GeometryParts {
    polygons: Vec<Vec<Vec<Coord<f64>>>>,
    lines: Vec<Vec<Coord<f64>>>,
    points: Vec<Coord<f64>>,
}

impl GeometryParts {
    fn add(&mut self, geometry: &Geometry<f64>) {
        match geometry {
            Geometry::Point(p) => self.points.push(p.0),
            Geometry::MultiPoint(mp) => self.points.extend(mp.iter().map(|p| p.0)),
            Geometry::Line(line) => self.lines.push(vec![line.start, line.end]),
            Geometry::LineString(ls) => self.lines.push(ls.0.clone()),
            Geometry::MultiLineString(mls) => {
                self.lines.extend(mls.iter().map(|ls| ls.0.clone()))
            }
            Geometry::Polygon(polygon) => self.add_polygon(polygon),
            Geometry::MultiPolygon(mp) => mp.iter().for_each(|p| self.add_polygon(p)),
            Geometry::Rect(rect) => self.add_polygon(&rect.to_polygon()),
            Geometry::Triangle(triangle) => self.add_polygon(&triangle.to_polygon()),
            Geometry::GeometryCollection(collection) => {
                collection.iter().for_each(|g| self.add(g))
            }
        }
    }

    fn add_polygon(&mut self, polygon: &geo_types::Polygon<f64>) {
        let rings = std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(|ring| ring.0.clone())
            .filter(|ring| !ring.is_empty())
            .collect::<Vec<_>>();
        if !rings.is_empty() {
            self.polygons.push(rings);
        }
    }

    fn is_empty(&self) -> bool {
        self.polygons.is_empty() && self.lines.is_empty() && self.points.is_empty()
    }
}

impl Figure {
    /// Creates an empty figure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Artists added so far.
    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    /// Legend entries in the order the labelled layers were drawn.
    pub fn legend_handles(&self) -> &[LegendHandle] {
        &self.legend_handles
    }

    /// Data extent of all artists, `None` when nothing has been drawn.
    pub fn data_bounds(&self) -> Option<Rect> {
        Rect::merge_all(self.artists.iter().filter_map(Artist::bounds))
    }

    /// Plots one layer on the axes.
    pub fn draw_layer(&mut self, layer: &ResolvedLayer) -> Result<(), MapError> {
        let style = DrawStyle::from_options(&layer.style)?;
        let label = layer.label.as_deref();

        match &layer.data {
            ResolvedData::Geometry(geometry) => {
                let mut parts = GeometryParts::default();
                parts.add(geometry);
                self.plot_parts(parts, &style, label);
            }
            ResolvedData::Dataset(dataset) => {
                let mut parts = GeometryParts::default();
                for feature in &dataset.features {
                    parts.add(&feature.geometry);
                }
                self.plot_parts(parts, &style, label);
            }
            ResolvedData::Raster(raster) => self.show_raster(raster, &style),
        }

        Ok(())
    }

    fn next_color(&mut self) -> Color {
        let color = Color::cycle(self.color_index);
        self.color_index += 1;
        color
    }

    fn plot_parts(&mut self, parts: GeometryParts, style: &DrawStyle, label: Option<&str>) {
        if parts.is_empty() {
            log::debug!("Layer {label:?} has no geometry to plot");
            return;
        }

        let opacity = style.opacity();
        let color = style.color.unwrap_or_else(|| self.next_color());
        let face = color.with_opacity(opacity);

        let edge_width = style.linewidth.unwrap_or(DEFAULT_EDGE_WIDTH);
        let polygon_edge = (edge_width > 0.0).then(|| Stroke {
            color: style.edge_color.unwrap_or(color).with_opacity(opacity),
            width: edge_width,
            line_style: style.line_style,
        });
        let line_stroke = Stroke {
            color: face,
            width: style.linewidth.unwrap_or(DEFAULT_LINE_WIDTH),
            line_style: style.line_style,
        };
        let marker_edge = style.edge_color.map(|edge_color| Stroke {
            color: edge_color.with_opacity(opacity),
            width: edge_width,
            line_style: LineStyle::Solid,
        });
        let marker_size = style.markersize.unwrap_or(DEFAULT_MARKER_SIZE).sqrt();

        let has_polygons = !parts.polygons.is_empty();
        let has_lines = !parts.lines.is_empty();
        let has_points = !parts.points.is_empty();

        for rings in parts.polygons {
            self.artists.push(Artist {
                kind: ArtistKind::Polygon {
                    rings,
                    face,
                    edge: polygon_edge,
                },
                zorder: style.zorder.unwrap_or(PATCH_ZORDER),
            });
        }

        for points in parts.lines {
            self.artists.push(Artist {
                kind: ArtistKind::Line {
                    points,
                    stroke: line_stroke,
                },
                zorder: style.zorder.unwrap_or(LINE_ZORDER),
            });
        }

        for position in parts.points {
            self.artists.push(Artist {
                kind: ArtistKind::Marker {
                    position,
                    color: face,
                    size: marker_size,
                    shape: style.marker,
                    edge: marker_edge,
                },
                zorder: style.zorder.unwrap_or(PATCH_ZORDER),
            });
        }

        let Some(label) = label.filter(|l| !l.is_empty() && !l.starts_with('_')) else {
            return;
        };

        let mut push_handle = |kind| {
            self.legend_handles.push(LegendHandle {
                label: label.to_string(),
                kind,
            })
        };
        if has_polygons {
            push_handle(HandleKind::Patch {
                face,
                edge: polygon_edge,
            });
        }
        if has_lines {
            push_handle(HandleKind::Line {
                stroke: line_stroke,
            });
        }
        if has_points {
            push_handle(HandleKind::Marker {
                color: face,
                shape: style.marker,
            });
        }
    }

    fn show_raster(&mut self, raster: &Raster, style: &DrawStyle) {
        let image = raster.to_image(style.colormap, style.opacity());
        self.artists.push(Artist {
            kind: ArtistKind::Image {
                image,
                extent: raster.extent(),
            },
            zorder: style.zorder.unwrap_or(IMAGE_ZORDER),
        });
    }

    /// Lays the figure out and encodes it in the given format.
    pub fn render(
        &self,
        decorations: &Decorations,
        options: &StaticMapOptions,
        shaper: &TextShaper,
        format: OutputFormat,
    ) -> Result<Vec<u8>, MapError> {
        let layout = Layout::compute(self, decorations, options, shaper)?;
        let (width, height) = layout.canvas_size;
        log::debug!("Rendering {width}x{height} px figure with {} artists", self.artists.len());

        match format {
            OutputFormat::Png | OutputFormat::Jpeg => {
                let mut canvas = RasterCanvas::new(width, height, options.background, shaper);
                self.draw(&mut canvas, &layout, decorations)?;
                canvas.encode(format)
            }
            OutputFormat::Svg => {
                let mut canvas = SvgCanvas::new(
                    width,
                    height,
                    options.dpi,
                    options.background,
                    shaper.families(),
                );
                self.draw(&mut canvas, &layout, decorations)?;
                Ok(canvas.build().into_bytes())
            }
        }
    }

    /// Draws all elements of the figure in their stacking order.
    pub fn draw(
        &self,
        canvas: &mut dyn Canvas,
        layout: &Layout,
        decorations: &Decorations,
    ) -> Result<(), MapError> {
        let axes = layout.axes();
        let px = layout.px_per_pt;

        canvas.fill_rect(axes, &Paint::fill(Color::WHITE));

        let mut artists: Vec<&Artist> = self.artists.iter().collect();
        artists.sort_by(|a, b| a.zorder.total_cmp(&b.zorder));
        let split = artists.partition_point(|a| a.zorder < GRID_ZORDER);

        canvas.set_clip(Some(axes));
        for artist in &artists[..split] {
            draw_artist(canvas, artist, &layout.view, px)?;
        }
        if decorations.show_grid {
            draw_grid(canvas, layout);
        }
        for artist in &artists[split..] {
            draw_artist(canvas, artist, &layout.view, px)?;
        }
        canvas.set_clip(None);

        let axes_line = LinePaint::solid(Color::BLACK, AXES_LINE_WIDTH * px);
        let frame = axes_line.clone().with_line_cap(LineCap::Square);
        canvas.fill_rect(axes, &Paint::fill(Color::TRANSPARENT).with_edge(frame));

        let tick_length = layout::TICK_LENGTH * px;
        for tick in &layout.x_ticks {
            canvas.draw_line(
                &[
                    Point2::new(tick.position, axes.y_max()),
                    Point2::new(tick.position, axes.y_max() + tick_length),
                ],
                &axes_line,
            );
            canvas.draw_text(&tick.label);
        }
        for tick in &layout.y_ticks {
            canvas.draw_line(
                &[
                    Point2::new(axes.x_min(), tick.position),
                    Point2::new(axes.x_min() - tick_length, tick.position),
                ],
                &axes_line,
            );
            canvas.draw_text(&tick.label);
        }

        if let Some(title) = &layout.title {
            canvas.draw_text(title);
        }

        if let Some(legend) = &layout.legend {
            draw_legend(canvas, legend, px);
        }

        Ok(())
    }
}

fn to_screen(view: &FigureView, points: &[Coord<f64>]) -> Vec<Point2<f64>> {
    points.iter().map(|p| view.map_to_screen(*p)).collect()
}

fn line_paint(stroke: &Stroke, px_per_pt: f64) -> LinePaint {
    let dash = stroke
        .line_style
        .pattern(stroke.width)
        .map(|pattern| pattern.into_iter().map(|v| v * px_per_pt).collect());
    LinePaint::solid(stroke.color, stroke.width * px_per_pt)
        .with_dash(dash)
        .with_line_cap(match stroke.line_style {
            LineStyle::Solid => LineCap::Square,
            _ => LineCap::Butt,
        })
}

fn draw_artist(
    canvas: &mut dyn Canvas,
    artist: &Artist,
    view: &FigureView,
    px_per_pt: f64,
) -> Result<(), MapError> {
    match &artist.kind {
        ArtistKind::Polygon { rings, face, edge } => {
            let rings: Vec<_> = rings.iter().map(|ring| to_screen(view, ring)).collect();
            let mut paint = Paint::fill(*face);
            if let Some(edge) = edge {
                paint = paint.with_edge(line_paint(edge, px_per_pt));
            }
            canvas.draw_polygon(&rings, &paint);
        }
        ArtistKind::Line { points, stroke } => {
            canvas.draw_line(&to_screen(view, points), &line_paint(stroke, px_per_pt));
        }
        ArtistKind::Marker {
            position,
            color,
            size,
            shape,
            edge,
        } => canvas.draw_point(
            view.map_to_screen(*position),
            &PointPaint {
                color: *color,
                size: size * px_per_pt,
                shape: *shape,
                edge: edge.as_ref().map(|e| line_paint(e, px_per_pt)),
            },
        ),
        ArtistKind::Image { image, extent } => {
            canvas.draw_image(image, view.map_rect_to_screen(*extent))?;
        }
    }

    Ok(())
}

fn draw_grid(canvas: &mut dyn Canvas, layout: &Layout) {
    let axes = layout.axes();
    let width = AXES_LINE_WIDTH * layout.px_per_pt;
    let paint = LinePaint::solid(GRID_COLOR.with_opacity(GRID_ALPHA), width)
        .with_dash(LineStyle::Dashed.pattern(AXES_LINE_WIDTH).map(|pattern| {
            pattern
                .into_iter()
                .map(|v| v * layout.px_per_pt)
                .collect()
        }));

    for tick in &layout.x_ticks {
        canvas.draw_line(
            &[
                Point2::new(tick.position, axes.y_min()),
                Point2::new(tick.position, axes.y_max()),
            ],
            &paint,
        );
    }
    for tick in &layout.y_ticks {
        canvas.draw_line(
            &[
                Point2::new(axes.x_min(), tick.position),
                Point2::new(axes.x_max(), tick.position),
            ],
            &paint,
        );
    }
}

fn draw_legend(canvas: &mut dyn Canvas, legend: &LegendLayout, px_per_pt: f64) {
    canvas.fill_rect(
        legend.frame,
        &Paint::fill(Color::WHITE.with_opacity(LEGEND_FACE_ALPHA))
            .with_edge(LinePaint::solid(LEGEND_EDGE_COLOR, AXES_LINE_WIDTH * px_per_pt)),
    );

    for entry in &legend.entries {
        let area = entry.handle_area;
        match &entry.handle.kind {
            HandleKind::Patch { face, edge } => {
                let mut paint = Paint::fill(*face);
                if let Some(edge) = edge {
                    paint = paint.with_edge(line_paint(edge, px_per_pt));
                }
                canvas.fill_rect(area, &paint);
            }
            HandleKind::Line { stroke } => {
                let y = area.center().y;
                canvas.draw_line(
                    &[Point2::new(area.x_min(), y), Point2::new(area.x_max(), y)],
                    &line_paint(stroke, px_per_pt),
                );
            }
            HandleKind::Marker { color, shape } => {
                let center = area.center();
                canvas.draw_point(
                    Point2::new(center.x, center.y),
                    &PointPaint {
                        color: *color,
                        size: LEGEND_MARKER_SIZE * px_per_pt,
                        shape: *shape,
                        edge: None,
                    },
                );
            }
        }
        draw_label(canvas, &entry.label);
    }
}

fn draw_label(canvas: &mut dyn Canvas, label: &PlacedText) {
    if !label.text.is_empty() {
        canvas.draw_text(label);
    }
}
