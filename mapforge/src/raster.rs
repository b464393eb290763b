//! Decoded raster grids and their conversion into images.

use image::{Rgba, RgbaImage};
use mapforge_types::{Color, Rect};

/// Colormap applied to single band rasters.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Colormap {
    /// Black to white.
    Gray,
    /// Perceptually uniform dark blue to yellow map.
    #[default]
    Viridis,
}

impl Colormap {
    /// Parses a colormap name. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "gray" | "grey" | "greys_r" => Some(Self::Gray),
            "viridis" => Some(Self::Viridis),
            _ => None,
        }
    }

    /// Color at the normalized position `t` in `0..=1`.
    pub fn color_at(&self, t: f64) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Colormap::Gray => {
                let v = (t * 255.0).round() as u8;
                Color::rgba(v, v, v, 255)
            }
            Colormap::Viridis => {
                let scaled = t * (VIRIDIS.len() - 1) as f64;
                let index = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
                let frac = scaled - index as f64;
                let from = VIRIDIS[index];
                let to = VIRIDIS[index + 1];
                let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
                Color::rgba(
                    mix(from[0], to[0]),
                    mix(from[1], to[1]),
                    mix(from[2], to[2]),
                    255,
                )
            }
        }
    }
}

const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

/// Raster grid with interleaved band samples.
///
/// Row 0 is the northern (top) edge of `extent`.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: u32,
    height: u32,
    bands: u32,
    samples: Vec<f64>,
    extent: Rect,
    nodata: Option<f64>,
}

impl Raster {
    /// Creates a raster. Returns `None` if the number of samples does not match the dimensions.
    pub fn new(
        width: u32,
        height: u32,
        bands: u32,
        samples: Vec<f64>,
        extent: Rect,
        nodata: Option<f64>,
    ) -> Option<Self> {
        let expected = width as usize * height as usize * bands as usize;
        if bands == 0 || samples.len() != expected {
            return None;
        }

        Some(Self {
            width,
            height,
            bands,
            samples,
            extent,
            nodata,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bands.
    pub fn bands(&self) -> u32 {
        self.bands
    }

    /// Extent in data coordinates.
    pub fn extent(&self) -> Rect {
        self.extent
    }

    /// Value marking missing pixels.
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Sample value of a band at the pixel.
    pub fn sample(&self, x: u32, y: u32, band: u32) -> f64 {
        let index = ((y as usize * self.width as usize + x as usize) * self.bands as usize)
            + band as usize;
        self.samples[index]
    }

    fn is_nodata(&self, value: f64) -> bool {
        !value.is_finite() || self.nodata.is_some_and(|nodata| nodata == value)
    }

    fn band_range(&self, band: u32) -> Option<(f64, f64)> {
        self.samples
            .iter()
            .skip(band as usize)
            .step_by(self.bands as usize)
            .copied()
            .filter(|v| !self.is_nodata(*v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })
    }

    /// Converts the raster into an image.
    ///
    /// Rasters with three or more bands are shown as RGB with every band stretched to its own
    /// value range, the rest are shown through the colormap using the first band. Nodata pixels
    /// are transparent. `alpha` is applied to every other pixel.
    pub fn to_image(&self, colormap: Colormap, alpha: f64) -> RgbaImage {
        let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        let rgb = self.bands >= 3;
        let channels = if rgb { 3 } else { 1 };
        let ranges: Vec<_> = (0..channels).map(|band| self.band_range(band)).collect();

        let normalize = |value: f64, band: usize| match ranges[band] {
            Some((min, max)) if max > min => (value - min) / (max - min),
            _ => 0.0,
        };

        RgbaImage::from_fn(self.width, self.height, |x, y| {
            if (0..channels).any(|band| self.is_nodata(self.sample(x, y, band))) {
                return Rgba([0, 0, 0, 0]);
            }

            if rgb {
                let channel = |band: u32| {
                    (normalize(self.sample(x, y, band), band as usize) * 255.0).round() as u8
                };
                Rgba([channel(0), channel(1), channel(2), alpha])
            } else {
                let color = colormap.color_at(normalize(self.sample(x, y, 0), 0));
                Rgba([color.r(), color.g(), color.b(), alpha])
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Raster {
        Raster::new(
            2,
            2,
            1,
            vec![0.0, 1.0, 2.0, -9999.0],
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Some(-9999.0),
        )
        .unwrap()
    }

    #[test]
    fn rejects_wrong_sample_count() {
        assert!(Raster::new(2, 2, 1, vec![0.0; 3], Rect::new(0.0, 0.0, 1.0, 1.0), None).is_none());
        assert!(Raster::new(1, 1, 0, vec![], Rect::new(0.0, 0.0, 1.0, 1.0), None).is_none());
    }

    #[test]
    fn gray_stretch_ignores_nodata() {
        let image = gradient().to_image(Colormap::Gray, 1.0);
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([128, 128, 128, 255]));
        assert_eq!(image.get_pixel(0, 1), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn rgb_bands() {
        let raster = Raster::new(
            2,
            1,
            3,
            vec![0.0, 10.0, 5.0, 100.0, 20.0, 5.0],
            Rect::new(0.0, 0.0, 2.0, 1.0),
            None,
        )
        .unwrap();

        let image = raster.to_image(Colormap::Viridis, 0.5);
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 128]));
        assert_eq!(image.get_pixel(1, 0), &Rgba([255, 255, 0, 128]));
    }

    #[test]
    fn viridis_ends() {
        assert_eq!(Colormap::Viridis.color_at(0.0), Color::rgba(68, 1, 84, 255));
        assert_eq!(Colormap::Viridis.color_at(1.0), Color::rgba(253, 231, 37, 255));
        assert_eq!(Colormap::from_name("Greys_r"), Some(Colormap::Gray));
        assert_eq!(Colormap::from_name("jet"), None);
    }
}
