//! Tile providers of the web map.

use std::str::FromStr;

use crate::error::MapError;

/// Credit line shown in the corner of the map for the tile provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    text: String,
    url: Option<String>,
}

impl Attribution {
    /// Creates an attribution with an optional link.
    pub fn new(text: impl Into<String>, url: Option<&str>) -> Self {
        Self {
            text: text.into(),
            url: url.map(String::from),
        }
    }

    /// Attribution text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Link target.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Attribution markup for the Leaflet attribution control.
    pub fn to_html(&self) -> String {
        let text = super::templates::escape_html(&self.text);
        match &self.url {
            Some(url) => format!(
                r#"&copy; <a href="{}">{text}</a>"#,
                super::templates::escape_html(url)
            ),
            None => text,
        }
    }
}

/// Background tile layer of the interactive map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Basemap {
    /// OpenStreetMap standard tiles.
    OpenStreetMap,
    /// CARTO light tiles.
    CartoDbPositron,
    /// CARTO dark tiles.
    CartoDbDarkMatter,
    /// OpenTopoMap tiles.
    OpenTopoMap,
    /// Esri satellite imagery.
    EsriWorldImagery,
    /// Tile URL template with `{z}`, `{x}` and `{y}` placeholders.
    Custom(String),
}

impl FromStr for Basemap {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let basemap = match name.to_ascii_lowercase().as_str() {
            "openstreetmap" | "osm" => Self::OpenStreetMap,
            "cartodb positron" | "cartodbpositron" => Self::CartoDbPositron,
            "cartodb dark_matter" | "cartodbdark_matter" => Self::CartoDbDarkMatter,
            "opentopomap" => Self::OpenTopoMap,
            "esri worldimagery" | "esri.worldimagery" => Self::EsriWorldImagery,
            _ if ["{z}", "{x}", "{y}"].iter().all(|p| name.contains(p)) => {
                Self::Custom(name.to_string())
            }
            _ => return Err(MapError::UnsupportedBasemap(name.to_string())),
        };

        Ok(basemap)
    }
}

impl Basemap {
    /// Leaflet tile URL template.
    pub fn tile_url(&self) -> &str {
        match self {
            Basemap::OpenStreetMap => "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
            Basemap::CartoDbPositron => {
                "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png"
            }
            Basemap::CartoDbDarkMatter => {
                "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png"
            }
            Basemap::OpenTopoMap => "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
            Basemap::EsriWorldImagery => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
            Basemap::Custom(url) => url,
        }
    }

    /// Attribution required by the tile provider.
    pub fn attribution(&self) -> Option<Attribution> {
        let attribution = match self {
            Basemap::OpenStreetMap => Attribution::new(
                "OpenStreetMap contributors",
                Some("https://www.openstreetmap.org/copyright"),
            ),
            Basemap::CartoDbPositron | Basemap::CartoDbDarkMatter => Attribution::new(
                "OpenStreetMap contributors, CARTO",
                Some("https://carto.com/attributions"),
            ),
            Basemap::OpenTopoMap => Attribution::new(
                "OpenStreetMap contributors, SRTM, OpenTopoMap (CC-BY-SA)",
                Some("https://opentopomap.org"),
            ),
            Basemap::EsriWorldImagery => Attribution::new(
                "Esri, Maxar, Earthstar Geographics, and the GIS User Community",
                None,
            ),
            Basemap::Custom(_) => return None,
        };

        Some(attribution)
    }

    /// Highest zoom level served by the provider.
    pub fn max_zoom(&self) -> u8 {
        match self {
            Basemap::OpenStreetMap => 19,
            Basemap::CartoDbPositron | Basemap::CartoDbDarkMatter => 20,
            Basemap::OpenTopoMap => 17,
            Basemap::EsriWorldImagery | Basemap::Custom(_) => 18,
        }
    }

    /// Subdomains substituted for `{s}` in the tile URL.
    pub fn subdomains(&self) -> Option<&'static str> {
        match self {
            Basemap::CartoDbPositron | Basemap::CartoDbDarkMatter => Some("abcd"),
            Basemap::OpenTopoMap => Some("abc"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_names() {
        assert_eq!("OpenStreetMap".parse::<Basemap>().unwrap(), Basemap::OpenStreetMap);
        assert_eq!(
            "cartodb POSITRON".parse::<Basemap>().unwrap(),
            Basemap::CartoDbPositron
        );
        assert_eq!(
            "CartoDB dark_matter".parse::<Basemap>().unwrap(),
            Basemap::CartoDbDarkMatter
        );
        assert_eq!(
            "Esri WorldImagery".parse::<Basemap>().unwrap(),
            Basemap::EsriWorldImagery
        );
    }

    #[test]
    fn custom_template() {
        let url = "https://tiles.example.com/{z}/{x}/{y}.png";
        let basemap: Basemap = url.parse().unwrap();
        assert_eq!(basemap.tile_url(), url);
        assert_eq!(basemap.attribution(), None);
    }

    #[test]
    fn unknown_basemap() {
        assert_matches!(
            "Stamen Watercolor".parse::<Basemap>(),
            Err(MapError::UnsupportedBasemap(name)) if name == "Stamen Watercolor"
        );
        assert_matches!(
            "https://tiles.example.com/{z}.png".parse::<Basemap>(),
            Err(MapError::UnsupportedBasemap(_))
        );
    }

    #[test]
    fn attribution_markup() {
        let attribution = Basemap::OpenStreetMap.attribution().unwrap();
        assert_eq!(attribution.url(), Some("https://www.openstreetmap.org/copyright"));
        assert_eq!(
            attribution.to_html(),
            r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap contributors</a>"#
        );
        assert_eq!(
            Attribution::new("A & B", None).to_html(),
            "A &amp; B"
        );
    }
}
