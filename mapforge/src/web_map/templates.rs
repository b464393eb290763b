//! HTML fragments of the interactive map page, filled in with `strfmt`.

use std::collections::HashMap;

use crate::error::MapError;

pub(crate) const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<title>{page_title}</title>
{assets}
<style>
html, body {{ width: 100%; height: 100%; margin: 0; padding: 0; }}
#map {{ position: absolute; top: 0; bottom: 0; right: 0; left: 0; }}
</style>
</head>
<body>
<div id="map"></div>
{fixed_elements}
<script>
{script}
</script>
</body>
</html>
"#;

pub(crate) const STYLESHEET: &str = r#"<link rel="stylesheet" href="{href}"/>"#;

pub(crate) const SCRIPT_ASSET: &str = r#"<script src="{src}"></script>"#;

pub(crate) const LEGEND: &str = r#"<div id="mapLegend" style="position: fixed; bottom: 50px; left: 50px; width: 200px; z-index: 9999; background-color: white; border: 2px solid grey; font-size: 14px; padding: 10px;">
<b>Legend</b><br>
{items}</div>"#;

pub(crate) const LEGEND_ITEM: &str = r#"<i style="background:{color};width:18px;height:18px;float:left;margin-right:8px;"></i>{label}<br>
"#;

pub(crate) const TITLE: &str = r#"<div id="mapTitle" style="position: fixed; top: 10px; left: 50%; transform: translateX(-50%); z-index: 9999; font-size: 20px; font-weight: bold; background-color: rgba(255, 255, 255, 0.7); padding: 5px 10px; border-radius: 5px; text-align: center;">{title}<br><span id="layerTitle" style="font-size: 14px; font-weight: normal;">Showing: All layers</span></div>"#;

/// Keeps the subtitle in sync with the overlay toggled last.
pub(crate) const TITLE_SCRIPT: &str = r#"map.on('overlayadd', function (e) {
    document.getElementById('layerTitle').textContent = 'Showing: ' + e.name;
});
map.on('overlayremove', function () {
    document.getElementById('layerTitle').textContent = 'Showing: All layers';
});"#;

pub(crate) const ESCAPE_FUNCTION: &str = r#"function escapeHtml(value) {
    return String(value)
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;')
        .replace(/'/g, '&#39;');
}"#;

pub(crate) const LAT_LNG_POPUP: &str = r#"var latLngPopup = L.popup();
map.on('click', function (e) {
    latLngPopup
        .setLatLng(e.latlng)
        .setContent('Latitude: ' + e.latlng.lat.toFixed(4) + '<br>Longitude: ' + e.latlng.lng.toFixed(4))
        .openOn(map);
});"#;

/// Fills `{name}` placeholders of the template.
pub(crate) fn fill(template: &str, vars: &[(&str, String)]) -> Result<String, MapError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();

    strfmt::strfmt(template, &vars).map_err(|err| MapError::Encode(err.to_string()))
}

/// Escapes text for HTML element content and quoted attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    escaped
}

/// Serializes a value as a JavaScript literal that is safe inside a `<script>` element.
pub(crate) fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, MapError> {
    let json = serde_json::to_string(value).map_err(|err| MapError::Encode(err.to_string()))?;
    Ok(json.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_keeps_escaped_braces() {
        let html = fill(PAGE, &[
            ("page_title", "T".into()),
            ("assets", String::new()),
            ("fixed_elements", String::new()),
            ("script", "var a = {};".into()),
        ])
        .unwrap();

        assert!(html.contains("<title>T</title>"));
        assert!(html.contains("html, body { width: 100%;"));
        assert!(html.contains("var a = {};"));
    }

    #[test]
    fn fill_reports_missing_values() {
        assert!(fill(LEGEND, &[]).is_err());
    }

    #[test]
    fn escaping() {
        assert_eq!(
            escape_html(r#"<b>"Rivers" & 'lakes'</b>"#),
            "&lt;b&gt;&quot;Rivers&quot; &amp; &#39;lakes&#39;&lt;/b&gt;"
        );
        assert_eq!(
            script_json("</script><script>").unwrap(),
            r#""<\/script><script>""#
        );
    }
}
