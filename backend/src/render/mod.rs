//! Plotly figure for the trade balance map.
//!
//! The map holds no business rules: colors and sizes arrive precomputed on
//! the points. This module only lays them out as a `scattergeo` figure and,
//! for the CLI, wraps the figure in a self-contained HTML page that loads
//! Plotly from its CDN.

use serde_json::{json, Value};

use crate::error::RenderResult;
use crate::models::{HomeMarker, PlottablePoint, Selection};

/// Page heading.
pub const MAP_HEADING: &str = "PET Trade Balance Map (Europe + World)";

/// Shown instead of a map while nothing is selected.
pub const SELECTION_PROMPT: &str = "Select one or more countries to analyze";

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Diameter in pixels the largest partner marker maps to.
const MAX_MARKER_PX: f64 = 40.0;
/// Smallest rendered partner marker, so zero-trade partners stay visible.
const MIN_MARKER_PX: f64 = 4.0;
const HOME_MARKER_PX: f64 = 10.0;
const HOME_MARKER_COLOR: &str = "blue";

/// `PET Trade Balance – Austria, Slovenia`
pub fn map_title(selection: &Selection) -> String {
    format!("PET Trade Balance – {}", selection.joined())
}

/// Plotly `sizeref` for area-scaled markers: the largest size maps to
/// [`MAX_MARKER_PX`]. All-zero sizes fall back to 1 and render at the minimum.
pub fn size_ref(points: &[PlottablePoint]) -> f64 {
    let max = points.iter().map(|p| p.size).fold(0.0_f64, f64::max);
    if max > 0.0 {
        2.0 * max / MAX_MARKER_PX.powi(2)
    } else {
        1.0
    }
}

/// Build the figure: trace 0 holds the partners, then one trace per home marker.
pub fn figure(title: &str, points: &[PlottablePoint], home_markers: &[HomeMarker]) -> Value {
    let mut traces = vec![partner_trace(points)];
    traces.extend(home_markers.iter().map(home_trace));

    json!({
        "data": traces,
        "layout": {
            "title": { "text": title },
            "showlegend": false,
            "geo": {
                "scope": "world",
                "projection": { "type": "natural earth" },
                "showland": true,
                "showcountries": true,
                "landcolor": "rgb(243, 243, 243)",
                "countrycolor": "black"
            }
        }
    })
}

fn partner_trace(points: &[PlottablePoint]) -> Value {
    json!({
        "type": "scattergeo",
        "mode": "markers",
        "name": "Partners",
        "lon": points.iter().map(|p| p.lon).collect::<Vec<_>>(),
        "lat": points.iter().map(|p| p.lat).collect::<Vec<_>>(),
        "text": points.iter().map(|p| p.text.as_str()).collect::<Vec<_>>(),
        "hoverinfo": "text",
        "marker": {
            "size": points.iter().map(|p| p.size).collect::<Vec<_>>(),
            "color": points.iter().map(|p| p.color.as_str()).collect::<Vec<_>>(),
            "line": { "width": 0.5, "color": "black" },
            "sizemode": "area",
            "sizeref": size_ref(points),
            "sizemin": MIN_MARKER_PX
        }
    })
}

fn home_trace(marker: &HomeMarker) -> Value {
    json!({
        "type": "scattergeo",
        "mode": "markers+text",
        "name": marker.country,
        "lon": [marker.lon],
        "lat": [marker.lat],
        "text": [marker.country],
        "textposition": "top center",
        "marker": { "size": HOME_MARKER_PX, "color": HOME_MARKER_COLOR }
    })
}

/// Self-contained HTML page showing the figure.
pub fn render_html(figure: &Value) -> RenderResult<String> {
    // "</" inside the script body would end the script element early
    let figure_json = serde_json::to_string(figure)?.replace("</", "<\\/");

    Ok(format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{heading}</title>
  <script src="{cdn}"></script>
  <style>
    body {{ font-family: sans-serif; margin: 0; padding: 16px; background: #fff; }}
    h1 {{ font-size: 20px; color: #212529; }}
    #map {{ width: 100%; height: 85vh; }}
  </style>
</head>
<body>
  <h1>{heading}</h1>
  <div id="map"></div>
  <script>
    var figure = {figure_json};
    Plotly.newPlot("map", figure.data, figure.layout, {{ responsive: true }});
  </script>
</body>
</html>
"##,
        heading = escape_html(MAP_HEADING),
        cdn = PLOTLY_CDN,
        figure_json = figure_json,
    ))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;

    fn point(partner: &str, size: f64, direction: Direction) -> PlottablePoint {
        PlottablePoint {
            country: "Austria".into(),
            partner: partner.into(),
            lat: 50.0,
            lon: 10.0,
            text: format!("{partner}<br>Export: 0 Kg"),
            color: direction.color().into(),
            size,
            direction,
        }
    }

    #[test]
    fn test_title_joins_selection() {
        let selection = Selection::new(["Austria", "Slovenia"]).unwrap();
        assert_eq!(map_title(&selection), "PET Trade Balance – Austria, Slovenia");
    }

    #[test]
    fn test_size_ref() {
        let points = vec![
            point("Germany", 2.0, Direction::ExportSurplus),
            point("Italy", 0.5, Direction::ImportSurplus),
        ];
        assert_eq!(size_ref(&points), 2.0 * 2.0 / 1600.0);
        assert_eq!(size_ref(&[point("Italy", 0.0, Direction::Balanced)]), 1.0);
        assert_eq!(size_ref(&[]), 1.0);
    }

    #[test]
    fn test_figure_layout() {
        let points = vec![
            point("Germany", 2.0, Direction::ExportSurplus),
            point("Italy", 0.0, Direction::Balanced),
        ];
        let homes = vec![HomeMarker {
            country: "Austria".into(),
            lat: 47.5162,
            lon: 14.5501,
        }];

        let fig = figure("PET Trade Balance – Austria", &points, &homes);

        assert_eq!(fig["data"].as_array().unwrap().len(), 2);
        let partners = &fig["data"][0];
        assert_eq!(partners["type"], "scattergeo");
        assert_eq!(partners["marker"]["color"], json!(["green", "gray"]));
        assert_eq!(partners["marker"]["sizemode"], "area");
        assert_eq!(partners["marker"]["sizemin"], 4.0);

        let home = &fig["data"][1];
        assert_eq!(home["mode"], "markers+text");
        assert_eq!(home["text"], json!(["Austria"]));
        assert_eq!(home["marker"]["color"], "blue");

        assert_eq!(fig["layout"]["title"]["text"], "PET Trade Balance – Austria");
        assert_eq!(fig["layout"]["geo"]["projection"]["type"], "natural earth");
    }

    #[test]
    fn test_html_embeds_figure() {
        let fig = figure("T", &[point("</script>", 1.0, Direction::ExportSurplus)], &[]);
        let html = render_html(&fig).unwrap();

        assert!(html.contains(MAP_HEADING));
        assert!(html.contains("Plotly.newPlot"));
        assert!(!html.contains("</script><br>"));
    }
}
