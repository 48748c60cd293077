use crate::app::page_config::PageConfig;
use crate::domain::fire_point::FirePoint;
use crate::utils::error::Result;
use crate::visuals::maps::{format_thousands, DeckSpec};

const DECK_GL_JS: &str = "https://unpkg.com/deck.gl@9.0.38/dist.min.js";
const MAPLIBRE_JS: &str = "https://unpkg.com/maplibre-gl@4.7.1/dist/maplibre-gl.js";
const MAPLIBRE_CSS: &str = "https://unpkg.com/maplibre-gl@4.7.1/dist/maplibre-gl.css";
const BASEMAP_STYLE: &str = "https://basemaps.cartocdn.com/gl/positron-gl-style/style.json";

const PREVIEW_COLUMNS: [&str; 9] = [
    "Fire ID",
    "Name",
    "Agency",
    "Year",
    "Reported",
    "Cause",
    "Size (ha)",
    "Latitude",
    "Longitude",
];

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn preview_row(fire: &FirePoint) -> [String; 9] {
    [
        fire.fire_id.clone().unwrap_or_default(),
        fire.fire_name.clone().unwrap_or_default(),
        fire.src_agency.clone().unwrap_or_default(),
        fire.year.to_string(),
        fire.report_date.map(|d| d.to_string()).unwrap_or_default(),
        fire.cause_primary.clone().unwrap_or_default(),
        fire.size_ha.map(|s| format_thousands(s, 1)).unwrap_or_default(),
        format!("{:.4}", fire.latitude),
        format!("{:.4}", fire.longitude),
    ]
}

/// Standalone page: heading, summary line, a preview table of the first
/// records and the deck.gl scatter map.
pub fn render_html(
    page: &PageConfig,
    deck: &DeckSpec,
    preview: &[FirePoint],
    summary: &str,
) -> Result<String> {
    // keep the embedded JSON from closing the script element
    let deck_json = serde_json::to_string(deck)?.replace("</", "<\\/");

    let mut output = String::new();

    output.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    output.push_str("<meta charset=\"UTF-8\">\n");
    output.push_str(&format!("<title>{}</title>\n", escape_html(&page.page_title)));
    output.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", MAPLIBRE_CSS));
    output.push_str(&format!("<script src=\"{}\"></script>\n", MAPLIBRE_JS));
    output.push_str(&format!("<script src=\"{}\"></script>\n", DECK_GL_JS));
    output.push_str("<style>\n");
    output.push_str(&format!(
        "body {{ font-family: Arial, sans-serif; max-width: {}; margin: 0 auto; padding: 20px; box-sizing: border-box; }}\n",
        page.layout.max_width()
    ));
    output.push_str("h1 { color: #333; border-bottom: 2px solid #d33; padding-bottom: 10px; }\n");
    output.push_str("table { border-collapse: collapse; width: 100%; margin: 20px 0; }\n");
    output.push_str("th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }\n");
    output.push_str("th { background-color: #d33; color: white; }\n");
    output.push_str("tr:nth-child(even) { background-color: #f2f2f2; }\n");
    output.push_str("#map { position: relative; width: 100%; height: 640px; }\n");
    output.push_str("footer { color: #777; margin-top: 20px; font-size: 0.9em; }\n");
    output.push_str("</style>\n</head>\n<body>\n");

    output.push_str(&format!("<h1>{}</h1>\n", escape_html(&page.title)));

    output.push_str("<table>\n<tr>");
    for column in PREVIEW_COLUMNS {
        output.push_str(&format!("<th>{}</th>", column));
    }
    output.push_str("</tr>\n");
    for fire in preview {
        output.push_str("<tr>");
        for cell in preview_row(fire) {
            output.push_str(&format!("<td>{}</td>", escape_html(&cell)));
        }
        output.push_str("</tr>\n");
    }
    output.push_str("</table>\n");

    output.push_str(&format!("<p class=\"summary\">{}</p>\n", escape_html(summary)));
    output.push_str("<div id=\"map\"></div>\n");

    if let Some(about) = &page.about {
        output.push_str(&format!("<footer>{}</footer>\n", escape_html(about)));
    }

    output.push_str("<script>\n");
    output.push_str(&format!("const spec = {};\n", deck_json));
    output.push_str(&format!("const basemap = \"{}\";\n", BASEMAP_STYLE));
    output.push_str(
        r#"const entities = { "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;" };
const escapeHtml = (value) => String(value).replace(/[&<>"']/g, (c) => entities[c]);
const fill = (template, object) =>
  template.replace(/\{(\w+)\}/g, (_, key) => escapeHtml(object[key] ?? ""));
const layers = spec.layers.map((layer) => new deck.ScatterplotLayer({
  id: layer.id,
  data: layer.data,
  getPosition: (d) => [d.longitude, d.latitude],
  getRadius: (d) => d.radius,
  getFillColor: (d) => d.fill_color,
  pickable: layer.pickable,
}));
new deck.DeckGL({
  container: "map",
  mapStyle: basemap,
  initialViewState: spec.initialViewState,
  controller: true,
  layers,
  getTooltip: ({ object }) => object && {
    html: fill(spec.tooltip.html, object),
    style: spec.tooltip.style,
  },
});
"#,
    );
    output.push_str("</script>\n</body>\n</html>\n");

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DataModel, Record};
    use crate::visuals::maps::{make_deck, MapOptions};
    use serde_json::json;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_render_html_embeds_preview_and_deck() {
        let fire = FirePoint::from_record(&Record::from_pairs([
            ("FIRE_ID", json!("QC1")),
            ("FIRENAME", json!("Lac <Sud>")),
            ("YEAR", json!(2023)),
            ("MONTH", json!(6)),
            ("LATITUDE", json!(48.25)),
            ("LONGITUDE", json!(-70.1)),
        ]))
        .unwrap();
        let deck = make_deck(&[&fire], &MapOptions::default());

        let html = render_html(
            &PageConfig::default(),
            &deck,
            std::slice::from_ref(&fire),
            "Showing 1 fires reported since Wednesday 01 January 2020",
        )
        .unwrap();

        assert!(html.contains("<title>Hazards</title>"));
        assert!(html.contains("<h1>Canadian Fires</h1>"));
        assert!(html.contains("<td>Lac &lt;Sud&gt;</td>"));
        assert!(html.contains("Showing 1 fires reported since Wednesday 01 January 2020"));
        assert!(html.contains("\"@@type\":\"ScatterplotLayer\""));
        assert!(!html.contains("<footer>"));
        assert!(html.contains("escapeHtml(object[key] ?? \"\")"));
    }
}
