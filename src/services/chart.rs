use crate::constants::tidy_column;
use crate::models::{PriceRange, TidyTable};
use serde_json::{json, Value};

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Vega-Lite line chart of a tidy price table.
///
/// x = date (temporal), y = price (quantitative, unstacked, domain clamped to
/// `range` with clipping), color = series name (nominal).
pub fn line_chart(data: &TidyTable, range: &PriceRange) -> Value {
    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "width": "container",
        "data": { "values": data },
        "mark": { "type": "line", "opacity": 0.8, "clip": true },
        "encoding": {
            "x": { "field": tidy_column::DATE, "type": "temporal" },
            "y": {
                "field": tidy_column::VALUE,
                "type": "quantitative",
                "stack": null,
                "scale": { "domain": [range.ymin, range.ymax] }
            },
            "color": { "field": tidy_column::NAME, "type": "nominal" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TidyRow;
    use crate::services::test_support::date;

    #[test]
    fn test_line_chart_encoding() {
        let data = vec![
            TidyRow::new(date(2025, 1, 6), "A", Some(100.0)),
            TidyRow::new(date(2025, 1, 6), "B", Some(200.0)),
        ];
        let range = PriceRange::new(50.0, 150.0).unwrap();
        let chart = line_chart(&data, &range);

        assert_eq!(chart["mark"]["clip"], true);
        assert_eq!(chart["encoding"]["x"]["type"], "temporal");
        assert_eq!(chart["encoding"]["y"]["field"], "Stock Prices(円)");
        assert_eq!(chart["encoding"]["y"]["scale"]["domain"], json!([50.0, 150.0]));
        assert!(chart["encoding"]["y"]["stack"].is_null());
        assert_eq!(chart["encoding"]["color"]["field"], "Name");
        assert_eq!(chart["data"]["values"].as_array().unwrap().len(), 2);
        assert_eq!(chart["data"]["values"][1]["Name"], "B");
    }
}
