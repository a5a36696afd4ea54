//! Fetching and parsing shared scans
//!
//! adashboard serves a JSON list of ship types. dscan.info serves an HTML
//! page where the ship breakdown sits in a table under an "All ships" heading.

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::debug;

use fusion_core::ScanSettings;

use crate::{ScanError, ScanLink};

/// A ship type and how many were on scan
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScannedShip {
    pub name: String,
    pub count: u32,
}

static HEADING_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, caption, th, td, div, span, strong, b, p").unwrap()
});

static TABLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());

static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

const ALL_SHIPS_HEADING: &str = "all ships";

/// URL the scan content is fetched from
pub fn scan_url(link: &ScanLink, settings: &ScanSettings) -> String {
    match link {
        ScanLink::Adashboard { id } => format!(
            "{}/intel/dscan/view/{}/json",
            settings.adashboard_base.trim_end_matches('/'),
            id
        ),
        ScanLink::DscanInfo { id } => {
            format!("{}/v/{}", settings.dscan_info_base.trim_end_matches('/'), id)
        }
    }
}

/// Fetch and parse a shared scan
pub async fn fetch_scan(
    client: &Client,
    link: &ScanLink,
    settings: &ScanSettings,
) -> Result<Vec<ScannedShip>, ScanError> {
    let url = scan_url(link, settings);
    debug!("Fetching {} scan: {}", link.service(), url);

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(ScanError::Status(response.status().as_u16()));
    }

    let body = response.text().await?;
    match link {
        ScanLink::Adashboard { .. } => parse_adashboard_json(&body),
        ScanLink::DscanInfo { .. } => parse_all_ships_table(&body),
    }
}

/// Parse an adashboard JSON ship list
pub fn parse_adashboard_json(body: &str) -> Result<Vec<ScannedShip>, ScanError> {
    serde_json::from_str(body).map_err(|e| ScanError::Parse(e.to_string()))
}

/// Parse the "All ships" table out of a dscan.info page
pub fn parse_all_ships_table(html: &str) -> Result<Vec<ScannedShip>, ScanError> {
    let document = Html::parse_document(html);

    let table = document
        .select(&HEADING_SELECTOR)
        .filter(|el| normalize_whitespace(&el.text().collect::<String>()).eq_ignore_ascii_case(ALL_SHIPS_HEADING))
        .find_map(find_ship_table)
        .ok_or_else(|| ScanError::Parse("no \"All ships\" table".to_string()))?;

    Ok(table.select(&ROW_SELECTOR).filter_map(parse_row).collect())
}

/// Locate the table a heading labels: the enclosing table for header cells,
/// otherwise the first table after the heading or one of its ancestors.
fn find_ship_table(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if matches!(heading.value().name(), "th" | "td" | "caption") {
        return heading
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "table");
    }

    let mut current = Some(heading);
    while let Some(node) = current {
        for sibling in node.next_siblings().filter_map(ElementRef::wrap) {
            if sibling.value().name() == "table" {
                return Some(sibling);
            }
            if let Some(table) = sibling.select(&TABLE_SELECTOR).next() {
                return Some(table);
            }
        }
        current = node.parent().and_then(ElementRef::wrap);
    }
    None
}

/// A row is a ship if it has a count cell and a name cell, in either order
fn parse_row(row: ElementRef<'_>) -> Option<ScannedShip> {
    let cells: Vec<String> = row
        .select(&CELL_SELECTOR)
        .map(|cell| normalize_whitespace(&cell.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect();

    let count = cells.iter().find_map(|text| parse_count(text))?;
    let name = cells.iter().find(|text| parse_count(text).is_none())?;

    Some(ScannedShip {
        name: name.clone(),
        count,
    })
}

fn parse_count(text: &str) -> Option<u32> {
    text.trim_end_matches(['x', 'X'])
        .replace(',', "")
        .parse()
        .ok()
}

/// Normalize whitespace in text
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_adashboard_json() {
        let body = r#"[{"name":"Sabre","count":2,"group":"Interdictor"},{"name":"Loki","count":1}]"#;
        let ships = parse_adashboard_json(body).unwrap();

        assert_eq!(
            ships,
            vec![
                ScannedShip {
                    name: "Sabre".to_string(),
                    count: 2
                },
                ScannedShip {
                    name: "Loki".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_parse_adashboard_rejects_garbage() {
        assert!(matches!(
            parse_adashboard_json("<html>nope</html>"),
            Err(ScanError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_all_ships_table() {
        let html = r#"
            <html>
            <body>
                <div class="panel">
                    <h3>Structures</h3>
                    <table><tr><td>1</td><td>Astrahus</td></tr></table>
                </div>
                <div class="panel">
                    <div class="panel-heading"><h3>All ships</h3></div>
                    <table>
                        <tr><th>Count</th><th>Type</th></tr>
                        <tr><td>3</td><td>Rifter</td></tr>
                        <tr><td>1,024</td><td>Capsule</td></tr>
                        <tr><td>Svipul</td><td>2x</td></tr>
                    </table>
                </div>
            </body>
            </html>
        "#;

        let ships = parse_all_ships_table(html).unwrap();
        assert_eq!(ships.len(), 3);
        assert_eq!(ships[0].name, "Rifter");
        assert_eq!(ships[0].count, 3);
        assert_eq!(ships[1].count, 1024);
        assert_eq!(ships[2].name, "Svipul");
        assert_eq!(ships[2].count, 2);
    }

    #[test]
    fn test_parse_header_cell_table() {
        let html = r#"
            <table>
                <tr><th colspan="2">All ships</th></tr>
                <tr><td>Loki</td><td>4</td></tr>
            </table>
        "#;

        let ships = parse_all_ships_table(html).unwrap();
        assert_eq!(
            ships,
            vec![ScannedShip {
                name: "Loki".to_string(),
                count: 4
            }]
        );
    }

    #[test]
    fn test_missing_table_is_parse_error() {
        let html = "<html><body><h3>Nothing here</h3></body></html>";
        assert!(matches!(
            parse_all_ships_table(html),
            Err(ScanError::Parse(_))
        ));
    }

    #[test]
    fn test_scan_urls() {
        let settings = ScanSettings {
            adashboard_base: "http://localhost:1234/".to_string(),
            ..Default::default()
        };
        let link = ScanLink::Adashboard {
            id: "abc".to_string(),
        };
        assert_eq!(
            scan_url(&link, &settings),
            "http://localhost:1234/intel/dscan/view/abc/json"
        );

        let link = ScanLink::DscanInfo {
            id: "xyz".to_string(),
        };
        assert_eq!(scan_url(&link, &settings), "https://dscan.info/v/xyz");
    }
}
