use super::types::{Sample, TimeSeriesDocument};
use super::TimeSeriesError;
use roxmltree::Node;
use std::path::Path;
use tokio::fs;

/// Namespace of IEC 62325-451-2 schedule documents
pub const SCHEDULE_NAMESPACE: &str = "urn:iec62325.351:tc57wg16:451-2:scheduledocument:5:1";

/// Read and parse a day-schedule document from disk
pub async fn read_document(path: &Path) -> Result<TimeSeriesDocument, TimeSeriesError> {
    let content = fs::read_to_string(path).await?;
    parse_document(&content)
}

/// Parse a day-schedule document.
///
/// The root must hold exactly two `TimeSeries` children: the first is the
/// A-to-B flow, the second B-to-A. Elements are matched on local name, so
/// documents with a default namespace or a prefix both parse.
pub fn parse_document(content: &str) -> Result<TimeSeriesDocument, TimeSeriesError> {
    let doc = roxmltree::Document::parse(content)?;

    let series: Vec<Node> = doc
        .root_element()
        .children()
        .filter(|n| is_element(n, "TimeSeries"))
        .collect();

    if series.len() != 2 {
        return Err(TimeSeriesError::UnexpectedSeriesCount(series.len()));
    }

    let a_to_b = parse_points(&series[0])?;
    let b_to_a = parse_points(&series[1])?;

    Ok(TimeSeriesDocument::new(a_to_b, b_to_a))
}

fn is_element(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'input>(node: &Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_element(n, name))
}

/// Collect the points of a series' `Period` in document order
fn parse_points(series: &Node) -> Result<Vec<Sample>, TimeSeriesError> {
    let period = child(series, "Period")
        .ok_or_else(|| TimeSeriesError::Malformed("TimeSeries without Period".to_string()))?;

    period
        .children()
        .filter(|n| is_element(n, "Point"))
        .map(|point| -> Result<Sample, TimeSeriesError> {
            let position = int_field(&point, "position")?;
            let quantity = int_field(&point, "quantity")?;
            Ok(Sample::new(position, quantity))
        })
        .collect()
}

fn int_field(point: &Node, name: &str) -> Result<i64, TimeSeriesError> {
    let raw = child(point, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .ok_or_else(|| TimeSeriesError::Malformed(format!("Point without {}", name)))?;

    raw.parse::<i64>()
        .map_err(|_| TimeSeriesError::Malformed(format!("{} '{}' is not an integer", name, raw)))
}
