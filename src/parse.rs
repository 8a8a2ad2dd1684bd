use crate::error::LoadResult;
use crate::models::RawRow;

/// Tokenizes CSV text with a header row into raw rows.
///
/// Lines with no content are skipped. Rows whose field count differs from the
/// header are an error.
pub fn parse_rows(text: &str) -> LoadResult<Vec<RawRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows: Vec<RawRow> = Vec::new();

    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.trim(), value))
                .collect(),
        );
    }

    tracing::debug!(rows = rows.len(), columns = headers.len(), "parsed sheet CSV");
    Ok(rows)
}
