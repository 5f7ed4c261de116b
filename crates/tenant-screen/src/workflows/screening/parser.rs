use std::collections::BTreeMap;
use std::io::Read;

/// One untyped input row: column header to raw cell text.
pub type RawRow = BTreeMap<String, String>;

/// Reads a headed CSV stream into raw rows. Short rows simply lack the
/// trailing columns so the normalizer can report them as missing.
pub fn read_raw_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect::<RawRow>();
        rows.push(row);
    }

    Ok(rows)
}
