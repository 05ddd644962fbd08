//! Writers that serialize a [`Table`] for downstream tools

use crate::flatten::project::CELL_COLLISION_JOIN;
use crate::flatten::Table;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::Write;

/// Key holding the row key in JSON Lines output
pub const ROW_KEY_FIELD: &str = "_row";

/// Joins header levels into one JSON key
pub const JSON_KEY_JOIN: &str = "|";

/// Writes a table as delimited text (CSV by default).
///
/// Each header level gets its own record; the first column holds the row
/// keys and is blank on header records. Quoting is left to the `csv` crate.
pub struct DelimitedWriter<W: Write> {
    writer: W,
    delimiter: u8,
}

impl<W: Write> DelimitedWriter<W> {
    pub fn new(writer: W) -> Self {
        DelimitedWriter {
            writer,
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        let mut records = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut self.writer);

        for level in 0..table.header_depth() {
            let labels = table
                .columns()
                .iter()
                .map(|column| column.levels()[level].as_str());
            records.write_record(std::iter::once("").chain(labels))
                .with_context(|| format!("Failed to write header line {}", level + 1))?;
        }

        for row in table.rows() {
            let cells = row
                .values()
                .iter()
                .map(|value| value.as_deref().unwrap_or_default());
            records.write_record(std::iter::once(row.key()).chain(cells))
                .with_context(|| format!("Failed to write row: {}", row.key()))?;
        }

        records.flush().context("Failed to flush CSV records")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Writes one JSON object per row.
///
/// Each object carries the row key under `_row` and one entry per present
/// cell, keyed by the column's header levels joined with `|`.
pub struct JsonLinesWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesWriter { writer }
    }

    pub fn write_table(&mut self, table: &Table) -> Result<()> {
        let keys: Vec<String> = table
            .columns()
            .iter()
            .map(|column| column.join(JSON_KEY_JOIN))
            .collect();

        for row in table.rows() {
            let mut data = Map::new();
            data.insert(ROW_KEY_FIELD.to_string(), Value::String(row.key().to_string()));

            for (key, value) in keys.iter().zip(row.values()) {
                let Some(value) = value else { continue };
                // Relabelled headers may repeat
                match data.get_mut(key) {
                    Some(Value::String(existing)) => {
                        existing.push_str(CELL_COLLISION_JOIN);
                        existing.push_str(value);
                    }
                    _ => {
                        data.insert(key.clone(), Value::String(value.clone()));
                    }
                }
            }

            let json = serde_json::to_string(&data).context("Failed to serialize row")?;
            writeln!(self.writer, "{}", json)
                .with_context(|| format!("Failed to write row: {}", row.key()))?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::{project, DocumentSet};
    use crate::header::{simplify_header, LookupTable};

    fn sample_table() -> Table {
        let mut documents = DocumentSet::new();
        documents.insert(
            "one",
            vec!["a|x|1".to_string(), "a|y|say \"hi\"".to_string()],
        );
        documents.insert("two", vec!["a|x|2,5".to_string(), "b|z|multi\nline".to_string()]);
        project(&documents, "|", 0).unwrap()
    }

    #[test]
    fn test_csv_output() {
        let mut writer = DelimitedWriter::new(Vec::new());
        writer.write_table(&sample_table()).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();

        let expected = concat!(
            ",a,a,b\n",
            ",x,y,z\n",
            "one,1,\"say \"\"hi\"\"\",\n",
            "two,\"2,5\",,\"multi\nline\"\n",
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn test_custom_delimiter() {
        let mut writer = DelimitedWriter::new(Vec::new()).with_delimiter(b';');
        writer.write_table(&sample_table()).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();

        assert!(output.starts_with(";a;a;b\n;x;y;z\n"));
        assert!(output.contains("two;2,5;;"));
    }

    #[test]
    fn test_csv_quotes_awkward_labels_and_keys() {
        let mut documents = DocumentSet::new();
        documents.insert("k,1", vec!["a,b|x \"q\"|v".to_string()]);
        let table = project(&documents, "|", 0).unwrap();

        let mut writer = DelimitedWriter::new(Vec::new());
        writer.write_table(&table).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();

        assert_eq!(output, ",\"a,b\"\n,\"x \"\"q\"\"\"\n\"k,1\",v\n");
    }

    #[test]
    fn test_json_lines_output() {
        let mut buffer = Vec::new();
        let mut writer = JsonLinesWriter::new(&mut buffer);
        writer.write_table(&sample_table()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["_row"], "one");
        assert_eq!(lines[0]["a|y"], "say \"hi\"");
        assert!(lines[0].get("b|z").is_none());
        assert_eq!(lines[1]["b|z"], "multi\nline");
    }

    #[test]
    fn test_json_lines_merges_repeated_labels() {
        let lookup: LookupTable = [("a|x", "same"), ("a|y", "same")].into_iter().collect();
        let simplified = simplify_header(&sample_table(), " ", &lookup);

        let mut buffer = Vec::new();
        JsonLinesWriter::new(&mut buffer)
            .write_table(&simplified.table)
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let first: Value = serde_json::from_str(output.lines().next().unwrap()).unwrap();
        assert_eq!(first["same"], "1 & say \"hi\"");
    }
}
