use super::{AugmentedTable, Record, Table, TextColumn};
use crate::error::{PipelineError, Result};
use std::fs::File;
use std::io;
use std::path::Path;

/// Parse CSV with a header row into a [`Table`].
///
/// The header must contain `text_column`; otherwise a [`PipelineError::Schema`]
/// is returned and no rows are read. Rows whose width differs from the header
/// are rejected.
pub fn read_csv<R: io::Read>(reader: R, text_column: &TextColumn) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    text_column.locate(&columns)?;

    let mut records = Vec::new();
    for row in reader.records() {
        records.push(Record::new(row?.iter()));
    }

    tracing::debug!(
        columns = columns.len(),
        rows = records.len(),
        "parsed CSV input"
    );
    Table::new(columns, records)
}

/// [`read_csv`] from a file.
pub fn read_csv_path(path: impl AsRef<Path>, text_column: &TextColumn) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        PipelineError::Csv(format!("Failed to open '{}': {}", path.display(), e))
    })?;
    read_csv(io::BufReader::new(file), text_column)
}

/// Write an [`AugmentedTable`] as CSV: header first, original columns in order,
/// then `Sentiment, Emoji, Confidence`. No index column.
///
/// The file format has no partial flag. Rows that fell back are written as
/// `Unknown, 🤔, N/A`, and a partial table is also logged with its fallback rows
/// (1-based) so the export is never silently incomplete.
pub fn write_csv<W: io::Write>(table: &AugmentedTable, writer: W) -> Result<()> {
    if table.is_partial() {
        tracing::warn!(
            rows = ?table.fallback_rows(),
            "writing partial results, fallback rows have N/A confidence"
        );
    }

    let mut writer = csv::WriterBuilder::new().from_writer(writer);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// [`write_csv`] to a file, replacing it if present.
pub fn write_csv_path(table: &AugmentedTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        PipelineError::Csv(format!("Failed to create '{}': {}", path.display(), e))
    })?;
    write_csv(table, io::BufWriter::new(file))
}

/// [`write_csv`] into a `String`.
pub fn to_csv_string(table: &AugmentedTable) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| PipelineError::Unexpected(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::stats::BatchStats;
    use crate::sentiment::{AnalyzedItem, SentimentCategory};
    use std::time::Duration;

    #[test]
    fn reads_header_and_rows_in_order() {
        let input = "id,Text,channel\n1,Great service!,email\n2,\"Terrible, slow\",phone\n3,,chat\n";
        let table = read_csv(input.as_bytes(), &TextColumn::default()).unwrap();

        assert_eq!(table.columns(), ["id", "Text", "channel"]);
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.texts(&TextColumn::default()).unwrap(),
            ["Great service!", "Terrible, slow", ""]
        );
    }

    #[test]
    fn missing_text_column_is_a_schema_error() {
        let input = "id,Review\n1,Nice\n";
        let err = read_csv(input.as_bytes(), &TextColumn::default()).unwrap_err();
        match err {
            PipelineError::Schema(msg) => {
                assert!(msg.contains("'Text'"), "{msg}");
                assert!(msg.contains("Review"), "{msg}");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn text_column_match_is_case_sensitive_unless_relaxed() {
        let input = "text\nfine\n";
        assert!(read_csv(input.as_bytes(), &TextColumn::default()).is_err());
        assert!(read_csv(input.as_bytes(), &TextColumn::case_insensitive("Text")).is_ok());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let input = "id,Text\n1,ok\n2\n";
        assert!(matches!(
            read_csv(input.as_bytes(), &TextColumn::default()),
            Err(PipelineError::Csv(_))
        ));
    }

    #[test]
    fn empty_input_has_no_text_column() {
        assert!(matches!(
            read_csv("".as_bytes(), &TextColumn::default()),
            Err(PipelineError::Schema(_))
        ));
    }

    #[test]
    fn writes_original_columns_then_derived_columns() {
        let table = read_csv(
            "Text,id\n\"Great, really\",1\n".as_bytes(),
            &TextColumn::default(),
        )
        .unwrap();
        let item = AnalyzedItem {
            category: SentimentCategory::Positive,
            glyph: "😊",
            confidence: "95.00%".into(),
        };
        let stats = BatchStats {
            total_time: Duration::ZERO,
            rows_processed: 1,
            fallback_rows: 0,
        };
        let augmented = AugmentedTable::new(table, vec![item], vec![], stats).unwrap();

        assert_eq!(
            to_csv_string(&augmented).unwrap(),
            "Text,id,Sentiment,Emoji,Confidence\n\"Great, really\",1,Positive,😊,95.00%\n"
        );
    }

    #[test]
    fn fallback_rows_are_exported_as_not_available() {
        let table = Table::from_texts(["Great service!", "???"]);
        let item = AnalyzedItem {
            category: SentimentCategory::Positive,
            glyph: "😊",
            confidence: "95.00%".into(),
        };
        let stats = BatchStats {
            total_time: Duration::ZERO,
            rows_processed: 2,
            fallback_rows: 1,
        };
        let augmented =
            AugmentedTable::new(table, vec![item, AnalyzedItem::unavailable()], vec![2], stats)
                .unwrap();

        assert!(augmented.is_partial());
        assert_eq!(
            to_csv_string(&augmented).unwrap(),
            "Text,Sentiment,Emoji,Confidence\nGreat service!,Positive,😊,95.00%\n???,Unknown,🤔,N/A\n"
        );
    }
}
