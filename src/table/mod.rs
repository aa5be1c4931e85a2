//! Tabular input and output.
//!
//! A [`Table`] is a header plus ordered [`Record`]s. Batch analysis appends
//! [`AUGMENTED_COLUMNS`] to produce an [`AugmentedTable`], which serializes back
//! to CSV with the original columns first.

use crate::error::{PipelineError, Result};
use crate::pipelines::stats::BatchStats;
use crate::sentiment::AnalyzedItem;

mod delimited;

pub use delimited::{read_csv, read_csv_path, to_csv_string, write_csv, write_csv_path};

/// Columns appended by batch analysis, in output order.
pub const AUGMENTED_COLUMNS: [&str; 3] = ["Sentiment", "Emoji", "Confidence"];

/// Name of the text column when none is configured.
pub const DEFAULT_TEXT_COLUMN: &str = "Text";

/// How the text column is located in a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextColumn {
    name: String,
    case_insensitive: bool,
}

impl TextColumn {
    /// Match `name` exactly.
    pub fn exact(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            case_insensitive: false,
        }
    }

    /// Match `name` ignoring ASCII case.
    pub fn case_insensitive(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            case_insensitive: true,
        }
    }

    /// Configured column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, column: &str) -> bool {
        if self.case_insensitive {
            column.eq_ignore_ascii_case(&self.name)
        } else {
            column == self.name
        }
    }

    /// Position of the text column in `columns`.
    ///
    /// Fails with [`PipelineError::Schema`] when the column is missing, or when
    /// more than one column matches.
    pub fn locate(&self, columns: &[String]) -> Result<usize> {
        let mut found = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| self.matches(c))
            .map(|(i, _)| i);

        match (found.next(), found.next()) {
            (Some(i), None) => Ok(i),
            (Some(_), Some(_)) => Err(PipelineError::Schema(format!(
                "More than one column matches '{}'. Columns: [{}]",
                self.name,
                columns.join(", ")
            ))),
            (None, _) => Err(PipelineError::Schema(format!(
                "Input does not contain a '{}' column. Columns: [{}]",
                self.name,
                columns.join(", ")
            ))),
        }
    }
}

impl Default for TextColumn {
    fn default() -> Self {
        Self::exact(DEFAULT_TEXT_COLUMN)
    }
}

/// One row of input. Fields line up with [`Table::columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Record from its field values, in column order.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// All field values.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Ordered records sharing one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Build a table, checking that every record is as wide as the header.
    pub fn new<I, S>(columns: I, records: Vec<Record>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if let Some((i, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(PipelineError::Schema(format!(
                "Row {} has {} fields but the header has {}",
                i + 1,
                record.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, records })
    }

    /// Single-column table named [`DEFAULT_TEXT_COLUMN`].
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: vec![DEFAULT_TEXT_COLUMN.to_string()],
            records: texts.into_iter().map(|t| Record::new([t])).collect(),
        }
    }

    /// Header, in input order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All records, in input order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` records, for previews.
    pub fn head(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }

    /// Values of the text column, in row order.
    pub fn texts(&self, column: &TextColumn) -> Result<Vec<&str>> {
        let index = column.locate(&self.columns)?;
        Ok(self
            .records
            .iter()
            .map(|r| r.get(index).unwrap_or_default())
            .collect())
    }
}

/// A [`Table`] with one [`AnalyzedItem`] per record.
///
/// Rows recorded with [`AnalyzedItem::unavailable`] in fallback mode are listed
/// in [`fallback_rows`](Self::fallback_rows); a non-empty list marks the table
/// as partial.
#[derive(Debug, Clone)]
pub struct AugmentedTable {
    table: Table,
    items: Vec<AnalyzedItem>,
    fallback_rows: Vec<usize>,
    /// Execution statistics.
    pub stats: BatchStats,
}

impl AugmentedTable {
    pub(crate) fn new(
        table: Table,
        items: Vec<AnalyzedItem>,
        fallback_rows: Vec<usize>,
        stats: BatchStats,
    ) -> Result<Self> {
        if items.len() != table.len() {
            return Err(PipelineError::Unexpected(format!(
                "Got {} results for {} rows",
                items.len(),
                table.len()
            )));
        }
        Ok(Self {
            table,
            items,
            fallback_rows,
            stats,
        })
    }

    /// The input table, unchanged.
    pub fn source(&self) -> &Table {
        &self.table
    }

    /// Analysis results; `items()[i]` belongs to row `i`.
    pub fn items(&self) -> &[AnalyzedItem] {
        &self.items
    }

    /// 1-based numbers of rows that hold a fallback result instead of a real one.
    pub fn fallback_rows(&self) -> &[usize] {
        &self.fallback_rows
    }

    /// True if any row holds a fallback result.
    pub fn is_partial(&self) -> bool {
        !self.fallback_rows.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Original columns followed by [`AUGMENTED_COLUMNS`].
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.table
            .columns()
            .iter()
            .map(String::as_str)
            .chain(AUGMENTED_COLUMNS)
    }

    /// Rows with the three derived fields appended.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> {
        self.table
            .records()
            .iter()
            .zip(&self.items)
            .map(|(record, item)| {
                let mut row: Vec<&str> = record.fields().iter().map(String::as_str).collect();
                row.extend([item.category.as_str(), item.glyph, item.confidence.as_str()]);
                row
            })
    }

    /// Flatten into a plain [`Table`] with the derived columns appended.
    pub fn into_table(self) -> Table {
        let columns = self
            .table
            .columns
            .into_iter()
            .chain(AUGMENTED_COLUMNS.map(String::from))
            .collect();
        let records = self
            .table
            .records
            .into_iter()
            .zip(self.items)
            .map(|(record, item)| {
                let mut fields = record.fields;
                fields.extend([
                    item.category.to_string(),
                    item.glyph.to_string(),
                    item.confidence,
                ]);
                Record { fields }
            })
            .collect();
        Table { columns, records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentCategory;
    use std::time::Duration;

    fn stats(rows: usize) -> BatchStats {
        BatchStats {
            total_time: Duration::ZERO,
            rows_processed: rows,
            fallback_rows: 0,
        }
    }

    #[test]
    fn locates_text_column_exactly_by_default() {
        let columns = vec!["id".to_string(), "Text".to_string()];
        assert_eq!(TextColumn::default().locate(&columns).unwrap(), 1);

        let lower = vec!["text".to_string()];
        assert!(matches!(
            TextColumn::default().locate(&lower),
            Err(PipelineError::Schema(_))
        ));
        assert_eq!(TextColumn::case_insensitive("Text").locate(&lower).unwrap(), 0);
    }

    #[test]
    fn ambiguous_text_column_is_rejected() {
        let columns = vec!["TEXT".to_string(), "text".to_string()];
        let err = TextColumn::case_insensitive("Text")
            .locate(&columns)
            .unwrap_err();
        assert!(err.to_string().contains("More than one"));
    }

    #[test]
    fn ragged_records_are_rejected() {
        let err = Table::new(["a", "b"], vec![Record::new(["1"])]).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn head_is_bounded_by_length() {
        let table = Table::from_texts(["a", "b", "c"]);
        assert_eq!(table.head(2).len(), 2);
        assert_eq!(table.head(10).len(), 3);
    }

    #[test]
    fn augmented_rows_append_in_fixed_order() {
        let table = Table::new(["id", "Text"], vec![Record::new(["7", "Great"])]).unwrap();
        let item = AnalyzedItem {
            category: SentimentCategory::Positive,
            glyph: "😊",
            confidence: "95.00%".into(),
        };
        let augmented = AugmentedTable::new(table, vec![item], vec![], stats(1)).unwrap();

        assert_eq!(
            augmented.columns().collect::<Vec<_>>(),
            ["id", "Text", "Sentiment", "Emoji", "Confidence"]
        );
        assert_eq!(
            augmented.rows().next().unwrap(),
            ["7", "Great", "Positive", "😊", "95.00%"]
        );

        let flat = augmented.into_table();
        assert_eq!(flat.columns().len(), 5);
        assert_eq!(flat.records()[0].get(4), Some("95.00%"));
    }

    #[test]
    fn mismatched_result_count_is_an_error() {
        let table = Table::from_texts(["a", "b"]);
        assert!(AugmentedTable::new(table, vec![], vec![], stats(0)).is_err());
    }
}
