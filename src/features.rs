use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use tracing::warn;

use crate::model::{ModelInput, PredictionError};

const ID_COLUMN: &str = "id_student";
const ENGAGEMENT_COLUMN: &str = "engagement_classification";

/// Columns present in the source file that must never reach the model.
const ADMIN_COLUMNS: [&str; 3] = ["id_student", "study_method_preference", "final_result"];

/// The precomputed per-student feature table, loaded once from CSV and
/// read-only afterwards. Cells stay as raw strings until a row is turned
/// into model input, so a bad value only fails the student it belongs to.
#[derive(Debug)]
pub struct FeatureTable {
    columns: Vec<String>,
    id_idx: usize,
    engagement_idx: usize,
    rows: HashMap<i64, Vec<String>>,
}

impl FeatureTable {
    pub fn from_csv(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open feature data file {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("failed to parse feature data file {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let headers = csv_reader.headers().context("feature data has no header row")?;
        let columns: Vec<String> = headers.iter().map(str::to_string).collect();
        let id_idx = columns
            .iter()
            .position(|c| c == ID_COLUMN)
            .with_context(|| format!("feature data is missing the {ID_COLUMN} column"))?;
        let engagement_idx = columns
            .iter()
            .position(|c| c == ENGAGEMENT_COLUMN)
            .with_context(|| format!("feature data is missing the {ENGAGEMENT_COLUMN} column"))?;

        let mut rows: HashMap<i64, Vec<String>> = HashMap::new();
        for record in csv_reader.records() {
            let record = record.context("failed to read feature data record")?;
            let cells: Vec<String> = record.iter().map(str::to_string).collect();
            let raw_id = cells.get(id_idx).map(String::as_str).unwrap_or_default();
            let Ok(student_id) = raw_id.trim().parse::<i64>() else {
                warn!(raw_id, "skipping feature row with non-integer student id");
                continue;
            };
            // First occurrence wins for duplicate ids.
            rows.entry(student_id).or_insert(cells);
        }

        Ok(Self {
            columns,
            id_idx,
            engagement_idx,
            rows,
        })
    }

    pub fn get(&self, student_id: i64) -> Option<FeatureRow<'_>> {
        self.rows.get(&student_id).map(|cells| FeatureRow {
            table: self,
            student_id,
            cells,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All known student ids, ascending.
    pub fn student_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.rows.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// One student's row, borrowed from the table.
#[derive(Debug)]
pub struct FeatureRow<'a> {
    table: &'a FeatureTable,
    student_id: i64,
    cells: &'a [String],
}

impl FeatureRow<'_> {
    /// The precomputed engagement class carried in the table. This is an
    /// upstream feature, never a model output.
    pub fn engagement_classification(&self) -> Result<i32, PredictionError> {
        self.cells
            .get(self.table.engagement_idx)
            .and_then(|cell| cell.trim().parse::<i32>().ok())
            .ok_or(PredictionError::MissingEngagement(self.student_id))
    }

    /// Builds the classifier input: administrative columns are dropped,
    /// column names are stripped of characters the model schema rejects,
    /// and empty cells are omitted (the model treats them as missing).
    pub fn model_input(&self) -> Result<ModelInput, PredictionError> {
        let mut input = ModelInput::default();
        for (idx, column) in self.table.columns.iter().enumerate() {
            if idx == self.table.id_idx || ADMIN_COLUMNS.contains(&column.as_str()) {
                continue;
            }
            let cell = self.cells.get(idx).map(String::as_str).unwrap_or_default();
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let value = cell
                .parse::<f64>()
                .map_err(|_| PredictionError::BadFeatureValue {
                    column: column.clone(),
                    value: cell.to_string(),
                })?;
            input.insert(sanitize_column_name(column), value);
        }
        Ok(input)
    }
}

/// Strips `[`, `]` and `<`, which the model's input schema rejects.
fn sanitize_column_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | '<'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> FeatureTable {
        let csv = "\
id_student,clicks_per_week,score[avg],engagement_classification,study_method_preference,final_result
42,5.0,71.5,1,0,Pass
7,2.5,44.0,0,1,Fail
13,1.0,,2,3,Withdrawn
";
        FeatureTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn looks_up_students_by_id() {
        let table = sample_table();
        assert_eq!(table.len(), 3);
        assert!(table.get(42).is_some());
        assert!(table.get(999).is_none());
        assert_eq!(table.student_ids(), vec![7, 13, 42]);
    }

    #[test]
    fn engagement_comes_from_the_table_not_the_model() {
        let table = sample_table();
        assert_eq!(table.get(42).unwrap().engagement_classification().unwrap(), 1);
        assert_eq!(table.get(7).unwrap().engagement_classification().unwrap(), 0);
    }

    #[test]
    fn model_input_drops_admin_columns_and_sanitizes_names() {
        let table = sample_table();
        let input = table.get(42).unwrap().model_input().unwrap();
        assert_eq!(input.get("clicks_per_week"), Some(5.0));
        assert_eq!(input.get("scoreavg"), Some(71.5));
        assert_eq!(input.get("engagement_classification"), Some(1.0));
        assert_eq!(input.get("id_student"), None);
        assert_eq!(input.get("study_method_preference"), None);
        assert_eq!(input.get("final_result"), None);
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn empty_cells_are_omitted_from_model_input() {
        let table = sample_table();
        let input = table.get(13).unwrap().model_input().unwrap();
        assert_eq!(input.get("scoreavg"), None);
        assert_eq!(input.get("clicks_per_week"), Some(1.0));
    }

    #[test]
    fn non_numeric_predictor_is_an_error() {
        let csv = "\
id_student,clicks_per_week,engagement_classification
5,lots,1
";
        let table = FeatureTable::from_reader(csv.as_bytes()).unwrap();
        let err = table.get(5).unwrap().model_input().unwrap_err();
        assert!(matches!(err, PredictionError::BadFeatureValue { .. }));
    }

    #[test]
    fn unparseable_engagement_is_an_error() {
        let csv = "\
id_student,clicks_per_week,engagement_classification
5,1.0,high
";
        let table = FeatureTable::from_reader(csv.as_bytes()).unwrap();
        let err = table.get(5).unwrap().engagement_classification().unwrap_err();
        assert!(matches!(err, PredictionError::MissingEngagement(5)));
    }

    #[test]
    fn duplicate_student_ids_keep_the_first_row() {
        let csv = "\
id_student,clicks_per_week,engagement_classification
8,1.0,0
8,9.0,2
";
        let table = FeatureTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        let input = table.get(8).unwrap().model_input().unwrap();
        assert_eq!(input.get("clicks_per_week"), Some(1.0));
    }

    #[test]
    fn missing_required_columns_fail_the_load() {
        assert!(FeatureTable::from_reader("clicks_per_week\n1.0\n".as_bytes()).is_err());
        assert!(
            FeatureTable::from_reader("id_student,clicks_per_week\n1,1.0\n".as_bytes()).is_err()
        );
    }

    #[test]
    fn rows_with_bad_ids_are_skipped() {
        let csv = "\
id_student,clicks_per_week,engagement_classification
abc,1.0,0
9,2.0,1
";
        let table = FeatureTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.student_ids(), vec![9]);
    }
}
