use serde_json::{Map, Value};

use crate::api::TablePayload;
use crate::error::{FinsightsError, Result};

/// One transaction table extracted from the statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableDataset {
    pub rows: Vec<Map<String, Value>>,
}

impl TableDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in the order the first row carries them.
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Display text of one cell; missing and null cells are empty.
    pub fn cell_text(&self, row: usize, column: &str) -> String {
        match self.rows.get(row).and_then(|r| r.get(column)) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Decode every encoded table in the payload, preserving extraction order.
pub fn decode_tables(payload: TablePayload) -> Result<Vec<TableDataset>> {
    match payload {
        TablePayload::One(encoded) => Ok(vec![decode_table(&encoded)?]),
        TablePayload::Many(encoded) => encoded.iter().map(|t| decode_table(t)).collect(),
    }
}

fn decode_table(encoded: &str) -> Result<TableDataset> {
    let value: Value = serde_json::from_str(encoded)
        .map_err(|e| FinsightsError::Parse(format!("table is not valid JSON: {e}")))?;
    let Value::Array(items) = value else {
        return Err(FinsightsError::Parse(
            "table must be a list of rows".to_string(),
        ));
    };
    let rows = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(row) => Ok(row),
            _ => Err(FinsightsError::Parse(format!("row {idx} is not an object"))),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TableDataset { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"[
        {"id": 1, "date": "01 Nov", "transaction": "Direct Credit JL", "amount": 40.0},
        {"id": 2, "date": "02 Nov", "transaction": "Account Fee", "amount": null}
    ]"#;

    #[test]
    fn single_encoded_table_is_one_dataset() {
        let tables = decode_tables(TablePayload::One(TABLE.to_string())).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 2);
        assert_eq!(tables[0].columns(), ["id", "date", "transaction", "amount"]);
    }

    #[test]
    fn table_list_keeps_order() {
        let tables = decode_tables(TablePayload::Many(vec![
            TABLE.to_string(),
            r#"[{"date": "03 Dec", "transaction": "Transfer"}]"#.to_string(),
        ]))
        .unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].cell_text(0, "transaction"), "Transfer");
        assert!(decode_tables(TablePayload::Many(vec![])).unwrap().is_empty());
    }

    #[test]
    fn cell_text_formats_values() {
        let table = decode_table(TABLE).unwrap();
        assert_eq!(table.cell_text(0, "id"), "1");
        assert_eq!(table.cell_text(0, "amount"), "40.0");
        assert_eq!(table.cell_text(1, "amount"), "");
        assert_eq!(table.cell_text(5, "amount"), "");
    }

    #[test]
    fn malformed_tables_are_parse_failures() {
        for bad in ["not json", r#"{"id": 1}"#, "[1, 2]"] {
            let err = decode_tables(TablePayload::One(bad.to_string())).unwrap_err();
            assert!(matches!(err, FinsightsError::Parse(_)), "{bad}");
        }
    }
}
