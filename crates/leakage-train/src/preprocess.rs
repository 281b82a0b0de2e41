//! One-hot encoding and feature/target separation.

use std::collections::HashMap;

use leakage_forest::{CategoricalEncoding, FeatureSchema, FeatureSource};
use tracing::info;

use crate::data::RawTable;
use crate::error::TrainError;

pub const ID_COLUMN: &str = "id_loss";
pub const LABEL_COLUMN: &str = "leakage_label";
pub const CATEGORICAL_COLUMNS: [&str; 2] = ["pet_species", "pet_breed"];

/// Encoded features and binary targets, row-aligned.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub schema: FeatureSchema,
    pub classes: Vec<String>,
    pub x: Vec<Vec<f64>>,
    pub y: Vec<usize>,
}

/// One CSV row with numeric cells already parsed.
struct ParsedRow<'a> {
    numeric: HashMap<&'a str, f64>,
    categorical: HashMap<&'a str, &'a str>,
}

impl FeatureSource for ParsedRow<'_> {
    fn numeric(&self, column: &str) -> Option<f64> {
        self.numeric.get(column).copied()
    }

    fn categorical(&self, column: &str) -> Option<&str> {
        self.categorical.get(column).copied()
    }
}

/// Encodes the categorical columns (first level dropped) and splits off the label.
///
/// Every column other than the identifier, the label and the categorical
/// columns is treated as numeric and kept in file order.
pub fn preprocess_data(table: &RawTable) -> Result<Prepared, TrainError> {
    info!("Starting data preprocessing (One-Hot Encoding).");

    let require = |name: &str| {
        table
            .column_index(name)
            .ok_or_else(|| TrainError::MissingColumn(name.to_string()))
    };
    require(ID_COLUMN)?;
    let label_idx = require(LABEL_COLUMN)?;
    let categorical_idx = CATEGORICAL_COLUMNS
        .iter()
        .map(|&c| require(c).map(|idx| (c, idx)))
        .collect::<Result<Vec<_>, _>>()?;

    let numeric_idx: Vec<(&str, usize)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.as_str() != ID_COLUMN && h.as_str() != LABEL_COLUMN)
        .filter(|(_, h)| !CATEGORICAL_COLUMNS.contains(&h.as_str()))
        .map(|(idx, h)| (h.as_str(), idx))
        .collect();

    let schema = FeatureSchema {
        numeric: numeric_idx.iter().map(|(name, _)| name.to_string()).collect(),
        categorical: categorical_idx
            .iter()
            .map(|&(name, idx)| CategoricalEncoding::fit(name, table.rows.iter().map(|r| &r[idx])))
            .collect(),
    };

    let mut x = Vec::with_capacity(table.rows.len());
    let mut y = Vec::with_capacity(table.rows.len());
    for (row_no, record) in table.rows.iter().enumerate() {
        let mut numeric = HashMap::with_capacity(numeric_idx.len());
        for &(name, idx) in &numeric_idx {
            numeric.insert(name, parse_number(&record[idx], row_no, name)?);
        }
        let categorical = categorical_idx.iter().map(|&(name, idx)| (name, &record[idx])).collect();
        let row = ParsedRow { numeric, categorical };

        x.push(schema.encode(&row).map_err(TrainError::Encode)?);
        y.push(parse_label(&record[label_idx], row_no)?);
    }

    info!(
        "Features shape: ({}, {}), Target shape: ({},)",
        x.len(),
        schema.len(),
        y.len()
    );
    Ok(Prepared { schema, classes: vec!["0".to_string(), "1".to_string()], x, y })
}

fn parse_number(cell: &str, row: usize, column: &str) -> Result<f64, TrainError> {
    let invalid = || TrainError::InvalidValue { row, column: column.to_string(), value: cell.to_string() };
    match cell.to_ascii_lowercase().as_str() {
        "true" => Ok(1.0),
        "false" => Ok(0.0),
        other => other
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(invalid),
    }
}

fn parse_label(cell: &str, row: usize) -> Result<usize, TrainError> {
    match parse_number(cell, row, LABEL_COLUMN)? {
        v if v == 0.0 => Ok(0),
        v if v == 1.0 => Ok(1),
        _ => Err(TrainError::InvalidValue {
            row,
            column: LABEL_COLUMN.to_string(),
            value: cell.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leakage_core::{ClaimsRequest, PetSpecies};

    use crate::data::parse_data;

    const SAMPLE: &str = "\
id_loss,claim_amount,pet_breed,pet_species,owner_age,number_of_previous_claims,days_to_claim,policy_tenure,leakage_label
1,450.75,labrador,dog,42,2,5,12,0
2,1200.00,siamese,cat,35,0,1,3,1
3,80.10,beagle,dog,51,1,30,24,0
4,990.00,labrador,dog,28,4,2,6,1
";

    #[test]
    fn test_features_exclude_label_and_identifier() {
        let prepared = preprocess_data(&parse_data(SAMPLE).unwrap()).unwrap();
        let names = prepared.schema.feature_names();
        assert!(!names.iter().any(|n| n == ID_COLUMN || n == LABEL_COLUMN));
        assert_eq!(
            names,
            vec![
                "claim_amount",
                "owner_age",
                "number_of_previous_claims",
                "days_to_claim",
                "policy_tenure",
                "pet_species_dog",
                "pet_breed_labrador",
                "pet_breed_siamese",
            ]
        );
    }

    #[test]
    fn test_rows_encoded() {
        let prepared = preprocess_data(&parse_data(SAMPLE).unwrap()).unwrap();
        assert_eq!(prepared.y, vec![0, 1, 0, 1]);
        assert_eq!(prepared.x[1], vec![1200.0, 35.0, 0.0, 1.0, 3.0, 0.0, 0.0, 1.0]);
        // beagle is the dropped reference level
        assert_eq!(prepared.x[2][5..], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_label_column() {
        let table = parse_data("id_loss,pet_breed,pet_species\n1,a,dog\n").unwrap();
        let err = preprocess_data(&table).unwrap_err();
        assert!(matches!(err, TrainError::MissingColumn(c) if c == LABEL_COLUMN));
    }

    #[test]
    fn test_invalid_numeric_cell() {
        let table = parse_data(
            "id_loss,claim_amount,pet_breed,pet_species,leakage_label\n1,lots,labrador,dog,0\n",
        )
        .unwrap();
        let err = preprocess_data(&table).unwrap_err();
        assert!(matches!(err, TrainError::InvalidValue { row: 0, ref column, .. } if column == "claim_amount"));
    }

    #[test]
    fn test_boolean_labels_accepted() {
        let table = parse_data(
            "id_loss,claim_amount,pet_breed,pet_species,leakage_label\n1,10,a,dog,True\n2,20,b,cat,false\n",
        )
        .unwrap();
        assert_eq!(preprocess_data(&table).unwrap().y, vec![1, 0]);
    }

    #[test]
    fn test_label_out_of_range() {
        let table = parse_data(
            "id_loss,claim_amount,pet_breed,pet_species,leakage_label\n1,10,a,dog,2\n",
        )
        .unwrap();
        assert!(matches!(preprocess_data(&table), Err(TrainError::InvalidValue { .. })));
    }

    #[test]
    fn test_blank_category_gets_no_column() {
        let table = parse_data(
            "id_loss,claim_amount,pet_breed,pet_species,leakage_label\n1,10,,dog,0\n2,20,beagle,cat,1\n3,30,labrador,dog,0\n",
        )
        .unwrap();
        let prepared = preprocess_data(&table).unwrap();
        assert_eq!(
            prepared.schema.feature_names(),
            vec!["claim_amount", "pet_species_dog", "pet_breed_labrador"]
        );
        assert_eq!(prepared.x[0], vec![10.0, 1.0, 0.0]);
    }

    #[test]
    fn test_schema_from_json_encodes_claim_like_csv_row() {
        let prepared = preprocess_data(&parse_data(SAMPLE).unwrap()).unwrap();
        let json = serde_json::to_string(&prepared.schema).unwrap();
        let schema: FeatureSchema = serde_json::from_str(&json).unwrap();

        let claim = ClaimsRequest {
            id_loss: 2,
            claim_amount: 1200.0,
            pet_breed: "siamese".into(),
            pet_species: PetSpecies::Cat,
            owner_age: 35,
            number_of_previous_claims: 0,
            days_to_claim: 1,
            policy_tenure: 3,
        };
        assert_eq!(schema.encode(&claim).unwrap(), prepared.x[1]);
    }
}
