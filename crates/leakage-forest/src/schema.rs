//! Feature layout shared by training and serving.
//!
//! Numeric columns come first, in training-data order, followed by one
//! indicator column per kept categorical level. The first level of every
//! categorical column (lexicographic order) is dropped and acts as the
//! reference: a value equal to it, or never seen during training, encodes as
//! all zeros.

use std::collections::BTreeSet;

use leakage_core::{ClaimsRequest, ModelError};
use serde::{Deserialize, Serialize};

/// Something that can be turned into a feature row.
pub trait FeatureSource {
    fn numeric(&self, column: &str) -> Option<f64>;
    fn categorical(&self, column: &str) -> Option<&str>;
}

impl FeatureSource for ClaimsRequest {
    fn numeric(&self, column: &str) -> Option<f64> {
        self.numeric_feature(column)
    }

    fn categorical(&self, column: &str) -> Option<&str> {
        self.categorical_feature(column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoding {
    pub column: String,
    /// The reference level, encoded as all zeros.
    pub dropped: String,
    /// Levels that get their own indicator column, sorted.
    pub levels: Vec<String>,
}

impl CategoricalEncoding {
    /// Learns the levels of a column from its observed values.
    ///
    /// Blank values are missing, not a level: they get no indicator column and
    /// encode as all zeros.
    pub fn fit<'a, I>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sorted: Vec<String> = values
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect();
        let dropped = if sorted.is_empty() { String::new() } else { sorted.remove(0) };
        Self { column: column.into(), dropped, levels: sorted }
    }

    pub fn feature_names(&self) -> impl Iterator<Item = String> + '_ {
        self.levels.iter().map(move |level| format!("{}_{}", self.column, level))
    }

    fn encode_into(&self, value: &str, out: &mut Vec<f64>) {
        out.extend(self.levels.iter().map(|level| if level == value { 1.0 } else { 0.0 }));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeatureSchema {
    pub numeric: Vec<String>,
    pub categorical: Vec<CategoricalEncoding>,
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|c| c.levels.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names of the encoded feature row, in order.
    pub fn feature_names(&self) -> Vec<String> {
        self.numeric
            .iter()
            .cloned()
            .chain(self.categorical.iter().flat_map(|c| c.feature_names()))
            .collect()
    }

    pub fn encode<S: FeatureSource + ?Sized>(&self, source: &S) -> Result<Vec<f64>, ModelError> {
        let mut row = Vec::with_capacity(self.len());
        for column in &self.numeric {
            let value = source
                .numeric(column)
                .ok_or_else(|| ModelError::MissingFeature(column.clone()))?;
            row.push(value);
        }
        for encoding in &self.categorical {
            let value = source
                .categorical(&encoding.column)
                .ok_or_else(|| ModelError::MissingFeature(encoding.column.clone()))?;
            encoding.encode_into(value, &mut row);
        }
        Ok(row)
    }
}
