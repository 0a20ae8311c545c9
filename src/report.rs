//! Machine-readable result of one benchmark cell.
//!
//! One JSON object per (strategy, type, order), with the field names the
//! results viewer reads:
//!
//! ```json
//! {
//!   "name": "MatMult_Simd",
//!   "times_executed": 3,
//!   "avg_execution_time_seconds": 0.0021,
//!   "data_type": "Float",
//!   "matrix_dims": "128x128"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::select::Selection;

/// Prefix of every report name, followed by the strategy tag.
pub const NAME_PREFIX: &str = "MatMult_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub name: String,
    pub times_executed: usize,
    pub avg_execution_time_seconds: f64,
    pub data_type: String,
    /// `"<columns>x<rows>"`.
    pub matrix_dims: String,
}

impl BenchmarkReport {
    pub fn new(
        selection: Selection,
        times_executed: usize,
        avg_execution_time_seconds: f64,
    ) -> Self {
        Self {
            name: format!("{}{}", NAME_PREFIX, selection.mult),
            times_executed,
            avg_execution_time_seconds,
            data_type: selection.dtype.to_string(),
            matrix_dims: format!("{}x{}", selection.order, selection.order),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
