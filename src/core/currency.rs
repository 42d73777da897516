//! Display-time currency conversion.

use serde::{Deserialize, Serialize};

/// Fixed multiplicative factor applied to native-currency figures when they
/// are shown or exported. Ledger values are never stored converted.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DisplayConverter {
    pub code: String,
    pub symbol: String,
    pub rate: f64,
}

impl Default for DisplayConverter {
    fn default() -> Self {
        DisplayConverter {
            code: "INR".to_string(),
            symbol: "₹".to_string(),
            rate: 82.5,
        }
    }
}

impl DisplayConverter {
    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.rate
    }

    /// Converts and formats with two decimals, e.g. `₹1650.00`.
    pub fn format(&self, amount: f64) -> String {
        let converted = self.convert(amount);
        if converted < 0.0 {
            format!("-{}{:.2}", self.symbol, converted.abs())
        } else {
            format!("{}{:.2}", self.symbol, converted)
        }
    }
}
