use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// マーケットプレイス手数料の合計上限（%）
pub const MAX_FEES: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeForm {
    pub recipient: String,
    #[serde(alias = "amount_percentage")]
    pub amount_percentage: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeeForm {
    pub fn new(recipient: &str, amount_percentage: f64) -> Self {
        Self {
            recipient: recipient.to_string(),
            amount_percentage,
            extra: Map::new(),
        }
    }
}

/// 手数料の合計（%）
pub fn total_percentage(fees: &[FeeForm]) -> f64 {
    fees.iter().map(|f| f.amount_percentage).sum()
}
