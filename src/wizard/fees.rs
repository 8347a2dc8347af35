// ========================================
// マーケットプレイス手数料エディタ
// ========================================
//
// 合計が MAX_FEES を超えると追加ボタンだけが無効になり、警告を表示する。
// 保存（commit）は上限に関係なく行える。

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use std::fmt;

use super::store::{ConfigAction, ConfigStore};
use crate::model::app_config::AppConfig;
use crate::model::fee::{FeeForm, MAX_FEES, total_percentage};

lazy_static! {
    static ref ADDRESS: Regex = Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address regex");
}

pub fn is_valid_address(address: &str) -> bool {
    ADDRESS.is_match(address)
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeeError {
    InvalidAddress(String),
    InvalidAmount(f64),
    DuplicateRecipient(String),
    OverLimit { total: f64, max_fee: f64 },
    IndexOutOfRange(usize),
}

impl fmt::Display for FeeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeError::InvalidAddress(a) => write!(f, "'{}' is not a valid address", a),
            FeeError::InvalidAmount(v) => write!(f, "Fee amount must be greater than 0 (got {})", v),
            FeeError::DuplicateRecipient(a) => write!(f, "{} already receives a fee", a),
            FeeError::OverLimit { total, max_fee } => {
                write!(f, "Total fees {}% exceed the {}% limit", total, max_fee)
            }
            FeeError::IndexOutOfRange(i) => write!(f, "No fee at position {}", i),
        }
    }
}

impl std::error::Error for FeeError {}

/// 上限超過時に表示する警告
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeAlert {
    pub total: f64,
    pub max_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeeEditor {
    fees: Vec<FeeForm>,
}

impl FeeEditor {
    pub fn new(fees: Vec<FeeForm>) -> Self {
        Self { fees }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.fees().to_vec())
    }

    pub fn fees(&self) -> &[FeeForm] {
        &self.fees
    }

    pub fn total(&self) -> f64 {
        total_percentage(&self.fees)
    }

    /// 追加ボタンが有効か
    pub fn can_add(&self) -> bool {
        self.total() <= MAX_FEES
    }

    pub fn over_limit_alert(&self) -> Option<FeeAlert> {
        let total = self.total();
        (total > MAX_FEES).then_some(FeeAlert {
            total,
            max_fee: MAX_FEES,
        })
    }

    pub fn add_fee(&mut self, fee: FeeForm) -> Result<(), FeeError> {
        if !self.can_add() {
            return Err(FeeError::OverLimit {
                total: self.total(),
                max_fee: MAX_FEES,
            });
        }
        if !is_valid_address(&fee.recipient) {
            return Err(FeeError::InvalidAddress(fee.recipient));
        }
        if !fee.amount_percentage.is_finite() || fee.amount_percentage <= 0.0 {
            return Err(FeeError::InvalidAmount(fee.amount_percentage));
        }
        if self
            .fees
            .iter()
            .any(|f| f.recipient.eq_ignore_ascii_case(&fee.recipient))
        {
            return Err(FeeError::DuplicateRecipient(fee.recipient));
        }
        debug!("Fee added: {} {}%", fee.recipient, fee.amount_percentage);
        self.fees.push(fee);
        if let Some(alert) = self.over_limit_alert() {
            warn!("Fees total {}% exceeds the {}% limit", alert.total, alert.max_fee);
        }
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<FeeForm, FeeError> {
        if index >= self.fees.len() {
            return Err(FeeError::IndexOutOfRange(index));
        }
        Ok(self.fees.remove(index))
    }

    /// 手数料一覧を反映した設定を返す
    pub fn commit(&self, config: &AppConfig) -> AppConfig {
        AppConfig {
            fees: Some(self.fees.clone()),
            ..config.clone()
        }
    }

    pub fn commit_to(&self, store: &mut ConfigStore) -> Result<(), String> {
        store.dispatch(ConfigAction::SetFees(self.fees.clone()))
    }
}
