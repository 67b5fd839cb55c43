//! 庫存快照與物料需求

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::quantity::Quantity;

/// 庫存可用量快照（由庫存協作方提供，每個 BOM 子件一筆）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAvailability {
    /// 物料ID
    pub product_id: String,

    /// 現有可用數量
    pub available_quantity: Quantity,

    /// 已被其他訂單保留的數量
    pub reserved_quantity: Quantity,
}

impl StockAvailability {
    pub fn new(product_id: String, available_quantity: Quantity, reserved_quantity: Quantity) -> Self {
        Self {
            product_id,
            available_quantity,
            reserved_quantity,
        }
    }

    /// 淨可用量 = 可用 - 已保留
    ///
    /// 保留量超過可用量代表資料不一致，回傳 `NegativeResult`。
    pub fn net_available(&self) -> Result<Quantity, ValidationError> {
        self.available_quantity.subtract(&self.reserved_quantity)
    }
}

/// 物料需求（計算產物，不持久化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    /// 物料ID
    pub component_id: String,

    /// 需求數量（含損耗）
    pub required_quantity: Quantity,

    /// 淨可用數量
    pub available_quantity: Quantity,

    /// 短缺數量（無短缺時為 None）
    pub shortfall: Option<Quantity>,
}

impl MaterialRequirement {
    /// 創建尚未比對庫存的需求（可用量為 0，無短缺）
    pub fn new(component_id: String, required_quantity: Quantity) -> Result<Self, ValidationError> {
        let available_quantity = Quantity::zero(required_quantity.unit())?;
        Ok(Self {
            component_id,
            required_quantity,
            available_quantity,
            shortfall: None,
        })
    }

    /// 檢查是否短缺
    pub fn has_shortfall(&self) -> bool {
        self.shortfall.is_some()
    }
}

/// 單一物料的短缺明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortfallLine {
    pub component_id: String,
    pub required: Quantity,
    pub available: Quantity,
    pub shortfall: Quantity,
}

/// 合計需求量（忽略單位，僅供彙總報表使用）
pub fn total_required(requirements: &[MaterialRequirement]) -> Result<Decimal, ValidationError> {
    checked_total(requirements.iter().map(|r| r.required_quantity.value()))
}

/// 合計可用量（忽略單位，僅供彙總報表使用）
pub fn total_available(requirements: &[MaterialRequirement]) -> Result<Decimal, ValidationError> {
    checked_total(requirements.iter().map(|r| r.available_quantity.value()))
}

fn checked_total(mut values: impl Iterator<Item = Decimal>) -> Result<Decimal, ValidationError> {
    values.try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(value)
            .ok_or(ValidationError::Overflow { operation: "sum" })
    })
}

/// 擷取短缺明細
pub fn shortfall_lines(requirements: &[MaterialRequirement]) -> Vec<ShortfallLine> {
    requirements
        .iter()
        .filter_map(|r| {
            r.shortfall.as_ref().map(|shortfall| ShortfallLine {
                component_id: r.component_id.clone(),
                required: r.required_quantity.clone(),
                available: r.available_quantity.clone(),
                shortfall: shortfall.clone(),
            })
        })
        .collect()
}
