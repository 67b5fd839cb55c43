//! # Manufacturing Core
//!
//! 製令與物料需求的核心資料模型：數量/金額值物件、BOM 記錄、製令記錄、
//! 庫存快照與錯誤分類。本 crate 不做任何 I/O。

pub mod bom;
pub mod config;
pub mod error;
pub mod money;
pub mod operation;
pub mod order;
pub mod product;
pub mod quantity;
pub mod stock;

// Re-export 主要類型
pub use bom::{Bom, BomComponent, BomComponentRecord, BomPersistence, NewBom};
pub use config::{DueDateBonus, ServiceConfig, ShortfallReporting};
pub use error::{BusinessRuleViolation, ValidationError};
pub use money::Money;
pub use operation::BomOperation;
pub use order::{
    ManufacturingOrder, ManufacturingOrderPersistence, MoPriority, MoStatus,
    NewManufacturingOrder,
};
pub use product::{Product, ProductType};
pub use quantity::Quantity;
pub use stock::{MaterialRequirement, ShortfallLine, StockAvailability};

use rust_decimal::Decimal;

/// 製造領域錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MfgError {
    #[error("驗證錯誤: {0}")]
    Validation(#[from] ValidationError),

    #[error("業務規則錯誤: {0}")]
    BusinessRule(#[from] BusinessRuleViolation),

    /// 短缺物料的需求合計與可用合計；逐料回報模式下 `shortfalls` 帶明細
    #[error("庫存不足：需求合計 {total_required}，可用合計 {total_available}")]
    InsufficientStock {
        total_required: Decimal,
        total_available: Decimal,
        shortfalls: Vec<ShortfallLine>,
    },

    #[error("缺少物料 {component_id} 的庫存資料")]
    MissingStockData { component_id: String },
}

impl MfgError {
    /// 穩定的錯誤代碼，供 API 層對應回應
    pub fn code(&self) -> &'static str {
        match self {
            MfgError::Validation(_) => "VALIDATION_ERROR",
            MfgError::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            MfgError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            MfgError::MissingStockData { .. } => "MISSING_STOCK_DATA",
        }
    }
}

pub type Result<T> = std::result::Result<T, MfgError>;
