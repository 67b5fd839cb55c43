//! 錯誤分類
//!
//! 值物件與記錄的輸入驗證錯誤（[`ValidationError`]），
//! 以及資料合法但違反業務規則的錯誤（[`BusinessRuleViolation`]）。

use rust_decimal::Decimal;

/// 輸入驗證錯誤
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} 為必填欄位")]
    Required { field: &'static str },

    #[error("{field} 長度不可超過 {max} 個字元")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} 必須大於 0（實際: {value}）")]
    MustBePositive { field: &'static str, value: Decimal },

    #[error("{field} 不可為負數（實際: {value}）")]
    NegativeValue { field: &'static str, value: Decimal },

    #[error("{field} 超出範圍 [{min}, {max}]（實際: {value}）")]
    OutOfRange {
        field: &'static str,
        min: Decimal,
        max: Decimal,
        value: Decimal,
    },

    #[error("單位不一致: {left} vs {right}")]
    UnitMismatch { left: String, right: String },

    #[error("幣別不一致: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("運算結果為負數: {left} - {right}")]
    NegativeResult { left: Decimal, right: Decimal },

    #[error("無效的幣別代碼: {0}（需為 3 碼 ISO 代碼）")]
    InvalidCurrency(String),

    #[error("{field} 格式錯誤: {value}")]
    InvalidFormat { field: &'static str, value: String },

    #[error("BOM 子件重複: {0}")]
    DuplicateComponent(String),

    #[error("找不到 BOM 子件: {0}")]
    ComponentNotFound(String),

    #[error("BOM {bom_id} 與製令 {mo_number} 不符")]
    BomMismatch { mo_number: String, bom_id: String },

    #[error("{field} 日期區間錯誤：結束早於開始")]
    InvalidDateRange { field: &'static str },

    #[error("工作中心效率必須大於 0（工序 {operation}，實際: {efficiency}）")]
    InvalidEfficiency { operation: String, efficiency: Decimal },

    #[error("物料 {0} 沒有需求資料")]
    MissingRequirement(String),

    #[error("物料需求不是為製令 {mo_number} 計算的")]
    PlanMismatch { mo_number: String },

    #[error("除數不可為 0")]
    DivisionByZero,

    #[error("{operation} 運算溢位")]
    Overflow { operation: &'static str },
}

/// 業務規則違反
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BusinessRuleViolation {
    #[error("產品 {product_id} 未啟用，不可建立製令")]
    InactiveProduct { product_id: String },

    #[error("產品 {product_id} 為原物料，不可製造")]
    RawMaterialNotManufacturable { product_id: String },

    #[error("BOM 沒有任何子件")]
    EmptyBom,

    #[error("製令 {mo_number} 狀態為 {from}，不可執行 {action}")]
    InvalidStatusTransition {
        mo_number: String,
        from: String,
        action: &'static str,
    },

    #[error("製令 {mo_number} 尚未指派負責人，不可開工")]
    MissingAssignee { mo_number: String },

    #[error("製令 {mo_number} 仍有未完工的工單")]
    WorkOrdersIncomplete { mo_number: String },

    #[error("BOM {bom_id} 未啟用或未核准，不可用於開立製令")]
    BomNotUsable { bom_id: String },

    #[error("BOM {bom_id} 已由 {approved_by} 核准，不可重複核准")]
    AlreadyApproved { bom_id: String, approved_by: String },
}
