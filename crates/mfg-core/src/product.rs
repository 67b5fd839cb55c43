//! 產品模型（僅含製令驗證所需欄位）

use serde::{Deserialize, Serialize};

/// 產品類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// 原物料（不可製造）
    RawMaterial,
    /// 半成品
    Manufactured,
    /// 成品
    FinishedGood,
}

/// 產品
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// 產品ID
    pub id: String,

    /// 料號
    pub sku: String,

    /// 是否啟用
    pub is_active: bool,

    /// 產品類型
    pub product_type: ProductType,
}

impl Product {
    /// 創建新的產品（預設啟用）
    pub fn new(id: String, sku: String, product_type: ProductType) -> Self {
        Self {
            id,
            sku,
            is_active: true,
            product_type,
        }
    }

    /// 建構器模式：設置啟用狀態
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// 檢查是否為原物料
    pub fn is_raw_material(&self) -> bool {
        self.product_type == ProductType::RawMaterial
    }
}
