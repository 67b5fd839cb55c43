//! 物料需求計算與庫存比對

use mfg_core::{
    BomComponent, MaterialRequirement, MfgError, Quantity, StockAvailability, ValidationError,
};
use std::collections::{HashMap, HashSet};

/// 物料需求計算器
pub struct RequirementCalculator;

impl RequirementCalculator {
    /// 由 BOM 展開需求量
    ///
    /// 每個子件：`需求 = 用量 × 製令數量 × (1 + 損耗率)`。
    /// 可用量初始化為 0、短缺為 None，只計算需求，不比對庫存。
    pub fn calculate(
        order_quantity: &Quantity,
        components: &[BomComponent],
    ) -> mfg_core::Result<Vec<MaterialRequirement>> {
        components
            .iter()
            .map(|component| -> mfg_core::Result<MaterialRequirement> {
                let base = component.quantity.multiply(order_quantity.value())?;
                let scrap = base.multiply(component.scrap_factor)?;
                let required = base.add(&scrap)?;
                Ok(MaterialRequirement::new(component.component_id.clone(), required)?)
            })
            .collect()
    }

    /// 比對庫存快照，填入淨可用量與短缺量
    ///
    /// # 錯誤
    /// * `MissingStockData` - 子件沒有對應的庫存資料
    /// * `Validation(NegativeResult)` - 保留量大於可用量（資料不一致，不視為短缺）
    /// * `Validation(UnitMismatch)` - 庫存單位與需求單位不一致
    pub fn validate_availability(
        requirements: &[MaterialRequirement],
        stock: &[StockAvailability],
    ) -> mfg_core::Result<Vec<MaterialRequirement>> {
        let stock_map: HashMap<&str, &StockAvailability> = stock
            .iter()
            .map(|s| (s.product_id.as_str(), s))
            .collect();

        requirements
            .iter()
            .map(|requirement| -> mfg_core::Result<MaterialRequirement> {
                let availability = stock_map
                    .get(requirement.component_id.as_str())
                    .ok_or_else(|| MfgError::MissingStockData {
                        component_id: requirement.component_id.clone(),
                    })?;

                let net_available = availability.net_available()?;

                let shortfall = if requirement
                    .required_quantity
                    .is_greater_than(&net_available)?
                {
                    Some(requirement.required_quantity.subtract(&net_available)?)
                } else {
                    None
                };

                Ok(MaterialRequirement {
                    component_id: requirement.component_id.clone(),
                    required_quantity: requirement.required_quantity.clone(),
                    available_quantity: net_available,
                    shortfall,
                })
            })
            .collect()
    }

    /// 檢查需求清單涵蓋每個 BOM 子件
    pub fn ensure_coverage(
        components: &[BomComponent],
        requirements: &[MaterialRequirement],
    ) -> mfg_core::Result<()> {
        let covered: HashSet<&str> = requirements
            .iter()
            .map(|r| r.component_id.as_str())
            .collect();

        match components
            .iter()
            .find(|c| !covered.contains(c.component_id.as_str()))
        {
            Some(missing) => {
                Err(ValidationError::MissingRequirement(missing.component_id.clone()).into())
            }
            None => Ok(()),
        }
    }
}
