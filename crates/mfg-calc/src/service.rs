//! 製令領域服務
//!
//! 無狀態的規則引擎：所有操作都是輸入的純函數，不做 I/O、不寫日誌。
//! 唯一持有的是 [`ServiceConfig`]。

use chrono::{DateTime, Utc};
use mfg_core::{
    BomComponent, BomOperation, ManufacturingOrder, MaterialRequirement, Product, Quantity,
    ServiceConfig, StockAvailability,
};
use rust_decimal::Decimal;

use crate::duration::DurationEstimator;
use crate::priority::PriorityScorer;
use crate::requirements::RequirementCalculator;
use crate::transition::TransitionValidator;

/// 製令領域服務
#[derive(Debug, Clone, Default)]
pub struct ManufacturingOrderDomainService {
    config: ServiceConfig,
}

impl ManufacturingOrderDomainService {
    /// 以指定配置創建服務
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn validate_manufacturing_order_creation(
        &self,
        product: &Product,
        quantity: &Quantity,
        components: &[BomComponent],
    ) -> mfg_core::Result<()> {
        TransitionValidator::validate_creation(product, quantity, components)
    }

    pub fn calculate_material_requirements(
        &self,
        order_quantity: &Quantity,
        components: &[BomComponent],
    ) -> mfg_core::Result<Vec<MaterialRequirement>> {
        RequirementCalculator::calculate(order_quantity, components)
    }

    pub fn validate_material_availability(
        &self,
        requirements: &[MaterialRequirement],
        stock: &[StockAvailability],
    ) -> mfg_core::Result<Vec<MaterialRequirement>> {
        RequirementCalculator::validate_availability(requirements, stock)
    }

    pub fn validate_manufacturing_order_confirmation(
        &self,
        mo: &ManufacturingOrder,
        requirements: &[MaterialRequirement],
    ) -> mfg_core::Result<()> {
        TransitionValidator::validate_confirmation(mo, requirements, self.config.shortfall_reporting)
    }

    pub fn validate_manufacturing_order_start(&self, mo: &ManufacturingOrder) -> mfg_core::Result<()> {
        TransitionValidator::validate_start(mo)
    }

    pub fn validate_manufacturing_order_completion(
        &self,
        mo: &ManufacturingOrder,
        work_orders_completed: bool,
    ) -> mfg_core::Result<()> {
        TransitionValidator::validate_completion(mo, work_orders_completed)
    }

    pub fn validate_manufacturing_order_cancellation(
        &self,
        mo: &ManufacturingOrder,
    ) -> mfg_core::Result<()> {
        TransitionValidator::validate_cancellation(mo)
    }

    /// 以目前時間計算優先分數
    pub fn calculate_priority_score(&self, mo: &ManufacturingOrder) -> i64 {
        self.calculate_priority_score_at(mo, Utc::now())
    }

    pub fn calculate_priority_score_at(&self, mo: &ManufacturingOrder, now: DateTime<Utc>) -> i64 {
        PriorityScorer::score(mo, now, &self.config)
    }

    pub fn should_auto_prioritize(&self, mo: &ManufacturingOrder) -> bool {
        self.should_auto_prioritize_at(mo, Utc::now())
    }

    pub fn should_auto_prioritize_at(&self, mo: &ManufacturingOrder, now: DateTime<Utc>) -> bool {
        PriorityScorer::should_auto_prioritize(mo, now, &self.config)
    }

    /// 批次排序製令（分數由高到低）
    pub fn rank_by_priority<'a>(
        &self,
        orders: &'a [ManufacturingOrder],
        now: DateTime<Utc>,
    ) -> Vec<(&'a ManufacturingOrder, i64)> {
        PriorityScorer::rank(orders, now, &self.config)
    }

    /// 估算工時（分鐘）
    pub fn calculate_estimated_duration(
        &self,
        order_quantity: &Quantity,
        operations: &[BomOperation],
    ) -> mfg_core::Result<Decimal> {
        DurationEstimator::estimate(order_quantity, operations)
    }
}
