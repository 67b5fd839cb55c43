//! # Manufacturing Order Engine
//!
//! 製令規則引擎：物料需求、庫存比對、狀態轉換檢查、排程優先分數與工時估算

pub mod duration;
pub mod lifecycle;
pub mod priority;
pub mod requirements;
pub mod service;
pub mod transition;

// Re-export 主要類型
pub use duration::DurationEstimator;
pub use lifecycle::{
    CancellationOutcome, ConfirmationOutcome, LifecycleController, MaterialPlan, Reservation,
};
pub use priority::PriorityScorer;
pub use requirements::RequirementCalculator;
pub use service::ManufacturingOrderDomainService;
pub use transition::TransitionValidator;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Utc};
    use mfg_core::{
        ManufacturingOrder, MoPriority, MoStatus, NewManufacturingOrder, Quantity,
    };
    use rust_decimal::Decimal;
    use serde_json::Map;
    use uuid::Uuid;

    pub fn kg(value: Decimal) -> Quantity {
        Quantity::new(value, "kg").unwrap()
    }

    /// 指定狀態與負責人的製令
    pub fn order_in(status: MoStatus, assigned_to: Option<&str>) -> ManufacturingOrder {
        let mut record = base_order().to_persistence();
        record.status = status;
        record.assigned_to = assigned_to.map(str::to_string);
        ManufacturingOrder::from_persistence(record).unwrap()
    }

    /// 指定優先級、計劃完工日與建立時間的製令
    pub fn order_scheduled(
        status: MoStatus,
        priority: MoPriority,
        planned_end_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> ManufacturingOrder {
        let mut record = base_order().to_persistence();
        record.status = status;
        record.priority = priority;
        record.planned_end_date = planned_end_date;
        record.created_at = created_at;
        record.updated_at = created_at;
        ManufacturingOrder::from_persistence(record).unwrap()
    }

    fn base_order() -> ManufacturingOrder {
        ManufacturingOrder::create(NewManufacturingOrder {
            mo_number: format!("MO-{}", &Uuid::new_v4().simple().to_string()[..8]),
            product_id: "BIKE-001".to_string(),
            bom_id: Uuid::new_v4(),
            quantity: Quantity::new(Decimal::from(10), "pcs").unwrap(),
            priority: MoPriority::Normal,
            planned_start_date: None,
            planned_end_date: None,
            created_by: "planner".to_string(),
            assigned_to: None,
            notes: None,
            metadata: Map::new(),
        })
        .unwrap()
    }
}
