//! 製令生命週期控制
//!
//! 每個轉換都是「領域服務檢查 → 記錄重建」兩步。檢查失敗時原記錄不變。
//! 物料保留/釋放只以結果回報，實際執行由庫存協作方負責。

use mfg_core::{
    Bom, BusinessRuleViolation, ManufacturingOrder, MaterialRequirement, MfgError, MoStatus,
    NewManufacturingOrder, Product, Quantity, StockAvailability, ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::requirements::RequirementCalculator;
use crate::service::ManufacturingOrderDomainService;

/// 已比對庫存的物料計畫
///
/// 只能由 [`LifecycleController::plan_requirements`] 產生，涵蓋 BOM 每個子件，
/// 並綁定計算時的製令與 BOM。
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPlan {
    mo_id: Uuid,
    bom_id: Uuid,
    requirements: Vec<MaterialRequirement>,
}

impl MaterialPlan {
    pub fn mo_id(&self) -> Uuid {
        self.mo_id
    }

    pub fn bom_id(&self) -> Uuid {
        self.bom_id
    }

    /// 各子件需求（依 BOM 順序）
    pub fn requirements(&self) -> &[MaterialRequirement] {
        &self.requirements
    }

    pub fn has_shortfall(&self) -> bool {
        self.requirements.iter().any(MaterialRequirement::has_shortfall)
    }
}

/// 待建立的物料保留
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub component_id: String,
    pub quantity: Quantity,
}

/// 確認結果
#[derive(Debug, Clone)]
pub struct ConfirmationOutcome {
    /// 確認後的製令
    pub order: ManufacturingOrder,

    /// 需由庫存協作方建立的保留
    pub reservations: Vec<Reservation>,
}

/// 取消結果
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    /// 取消後的製令
    pub order: ManufacturingOrder,

    /// 是否需要釋放既有保留（取消前已確認）
    pub release_reservations: bool,
}

/// 生命週期控制器
#[derive(Debug, Clone, Default)]
pub struct LifecycleController {
    service: ManufacturingOrderDomainService,
}

impl LifecycleController {
    pub fn new(service: ManufacturingOrderDomainService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &ManufacturingOrderDomainService {
        &self.service
    }

    /// 開立製令：檢查產品與 BOM 後建立 Draft 製令
    pub fn open(
        &self,
        product: &Product,
        bom: &Bom,
        props: NewManufacturingOrder,
    ) -> mfg_core::Result<ManufacturingOrder> {
        if bom.id() != props.bom_id || bom.product_id() != product.id || props.product_id != product.id
        {
            tracing::warn!(
                "製令 {} 的 BOM {} 不屬於產品 {}",
                props.mo_number,
                bom.id(),
                product.id
            );
            return Err(ValidationError::BomMismatch {
                mo_number: props.mo_number,
                bom_id: bom.id().to_string(),
            }
            .into());
        }

        if !bom.can_be_used() {
            tracing::warn!(
                "製令 {} 的 BOM {} 未啟用或未核准",
                props.mo_number,
                bom.id()
            );
            return Err(BusinessRuleViolation::BomNotUsable {
                bom_id: bom.id().to_string(),
            }
            .into());
        }

        if let Err(err) =
            self.service
                .validate_manufacturing_order_creation(product, &props.quantity, bom.components())
        {
            tracing::warn!("製令 {} 建立失敗: {}", props.mo_number, err);
            return Err(err);
        }

        let mo = ManufacturingOrder::create(props)?;
        tracing::info!(
            "製令 {} 已建立：產品 {}，數量 {}",
            mo.mo_number(),
            mo.product_id(),
            mo.quantity()
        );
        Ok(mo)
    }

    /// 計算製令物料需求並比對庫存快照
    pub fn plan_requirements(
        &self,
        mo: &ManufacturingOrder,
        bom: &Bom,
        stock: &[StockAvailability],
    ) -> mfg_core::Result<MaterialPlan> {
        if bom.id() != mo.bom_id() {
            return Err(ValidationError::BomMismatch {
                mo_number: mo.mo_number().to_string(),
                bom_id: bom.id().to_string(),
            }
            .into());
        }

        let demand = self
            .service
            .calculate_material_requirements(mo.quantity(), bom.components())?;
        for requirement in &demand {
            tracing::debug!(
                "製令 {} 物料 {} 需求 {}",
                mo.mo_number(),
                requirement.component_id,
                requirement.required_quantity
            );
        }

        let checked = self.service.validate_material_availability(&demand, stock)?;
        RequirementCalculator::ensure_coverage(bom.components(), &checked)?;

        let short = checked.iter().filter(|r| r.has_shortfall()).count();
        if short > 0 {
            tracing::warn!("製令 {} 有 {} 項物料短缺", mo.mo_number(), short);
        }

        Ok(MaterialPlan {
            mo_id: mo.id(),
            bom_id: bom.id(),
            requirements: checked,
        })
    }

    /// 確認製令（Draft → Confirmed），回傳需建立的物料保留
    ///
    /// 只接受由 [`Self::plan_requirements`] 為同一製令產生的計畫。
    pub fn confirm(
        &self,
        mo: &ManufacturingOrder,
        plan: &MaterialPlan,
    ) -> mfg_core::Result<ConfirmationOutcome> {
        if plan.mo_id != mo.id() || plan.bom_id != mo.bom_id() {
            tracing::warn!("製令 {} 的物料計畫不符", mo.mo_number());
            return Err(ValidationError::PlanMismatch {
                mo_number: mo.mo_number().to_string(),
            }
            .into());
        }

        self.checked(
            mo,
            "confirm",
            self.service
                .validate_manufacturing_order_confirmation(mo, plan.requirements()),
        )?;

        let order = mo.confirm()?;
        let reservations: Vec<Reservation> = plan
            .requirements()
            .iter()
            .map(|r| Reservation {
                component_id: r.component_id.clone(),
                quantity: r.required_quantity.clone(),
            })
            .collect();

        tracing::info!(
            "製令 {} 已確認，保留 {} 項物料",
            order.mo_number(),
            reservations.len()
        );
        Ok(ConfirmationOutcome {
            order,
            reservations,
        })
    }

    /// 開工（Confirmed → InProgress）
    pub fn start(&self, mo: &ManufacturingOrder) -> mfg_core::Result<ManufacturingOrder> {
        self.checked(mo, "start", self.service.validate_manufacturing_order_start(mo))?;

        let order = mo.start()?;
        tracing::info!(
            "製令 {} 開工，負責人 {}",
            order.mo_number(),
            order.assigned_to().unwrap_or_default()
        );
        Ok(order)
    }

    /// 完工（InProgress → Completed）
    pub fn complete(
        &self,
        mo: &ManufacturingOrder,
        work_orders_completed: bool,
    ) -> mfg_core::Result<ManufacturingOrder> {
        self.checked(
            mo,
            "complete",
            self.service
                .validate_manufacturing_order_completion(mo, work_orders_completed),
        )?;

        let order = mo.complete()?;
        tracing::info!(
            "製令 {} 完工，實際工時 {:?} 分鐘",
            order.mo_number(),
            order.duration_minutes()
        );
        Ok(order)
    }

    /// 取消；已確認或生產中的製令需釋放保留
    pub fn cancel(
        &self,
        mo: &ManufacturingOrder,
        reason: Option<&str>,
    ) -> mfg_core::Result<CancellationOutcome> {
        self.checked(
            mo,
            "cancel",
            self.service.validate_manufacturing_order_cancellation(mo),
        )?;

        let release_reservations =
            matches!(mo.status(), MoStatus::Confirmed | MoStatus::InProgress);
        let order = mo.cancel(reason)?;

        tracing::info!(
            "製令 {} 已取消（原狀態 {}），釋放保留: {}",
            order.mo_number(),
            mo.status(),
            release_reservations
        );
        Ok(CancellationOutcome {
            order,
            release_reservations,
        })
    }

    /// 依交期自動提升為 Urgent；不需調整時回傳 None
    pub fn auto_prioritize(
        &self,
        mo: &ManufacturingOrder,
    ) -> mfg_core::Result<Option<ManufacturingOrder>> {
        if mo.status().is_terminal()
            || mo.priority() == mfg_core::MoPriority::Urgent
            || !self.service.should_auto_prioritize(mo)
        {
            return Ok(None);
        }

        let order = mo.change_priority(mfg_core::MoPriority::Urgent)?;
        tracing::info!(
            "製令 {} 優先級由 {} 提升為 {}",
            order.mo_number(),
            mo.priority(),
            order.priority()
        );
        Ok(Some(order))
    }

    fn checked(
        &self,
        mo: &ManufacturingOrder,
        action: &str,
        verdict: mfg_core::Result<()>,
    ) -> mfg_core::Result<()> {
        if let Err(err) = &verdict {
            match err {
                MfgError::BusinessRule(BusinessRuleViolation::InvalidStatusTransition { .. }) => {
                    tracing::warn!(
                        "製令 {} 狀態 {} 不可執行 {}",
                        mo.mo_number(),
                        mo.status(),
                        action
                    );
                }
                _ => tracing::warn!("製令 {} 執行 {} 被拒: {}", mo.mo_number(), action, err),
            }
        }
        verdict
    }
}
