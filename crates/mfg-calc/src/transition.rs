//! 製令建立與狀態轉換的規則檢查
//!
//! 只判斷「能不能」，不產生新狀態；狀態重建由 [`crate::lifecycle`] 負責。

use mfg_core::stock::{shortfall_lines, total_available, total_required};
use mfg_core::{
    BomComponent, BusinessRuleViolation, ManufacturingOrder, MaterialRequirement, MfgError,
    Product, Quantity, ShortfallReporting, ValidationError,
};

/// 規則檢查器
pub struct TransitionValidator;

impl TransitionValidator {
    /// 建立製令前的檢查
    pub fn validate_creation(
        product: &Product,
        quantity: &Quantity,
        components: &[BomComponent],
    ) -> mfg_core::Result<()> {
        if !product.is_active {
            return Err(BusinessRuleViolation::InactiveProduct {
                product_id: product.id.clone(),
            }
            .into());
        }

        if product.is_raw_material() {
            return Err(BusinessRuleViolation::RawMaterialNotManufacturable {
                product_id: product.id.clone(),
            }
            .into());
        }

        if quantity.is_zero() {
            return Err(ValidationError::MustBePositive {
                field: "quantity",
                value: quantity.value(),
            }
            .into());
        }

        if components.is_empty() {
            return Err(BusinessRuleViolation::EmptyBom.into());
        }

        Ok(())
    }

    /// 確認前的檢查：狀態必須為 Draft，且所有物料無短缺
    ///
    /// 短缺時回傳 `InsufficientStock`，金額為「短缺物料」的需求合計與可用合計。
    /// `PerComponent` 模式另外附上各物料明細。
    pub fn validate_confirmation(
        mo: &ManufacturingOrder,
        requirements: &[MaterialRequirement],
        reporting: ShortfallReporting,
    ) -> mfg_core::Result<()> {
        if !mo.can_be_confirmed() {
            return Err(invalid_transition(mo, "confirm"));
        }

        let short: Vec<MaterialRequirement> = requirements
            .iter()
            .filter(|r| r.has_shortfall())
            .cloned()
            .collect();

        if short.is_empty() {
            return Ok(());
        }

        let shortfalls = match reporting {
            ShortfallReporting::Aggregate => Vec::new(),
            ShortfallReporting::PerComponent => shortfall_lines(&short),
        };

        Err(MfgError::InsufficientStock {
            total_required: total_required(&short)?,
            total_available: total_available(&short)?,
            shortfalls,
        })
    }

    /// 開工前的檢查：狀態必須為 Confirmed，且已指派負責人
    pub fn validate_start(mo: &ManufacturingOrder) -> mfg_core::Result<()> {
        if !mo.can_be_started() {
            return Err(invalid_transition(mo, "start"));
        }

        if mo.assigned_to().is_none() {
            return Err(BusinessRuleViolation::MissingAssignee {
                mo_number: mo.mo_number().to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// 完工前的檢查：狀態必須為 InProgress，且工單已全部完工
    pub fn validate_completion(
        mo: &ManufacturingOrder,
        work_orders_completed: bool,
    ) -> mfg_core::Result<()> {
        if !mo.can_be_completed() {
            return Err(invalid_transition(mo, "complete"));
        }

        if !work_orders_completed {
            return Err(BusinessRuleViolation::WorkOrdersIncomplete {
                mo_number: mo.mo_number().to_string(),
            }
            .into());
        }

        Ok(())
    }

    pub fn validate_cancellation(mo: &ManufacturingOrder) -> mfg_core::Result<()> {
        if !mo.can_be_cancelled() {
            return Err(invalid_transition(mo, "cancel"));
        }
        Ok(())
    }
}

fn invalid_transition(mo: &ManufacturingOrder, action: &'static str) -> MfgError {
    BusinessRuleViolation::InvalidStatusTransition {
        mo_number: mo.mo_number().to_string(),
        from: mo.status().to_string(),
        action,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{kg, order_in};
    use mfg_core::{MoStatus, ProductType};
    use rust_decimal_macros::dec;

    fn product(product_type: ProductType) -> Product {
        Product::new("P-001".to_string(), "BIKE-001".to_string(), product_type)
    }

    fn component() -> BomComponent {
        BomComponent::new("STEEL-001".to_string(), kg(dec!(1)), 10)
    }

    fn requirement(required: rust_decimal::Decimal, available: rust_decimal::Decimal) -> MaterialRequirement {
        let mut r = MaterialRequirement::new("STEEL-001".to_string(), kg(required)).unwrap();
        r.available_quantity = kg(available);
        if required > available {
            r.shortfall = Some(kg(required - available));
        }
        r
    }

    #[test]
    fn test_creation_rules() {
        let qty = kg(dec!(5));
        let components = vec![component()];

        assert!(TransitionValidator::validate_creation(
            &product(ProductType::FinishedGood),
            &qty,
            &components
        )
        .is_ok());

        let inactive = product(ProductType::FinishedGood).with_active(false);
        assert!(matches!(
            TransitionValidator::validate_creation(&inactive, &qty, &components),
            Err(MfgError::BusinessRule(BusinessRuleViolation::InactiveProduct { .. }))
        ));

        assert!(matches!(
            TransitionValidator::validate_creation(&product(ProductType::RawMaterial), &qty, &components),
            Err(MfgError::BusinessRule(
                BusinessRuleViolation::RawMaterialNotManufacturable { .. }
            ))
        ));

        assert!(matches!(
            TransitionValidator::validate_creation(
                &product(ProductType::Manufactured),
                &kg(dec!(0)),
                &components
            ),
            Err(MfgError::Validation(ValidationError::MustBePositive { .. }))
        ));

        assert_eq!(
            TransitionValidator::validate_creation(&product(ProductType::Manufactured), &qty, &[]),
            Err(MfgError::BusinessRule(BusinessRuleViolation::EmptyBom))
        );
    }

    #[test]
    fn test_confirmation_without_shortfall() {
        let mo = order_in(MoStatus::Draft, None);
        let requirements = vec![requirement(dec!(22), dec!(30))];
        assert!(TransitionValidator::validate_confirmation(
            &mo,
            &requirements,
            ShortfallReporting::Aggregate
        )
        .is_ok());
    }

    #[test]
    fn test_confirmation_aggregates_shortfalls() {
        let mo = order_in(MoStatus::Draft, None);
        let mut second = requirement(dec!(10), dec!(4));
        second.component_id = "BOLT-001".to_string();
        let requirements = vec![
            requirement(dec!(22), dec!(20)),
            second,
            requirement(dec!(5), dec!(50)),
        ];

        let err =
            TransitionValidator::validate_confirmation(&mo, &requirements, ShortfallReporting::Aggregate)
                .unwrap_err();

        // 只合計短缺物料：需求 22 + 10，可用 20 + 4
        assert_eq!(
            err,
            MfgError::InsufficientStock {
                total_required: dec!(32),
                total_available: dec!(24),
                shortfalls: Vec::new(),
            }
        );
    }

    #[test]
    fn test_confirmation_per_component_report() {
        let mo = order_in(MoStatus::Draft, None);
        let requirements = vec![requirement(dec!(22), dec!(20)), requirement(dec!(1), dec!(9))];

        let err = TransitionValidator::validate_confirmation(
            &mo,
            &requirements,
            ShortfallReporting::PerComponent,
        )
        .unwrap_err();

        match err {
            MfgError::InsufficientStock { shortfalls, .. } => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].shortfall, kg(dec!(2)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_confirmation_wrong_status() {
        let mo = order_in(MoStatus::Confirmed, None);
        assert!(matches!(
            TransitionValidator::validate_confirmation(&mo, &[], ShortfallReporting::Aggregate),
            Err(MfgError::BusinessRule(BusinessRuleViolation::InvalidStatusTransition { .. }))
        ));
    }

    #[test]
    fn test_start_requires_assignee() {
        let unassigned = order_in(MoStatus::Confirmed, None);
        assert!(matches!(
            TransitionValidator::validate_start(&unassigned),
            Err(MfgError::BusinessRule(BusinessRuleViolation::MissingAssignee { .. }))
        ));

        let assigned = order_in(MoStatus::Confirmed, Some("operator-7"));
        assert!(TransitionValidator::validate_start(&assigned).is_ok());

        let draft = order_in(MoStatus::Draft, Some("operator-7"));
        assert!(TransitionValidator::validate_start(&draft).is_err());
    }

    #[test]
    fn test_completion_requires_work_orders() {
        let mo = order_in(MoStatus::InProgress, Some("operator-7"));
        assert!(TransitionValidator::validate_completion(&mo, true).is_ok());
        assert!(matches!(
            TransitionValidator::validate_completion(&mo, false),
            Err(MfgError::BusinessRule(BusinessRuleViolation::WorkOrdersIncomplete { .. }))
        ));

        let confirmed = order_in(MoStatus::Confirmed, Some("operator-7"));
        assert!(TransitionValidator::validate_completion(&confirmed, true).is_err());
    }

    #[test]
    fn test_cancellation() {
        for status in [MoStatus::Draft, MoStatus::Confirmed, MoStatus::InProgress] {
            assert!(TransitionValidator::validate_cancellation(&order_in(status, None)).is_ok());
        }
        for status in [MoStatus::Completed, MoStatus::Cancelled] {
            assert!(TransitionValidator::validate_cancellation(&order_in(status, None)).is_err());
        }
    }
}
