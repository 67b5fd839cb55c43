//! 製令工時估算

use mfg_core::{BomOperation, Quantity, ValidationError};
use rust_decimal::Decimal;

/// 工時估算器
pub struct DurationEstimator;

impl DurationEstimator {
    /// 估算製令總工時（分鐘）
    ///
    /// 每道工序：`(準備時間 + 單位加工時間 × 數量) / 工作中心效率`，再加總。
    /// 效率必須大於 0，否則回傳 `InvalidEfficiency`；工時不可為負。
    pub fn estimate(
        order_quantity: &Quantity,
        operations: &[BomOperation],
    ) -> mfg_core::Result<Decimal> {
        let mut total = Decimal::ZERO;

        for operation in operations {
            Self::check_operation(operation)?;

            let run = operation
                .run_time_minutes
                .checked_mul(order_quantity.value())
                .ok_or(ValidationError::Overflow { operation: "multiply" })?;
            let minutes = operation
                .setup_time_minutes
                .checked_add(run)
                .and_then(|work| work.checked_div(operation.work_center_efficiency))
                .ok_or(ValidationError::Overflow { operation: "divide" })?;
            total = total
                .checked_add(minutes)
                .ok_or(ValidationError::Overflow { operation: "sum" })?;
        }

        Ok(total)
    }

    fn check_operation(operation: &BomOperation) -> Result<(), ValidationError> {
        if operation.work_center_efficiency <= Decimal::ZERO {
            return Err(ValidationError::InvalidEfficiency {
                operation: operation.operation_id.clone(),
                efficiency: operation.work_center_efficiency,
            });
        }
        if operation.setup_time_minutes.is_sign_negative() && !operation.setup_time_minutes.is_zero() {
            return Err(ValidationError::NegativeValue {
                field: "setup_time_minutes",
                value: operation.setup_time_minutes,
            });
        }
        if operation.run_time_minutes.is_sign_negative() && !operation.run_time_minutes.is_zero() {
            return Err(ValidationError::NegativeValue {
                field: "run_time_minutes",
                value: operation.run_time_minutes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfg_core::MfgError;
    use rust_decimal_macros::dec;

    fn pcs(value: Decimal) -> Quantity {
        Quantity::new(value, "pcs").unwrap()
    }

    #[test]
    fn test_estimate_duration() {
        let operations = vec![
            BomOperation::new("CUT".to_string(), 10, dec!(30), dec!(2)),
            BomOperation::new("WELD".to_string(), 20, dec!(15), dec!(5))
                .with_work_center("WC-WELD".to_string())
                .with_efficiency(dec!(0.8)),
        ];

        // CUT: 30 + 2 × 10 = 50；WELD: (15 + 5 × 10) / 0.8 = 81.25
        let minutes = DurationEstimator::estimate(&pcs(dec!(10)), &operations).unwrap();
        assert_eq!(minutes, dec!(131.25));
    }

    #[test]
    fn test_no_operations() {
        assert_eq!(
            DurationEstimator::estimate(&pcs(dec!(10)), &[]).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_zero_efficiency_rejected() {
        let operations = vec![BomOperation::new("PAINT".to_string(), 10, dec!(5), dec!(1))
            .with_efficiency(Decimal::ZERO)];

        let err = DurationEstimator::estimate(&pcs(dec!(1)), &operations).unwrap_err();
        assert!(matches!(
            err,
            MfgError::Validation(ValidationError::InvalidEfficiency { .. })
        ));
    }

    #[test]
    fn test_negative_times_rejected() {
        let setup = vec![BomOperation::new("CUT".to_string(), 10, dec!(-5), dec!(1))];
        assert_eq!(
            DurationEstimator::estimate(&pcs(dec!(1)), &setup),
            Err(MfgError::Validation(ValidationError::NegativeValue {
                field: "setup_time_minutes",
                value: dec!(-5),
            }))
        );

        let run = vec![BomOperation::new("CUT".to_string(), 10, dec!(5), dec!(-1))];
        assert!(matches!(
            DurationEstimator::estimate(&pcs(dec!(1)), &run),
            Err(MfgError::Validation(ValidationError::NegativeValue {
                field: "run_time_minutes",
                ..
            }))
        ));
    }

    #[test]
    fn test_duration_overflow() {
        let operations = vec![BomOperation::new("CUT".to_string(), 10, dec!(0), Decimal::MAX)];
        assert_eq!(
            DurationEstimator::estimate(&pcs(dec!(2)), &operations),
            Err(MfgError::Validation(ValidationError::Overflow {
                operation: "multiply"
            }))
        );

        let slow = vec![BomOperation::new("CUT".to_string(), 10, Decimal::MAX, dec!(0))
            .with_efficiency(dec!(0.5))];
        assert!(matches!(
            DurationEstimator::estimate(&pcs(dec!(1)), &slow),
            Err(MfgError::Validation(ValidationError::Overflow { .. }))
        ));
    }
}
