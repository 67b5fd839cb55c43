//! 數量值物件
//!
//! 帶單位的非負數量。所有運算都回傳新值，不修改原值；
//! 兩個數量之間的運算要求單位完全一致。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// 單位字串最大長度
pub const MAX_UNIT_LEN: usize = 10;

/// 數量（數值 + 單位）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawQuantity")]
pub struct Quantity {
    value: Decimal,
    unit: String,
}

#[derive(Deserialize)]
struct RawQuantity {
    value: Decimal,
    unit: String,
}

impl TryFrom<RawQuantity> for Quantity {
    type Error = ValidationError;

    fn try_from(raw: RawQuantity) -> Result<Self, Self::Error> {
        Quantity::new(raw.value, raw.unit)
    }
}

impl Quantity {
    /// 創建數量，單位會去除空白並轉為小寫
    pub fn new(value: Decimal, unit: impl AsRef<str>) -> Result<Self, ValidationError> {
        let unit = normalize_unit(unit.as_ref())?;

        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativeValue {
                field: "quantity",
                value,
            });
        }

        Ok(Self {
            value: value.normalize(),
            unit,
        })
    }

    /// 指定單位的零數量
    pub fn zero(unit: impl AsRef<str>) -> Result<Self, ValidationError> {
        Self::new(Decimal::ZERO, unit)
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// 相加（單位必須一致）
    pub fn add(&self, other: &Quantity) -> Result<Quantity, ValidationError> {
        self.ensure_same_unit(other)?;
        let value = self
            .value
            .checked_add(other.value)
            .ok_or(ValidationError::Overflow { operation: "add" })?;
        Ok(self.with_value(value))
    }

    /// 相減（單位必須一致，結果不可為負）
    pub fn subtract(&self, other: &Quantity) -> Result<Quantity, ValidationError> {
        self.ensure_same_unit(other)?;

        if other.value > self.value {
            return Err(ValidationError::NegativeResult {
                left: self.value,
                right: other.value,
            });
        }

        Ok(self.with_value(self.value - other.value))
    }

    /// 乘以無單位的非負係數
    pub fn multiply(&self, factor: Decimal) -> Result<Quantity, ValidationError> {
        if factor.is_sign_negative() && !factor.is_zero() {
            return Err(ValidationError::NegativeValue {
                field: "factor",
                value: factor,
            });
        }

        let value = self
            .value
            .checked_mul(factor)
            .ok_or(ValidationError::Overflow { operation: "multiply" })?;
        Ok(self.with_value(value))
    }

    /// 除以無單位的正係數
    pub fn divide(&self, divisor: Decimal) -> Result<Quantity, ValidationError> {
        if divisor.is_zero() {
            return Err(ValidationError::DivisionByZero);
        }
        if divisor.is_sign_negative() {
            return Err(ValidationError::NegativeValue {
                field: "divisor",
                value: divisor,
            });
        }

        let value = self
            .value
            .checked_div(divisor)
            .ok_or(ValidationError::Overflow { operation: "divide" })?;
        Ok(self.with_value(value))
    }

    pub fn is_greater_than(&self, other: &Quantity) -> Result<bool, ValidationError> {
        self.ensure_same_unit(other)?;
        Ok(self.value > other.value)
    }

    pub fn is_less_than(&self, other: &Quantity) -> Result<bool, ValidationError> {
        self.ensure_same_unit(other)?;
        Ok(self.value < other.value)
    }

    pub fn is_equal_to(&self, other: &Quantity) -> Result<bool, ValidationError> {
        self.ensure_same_unit(other)?;
        Ok(self.value == other.value)
    }

    /// 加總同單位的數量；空序列回傳指定單位的零
    pub fn sum<'a, I>(quantities: I, unit: &str) -> Result<Quantity, ValidationError>
    where
        I: IntoIterator<Item = &'a Quantity>,
    {
        quantities
            .into_iter()
            .try_fold(Quantity::zero(unit)?, |acc, q| acc.add(q))
    }

    fn ensure_same_unit(&self, other: &Quantity) -> Result<(), ValidationError> {
        if self.unit != other.unit {
            return Err(ValidationError::UnitMismatch {
                left: self.unit.clone(),
                right: other.unit.clone(),
            });
        }
        Ok(())
    }

    fn with_value(&self, value: Decimal) -> Quantity {
        Quantity {
            value: value.normalize(),
            unit: self.unit.clone(),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

fn normalize_unit(unit: &str) -> Result<String, ValidationError> {
    let unit = unit.trim().to_lowercase();

    if unit.is_empty() {
        return Err(ValidationError::Required { field: "unit" });
    }
    if unit.chars().count() > MAX_UNIT_LEN {
        return Err(ValidationError::TooLong {
            field: "unit",
            max: MAX_UNIT_LEN,
        });
    }

    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn kg(value: Decimal) -> Quantity {
        Quantity::new(value, "kg").unwrap()
    }

    #[test]
    fn test_create_quantity_normalizes_unit() {
        let q = Quantity::new(dec!(2.50), "  KG ").unwrap();
        assert_eq!(q.unit(), "kg");
        assert_eq!(q.value(), dec!(2.5));
        assert_eq!(q.to_string(), "2.5 kg");
    }

    #[test]
    fn test_invalid_quantity() {
        assert_eq!(
            Quantity::new(dec!(-1), "kg"),
            Err(ValidationError::NegativeValue {
                field: "quantity",
                value: dec!(-1)
            })
        );
        assert_eq!(
            Quantity::new(dec!(1), "   "),
            Err(ValidationError::Required { field: "unit" })
        );
        assert!(matches!(
            Quantity::new(dec!(1), "kilogrammes"),
            Err(ValidationError::TooLong { field: "unit", .. })
        ));
    }

    #[test]
    fn test_arithmetic() {
        let a = kg(dec!(10));
        let b = kg(dec!(4));

        assert_eq!(a.add(&b).unwrap(), kg(dec!(14)));
        assert_eq!(a.subtract(&b).unwrap(), kg(dec!(6)));
        assert_eq!(a.multiply(dec!(1.5)).unwrap(), kg(dec!(15)));
        assert_eq!(a.divide(dec!(4)).unwrap(), kg(dec!(2.5)));

        // 原值不變
        assert_eq!(a.value(), dec!(10));
    }

    #[test]
    fn test_subtract_negative_result() {
        let a = kg(dec!(1));
        let b = kg(dec!(2));
        assert_eq!(
            a.subtract(&b),
            Err(ValidationError::NegativeResult {
                left: dec!(1),
                right: dec!(2)
            })
        );
    }

    #[test]
    fn test_multiply_rejects_negative_factor() {
        assert!(kg(dec!(1)).multiply(dec!(-0.5)).is_err());
        assert!(kg(dec!(1)).multiply(Decimal::ZERO).unwrap().is_zero());
        assert_eq!(kg(dec!(1)).divide(Decimal::ZERO), Err(ValidationError::DivisionByZero));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = kg(Decimal::MAX);
        assert_eq!(
            huge.add(&kg(dec!(1))),
            Err(ValidationError::Overflow { operation: "add" })
        );
        assert_eq!(
            huge.multiply(dec!(2)),
            Err(ValidationError::Overflow { operation: "multiply" })
        );
        assert_eq!(
            huge.divide(dec!(0.5)),
            Err(ValidationError::Overflow { operation: "divide" })
        );
    }

    #[test]
    fn test_comparisons() {
        let a = kg(dec!(3));
        let b = kg(dec!(3.000));
        assert!(a.is_equal_to(&b).unwrap());
        assert!(!a.is_greater_than(&b).unwrap());
        assert!(kg(dec!(1)).is_less_than(&a).unwrap());
    }

    #[test]
    fn test_sum() {
        let items = vec![kg(dec!(1)), kg(dec!(2.5)), kg(dec!(0.5))];
        assert_eq!(Quantity::sum(&items, "kg").unwrap(), kg(dec!(4)));
        assert!(Quantity::sum(&items, "pcs").is_err());
        assert!(Quantity::sum(Vec::<Quantity>::new().iter(), "kg").unwrap().is_zero());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Quantity = serde_json::from_str(r#"{"value":"2","unit":"KG"}"#).unwrap();
        assert_eq!(ok, kg(dec!(2)));

        let bad = serde_json::from_str::<Quantity>(r#"{"value":"-2","unit":"kg"}"#);
        assert!(bad.is_err());
    }

    fn arb_decimal() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000_000, 0u32..6).prop_map(|(n, scale)| Decimal::new(n, scale))
    }

    proptest! {
        #[test]
        fn add_then_subtract_is_identity(a in arb_decimal(), b in arb_decimal()) {
            let a = kg(a);
            let b = kg(b);
            let back = a.add(&b).unwrap().subtract(&b).unwrap();
            prop_assert!(back.is_equal_to(&a).unwrap());
        }

        #[test]
        fn mismatched_units_always_fail(a in arb_decimal(), b in arb_decimal()) {
            let a = kg(a);
            let b = Quantity::new(b, "pcs").unwrap();
            prop_assert!(a.add(&b).is_err());
            prop_assert!(a.subtract(&b).is_err());
            prop_assert!(a.is_greater_than(&b).is_err());
            prop_assert!(a.is_less_than(&b).is_err());
            prop_assert!(a.is_equal_to(&b).is_err());
        }
    }
}
