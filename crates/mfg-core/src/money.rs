//! 金額值物件

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// 金額小數位數
pub const MONEY_SCALE: u32 = 2;

/// 金額（非負，四捨五入至 2 位小數）+ ISO 4217 幣別
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMoney")]
pub struct Money {
    amount: Decimal,
    currency: String,
}

#[derive(Deserialize)]
struct RawMoney {
    amount: Decimal,
    currency: String,
}

impl TryFrom<RawMoney> for Money {
    type Error = ValidationError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Money::new(raw.amount, raw.currency)
    }
}

impl Money {
    pub fn new(amount: Decimal, currency: impl AsRef<str>) -> Result<Self, ValidationError> {
        let currency = normalize_currency(currency.as_ref())?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::NegativeValue {
                field: "amount",
                value: amount,
            });
        }

        Ok(Self {
            amount: round(amount),
            currency,
        })
    }

    pub fn zero(currency: impl AsRef<str>) -> Result<Self, ValidationError> {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn add(&self, other: &Money) -> Result<Money, ValidationError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(ValidationError::Overflow { operation: "add" })?;
        Ok(self.with_amount(amount))
    }

    pub fn subtract(&self, other: &Money) -> Result<Money, ValidationError> {
        self.ensure_same_currency(other)?;

        if other.amount > self.amount {
            return Err(ValidationError::NegativeResult {
                left: self.amount,
                right: other.amount,
            });
        }

        Ok(self.with_amount(self.amount - other.amount))
    }

    /// 乘以非負係數，結果重新四捨五入
    pub fn multiply(&self, factor: Decimal) -> Result<Money, ValidationError> {
        if factor.is_sign_negative() && !factor.is_zero() {
            return Err(ValidationError::NegativeValue {
                field: "factor",
                value: factor,
            });
        }

        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or(ValidationError::Overflow { operation: "multiply" })?;
        Ok(self.with_amount(amount))
    }

    pub fn is_greater_than(&self, other: &Money) -> Result<bool, ValidationError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount > other.amount)
    }

    pub fn is_less_than(&self, other: &Money) -> Result<bool, ValidationError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount < other.amount)
    }

    pub fn is_equal_to(&self, other: &Money) -> Result<bool, ValidationError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount == other.amount)
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), ValidationError> {
        if self.currency != other.currency {
            return Err(ValidationError::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }

    fn with_amount(&self, amount: Decimal) -> Money {
        Money {
            amount: round(amount),
            currency: self.currency.clone(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

fn normalize_currency(currency: &str) -> Result<String, ValidationError> {
    let code = currency.trim().to_uppercase();

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidCurrency(currency.to_string()));
    }

    Ok(code)
}
