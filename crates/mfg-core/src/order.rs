//! 製令（Manufacturing Order）記錄
//!
//! 狀態流轉：`Draft → Confirmed → InProgress → Completed`，
//! `Draft`、`Confirmed`、`InProgress` 可取消。`Completed`、`Cancelled` 為終態。
//!
//! 記錄本身只做狀態成員檢查（`can_be_*`）；指派人、庫存短缺、工單完工等
//! 完整規則由領域服務驗證。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{BusinessRuleViolation, ValidationError};
use crate::quantity::Quantity;
use crate::Result;

/// 取消原因在 metadata 中的鍵
pub const CANCELLATION_REASON_KEY: &str = "cancellationReason";

/// 製令狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoStatus {
    /// 草稿
    Draft,
    /// 已確認（物料已保留）
    Confirmed,
    /// 生產中
    InProgress,
    /// 已完工
    Completed,
    /// 已取消
    Cancelled,
}

impl MoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoStatus::Draft => "draft",
            MoStatus::Confirmed => "confirmed",
            MoStatus::InProgress => "in_progress",
            MoStatus::Completed => "completed",
            MoStatus::Cancelled => "cancelled",
        }
    }

    /// 檢查是否為終態
    pub fn is_terminal(&self) -> bool {
        matches!(self, MoStatus::Completed | MoStatus::Cancelled)
    }
}

impl fmt::Display for MoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(MoStatus::Draft),
            "confirmed" => Ok(MoStatus::Confirmed),
            "in_progress" => Ok(MoStatus::InProgress),
            "completed" => Ok(MoStatus::Completed),
            "cancelled" => Ok(MoStatus::Cancelled),
            _ => Err(ValidationError::InvalidFormat {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// 製令優先級
///
/// 標準值為 `low/normal/high/urgent`；舊驗證器使用的 `medium` 視為 `normal`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoPriority {
    Low,
    #[default]
    #[serde(alias = "medium")]
    Normal,
    High,
    Urgent,
}

impl MoPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoPriority::Low => "low",
            MoPriority::Normal => "normal",
            MoPriority::High => "high",
            MoPriority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for MoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(MoPriority::Low),
            "normal" | "medium" => Ok(MoPriority::Normal),
            "high" => Ok(MoPriority::High),
            "urgent" => Ok(MoPriority::Urgent),
            _ => Err(ValidationError::InvalidFormat {
                field: "priority",
                value: s.to_string(),
            }),
        }
    }
}

/// 建立製令的輸入
#[derive(Debug, Clone)]
pub struct NewManufacturingOrder {
    pub mo_number: String,
    pub product_id: String,
    pub bom_id: Uuid,
    pub quantity: Quantity,
    pub priority: MoPriority,
    pub planned_start_date: Option<DateTime<Utc>>,
    pub planned_end_date: Option<DateTime<Utc>>,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub metadata: Map<String, Value>,
}

/// 製令記錄
#[derive(Debug, Clone, PartialEq)]
pub struct ManufacturingOrder {
    id: Uuid,
    mo_number: String,
    product_id: String,
    bom_id: Uuid,
    quantity: Quantity,
    status: MoStatus,
    priority: MoPriority,
    planned_start_date: Option<DateTime<Utc>>,
    planned_end_date: Option<DateTime<Utc>>,
    actual_start_date: Option<DateTime<Utc>>,
    actual_end_date: Option<DateTime<Utc>>,
    created_by: String,
    assigned_to: Option<String>,
    notes: Option<String>,
    metadata: Map<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ManufacturingOrder {
    /// 建立新的製令（狀態為 Draft）
    pub fn create(props: NewManufacturingOrder) -> Result<Self> {
        let now = Utc::now();
        Self::build(ManufacturingOrderPersistence {
            id: Uuid::new_v4(),
            mo_number: props.mo_number,
            product_id: props.product_id,
            bom_id: props.bom_id,
            quantity: props.quantity.value(),
            unit: props.quantity.unit().to_string(),
            status: MoStatus::Draft,
            priority: props.priority,
            planned_start_date: props.planned_start_date,
            planned_end_date: props.planned_end_date,
            actual_start_date: None,
            actual_end_date: None,
            created_by: props.created_by,
            assigned_to: props.assigned_to,
            notes: props.notes,
            metadata: props.metadata,
            created_at: now,
            updated_at: now,
        })
    }

    /// 從持久化資料還原
    pub fn from_persistence(record: ManufacturingOrderPersistence) -> Result<Self> {
        Self::build(record)
    }

    pub fn to_persistence(&self) -> ManufacturingOrderPersistence {
        ManufacturingOrderPersistence {
            id: self.id,
            mo_number: self.mo_number.clone(),
            product_id: self.product_id.clone(),
            bom_id: self.bom_id,
            quantity: self.quantity.value(),
            unit: self.quantity.unit().to_string(),
            status: self.status,
            priority: self.priority,
            planned_start_date: self.planned_start_date,
            planned_end_date: self.planned_end_date,
            actual_start_date: self.actual_start_date,
            actual_end_date: self.actual_end_date,
            created_by: self.created_by.clone(),
            assigned_to: self.assigned_to.clone(),
            notes: self.notes.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn build(record: ManufacturingOrderPersistence) -> Result<Self> {
        if record.id.is_nil() {
            return Err(ValidationError::Required { field: "id" }.into());
        }
        if record.bom_id.is_nil() {
            return Err(ValidationError::Required { field: "bom_id" }.into());
        }
        let mo_number = required(record.mo_number, "mo_number")?;
        let product_id = required(record.product_id, "product_id")?;
        let created_by = required(record.created_by, "created_by")?;

        let quantity = Quantity::new(record.quantity, &record.unit)?;
        if quantity.is_zero() {
            return Err(ValidationError::MustBePositive {
                field: "quantity",
                value: quantity.value(),
            }
            .into());
        }

        check_range(record.planned_start_date, record.planned_end_date, "planned_date")?;
        check_range(record.actual_start_date, record.actual_end_date, "actual_date")?;

        let assigned_to = record
            .assigned_to
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        Ok(Self {
            id: record.id,
            mo_number,
            product_id,
            bom_id: record.bom_id,
            quantity,
            status: record.status,
            priority: record.priority,
            planned_start_date: record.planned_start_date,
            planned_end_date: record.planned_end_date,
            actual_start_date: record.actual_start_date,
            actual_end_date: record.actual_end_date,
            created_by,
            assigned_to,
            notes: record.notes,
            metadata: record.metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mo_number(&self) -> &str {
        &self.mo_number
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn bom_id(&self) -> Uuid {
        self.bom_id
    }

    pub fn quantity(&self) -> &Quantity {
        &self.quantity
    }

    pub fn status(&self) -> MoStatus {
        self.status
    }

    pub fn priority(&self) -> MoPriority {
        self.priority
    }

    pub fn planned_start_date(&self) -> Option<DateTime<Utc>> {
        self.planned_start_date
    }

    pub fn planned_end_date(&self) -> Option<DateTime<Utc>> {
        self.planned_end_date
    }

    pub fn actual_start_date(&self) -> Option<DateTime<Utc>> {
        self.actual_start_date
    }

    pub fn actual_end_date(&self) -> Option<DateTime<Utc>> {
        self.actual_end_date
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn assigned_to(&self) -> Option<&str> {
        self.assigned_to.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn can_be_confirmed(&self) -> bool {
        self.status == MoStatus::Draft
    }

    pub fn can_be_started(&self) -> bool {
        self.status == MoStatus::Confirmed
    }

    pub fn can_be_completed(&self) -> bool {
        self.status == MoStatus::InProgress
    }

    pub fn can_be_cancelled(&self) -> bool {
        matches!(
            self.status,
            MoStatus::Draft | MoStatus::Confirmed | MoStatus::InProgress
        )
    }

    /// 是否逾期：非終態且計劃完工日已過
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_at(Utc::now())
    }

    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        match self.planned_end_date {
            Some(end) => !self.status.is_terminal() && end < now,
            None => false,
        }
    }

    /// 計劃工期（分鐘）
    pub fn planned_duration_minutes(&self) -> Option<i64> {
        minutes_between(self.planned_start_date, self.planned_end_date)
    }

    /// 實際工期（分鐘）
    pub fn duration_minutes(&self) -> Option<i64> {
        minutes_between(self.actual_start_date, self.actual_end_date)
    }

    /// 確認製令（Draft → Confirmed）
    pub fn confirm(&self) -> Result<Self> {
        self.guard(self.can_be_confirmed(), "confirm")?;
        Ok(self.touch(|mo| mo.status = MoStatus::Confirmed))
    }

    /// 開工（Confirmed → InProgress），記錄實際開工時間
    pub fn start(&self) -> Result<Self> {
        self.guard(self.can_be_started(), "start")?;
        Ok(self.touch(|mo| {
            mo.status = MoStatus::InProgress;
            mo.actual_start_date = Some(mo.updated_at);
        }))
    }

    /// 完工（InProgress → Completed），記錄實際完工時間
    pub fn complete(&self) -> Result<Self> {
        self.guard(self.can_be_completed(), "complete")?;
        Ok(self.touch(|mo| {
            mo.status = MoStatus::Completed;
            mo.actual_end_date = Some(mo.updated_at);
        }))
    }

    /// 取消，原因寫入 metadata
    pub fn cancel(&self, reason: Option<&str>) -> Result<Self> {
        self.guard(self.can_be_cancelled(), "cancel")?;
        Ok(self.touch(|mo| {
            mo.status = MoStatus::Cancelled;
            if let Some(reason) = reason {
                mo.metadata.insert(
                    CANCELLATION_REASON_KEY.to_string(),
                    Value::String(reason.to_string()),
                );
            }
        }))
    }

    /// 指派負責人
    pub fn assign(&self, assignee: &str) -> Result<Self> {
        self.guard(!self.status.is_terminal(), "assign")?;
        let assignee = required(assignee.to_string(), "assigned_to")?;
        Ok(self.touch(|mo| mo.assigned_to = Some(assignee)))
    }

    /// 調整計劃日期
    pub fn reschedule(
        &self,
        planned_start_date: Option<DateTime<Utc>>,
        planned_end_date: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        self.guard(!self.status.is_terminal(), "reschedule")?;
        check_range(planned_start_date, planned_end_date, "planned_date")?;
        Ok(self.touch(|mo| {
            mo.planned_start_date = planned_start_date;
            mo.planned_end_date = planned_end_date;
        }))
    }

    /// 調整優先級
    pub fn change_priority(&self, priority: MoPriority) -> Result<Self> {
        self.guard(!self.status.is_terminal(), "change_priority")?;
        Ok(self.touch(|mo| mo.priority = priority))
    }

    pub fn update_notes(&self, notes: Option<String>) -> Self {
        self.touch(|mo| mo.notes = notes)
    }

    fn guard(&self, allowed: bool, action: &'static str) -> Result<()> {
        if allowed {
            return Ok(());
        }
        Err(BusinessRuleViolation::InvalidStatusTransition {
            mo_number: self.mo_number.clone(),
            from: self.status.to_string(),
            action,
        }
        .into())
    }

    fn touch(&self, change: impl FnOnce(&mut ManufacturingOrder)) -> Self {
        let mut next = self.clone();
        next.updated_at = Utc::now();
        change(&mut next);
        next
    }
}

/// 製令持久化資料（扁平結構）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturingOrderPersistence {
    pub id: Uuid,
    pub mo_number: String,
    pub product_id: String,
    pub bom_id: Uuid,
    pub quantity: Decimal,
    pub unit: String,
    pub status: MoStatus,
    pub priority: MoPriority,
    pub planned_start_date: Option<DateTime<Utc>>,
    pub planned_end_date: Option<DateTime<Utc>>,
    pub actual_start_date: Option<DateTime<Utc>>,
    pub actual_end_date: Option<DateTime<Utc>>,
    pub created_by: String,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn required(value: String, field: &'static str) -> std::result::Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

fn check_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    field: &'static str,
) -> std::result::Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::InvalidDateRange { field }),
        _ => Ok(()),
    }
}

fn minutes_between(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<i64> {
    Some((end? - start?).num_minutes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MfgError;
    use chrono::Duration;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn new_order() -> NewManufacturingOrder {
        NewManufacturingOrder {
            mo_number: "MO-2025-0001".to_string(),
            product_id: "BIKE-001".to_string(),
            bom_id: Uuid::new_v4(),
            quantity: Quantity::new(dec!(10), "pcs").unwrap(),
            priority: MoPriority::Normal,
            planned_start_date: None,
            planned_end_date: None,
            created_by: "planner".to_string(),
            assigned_to: None,
            notes: None,
            metadata: Map::new(),
        }
    }

    fn order_in(status: MoStatus) -> ManufacturingOrder {
        let mut record = ManufacturingOrder::create(new_order()).unwrap().to_persistence();
        record.status = status;
        ManufacturingOrder::from_persistence(record).unwrap()
    }

    #[test]
    fn test_create_order_in_draft() {
        let mo = ManufacturingOrder::create(new_order()).unwrap();
        assert_eq!(mo.status(), MoStatus::Draft);
        assert_eq!(mo.priority(), MoPriority::Normal);
        assert!(mo.assigned_to().is_none());
        assert!(mo.can_be_confirmed());
    }

    #[test]
    fn test_create_order_rejects_zero_quantity() {
        let mut props = new_order();
        props.quantity = Quantity::zero("pcs").unwrap();
        assert!(matches!(
            ManufacturingOrder::create(props),
            Err(MfgError::Validation(ValidationError::MustBePositive { field: "quantity", .. }))
        ));
    }

    #[test]
    fn test_create_order_rejects_inverted_dates() {
        let now = Utc::now();
        let mut props = new_order();
        props.planned_start_date = Some(now);
        props.planned_end_date = Some(now - Duration::hours(1));
        assert!(matches!(
            ManufacturingOrder::create(props),
            Err(MfgError::Validation(ValidationError::InvalidDateRange { .. }))
        ));
    }

    #[rstest]
    #[case(MoStatus::Draft, true, false, false, true)]
    #[case(MoStatus::Confirmed, false, true, false, true)]
    #[case(MoStatus::InProgress, false, false, true, true)]
    #[case(MoStatus::Completed, false, false, false, false)]
    #[case(MoStatus::Cancelled, false, false, false, false)]
    fn test_status_guards(
        #[case] status: MoStatus,
        #[case] confirm: bool,
        #[case] start: bool,
        #[case] complete: bool,
        #[case] cancel: bool,
    ) {
        let mo = order_in(status);
        assert_eq!(mo.can_be_confirmed(), confirm);
        assert_eq!(mo.can_be_started(), start);
        assert_eq!(mo.can_be_completed(), complete);
        assert_eq!(mo.can_be_cancelled(), cancel);
    }

    #[test]
    fn test_transitions_stamp_actual_dates() {
        let draft = ManufacturingOrder::create(new_order()).unwrap();
        let confirmed = draft.confirm().unwrap();
        let started = confirmed.start().unwrap();
        let completed = started.complete().unwrap();

        assert_eq!(draft.status(), MoStatus::Draft);
        assert_eq!(confirmed.status(), MoStatus::Confirmed);
        assert!(started.actual_start_date().is_some());
        assert!(completed.actual_end_date().is_some());
        assert!(completed.duration_minutes().unwrap() >= 0);
        assert!(completed.cancel(None).is_err());
    }

    #[test]
    fn test_wrong_status_transition_fails() {
        let draft = ManufacturingOrder::create(new_order()).unwrap();
        let err = draft.start().unwrap_err();
        assert!(matches!(
            err,
            MfgError::BusinessRule(BusinessRuleViolation::InvalidStatusTransition { action: "start", .. })
        ));
    }

    #[test]
    fn test_cancel_records_reason() {
        let mo = order_in(MoStatus::Confirmed).cancel(Some("customer withdrew")).unwrap();
        assert_eq!(mo.status(), MoStatus::Cancelled);
        assert_eq!(
            mo.metadata().get(CANCELLATION_REASON_KEY),
            Some(&Value::String("customer withdrew".to_string()))
        );
    }

    #[test]
    fn test_is_overdue() {
        let now = Utc::now();
        let mo = ManufacturingOrder::create(new_order())
            .unwrap()
            .reschedule(Some(now - Duration::days(3)), Some(now - Duration::days(1)))
            .unwrap();
        assert!(mo.is_overdue_at(now));
        assert_eq!(mo.planned_duration_minutes(), Some(2 * 24 * 60));

        let cancelled = mo.cancel(None).unwrap();
        assert!(!cancelled.is_overdue_at(now));

        let unscheduled = ManufacturingOrder::create(new_order()).unwrap();
        assert!(!unscheduled.is_overdue_at(now));
        assert_eq!(unscheduled.planned_duration_minutes(), None);
    }

    #[test]
    fn test_assign_and_priority() {
        let mo = ManufacturingOrder::create(new_order()).unwrap();
        let assigned = mo.assign("  operator-7 ").unwrap();
        assert_eq!(assigned.assigned_to(), Some("operator-7"));
        assert!(mo.assign("").is_err());

        let urgent = assigned.change_priority(MoPriority::Urgent).unwrap();
        assert_eq!(urgent.priority(), MoPriority::Urgent);
        assert!(order_in(MoStatus::Completed).change_priority(MoPriority::Low).is_err());
    }

    #[rstest]
    #[case("low", MoPriority::Low)]
    #[case("normal", MoPriority::Normal)]
    #[case("medium", MoPriority::Normal)]
    #[case("HIGH", MoPriority::High)]
    #[case("urgent", MoPriority::Urgent)]
    fn test_priority_parsing(#[case] input: &str, #[case] expected: MoPriority) {
        assert_eq!(input.parse::<MoPriority>().unwrap(), expected);
    }

    #[test]
    fn test_priority_serde_accepts_medium() {
        let p: MoPriority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(p, MoPriority::Normal);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"normal\"");
        assert!("critical".parse::<MoPriority>().is_err());
        assert_eq!("in_progress".parse::<MoStatus>().unwrap(), MoStatus::InProgress);
    }

    #[test]
    fn test_persistence_round_trip() {
        let mut props = new_order();
        props.metadata.insert("source".to_string(), Value::String("SO-123".to_string()));
        let mo = ManufacturingOrder::create(props)
            .unwrap()
            .assign("operator-7")
            .unwrap()
            .confirm()
            .unwrap();

        let restored = ManufacturingOrder::from_persistence(mo.to_persistence()).unwrap();
        assert_eq!(restored, mo);

        let json = serde_json::to_string(&mo.to_persistence()).unwrap();
        let record: ManufacturingOrderPersistence = serde_json::from_str(&json).unwrap();
        assert_eq!(record.status, MoStatus::Confirmed);
        assert_eq!(ManufacturingOrder::from_persistence(record).unwrap(), mo);
    }
}
