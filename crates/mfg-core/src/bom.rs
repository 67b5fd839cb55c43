//! BOM（物料清單）記錄
//!
//! 版本化、可核准的子件清單。所有狀態變更都回傳新的快照，原記錄不變。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BusinessRuleViolation, ValidationError};
use crate::quantity::Quantity;
use crate::Result;

/// BOM 子件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomComponent {
    /// 子件物料ID
    pub component_id: String,

    /// 單位父件用量
    pub quantity: Quantity,

    /// 順序（從 1 開始）
    pub sequence: u32,

    /// 損耗率（0.05 = 多備 5%）
    pub scrap_factor: Decimal,

    /// 備註
    pub notes: Option<String>,
}

impl BomComponent {
    /// 創建新的子件（損耗率預設 0）
    pub fn new(component_id: String, quantity: Quantity, sequence: u32) -> Self {
        Self {
            component_id,
            quantity,
            sequence,
            scrap_factor: Decimal::ZERO,
            notes: None,
        }
    }

    /// 建構器模式：設置損耗率
    pub fn with_scrap_factor(mut self, scrap_factor: Decimal) -> Self {
        self.scrap_factor = scrap_factor;
        self
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: String) -> Self {
        self.notes = Some(notes);
        self
    }

    /// 驗證子件欄位
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.component_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "component_id",
            });
        }
        if self.sequence == 0 {
            return Err(ValidationError::MustBePositive {
                field: "sequence",
                value: Decimal::ZERO,
            });
        }
        if self.scrap_factor < Decimal::ZERO || self.scrap_factor > Decimal::ONE {
            return Err(ValidationError::OutOfRange {
                field: "scrap_factor",
                min: Decimal::ZERO,
                max: Decimal::ONE,
                value: self.scrap_factor,
            });
        }
        Ok(())
    }
}

/// 建立 BOM 的輸入
#[derive(Debug, Clone)]
pub struct NewBom {
    pub product_id: String,
    pub version: String,
    pub name: String,
    pub description: Option<String>,
    pub components: Vec<BomComponent>,
    pub created_by: String,
}

/// BOM 記錄
#[derive(Debug, Clone, PartialEq)]
pub struct Bom {
    id: Uuid,
    product_id: String,
    version: String,
    name: String,
    description: Option<String>,
    components: Vec<BomComponent>,
    is_active: bool,
    is_default: bool,
    created_by: String,
    approved_by: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Bom {
    /// 建立新的 BOM：產生 ID，預設啟用、非預設、未核准
    pub fn create(props: NewBom) -> Result<Self> {
        let now = Utc::now();
        Self::build(BomPersistence {
            id: Uuid::new_v4(),
            product_id: props.product_id,
            version: props.version,
            name: props.name,
            description: props.description,
            components: props.components.into_iter().map(Into::into).collect(),
            is_active: true,
            is_default: false,
            created_by: props.created_by,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// 從持久化資料還原（不重新產生 ID）
    pub fn from_persistence(record: BomPersistence) -> Result<Self> {
        Self::build(record)
    }

    /// 轉為持久化資料
    pub fn to_persistence(&self) -> BomPersistence {
        BomPersistence {
            id: self.id,
            product_id: self.product_id.clone(),
            version: self.version.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            components: self.components.iter().cloned().map(Into::into).collect(),
            is_active: self.is_active,
            is_default: self.is_default,
            created_by: self.created_by.clone(),
            approved_by: self.approved_by.clone(),
            approved_at: self.approved_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn build(record: BomPersistence) -> Result<Self> {
        if record.id.is_nil() {
            return Err(ValidationError::Required { field: "id" }.into());
        }
        let product_id = required(record.product_id, "product_id")?;
        let version = required(record.version, "version")?;
        let name = required(record.name, "name")?;
        let created_by = required(record.created_by, "created_by")?;

        let mut components = record
            .components
            .into_iter()
            .map(BomComponent::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        validate_components(&components)?;
        components.sort_by_key(|c| c.sequence);

        Ok(Self {
            id: record.id,
            product_id,
            version,
            name,
            description: record.description,
            components,
            is_active: record.is_active,
            is_default: record.is_default,
            created_by,
            approved_by: record.approved_by,
            approved_at: record.approved_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// 子件清單（依 sequence 排序）
    pub fn components(&self) -> &[BomComponent] {
        &self.components
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn approved_by(&self) -> Option<&str> {
        self.approved_by.as_deref()
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_approved(&self) -> bool {
        self.approved_by.is_some()
    }

    /// 可用於開立製令：已啟用且已核准
    pub fn can_be_used(&self) -> bool {
        self.is_active && self.is_approved()
    }

    pub fn find_component(&self, component_id: &str) -> Option<&BomComponent> {
        self.components.iter().find(|c| c.component_id == component_id)
    }

    pub fn activate(&self) -> Self {
        self.touch(|bom| bom.is_active = true)
    }

    pub fn deactivate(&self) -> Self {
        self.touch(|bom| bom.is_active = false)
    }

    pub fn set_as_default(&self) -> Self {
        self.touch(|bom| bom.is_default = true)
    }

    pub fn unset_as_default(&self) -> Self {
        self.touch(|bom| bom.is_default = false)
    }

    /// 核准 BOM
    ///
    /// 只能核准一次；再次核准回傳 `AlreadyApproved`，不覆寫原核准人。
    pub fn approve(&self, approved_by: &str) -> Result<Self> {
        if let Some(existing) = &self.approved_by {
            return Err(BusinessRuleViolation::AlreadyApproved {
                bom_id: self.id.to_string(),
                approved_by: existing.clone(),
            }
            .into());
        }
        let approver = required(approved_by.to_string(), "approved_by")?;

        Ok(self.touch(|bom| {
            bom.approved_at = Some(bom.updated_at);
            bom.approved_by = Some(approver);
        }))
    }

    /// 新增子件（子件ID不可重複）
    pub fn add_component(&self, component: BomComponent) -> Result<Self> {
        component.validate()?;
        if self.find_component(&component.component_id).is_some() {
            return Err(ValidationError::DuplicateComponent(component.component_id).into());
        }

        Ok(self.touch(|bom| {
            bom.components.push(component);
            bom.components.sort_by_key(|c| c.sequence);
        }))
    }

    /// 移除子件
    pub fn remove_component(&self, component_id: &str) -> Result<Self> {
        if self.find_component(component_id).is_none() {
            return Err(ValidationError::ComponentNotFound(component_id.to_string()).into());
        }

        Ok(self.touch(|bom| bom.components.retain(|c| c.component_id != component_id)))
    }

    /// 更新子件用量
    pub fn update_component_quantity(&self, component_id: &str, quantity: Quantity) -> Result<Self> {
        if self.find_component(component_id).is_none() {
            return Err(ValidationError::ComponentNotFound(component_id.to_string()).into());
        }

        Ok(self.touch(|bom| {
            for component in bom.components.iter_mut() {
                if component.component_id == component_id {
                    component.quantity = quantity.clone();
                }
            }
        }))
    }

    /// 複製一份、套用變更並刷新 updated_at
    fn touch(&self, change: impl FnOnce(&mut Bom)) -> Self {
        let mut next = self.clone();
        next.updated_at = Utc::now();
        change(&mut next);
        next
    }
}

/// BOM 持久化資料（扁平結構）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomPersistence {
    pub id: Uuid,
    pub product_id: String,
    pub version: String,
    pub name: String,
    pub description: Option<String>,
    pub components: Vec<BomComponentRecord>,
    pub is_active: bool,
    pub is_default: bool,
    pub created_by: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// BOM 子件持久化資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomComponentRecord {
    pub component_id: String,
    pub quantity: Decimal,
    pub unit: String,
    pub sequence: u32,
    pub scrap_factor: Decimal,
    pub notes: Option<String>,
}

impl From<BomComponent> for BomComponentRecord {
    fn from(component: BomComponent) -> Self {
        Self {
            component_id: component.component_id,
            quantity: component.quantity.value(),
            unit: component.quantity.unit().to_string(),
            sequence: component.sequence,
            scrap_factor: component.scrap_factor,
            notes: component.notes,
        }
    }
}

impl TryFrom<BomComponentRecord> for BomComponent {
    type Error = ValidationError;

    fn try_from(record: BomComponentRecord) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            component_id: record.component_id,
            quantity: Quantity::new(record.quantity, &record.unit)?,
            sequence: record.sequence,
            scrap_factor: record.scrap_factor,
            notes: record.notes,
        })
    }
}

fn required(value: String, field: &'static str) -> std::result::Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

fn validate_components(components: &[BomComponent]) -> std::result::Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for component in components {
        component.validate()?;
        if !seen.insert(component.component_id.as_str()) {
            return Err(ValidationError::DuplicateComponent(
                component.component_id.clone(),
            ));
        }
    }
    Ok(())
}
