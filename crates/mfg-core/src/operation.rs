//! BOM 工序（途程）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 工序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomOperation {
    /// 工序ID
    pub operation_id: String,

    /// 順序
    pub sequence: u32,

    /// 工作中心
    pub work_center_id: Option<String>,

    /// 換線/準備時間（分鐘，每張製令一次）
    pub setup_time_minutes: Decimal,

    /// 單位加工時間（分鐘）
    pub run_time_minutes: Decimal,

    /// 工作中心效率（1.0 = 100%）
    pub work_center_efficiency: Decimal,
}

impl BomOperation {
    /// 創建新的工序（效率預設 100%）
    pub fn new(
        operation_id: String,
        sequence: u32,
        setup_time_minutes: Decimal,
        run_time_minutes: Decimal,
    ) -> Self {
        Self {
            operation_id,
            sequence,
            work_center_id: None,
            setup_time_minutes,
            run_time_minutes,
            work_center_efficiency: Decimal::ONE,
        }
    }

    /// 建構器模式：設置工作中心
    pub fn with_work_center(mut self, work_center_id: String) -> Self {
        self.work_center_id = Some(work_center_id);
        self
    }

    /// 建構器模式：設置效率
    pub fn with_efficiency(mut self, efficiency: Decimal) -> Self {
        self.work_center_efficiency = efficiency;
        self
    }
}
