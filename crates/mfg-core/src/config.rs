//! 製令領域服務配置

use serde::{Deserialize, Serialize};

use crate::order::MoPriority;

/// 短缺回報方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortfallReporting {
    /// 只回報短缺物料的需求合計與可用合計（舊行為）
    Aggregate,
    /// 合計之外，附上每個短缺物料的明細
    PerComponent,
}

/// 交期緊急度加分表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueDateBonus {
    /// 已逾期
    pub overdue: i64,
    /// 1 天內到期
    pub within_one_day: i64,
    /// 3 天內到期
    pub within_three_days: i64,
    /// 7 天內到期
    pub within_seven_days: i64,
}

impl Default for DueDateBonus {
    fn default() -> Self {
        Self {
            overdue: 200,
            within_one_day: 50,
            within_three_days: 25,
            within_seven_days: 10,
        }
    }
}

/// 領域服務配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// 短缺回報方式
    pub shortfall_reporting: ShortfallReporting,

    /// 自動提升優先級的到期時窗（小時）
    pub auto_prioritize_window_hours: i64,

    /// 開始計算單齡加分前的寬限天數
    pub age_bonus_grace_days: i64,

    /// 單齡加分上限
    pub age_bonus_cap: i64,

    /// 交期緊急度加分
    pub due_date_bonus: DueDateBonus,

    /// 優先級基礎分數（Low, Normal, High, Urgent）
    pub priority_base_scores: [i64; 4],
}

impl ServiceConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            shortfall_reporting: ShortfallReporting::Aggregate,
            auto_prioritize_window_hours: 24,
            age_bonus_grace_days: 7,
            age_bonus_cap: 30,
            due_date_bonus: DueDateBonus::default(),
            priority_base_scores: [25, 50, 75, 100],
        }
    }

    /// 建構器模式：設置短缺回報方式
    pub fn with_shortfall_reporting(mut self, reporting: ShortfallReporting) -> Self {
        self.shortfall_reporting = reporting;
        self
    }

    /// 建構器模式：設置自動提升優先級時窗
    pub fn with_auto_prioritize_window_hours(mut self, hours: i64) -> Self {
        self.auto_prioritize_window_hours = hours;
        self
    }

    /// 建構器模式：設置單齡加分規則
    pub fn with_age_bonus(mut self, grace_days: i64, cap: i64) -> Self {
        self.age_bonus_grace_days = grace_days;
        self.age_bonus_cap = cap;
        self
    }

    /// 建構器模式：設置交期加分表
    pub fn with_due_date_bonus(mut self, bonus: DueDateBonus) -> Self {
        self.due_date_bonus = bonus;
        self
    }

    /// 建構器模式：設置優先級基礎分數
    pub fn with_priority_base_scores(mut self, scores: [i64; 4]) -> Self {
        self.priority_base_scores = scores;
        self
    }

    /// 取得優先級基礎分數
    pub fn base_score(&self, priority: MoPriority) -> i64 {
        let index = match priority {
            MoPriority::Low => 0,
            MoPriority::Normal => 1,
            MoPriority::High => 2,
            MoPriority::Urgent => 3,
        };
        self.priority_base_scores[index]
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();

        assert_eq!(config.shortfall_reporting, ShortfallReporting::Aggregate);
        assert_eq!(config.auto_prioritize_window_hours, 24);
        assert_eq!(config.base_score(MoPriority::Urgent), 100);
        assert_eq!(config.base_score(MoPriority::High), 75);
        assert_eq!(config.base_score(MoPriority::Normal), 50);
        assert_eq!(config.base_score(MoPriority::Low), 25);
        assert_eq!(config.due_date_bonus.overdue, 200);
    }

    #[test]
    fn test_config_builder() {
        let config = ServiceConfig::new()
            .with_shortfall_reporting(ShortfallReporting::PerComponent)
            .with_auto_prioritize_window_hours(48)
            .with_age_bonus(14, 10)
            .with_priority_base_scores([10, 20, 30, 40]);

        assert_eq!(config.shortfall_reporting, ShortfallReporting::PerComponent);
        assert_eq!(config.auto_prioritize_window_hours, 48);
        assert_eq!(config.age_bonus_grace_days, 14);
        assert_eq!(config.age_bonus_cap, 10);
        assert_eq!(config.base_score(MoPriority::Urgent), 40);
    }
}
