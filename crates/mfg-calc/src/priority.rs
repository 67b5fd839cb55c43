//! 排程優先分數

use chrono::{DateTime, TimeDelta, Utc};
use mfg_core::{ManufacturingOrder, ServiceConfig};
use rayon::prelude::*;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// 優先分數計算器
pub struct PriorityScorer;

impl PriorityScorer {
    /// 計算優先分數（越高越急）
    ///
    /// 分數 = 優先級基礎分 + 交期緊急度加分 + 單齡加分。
    /// 交期天數與單齡天數皆以無條件進位的整日計算。
    pub fn score(mo: &ManufacturingOrder, now: DateTime<Utc>, config: &ServiceConfig) -> i64 {
        let mut score = config.base_score(mo.priority());

        if let Some(end) = mo.planned_end_date() {
            let days_until_due = ceil_days(end - now);
            let bonus = &config.due_date_bonus;

            score += if days_until_due < 0 {
                bonus.overdue
            } else if days_until_due <= 1 {
                bonus.within_one_day
            } else if days_until_due <= 3 {
                bonus.within_three_days
            } else if days_until_due <= 7 {
                bonus.within_seven_days
            } else {
                0
            };
        }

        let age_in_days = ceil_days(now - mo.created_at());
        if age_in_days > config.age_bonus_grace_days {
            score += (age_in_days - config.age_bonus_grace_days).min(config.age_bonus_cap);
        }

        score
    }

    /// 是否應自動提升優先級：非終態，且已逾期或在 `[now, now + 時窗]` 內到期
    pub fn should_auto_prioritize(
        mo: &ManufacturingOrder,
        now: DateTime<Utc>,
        config: &ServiceConfig,
    ) -> bool {
        if mo.status().is_terminal() {
            return false;
        }
        if mo.is_overdue_at(now) {
            return true;
        }

        let Some(end) = mo.planned_end_date() else {
            return false;
        };

        // 時窗超出可表示的時間範圍時視為無上限
        let horizon = TimeDelta::try_hours(config.auto_prioritize_window_hours)
            .and_then(|window| now.checked_add_signed(window));
        end >= now && horizon.map_or(true, |limit| end <= limit)
    }

    /// 批次評分並依分數由高到低排序
    ///
    /// 同分時依計劃完工日（無日期者排後）再依製令號排序。
    pub fn rank<'a>(
        orders: &'a [ManufacturingOrder],
        now: DateTime<Utc>,
        config: &ServiceConfig,
    ) -> Vec<(&'a ManufacturingOrder, i64)> {
        let mut scored: Vec<(&ManufacturingOrder, i64)> = orders
            .par_iter()
            .map(|mo| (mo, Self::score(mo, now, config)))
            .collect();

        scored.sort_by(|(a, score_a), (b, score_b)| {
            score_b
                .cmp(score_a)
                .then_with(|| match (a.planned_end_date(), b.planned_end_date()) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then_with(|| a.mo_number().cmp(b.mo_number()))
        });

        scored
    }
}

/// 無條件進位到整日（負值同樣往正方向進位）
fn ceil_days(delta: TimeDelta) -> i64 {
    let millis = delta.num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}
