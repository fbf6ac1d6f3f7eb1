use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::{ContaminationLevel, FoodLog, LogStatus, TrendDirection};

#[derive(Debug, Clone, Serialize)]
pub struct BreakdownItem {
    pub food_item: String,
    pub count: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub weekday: String,
    pub count: u32,
    pub level: ContaminationLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklySummary {
    pub days: Vec<DaySummary>,
    pub total: u32,
    pub average_daily: f64,
    pub max_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub direction: TrendDirection,
    pub percentage: f64,
    pub average: f64,
    pub highest: u32,
    pub lowest: u32,
}

/// Changes smaller than this (in percent) count as stable
const STABLE_THRESHOLD_PERCENT: f64 = 5.0;

/// Session-scoped food log; nothing is persisted
#[derive(Debug, Default)]
pub struct FoodLogBook {
    entries: Vec<FoodLog>,
    next_id: u64,
}

impl FoodLogBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, food_item: &str, microplastics_count: u32, logged_at: DateTime<Utc>) -> &FoodLog {
        self.push(food_item, microplastics_count, logged_at, LogStatus::Analyzed)
    }

    pub fn record_failure(&mut self, food_item: &str, logged_at: DateTime<Utc>) -> &FoodLog {
        self.push(food_item, 0, logged_at, LogStatus::Failed)
    }

    fn push(&mut self, food_item: &str, microplastics_count: u32, logged_at: DateTime<Utc>, status: LogStatus) -> &FoodLog {
        self.next_id += 1;
        log::debug!("📝 Logging {} ({} particles, {:?})", food_item, microplastics_count, status);
        self.entries.push(FoodLog {
            id: self.next_id,
            food_item: food_item.to_string(),
            microplastics_count,
            logged_at,
            status,
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Newest first
    pub fn entries(&self) -> Vec<&FoodLog> {
        let mut entries: Vec<&FoodLog> = self.entries.iter().collect();
        entries.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn analyzed_on(&self, date: NaiveDate) -> impl Iterator<Item = &FoodLog> {
        self.entries
            .iter()
            .filter(move |e| e.status == LogStatus::Analyzed && e.date() == date)
    }

    pub fn daily_total(&self, date: NaiveDate) -> u32 {
        self.analyzed_on(date).map(|e| e.microplastics_count).sum()
    }

    /// Per-item counts for one day with each item's share of the total
    pub fn daily_breakdown(&self, date: NaiveDate) -> Vec<BreakdownItem> {
        let total = self.daily_total(date);

        self.analyzed_on(date)
            .map(|e| BreakdownItem {
                food_item: e.food_item.clone(),
                count: e.microplastics_count,
                percentage: if total > 0 {
                    e.microplastics_count as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
            })
            .collect()
    }

    /// Seven days ending at `end_date` (inclusive), oldest first
    pub fn weekly_summary(&self, end_date: NaiveDate) -> WeeklySummary {
        let days: Vec<DaySummary> = (0..7)
            .rev()
            .map(|offset| {
                let date = end_date - Duration::days(offset);
                let count = self.daily_total(date);
                DaySummary {
                    date,
                    weekday: date.weekday().to_string(),
                    count,
                    level: ContaminationLevel::from_count(count),
                }
            })
            .collect();

        let total: u32 = days.iter().map(|d| d.count).sum();
        let max_count = days.iter().map(|d| d.count).max().unwrap_or(0);

        WeeklySummary {
            days,
            total,
            average_daily: total as f64 / 7.0,
            max_count,
        }
    }
}

/// Direction and spread of a series, comparing its first and last points
pub fn trend(values: &[u32]) -> TrendSummary {
    let highest = values.iter().copied().max().unwrap_or(0);
    let lowest = values.iter().copied().min().unwrap_or(0);
    let average = if values.is_empty() {
        0.0
    } else {
        values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
    };

    let (direction, percentage) = match (values.first(), values.last()) {
        (Some(&first), Some(&last)) if values.len() >= 2 && first > 0 => {
            let change = (last as f64 - first as f64) / first as f64 * 100.0;
            if change.abs() < STABLE_THRESHOLD_PERCENT {
                (TrendDirection::Stable, change)
            } else if change > 0.0 {
                (TrendDirection::Increasing, change.abs())
            } else {
                (TrendDirection::Decreasing, change.abs())
            }
        }
        _ => (TrendDirection::Stable, 0.0),
    };

    TrendSummary {
        direction,
        percentage,
        average,
        highest,
        lowest,
    }
}
