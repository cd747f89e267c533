use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::features::appointments::models::AppointmentStatus;

/// Headline counters for the dashboard
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummaryDto {
    pub total_patients: i64,
    pub new_patients_this_month: i64,
    pub appointments_today: i64,
    pub upcoming_appointments: i64,
    pub open_invoices: i64,
    #[schema(value_type = String)]
    pub outstanding_amount: Decimal,
    #[schema(value_type = String)]
    pub revenue_this_month: Decimal,
    pub active_treatment_plans: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePointDto {
    /// `YYYY-MM`
    pub month: String,
    pub invoice_count: i64,
    #[schema(value_type = String)]
    pub invoiced: Decimal,
    #[schema(value_type = String)]
    pub collected: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountDto {
    pub status: AppointmentStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentBreakdownDto {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total: i64,
    pub by_status: Vec<StatusCountDto>,
}

impl AppointmentBreakdownDto {
    pub fn new(from: NaiveDate, to: NaiveDate, by_status: Vec<StatusCountDto>) -> Self {
        Self {
            from,
            to,
            total: by_status.iter().map(|s| s.count).sum(),
            by_status,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopTreatmentDto {
    pub treatment_id: uuid::Uuid,
    pub name: String,
    pub code: String,
    pub times_planned: i64,
    #[schema(value_type = String)]
    pub planned_value: Decimal,
}

/// Date window for a report; both ends inclusive
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ReportRangeParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportRangeParams {
    /// Defaults to the twelve calendar months ending with `to` (or today)
    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), String> {
        let to = self.to.unwrap_or(today);
        let from = match self.from {
            Some(from) => from,
            None => first_of_month(to)
                .checked_sub_months(Months::new(11))
                .ok_or_else(|| "Report range is out of bounds".to_string())?,
        };

        if from > to {
            return Err("`from` must not be after `to`".to_string());
        }
        Ok((from, to))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TopTreatmentsParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Number of treatments to return (default 10)
    #[serde(default = "default_top")]
    #[param(minimum = 1, maximum = 50)]
    pub limit: i64,
}

fn default_top() -> i64 {
    10
}

impl TopTreatmentsParams {
    pub fn range(&self) -> ReportRangeParams {
        ReportRangeParams {
            from: self.from,
            to: self.to,
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_range_is_twelve_months() {
        let (from, to) = ReportRangeParams::default()
            .resolve(date(2025, 3, 18))
            .unwrap();
        assert_eq!(from, date(2024, 4, 1));
        assert_eq!(to, date(2025, 3, 18));
    }

    #[test]
    fn test_explicit_range_kept() {
        let params = ReportRangeParams {
            from: Some(date(2025, 1, 1)),
            to: Some(date(2025, 1, 31)),
        };
        assert_eq!(
            params.resolve(date(2025, 6, 1)).unwrap(),
            (date(2025, 1, 1), date(2025, 1, 31))
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let params = ReportRangeParams {
            from: Some(date(2025, 2, 1)),
            to: Some(date(2025, 1, 1)),
        };
        assert!(params.resolve(date(2025, 6, 1)).is_err());
    }

    #[test]
    fn test_breakdown_total() {
        let breakdown = AppointmentBreakdownDto::new(
            date(2025, 1, 1),
            date(2025, 1, 31),
            vec![
                StatusCountDto {
                    status: AppointmentStatus::Completed,
                    count: 12,
                },
                StatusCountDto {
                    status: AppointmentStatus::NoShow,
                    count: 3,
                },
            ],
        );
        assert_eq!(breakdown.total, 15);
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["byStatus"][1]["status"], "no_show");
    }

    #[test]
    fn test_top_limit_clamped() {
        let params: TopTreatmentsParams =
            serde_json::from_value(serde_json::json!({ "limit": 500 })).unwrap();
        assert_eq!(params.limit(), 50);
        let params: TopTreatmentsParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(params.limit(), 10);
    }
}
