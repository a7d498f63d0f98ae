use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::application::ReportService;
use crate::domain::errors::DomainError;
use crate::domain::report::{DailyEntry, SummaryReport, TodayReport, YearMonth};
use crate::errors::AppError;
use crate::infrastructure::Store;

use super::blocking;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct DailyParams {
    /// Month as `YYYY-MM`. Defaults to the current UTC month.
    pub month_year: Option<String>,
    /// Alternative to `monthYear`; must be given together with `month`.
    pub year: Option<i32>,
    pub month: Option<i32>,
}

impl DailyParams {
    fn resolve(self) -> Result<YearMonth, DomainError> {
        match (self.month_year, self.year, self.month) {
            (Some(month_year), None, None) => month_year.parse(),
            (None, Some(year), Some(month)) => YearMonth::new(year, month),
            (None, None, None) => Ok(YearMonth::containing(Utc::now().date_naive())),
            _ => Err(DomainError::validation(
                "give either monthYear or both year and month",
            )),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TodayParams {
    /// Day as `YYYY-MM-DD`. Defaults to the current UTC date.
    pub date: Option<String>,
}

/// GET /api/report/summary
#[utoipa::path(
    get,
    path = "/api/report/summary",
    responses(
        (status = 200, description = "Entity counts and total revenue at current prices", body = SummaryReport),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reports"
)]
pub async fn summary(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let report = blocking(move || ReportService::new(store.reader()).compute_summary()).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /api/report/daily
///
/// One entry per day of the month that has at least one order.
#[utoipa::path(
    get,
    path = "/api/report/daily",
    params(DailyParams),
    responses(
        (status = 200, description = "Per-day order count and revenue, ascending by day", body = [DailyEntry]),
        (status = 400, description = "Malformed month"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reports"
)]
pub async fn daily(
    store: web::Data<Store>,
    query: web::Query<DailyParams>,
) -> Result<HttpResponse, AppError> {
    let month = query.into_inner().resolve()?;
    let entries =
        blocking(move || ReportService::new(store.reader()).compute_daily_for(month)).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// GET /api/report/today
///
/// Every order of one day with its customer, items and products.
#[utoipa::path(
    get,
    path = "/api/report/today",
    params(TodayParams),
    responses(
        (status = 200, description = "Orders of the day in full detail", body = TodayReport),
        (status = 400, description = "Malformed date"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reports"
)]
pub async fn today(
    store: web::Data<Store>,
    query: web::Query<TodayParams>,
) -> Result<HttpResponse, AppError> {
    let date = query.into_inner().date;
    let report = blocking(move || {
        let service = ReportService::new(store.reader());
        match date {
            Some(date) => service.compute_today(&date),
            None => service.compute_for_date(Utc::now().date_naive()),
        }
    })
    .await?;
    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(month_year: Option<&str>, year: Option<i32>, month: Option<i32>) -> DailyParams {
        DailyParams {
            month_year: month_year.map(str::to_string),
            year,
            month,
        }
    }

    #[test]
    fn month_year_and_separate_fields_agree() {
        let a = params(Some("2024-05"), None, None).resolve().unwrap();
        let b = params(None, Some(2024), Some(5)).resolve().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mixed_or_partial_params_are_rejected() {
        for p in [
            params(Some("2024-05"), Some(2024), None),
            params(None, Some(2024), None),
            params(None, None, Some(5)),
        ] {
            assert!(matches!(p.resolve(), Err(DomainError::Validation(_))));
        }
    }

    #[test]
    fn no_params_means_current_month() {
        let resolved = params(None, None, None).resolve().unwrap();
        assert_eq!(resolved, YearMonth::containing(Utc::now().date_naive()));
    }
}
