use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::domain::errors::DomainError;
use crate::domain::ports::{RelationshipResolver, ReportSource};
use crate::domain::report::{
    parse_report_date, DailyEntry, DatedOrderLine, SummaryReport, SummarySnapshot, TodayReport,
    YearMonth,
};

/// Computes the summary, daily and single-day reports.
///
/// The service holds no state of its own; each report is one read against the
/// source and storage failures are returned as-is, never retried.
pub struct ReportService<S> {
    source: S,
}

impl<S: ReportSource + RelationshipResolver> ReportService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn compute_summary(&self) -> Result<SummaryReport, DomainError> {
        let snapshot = self.source.summary_snapshot()?;
        let report = summarize(&snapshot);
        log::debug!(
            "Summary over {} order item(s): revenue {}",
            report.order_item_count,
            report.total_revenue
        );
        Ok(report)
    }

    /// Per-day order counts and revenue for `year`-`month`, ascending by day.
    /// Days without orders are left out.
    pub fn compute_daily(&self, year: i32, month: i32) -> Result<Vec<DailyEntry>, DomainError> {
        self.compute_daily_for(YearMonth::new(year, month)?)
    }

    pub fn compute_daily_for(&self, month: YearMonth) -> Result<Vec<DailyEntry>, DomainError> {
        let (from, to) = month.bounds();
        let lines = self.source.order_lines_between(from, to)?;
        let entries = group_by_day(&lines);
        log::debug!("Daily report for {month}: {} day(s) with orders", entries.len());
        Ok(entries)
    }

    /// Full order detail for a `YYYY-MM-DD` date.
    pub fn compute_today(&self, date: &str) -> Result<TodayReport, DomainError> {
        self.compute_for_date(parse_report_date(date)?)
    }

    pub fn compute_for_date(&self, date: NaiveDate) -> Result<TodayReport, DomainError> {
        let orders = self.source.order_details_on_date(date)?;
        log::debug!("Detail report for {date}: {} order(s)", orders.len());
        Ok(TodayReport { date, orders })
    }
}

pub fn summarize(snapshot: &SummarySnapshot) -> SummaryReport {
    let unresolved = snapshot
        .lines
        .iter()
        .filter(|l| l.unit_price.is_none())
        .count();
    if unresolved > 0 {
        log::warn!("{unresolved} order item(s) reference a missing product; counted as zero revenue");
    }

    SummaryReport {
        customer_count: snapshot.counts.customers,
        product_count: snapshot.counts.products,
        order_count: snapshot.counts.orders,
        order_item_count: snapshot.counts.order_items,
        total_revenue: snapshot.lines.iter().fold(0.0, |acc, l| acc + l.amount()),
    }
}

#[derive(Default)]
struct DayTotals {
    orders: BTreeSet<i32>,
    revenue: f64,
}

/// Groups joined order rows by the UTC calendar day of the order date. An order
/// appearing on several rows (one per item) is counted once.
pub fn group_by_day(lines: &[DatedOrderLine]) -> Vec<DailyEntry> {
    let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for row in lines {
        let totals = days.entry(row.order_date.date_naive()).or_default();
        totals.orders.insert(row.order_id);
        if let Some(line) = &row.line {
            totals.revenue += line.amount();
        }
    }

    days.into_iter()
        .map(|(day, totals)| DailyEntry {
            day,
            order_count: totals.orders.len() as i64,
            total_revenue: totals.revenue,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::domain::order::{Order, OrderDetail, OrderItemWithRefs, OrderWithCustomer};
    use crate::domain::report::{EntityCounts, RevenueLine};

    /// In-memory source; records the range each dated query asked for.
    #[derive(Default)]
    struct FakeSource {
        snapshot: Option<SummarySnapshot>,
        lines: Vec<DatedOrderLine>,
        details: Vec<OrderDetail>,
        failure: Option<DomainError>,
        ranges: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    }

    impl FakeSource {
        fn check(&self) -> Result<(), DomainError> {
            match &self.failure {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            }
        }
    }

    impl ReportSource for FakeSource {
        fn summary_snapshot(&self) -> Result<SummarySnapshot, DomainError> {
            self.check()?;
            Ok(self.snapshot.clone().unwrap_or(SummarySnapshot {
                counts: EntityCounts::default(),
                lines: vec![],
            }))
        }

        fn order_lines_between(
            &self,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<DatedOrderLine>, DomainError> {
            self.check()?;
            self.ranges.lock().unwrap().push((from, to));
            Ok(self.lines.clone())
        }
    }

    impl RelationshipResolver for FakeSource {
        fn orders_with_customer(&self) -> Result<Vec<OrderWithCustomer>, DomainError> {
            Ok(vec![])
        }

        fn order_items_with_order_and_product(&self) -> Result<Vec<OrderItemWithRefs>, DomainError> {
            Ok(vec![])
        }

        fn orders_on_date(&self, _date: NaiveDate) -> Result<Vec<Order>, DomainError> {
            Ok(vec![])
        }

        fn order_details_on_date(&self, _date: NaiveDate) -> Result<Vec<OrderDetail>, DomainError> {
            self.check()?;
            Ok(self.details.clone())
        }
    }

    fn may(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn row(order_id: i32, at: DateTime<Utc>, line: Option<(i32, Option<f64>)>) -> DatedOrderLine {
        DatedOrderLine {
            order_id,
            order_date: at,
            line: line.map(|(quantity, unit_price)| RevenueLine {
                quantity,
                unit_price,
            }),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn summary_multiplies_quantity_by_price() {
        let source = FakeSource {
            snapshot: Some(SummarySnapshot {
                counts: EntityCounts {
                    customers: 1,
                    products: 2,
                    orders: 2,
                    order_items: 3,
                },
                lines: vec![
                    RevenueLine {
                        quantity: 3,
                        unit_price: Some(10.0),
                    },
                    RevenueLine {
                        quantity: 1,
                        unit_price: Some(10.0),
                    },
                    RevenueLine {
                        quantity: 2,
                        unit_price: Some(0.25),
                    },
                ],
            }),
            ..Default::default()
        };

        let report = ReportService::new(source).compute_summary().unwrap();

        assert_eq!(
            report,
            SummaryReport {
                customer_count: 1,
                product_count: 2,
                order_count: 2,
                order_item_count: 3,
                total_revenue: 40.5,
            }
        );
    }

    #[test]
    fn unresolved_product_contributes_zero() {
        let snapshot = SummarySnapshot {
            counts: EntityCounts {
                order_items: 2,
                ..Default::default()
            },
            lines: vec![
                RevenueLine {
                    quantity: 5,
                    unit_price: None,
                },
                RevenueLine {
                    quantity: 2,
                    unit_price: Some(3.0),
                },
            ],
        };

        let report = summarize(&snapshot);

        assert_eq!(report.total_revenue, 6.0);
        assert_eq!(report.order_item_count, 2);
    }

    #[test]
    fn days_three_three_seven_yield_two_sparse_entries() {
        let lines = vec![
            row(1, may(3, 9), Some((1, Some(2.0)))),
            row(2, may(3, 18), None),
            row(3, may(7, 12), Some((2, Some(5.0)))),
        ];

        let entries = group_by_day(&lines);

        assert_eq!(
            entries,
            vec![
                DailyEntry {
                    day: day(3),
                    order_count: 2,
                    total_revenue: 2.0,
                },
                DailyEntry {
                    day: day(7),
                    order_count: 1,
                    total_revenue: 10.0,
                },
            ]
        );
    }

    #[test]
    fn join_fan_out_counts_each_order_once() {
        let lines = vec![
            row(1, may(3, 9), Some((3, Some(10.0)))),
            row(1, may(3, 9), Some((1, Some(10.0)))),
            row(1, may(3, 9), Some((2, None))),
        ];

        let entries = group_by_day(&lines);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].order_count, 1);
        assert_eq!(entries[0].total_revenue, 40.0);
    }

    #[test]
    fn grouping_ignores_time_of_day() {
        let midnight = may(3, 0);
        let last_instant = may(4, 0) - Duration::nanoseconds(1);
        let lines = vec![row(1, midnight, None), row(2, last_instant, None), row(3, may(4, 0), None)];

        let entries = group_by_day(&lines);

        let counts: Vec<(NaiveDate, i64)> = entries.iter().map(|e| (e.day, e.order_count)).collect();
        assert_eq!(counts, vec![(day(3), 2), (day(4), 1)]);
    }

    #[test]
    fn entries_are_sorted_by_day_whatever_the_row_order() {
        let lines = vec![row(9, may(20, 1), None), row(4, may(2, 1), None)];

        let days: Vec<NaiveDate> = group_by_day(&lines).iter().map(|e| e.day).collect();

        assert_eq!(days, vec![day(2), day(20)]);
    }

    #[test]
    fn daily_queries_the_whole_month() {
        let source = FakeSource::default();
        let service = ReportService::new(source);

        let entries = service.compute_daily(2024, 2).unwrap();

        assert!(entries.is_empty());
        let ranges = service.source.ranges.lock().unwrap();
        assert_eq!(
            *ranges,
            vec![(
                Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            )]
        );
    }

    #[test]
    fn invalid_month_is_rejected_before_reading() {
        let service = ReportService::new(FakeSource::default());

        for (year, month) in [(2024, 0), (2024, 13), (0, 5), (-1, 1)] {
            assert!(matches!(
                service.compute_daily(year, month),
                Err(DomainError::Validation(_))
            ));
        }
        assert!(service.source.ranges.lock().unwrap().is_empty());
    }

    #[test]
    fn invalid_date_is_a_validation_error() {
        let service = ReportService::new(FakeSource::default());

        assert!(matches!(
            service.compute_today("2024-13-01"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn storage_failures_surface_unchanged() {
        let failure = DomainError::Storage("disk I/O error".to_string());
        let service = ReportService::new(FakeSource {
            failure: Some(failure.clone()),
            ..Default::default()
        });

        assert_eq!(service.compute_summary(), Err(failure.clone()));
        assert_eq!(service.compute_daily(2024, 5), Err(failure.clone()));
        assert_eq!(service.compute_today("2024-05-03"), Err(failure));
    }

    #[test]
    fn reports_are_idempotent() {
        let service = ReportService::new(FakeSource {
            lines: vec![row(1, may(3, 9), Some((3, Some(10.0))))],
            ..Default::default()
        });

        let first = service.compute_daily(2024, 5).unwrap();
        let second = service.compute_daily(2024, 5).unwrap();

        assert_eq!(first, second);
    }
}
