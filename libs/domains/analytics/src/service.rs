//! Analytics Service - dashboard figures for admins

use chrono::{Days, Utc};
use domain_orders::{Order, OrderStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::models::{DailySales, DashboardStats, LimitQuery, SalesQuery, StatusCount, TopProduct};
use crate::repository::AnalyticsRepository;

pub const DEFAULT_SALES_DAYS: u32 = 30;
pub const MAX_SALES_DAYS: u32 = 365;
pub const DEFAULT_LIST_LIMIT: u32 = 10;
pub const MAX_LIST_LIMIT: u32 = 50;
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

pub struct AnalyticsService<R: AnalyticsRepository> {
    repository: Arc<R>,
    low_stock_threshold: i32,
}

impl<R: AnalyticsRepository> AnalyticsService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    pub fn with_low_stock_threshold(mut self, threshold: i32) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> AnalyticsResult<DashboardStats> {
        let repo = &self.repository;
        let (total_revenue, total_orders, pending_orders, total_customers, active_products, low_stock_products) =
            tokio::try_join!(
                repo.revenue(),
                repo.count_orders(None),
                repo.count_orders(Some(OrderStatus::Pending)),
                repo.count_customers(),
                repo.count_active_products(),
                repo.count_low_stock(self.low_stock_threshold),
            )?;

        Ok(DashboardStats {
            total_revenue,
            total_orders,
            pending_orders,
            total_customers,
            active_products,
            low_stock_products,
            low_stock_threshold: self.low_stock_threshold,
        })
    }

    /// One entry per day, today included, with zeros for days without sales
    #[instrument(skip(self))]
    pub async fn sales(&self, query: SalesQuery) -> AnalyticsResult<Vec<DailySales>> {
        let days = query.days.unwrap_or(DEFAULT_SALES_DAYS);
        if !(1..=MAX_SALES_DAYS).contains(&days) {
            return Err(AnalyticsError::Validation(format!(
                "days must be between 1 and {MAX_SALES_DAYS}"
            )));
        }

        let today = Utc::now().date_naive();
        let first = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .unwrap_or(today);
        let since = first.and_time(chrono::NaiveTime::MIN).and_utc();

        let recorded: HashMap<_, _> = self
            .repository
            .daily_sales(since)
            .await?
            .into_iter()
            .map(|d| (d.date, d))
            .collect();

        Ok(first
            .iter_days()
            .take_while(|d| *d <= today)
            .map(|date| {
                recorded.get(&date).cloned().unwrap_or(DailySales {
                    date,
                    revenue: 0,
                    orders: 0,
                })
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn top_products(&self, query: LimitQuery) -> AnalyticsResult<Vec<TopProduct>> {
        self.repository.top_products(list_limit(query)?).await
    }

    /// Every status, zero when no order has it
    #[instrument(skip(self))]
    pub async fn orders_by_status(&self) -> AnalyticsResult<Vec<StatusCount>> {
        let counts: HashMap<_, _> = self
            .repository
            .orders_by_status()
            .await?
            .into_iter()
            .map(|s| (s.status, s.count))
            .collect();

        Ok(OrderStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: counts.get(status).copied().unwrap_or(0),
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn recent_orders(&self, query: LimitQuery) -> AnalyticsResult<Vec<Order>> {
        self.repository.recent_orders(list_limit(query)?).await
    }
}

fn list_limit(query: LimitQuery) -> AnalyticsResult<u32> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if !(1..=MAX_LIST_LIMIT).contains(&limit) {
        return Err(AnalyticsError::Validation(format!(
            "limit must be between 1 and {MAX_LIST_LIMIT}"
        )));
    }
    Ok(limit)
}

impl<R: AnalyticsRepository> Clone for AnalyticsService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockAnalyticsRepository;
    use mockall::predicate::*;

    #[tokio::test]
    async fn test_dashboard_collects_all_figures() {
        let mut mock = MockAnalyticsRepository::new();
        mock.expect_revenue().returning(|| Ok(125_000));
        mock.expect_count_orders()
            .with(eq(None))
            .returning(|_| Ok(42));
        mock.expect_count_orders()
            .with(eq(Some(OrderStatus::Pending)))
            .returning(|_| Ok(7));
        mock.expect_count_customers().returning(|| Ok(30));
        mock.expect_count_active_products().returning(|| Ok(120));
        mock.expect_count_low_stock()
            .with(eq(3))
            .returning(|_| Ok(4));

        let service = AnalyticsService::new(mock).with_low_stock_threshold(3);
        let stats = service.dashboard().await.unwrap();

        assert_eq!(
            stats,
            DashboardStats {
                total_revenue: 125_000,
                total_orders: 42,
                pending_orders: 7,
                total_customers: 30,
                active_products: 120,
                low_stock_products: 4,
                low_stock_threshold: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_sales_fills_missing_days() {
        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap();

        let mut mock = MockAnalyticsRepository::new();
        mock.expect_daily_sales()
            .withf(move |since| since.date_naive() == today.checked_sub_days(Days::new(6)).unwrap())
            .returning(move |_| {
                Ok(vec![DailySales {
                    date: yesterday,
                    revenue: 9_000,
                    orders: 2,
                }])
            });

        let service = AnalyticsService::new(mock);
        let sales = service.sales(SalesQuery { days: Some(7) }).await.unwrap();

        assert_eq!(sales.len(), 7);
        assert_eq!(sales.last().unwrap().date, today);
        assert_eq!(sales[5].date, yesterday);
        assert_eq!(sales[5].revenue, 9_000);
        assert_eq!(sales.iter().map(|d| d.orders).sum::<u64>(), 2);
    }

    #[tokio::test]
    async fn test_sales_rejects_out_of_range_days() {
        let service = AnalyticsService::new(MockAnalyticsRepository::new());

        for days in [0, 366] {
            let result = service.sales(SalesQuery { days: Some(days) }).await;
            assert!(matches!(result, Err(AnalyticsError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_orders_by_status_lists_every_status() {
        let mut mock = MockAnalyticsRepository::new();
        mock.expect_orders_by_status().returning(|| {
            Ok(vec![StatusCount {
                status: OrderStatus::Delivered,
                count: 9,
            }])
        });

        let service = AnalyticsService::new(mock);
        let counts = service.orders_by_status().await.unwrap();

        assert_eq!(counts.len(), OrderStatus::ALL.len());
        let delivered = counts
            .iter()
            .find(|c| c.status == OrderStatus::Delivered)
            .unwrap();
        assert_eq!(delivered.count, 9);
        assert!(counts
            .iter()
            .filter(|c| c.status != OrderStatus::Delivered)
            .all(|c| c.count == 0));
    }

    #[tokio::test]
    async fn test_list_limit_defaults_and_bounds() {
        let mut mock = MockAnalyticsRepository::new();
        mock.expect_top_products()
            .with(eq(DEFAULT_LIST_LIMIT))
            .returning(|_| Ok(vec![]));

        let service = AnalyticsService::new(mock);
        assert!(service.top_products(LimitQuery::default()).await.unwrap().is_empty());

        let result = service.recent_orders(LimitQuery { limit: Some(51) }).await;
        assert!(matches!(result, Err(AnalyticsError::Validation(_))));
    }
}
