//! Order Service - Business logic layer

use axum_helpers::{Paginated, Pagination, pagination::DEFAULT_LIMIT};
use domain_products::StockLine;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{OrderError, OrderResult};
use crate::inventory::Inventory;
use crate::models::{
    CreateOrder, Order, OrderFilter, OrderItem, OrderLineInput, OrderQuery, OrderStatus,
    PageQuery, ShippingRates, UpdateOrderStatus, UpdatePaymentStatus, Viewer,
};
use crate::order_number::{MAX_SAVE_ATTEMPTS, generate_order_number, generate_unique_order_number};
use crate::repository::OrderRepository;

/// Orders handled per backfill batch
const BACKFILL_BATCH: u64 = 100;

pub struct OrderService<R: OrderRepository> {
    repository: Arc<R>,
    inventory: Arc<dyn Inventory>,
    shipping: ShippingRates,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repository: R, inventory: impl Inventory + 'static) -> Self {
        Self {
            repository: Arc::new(repository),
            inventory: Arc::new(inventory),
            shipping: ShippingRates::default(),
        }
    }

    pub fn with_shipping(mut self, shipping: ShippingRates) -> Self {
        self.shipping = shipping;
        self
    }

    /// Place an order for a signed-in customer (`user_id`) or a guest.
    ///
    /// Prices are read from the catalog and stock is reserved line by line;
    /// any failure after a reservation puts the reserved stock back.
    #[instrument(skip(self, input), fields(user_id = ?user_id, lines = input.items.len()))]
    pub async fn create(&self, user_id: Option<Uuid>, input: CreateOrder) -> OrderResult<Order> {
        let lines = merge_lines(&input.items);

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let snapshot = self
                .inventory
                .snapshot(line.product_id, &line.size, &line.color)
                .await?;
            items.push(OrderItem {
                product_id: line.product_id,
                name: snapshot.name,
                slug: snapshot.slug,
                image: snapshot.image,
                size: line.size.clone(),
                color: line.color.clone(),
                quantity: line.quantity,
                unit_price: snapshot.unit_price,
                line_total: OrderItem::line_total(snapshot.unit_price, line.quantity),
            });
        }

        let order = Order::place(user_id, input, items, self.shipping);

        let mut reserved = Vec::with_capacity(lines.len());
        for line in stock_lines(&order) {
            if let Err(e) = self.inventory.reserve(&line).await {
                self.release_all(&reserved).await;
                return Err(e);
            }
            reserved.push(line);
        }

        match self.save(order).await {
            Ok(order) => {
                tracing::info!(
                    order_id = %order.id,
                    order_number = %order.order_number,
                    total = order.total,
                    "Order placed"
                );
                Ok(order)
            }
            Err(e) => {
                tracing::error!(error = %e, "Order could not be saved, releasing stock");
                self.release_all(&reserved).await;
                Err(e)
            }
        }
    }

    /// Insert `order`, drawing a fresh number whenever the unique index
    /// rejects the previous one. A number supplied by the caller is saved
    /// once, as is.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn save(&self, mut order: Order) -> OrderResult<Order> {
        if !order.order_number.is_empty() {
            return self.repository.insert(order).await;
        }

        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            order.order_number = generate_order_number(order.created_at);
            match self.repository.insert(order.clone()).await {
                Err(OrderError::DuplicateOrderNumber(number)) => {
                    tracing::warn!(attempt, %number, "Order number collision, regenerating");
                }
                result => return result,
            }
        }

        Err(OrderError::OrderNumberExhausted(MAX_SAVE_ATTEMPTS))
    }

    /// Signed-in customer's orders, newest first
    #[instrument(skip(self))]
    pub async fn list_mine(&self, user_id: Uuid, page: PageQuery) -> OrderResult<Paginated<Order>> {
        let query = OrderQuery {
            user_id: Some(user_id),
            ..Default::default()
        };
        self.paginate(query, Pagination::new(page.page, page.limit, DEFAULT_LIMIT))
            .await
    }

    /// Admin listing
    #[instrument(skip(self))]
    pub async fn list(&self, filter: OrderFilter) -> OrderResult<Paginated<Order>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to)
            && from > to
        {
            return Err(OrderError::Validation(
                "from must not be after to".to_string(),
            ));
        }

        let page = Pagination::new(filter.page, filter.limit, DEFAULT_LIMIT);
        let query = OrderQuery {
            user_id: None,
            status: filter.status,
            search: filter
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            from: filter.from,
            to: filter.to,
        };
        self.paginate(query, page).await
    }

    /// Admin lookup
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> OrderResult<Order> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// The owner or an admin
    #[instrument(skip(self))]
    pub async fn get_for(&self, id: Uuid, viewer: Viewer) -> OrderResult<Order> {
        let order = self.get(id).await?;
        if !order.visible_to(viewer) {
            return Err(OrderError::Forbidden);
        }
        Ok(order)
    }

    /// Guest tracking. A wrong email looks the same as an unknown number.
    #[instrument(skip(self, email))]
    pub async fn track(&self, order_number: &str, email: &str) -> OrderResult<Order> {
        let order_number = order_number.trim().to_uppercase();
        let not_found = || OrderError::NumberNotFound(order_number.clone());

        let order = self
            .repository
            .get_by_number(&order_number)
            .await?
            .ok_or_else(not_found)?;

        if !order.tracking_email().eq_ignore_ascii_case(email.trim()) {
            return Err(not_found());
        }
        Ok(order)
    }

    /// Customer cancellation of their own pending order
    #[instrument(skip(self))]
    pub async fn cancel_own(&self, id: Uuid, user_id: Uuid) -> OrderResult<Order> {
        let order = self.get(id).await?;
        if !order.is_owned_by(user_id) {
            return Err(OrderError::Forbidden);
        }
        if order.status != OrderStatus::Pending {
            return Err(OrderError::NotCancellable(order.status));
        }

        self.transition(
            order,
            OrderStatus::Cancelled,
            Some("Cancelled by customer".to_string()),
            Some(user_id),
        )
        .await
    }

    /// Admin status change
    #[instrument(skip(self, input), fields(to = %input.status))]
    pub async fn update_status(
        &self,
        id: Uuid,
        input: UpdateOrderStatus,
        admin_id: Uuid,
    ) -> OrderResult<Order> {
        let order = self.get(id).await?;
        self.transition(order, input.status, input.note, Some(admin_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn update_payment(&self, id: Uuid, input: UpdatePaymentStatus) -> OrderResult<Order> {
        let mut order = self.get(id).await?;
        let status = order.status;
        order.payment_status = input.payment_status;
        order.updated_at = chrono::Utc::now();

        if !self
            .repository
            .replace_if_status(order.clone(), status)
            .await?
        {
            return Err(OrderError::Conflict);
        }
        tracing::info!(order_id = %id, payment_status = %order.payment_status, "Payment status updated");
        Ok(order)
    }

    /// Give every order saved without a number one, checking each candidate
    /// against the collection first. Returns how many were assigned.
    #[instrument(skip(self))]
    pub async fn backfill_order_numbers(&self) -> OrderResult<u64> {
        let mut assigned = 0;
        loop {
            let batch = self.repository.missing_numbers(BACKFILL_BATCH).await?;
            if batch.is_empty() {
                break;
            }

            let mut progressed = false;
            for order in batch {
                let number = generate_unique_order_number(order.created_at, |candidate| async move {
                    self.repository.number_exists(&candidate).await
                })
                .await?;

                match self.repository.assign_number(order.id, &number).await {
                    Ok(true) => {
                        assigned += 1;
                        progressed = true;
                        tracing::info!(order_id = %order.id, %number, "Order number assigned");
                    }
                    Ok(false) => {}
                    // Taken between the check and the write; the next
                    // batch picks the order up again
                    Err(OrderError::DuplicateOrderNumber(number)) => {
                        progressed = true;
                        tracing::warn!(order_id = %order.id, %number, "Order number taken during backfill");
                    }
                    Err(e) => return Err(e),
                }
            }

            if !progressed {
                break;
            }
        }
        Ok(assigned)
    }

    async fn transition(
        &self,
        mut order: Order,
        to: OrderStatus,
        note: Option<String>,
        changed_by: Option<Uuid>,
    ) -> OrderResult<Order> {
        let from = order.status;
        if !order.transition(to, note, changed_by) {
            return Err(OrderError::InvalidTransition { from, to });
        }

        if !self.repository.replace_if_status(order.clone(), from).await? {
            return Err(OrderError::Conflict);
        }

        tracing::info!(order_id = %order.id, %from, %to, "Order status changed");
        if to == OrderStatus::Cancelled {
            self.release_all(&stock_lines(&order)).await;
        }
        Ok(order)
    }

    async fn paginate(&self, query: OrderQuery, page: Pagination) -> OrderResult<Paginated<Order>> {
        let total = self.repository.count(query.clone()).await?;
        let orders = self.repository.list(query, page).await?;
        Ok(Paginated::new(orders, total, page))
    }

    /// Best effort; a failed release is logged and the rest still go back
    async fn release_all(&self, lines: &[StockLine]) {
        for line in lines {
            if let Err(e) = self.inventory.release(line).await {
                tracing::error!(
                    product_id = %line.product_id,
                    size = %line.size,
                    color = %line.color,
                    quantity = line.quantity,
                    error = %e,
                    "Failed to release stock"
                );
            }
        }
    }
}

impl<R: OrderRepository> Clone for OrderService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            inventory: Arc::clone(&self.inventory),
            shipping: self.shipping,
        }
    }
}

/// Collapse repeated (product, size, color) lines into one
fn merge_lines(lines: &[OrderLineInput]) -> Vec<OrderLineInput> {
    let mut merged: Vec<OrderLineInput> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|m| {
            m.product_id == line.product_id && m.size == line.size && m.color == line.color
        }) {
            Some(existing) => existing.quantity += line.quantity,
            None => merged.push(line.clone()),
        }
    }
    merged
}

fn stock_lines(order: &Order) -> Vec<StockLine> {
    order
        .items
        .iter()
        .map(|item| StockLine {
            product_id: item.product_id,
            size: item.size.clone(),
            color: item.color.clone(),
            quantity: item.quantity,
        })
        .collect()
}
