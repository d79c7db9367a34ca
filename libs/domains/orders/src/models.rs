use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Order lifecycle
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Allowed next statuses
    pub fn next(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Processing, Cancelled],
            Processing => &[Shipped, Cancelled],
            Shipped => &[Delivered],
            Delivered | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        self.next().contains(&to)
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_empty()
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

/// Contact details captured at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CustomerInfo {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 30))]
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ShippingAddress {
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub postal_code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
}

/// Line item with the product details as they were when the order was placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    /// Minor units
    pub unit_price: i64,
    /// `unit_price * quantity`
    pub line_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusChange {
    pub status: OrderStatus,
    #[serde(default)]
    pub note: Option<String>,
    /// Admin or customer who made the change
    #[serde(default)]
    pub changed_by: Option<Uuid>,
    pub at: DateTime<Utc>,
}

/// Order entity - stored in the `orders` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// `CMD-YYMMDD-NNNNN`; empty only on legacy documents awaiting backfill
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    /// Lowercased; set on guest orders and used for tracking
    #[serde(default)]
    pub guest_email: Option<String>,
    pub customer: CustomerInfo,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub total: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One requested line; prices come from the catalog, never the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 20))]
    pub size: String,
    #[validate(length(min = 1, max = 40))]
    pub color: String,
    #[validate(range(min = 1, max = 100))]
    pub quantity: i32,
}

/// DTO for placing an order. Guests are identified by `customer.email`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrder {
    #[validate(nested)]
    pub customer: CustomerInfo,
    #[validate(nested)]
    pub shipping_address: ShippingAddress,
    #[validate(length(min = 1, max = 50), nested)]
    pub items: Vec<OrderLineInput>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentStatus {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct TrackQuery {
    #[validate(email)]
    pub email: String,
}

/// Admin listing parameters
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Order number, customer email or name, case-insensitive
    pub search: Option<String>,
    /// Created at or after
    pub from: Option<DateTime<Utc>>,
    /// Created at or before
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Resolved listing criteria handed to the repository
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Who is looking at an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Uuid,
    pub is_admin: bool,
}

/// Flat-rate shipping, waived from a subtotal threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingRates {
    pub flat_rate: i64,
    pub free_threshold: i64,
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self {
            flat_rate: 500,
            free_threshold: 10_000,
        }
    }
}

impl ShippingRates {
    pub fn cost(&self, subtotal: i64) -> i64 {
        if subtotal >= self.free_threshold {
            0
        } else {
            self.flat_rate
        }
    }
}

impl OrderItem {
    pub fn line_total(unit_price: i64, quantity: i32) -> i64 {
        unit_price.saturating_mul(i64::from(quantity))
    }
}

impl Order {
    /// A fresh pending order. The number is assigned when it is saved.
    pub fn place(
        user_id: Option<Uuid>,
        input: CreateOrder,
        items: Vec<OrderItem>,
        rates: ShippingRates,
    ) -> Self {
        let now = Utc::now();
        let subtotal = items.iter().map(|i| i.line_total).sum();
        let shipping_cost = rates.cost(subtotal);

        let mut customer = input.customer;
        customer.email = customer.email.trim().to_lowercase();
        let guest_email = user_id.is_none().then(|| customer.email.clone());

        Self {
            id: Uuid::now_v7(),
            order_number: String::new(),
            user_id,
            guest_email,
            customer,
            shipping_address: input.shipping_address,
            items,
            subtotal,
            shipping_cost,
            total: subtotal + shipping_cost,
            status: OrderStatus::Pending,
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Pending,
            status_history: vec![StatusChange {
                status: OrderStatus::Pending,
                note: Some("Order placed".to_string()),
                changed_by: user_id,
                at: now,
            }],
            notes: input.notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == Some(user_id)
    }

    pub fn visible_to(&self, viewer: Viewer) -> bool {
        viewer.is_admin || self.is_owned_by(viewer.user_id)
    }

    /// Email that unlocks guest tracking
    pub fn tracking_email(&self) -> &str {
        self.guest_email.as_deref().unwrap_or(&self.customer.email)
    }

    /// Move to `to`, recording the change. Delivering a cash-on-delivery
    /// order marks it paid; cancelling a paid order marks it refunded.
    ///
    /// Returns `false` without touching the order when the transition is
    /// not allowed.
    pub fn transition(
        &mut self,
        to: OrderStatus,
        note: Option<String>,
        changed_by: Option<Uuid>,
    ) -> bool {
        if !self.status.can_transition_to(to) {
            return false;
        }

        let now = Utc::now();
        self.status = to;
        self.status_history.push(StatusChange {
            status: to,
            note: note.filter(|n| !n.trim().is_empty()),
            changed_by,
            at: now,
        });

        match (to, self.payment_method, self.payment_status) {
            (OrderStatus::Delivered, PaymentMethod::CashOnDelivery, PaymentStatus::Pending) => {
                self.payment_status = PaymentStatus::Paid;
            }
            (OrderStatus::Cancelled, _, PaymentStatus::Paid) => {
                self.payment_status = PaymentStatus::Refunded;
            }
            _ => {}
        }

        self.updated_at = now;
        true
    }
}
