//! Order board: the filtered order collection plus every mutation an
//! operator can apply to it. Each successful mutation re-reads the
//! collection so the board always reflects the backend.

use serde::Deserialize;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::api::{Ack, OrderApi};
use crate::domain::order::{BadgeColor, Costing, Order, OrderStatus, PaymentStatus, StatusFilter};
use crate::error::{AdminError, AdminResult};
use crate::services::assignment::{self, AssignmentOutcome, AssignmentRequest};
use crate::services::directory::{Directory, DirectoryView};
use crate::validation::{validate_required, ValidationError};

/// How the board treats a status change the transition table does not list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Log a warning and submit anyway; the backend decides.
    #[default]
    Advisory,
    /// Refuse locally.
    Enforced,
}

impl FromStr for TransitionPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(TransitionPolicy::Advisory),
            "enforced" => Ok(TransitionPolicy::Enforced),
            other => Err(ValidationError::new(
                "transition_policy",
                format!("unknown policy '{}', expected advisory or enforced", other),
            )),
        }
    }
}

/// Content of the shop or partner column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartyCell {
    /// A picker is offered.
    Selectable,
    /// Read-only text: the assigned name, or "—".
    Fixed(String),
}

impl PartyCell {
    pub fn text(&self) -> &str {
        match self {
            PartyCell::Selectable => "[select]",
            PartyCell::Fixed(text) => text,
        }
    }
}

/// Everything one table row shows for an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
    pub id: String,
    pub short_id: String,
    pub customer: String,
    pub phone: String,
    pub address: String,
    pub items: Vec<String>,
    pub costing: Costing,
    pub shop: PartyCell,
    pub partner: PartyCell,
    pub payment: String,
    pub status: OrderStatus,
    pub badge: BadgeColor,
    pub mark_paid_offered: bool,
    pub created: String,
}

const PLACEHOLDER: &str = "—";

impl OrderRow {
    pub fn from_order(order: &Order) -> Self {
        let party_cell = |party: Option<&crate::domain::order::PartyRef>| {
            if order.can_assign() {
                PartyCell::Selectable
            } else {
                PartyCell::Fixed(
                    party
                        .and_then(|p| p.display_name())
                        .unwrap_or(PLACEHOLDER)
                        .to_string(),
                )
            }
        };

        let customer = order.customer.as_ref();
        let phone = order
            .address_details
            .as_ref()
            .and_then(|a| a.recipient_phone_number.clone())
            .or_else(|| customer.and_then(|c| c.phone.clone()))
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        let address = order
            .address_details
            .as_ref()
            .map(|a| a.one_line())
            .filter(|line| !line.is_empty())
            .or_else(|| order.address.clone())
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        let payment = match &order.payment_method {
            Some(method) => format!("{} ({})", order.payment_status, method),
            None => order.payment_status.to_string(),
        };

        OrderRow {
            id: order.id.clone(),
            short_id: order.short_id().to_string(),
            customer: customer
                .and_then(|c| c.display_name())
                .unwrap_or(PLACEHOLDER)
                .to_string(),
            phone,
            address,
            items: order
                .items
                .iter()
                .map(|i| format!("{} x{} @ ₹{}", i.name, i.quantity, i.price))
                .collect(),
            costing: order.costing(),
            shop: party_cell(order.shop_assigned.as_ref()),
            partner: party_cell(order.assigned_to.as_ref()),
            payment,
            status: order.status.clone(),
            badge: order.status.badge(),
            mark_paid_offered: order.can_mark_paid(),
            created: order
                .created_at
                .map(|t| t.format("%d %b %Y, %H:%M").to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        }
    }
}

pub struct OrderBoard<A: OrderApi + ?Sized> {
    api: Arc<A>,
    orders: Directory<Order>,
    filter: Mutex<StatusFilter>,
    policy: TransitionPolicy,
    token: CancellationToken,
}

impl<A: OrderApi + ?Sized> OrderBoard<A> {
    pub fn new(api: Arc<A>, policy: TransitionPolicy) -> Self {
        OrderBoard {
            api,
            orders: Directory::new("orders"),
            filter: Mutex::new(StatusFilter::All),
            policy,
            token: CancellationToken::new(),
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    /// Changes the status filter. The collection is not re-read until the
    /// next [`refresh`](Self::refresh).
    pub fn set_filter(&self, filter: StatusFilter) {
        if let Ok(mut current) = self.filter.lock() {
            *current = filter;
        }
    }

    /// Token that scopes every fetch this board makes. Cancelling it
    /// discards in-flight results.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub async fn refresh(&self) -> AdminResult<usize> {
        let filter = self.filter();
        let snapshot = self
            .orders
            .refresh(self.api.fetch_orders(&filter), &self.token)
            .await?;
        Ok(snapshot.items.len())
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders.items()
    }

    pub fn view(&self) -> DirectoryView {
        self.orders.view()
    }

    pub fn last_error(&self) -> Option<String> {
        self.orders.last_error()
    }

    pub fn rows(&self) -> Vec<OrderRow> {
        self.orders
            .snapshot()
            .items
            .iter()
            .map(OrderRow::from_order)
            .collect()
    }

    fn find(&self, order_id: &str) -> Option<Order> {
        self.orders
            .snapshot()
            .items
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
    }

    pub async fn assign(&self, request: &AssignmentRequest) -> AdminResult<AssignmentOutcome> {
        let outcome = assignment::assign(self.api.as_ref(), request).await?;
        self.reload_after(&request.order_id).await;
        Ok(outcome)
    }

    /// Sets a new status. Only the nine known statuses may be sent. Under
    /// [`TransitionPolicy::Enforced`] an order missing from the current
    /// snapshot is looked up first so the check always runs.
    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> AdminResult<Ack> {
        validate_required("order_id", order_id)?;
        if !status.is_known() {
            tracing::warn!("Refusing unknown status '{}' for order {}", status, order_id);
            return Err(ValidationError::new(
                "status",
                format!("'{}' is not an order status", status),
            )
            .into());
        }

        let current = match (self.find(order_id), self.policy) {
            (Some(order), _) => Some(order.status),
            (None, TransitionPolicy::Enforced) => Some(
                self.api
                    .fetch_order(order_id)
                    .await
                    .map_err(|e| log_failure("look up", order_id, e))?
                    .status,
            ),
            (None, TransitionPolicy::Advisory) => None,
        };

        if let Some(current) = current {
            if !current.can_transition_to(&status) {
                match self.policy {
                    TransitionPolicy::Enforced => {
                        tracing::warn!(
                            "Refusing status change of order {} from {} to {}",
                            order_id,
                            current,
                            status
                        );
                        return Err(ValidationError::new(
                            "status",
                            format!("cannot move order from {} to {}", current, status),
                        )
                        .into());
                    }
                    TransitionPolicy::Advisory => tracing::warn!(
                        "Order {} moving from {} to {} is outside the usual lifecycle",
                        order_id,
                        current,
                        status
                    ),
                }
            }
        }

        let ack = self
            .api
            .update_status(order_id, &status)
            .await
            .map_err(|e| log_failure("update status of", order_id, e))?;
        tracing::info!("Order {} status set to {}", order_id, status);
        self.reload_after(order_id).await;
        Ok(ack)
    }

    pub async fn mark_paid(&self, order_id: &str) -> AdminResult<Ack> {
        validate_required("order_id", order_id)?;
        let ack = self
            .api
            .update_payment_status(order_id, &PaymentStatus::Paid)
            .await
            .map_err(|e| log_failure("mark paid", order_id, e))?;
        tracing::info!("Order {} marked as paid", order_id);
        self.reload_after(order_id).await;
        Ok(ack)
    }

    /// Cancels after `confirm` agrees. Returns `Ok(None)` when the operator
    /// declined, in which case nothing is sent.
    pub async fn cancel<F>(&self, order_id: &str, confirm: F) -> AdminResult<Option<Ack>>
    where
        F: FnOnce(&str) -> bool,
    {
        validate_required("order_id", order_id)?;
        if !confirm(order_id) {
            tracing::debug!("Cancellation of order {} declined", order_id);
            return Ok(None);
        }
        let ack = self
            .api
            .cancel_order(order_id)
            .await
            .map_err(|e| log_failure("cancel", order_id, e))?;
        tracing::info!("Order {} cancelled", order_id);
        self.reload_after(order_id).await;
        Ok(Some(ack))
    }

    // The mutation already succeeded; a failed re-read leaves the stale
    // collection in place and is only logged.
    async fn reload_after(&self, order_id: &str) {
        match self.refresh().await {
            Ok(_) | Err(AdminError::Cancelled) => {}
            Err(e) => tracing::warn!("Reload after change to order {} failed: {}", order_id, e),
        }
    }
}

fn log_failure(action: &str, order_id: &str, e: AdminError) -> AdminError {
    tracing::error!("Failed to {} order {}: {}", action, order_id, e);
    e
}
