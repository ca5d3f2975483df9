use crate::api::{Ack, OrderApi};
use crate::error::AdminResult;
use crate::validation::{sanitize_string, ValidationError, ValidationResult};

/// Shop and optional delivery partner chosen for a placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub order_id: String,
    pub shop_id: String,
    pub partner_id: Option<String>,
}

impl AssignmentRequest {
    pub fn new(
        order_id: impl Into<String>,
        shop_id: impl Into<String>,
        partner_id: Option<String>,
    ) -> Self {
        AssignmentRequest {
            order_id: sanitize_string(&order_id.into()),
            shop_id: sanitize_string(&shop_id.into()),
            partner_id: partner_id
                .map(|p| sanitize_string(&p))
                .filter(|p| !p.is_empty()),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        if self.order_id.is_empty() {
            return Err(ValidationError::new("order_id", "Order id is missing"));
        }
        if self.shop_id.is_empty() {
            return Err(ValidationError::new("shop_id", "Please select a Shop first"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    ShopOnly { shop: Ack },
    ShopAndPartner { shop: Ack, partner: Ack },
}

impl AssignmentOutcome {
    pub fn summary(&self) -> &'static str {
        match self {
            AssignmentOutcome::ShopOnly { .. } => "Order assigned to shop",
            AssignmentOutcome::ShopAndPartner { .. } => {
                "Order assigned to shop and delivery partner"
            }
        }
    }
}

/// Assigns the shop, then the partner if one was chosen. A failed shop call
/// stops the sequence; nothing already applied is rolled back.
pub async fn assign<A>(api: &A, request: &AssignmentRequest) -> AdminResult<AssignmentOutcome>
where
    A: OrderApi + ?Sized,
{
    if let Err(e) = request.validate() {
        tracing::warn!("Assignment of order {} rejected: {}", request.order_id, e);
        return Err(e.into());
    }

    let shop = api
        .assign_to_shop(&request.order_id, &request.shop_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to assign order {} to shop: {}", request.order_id, e);
            e
        })?;

    let outcome = match request.partner_id.as_deref() {
        Some(partner_id) => {
            let partner = api
                .assign_to_partner(&request.order_id, partner_id, Some(&request.shop_id))
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Order {} assigned to shop but partner assignment failed: {}",
                        request.order_id,
                        e
                    );
                    e
                })?;
            AssignmentOutcome::ShopAndPartner { shop, partner }
        }
        None => AssignmentOutcome::ShopOnly { shop },
    };

    tracing::info!(
        "Order {} assigned (shop={}, partner={})",
        request.order_id,
        request.shop_id,
        request.partner_id.as_deref().unwrap_or("-")
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::RecordingApi;

    #[tokio::test]
    async fn empty_shop_makes_no_calls() {
        let api = RecordingApi::default();
        let request = AssignmentRequest::new("O1", "  ", Some("P1".into()));
        let result = assign(&api, &request).await;

        match result {
            Err(crate::error::AdminError::Validation(e)) => {
                assert_eq!(e.message, "Please select a Shop first")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn shop_only_makes_one_call() {
        let api = RecordingApi::default();
        let outcome = assign(&api, &AssignmentRequest::new("O1", "S1", None))
            .await
            .unwrap();
        assert!(matches!(outcome, AssignmentOutcome::ShopOnly { .. }));
        assert_eq!(api.calls(), vec!["shop O1 S1"]);
    }

    #[tokio::test]
    async fn blank_partner_counts_as_none() {
        let api = RecordingApi::default();
        assign(&api, &AssignmentRequest::new("O1", "S1", Some(" ".into())))
            .await
            .unwrap();
        assert_eq!(api.calls(), vec!["shop O1 S1"]);
    }

    #[tokio::test]
    async fn partner_follows_shop_with_shop_id() {
        let api = RecordingApi::default();
        let outcome = assign(&api, &AssignmentRequest::new("O1", "S1", Some("P1".into())))
            .await
            .unwrap();
        assert!(matches!(outcome, AssignmentOutcome::ShopAndPartner { .. }));
        assert_eq!(api.calls(), vec!["shop O1 S1", "partner O1 P1 S1"]);
    }

    #[tokio::test]
    async fn shop_failure_skips_partner() {
        let api = RecordingApi::failing_on("shop");
        let result = assign(&api, &AssignmentRequest::new("O1", "S1", Some("P1".into()))).await;
        assert!(result.is_err());
        assert_eq!(api.calls(), vec!["shop O1 S1"]);
    }
}
