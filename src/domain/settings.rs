use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub cod_enabled: bool,
}

/// Global fee configuration applied by the backend at checkout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfig {
    pub delivery_charge: Option<BigDecimal>,
    pub handling_fee: Option<BigDecimal>,
    pub gst_percentage: Option<BigDecimal>,
    pub late_night_fee: Option<BigDecimal>,
    #[serde(default)]
    pub is_late_night_active: bool,
    pub surge_fee: Option<BigDecimal>,
    #[serde(default)]
    pub is_surge_active: bool,
    #[serde(default)]
    pub is_active: bool,
}

/// Operator edits to a [`FeeConfig`]. Unset fields keep the stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeeChanges {
    pub delivery_charge: Option<BigDecimal>,
    pub handling_fee: Option<BigDecimal>,
    pub gst_percentage: Option<BigDecimal>,
    pub late_night_fee: Option<BigDecimal>,
    pub surge_fee: Option<BigDecimal>,
    pub is_late_night_active: Option<bool>,
    pub is_surge_active: Option<bool>,
    pub is_active: Option<bool>,
}

impl FeeChanges {
    pub fn is_empty(&self) -> bool {
        *self == FeeChanges::default()
    }

    pub fn apply_to(self, mut fee: FeeConfig) -> FeeConfig {
        if self.delivery_charge.is_some() {
            fee.delivery_charge = self.delivery_charge;
        }
        if self.handling_fee.is_some() {
            fee.handling_fee = self.handling_fee;
        }
        if self.gst_percentage.is_some() {
            fee.gst_percentage = self.gst_percentage;
        }
        if self.late_night_fee.is_some() {
            fee.late_night_fee = self.late_night_fee;
        }
        if self.surge_fee.is_some() {
            fee.surge_fee = self.surge_fee;
        }
        fee.is_late_night_active = self.is_late_night_active.unwrap_or(fee.is_late_night_active);
        fee.is_surge_active = self.is_surge_active.unwrap_or(fee.is_surge_active);
        fee.is_active = self.is_active.unwrap_or(fee.is_active);
        fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_fee_config() {
        let fee: FeeConfig = serde_json::from_str(
            r#"{"deliveryCharge":20,"handlingFee":5,"gstPercentage":"5","isSurgeActive":true,"isActive":true}"#,
        )
        .unwrap();
        assert_eq!(fee.delivery_charge, Some(BigDecimal::from(20)));
        assert!(fee.is_surge_active);
        assert!(!fee.is_late_night_active);
    }

    #[test]
    fn changes_only_touch_given_fields() {
        let stored = FeeConfig {
            delivery_charge: Some(BigDecimal::from(20)),
            handling_fee: Some(BigDecimal::from(5)),
            is_surge_active: true,
            is_active: true,
            ..FeeConfig::default()
        };
        let changes = FeeChanges {
            handling_fee: Some(BigDecimal::from(8)),
            is_surge_active: Some(false),
            ..FeeChanges::default()
        };
        assert!(!changes.is_empty());

        let updated = changes.apply_to(stored);
        assert_eq!(updated.delivery_charge, Some(BigDecimal::from(20)));
        assert_eq!(updated.handling_fee, Some(BigDecimal::from(8)));
        assert!(!updated.is_surge_active);
        assert!(updated.is_active);
        assert!(FeeChanges::default().is_empty());
    }
}
