use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub mini_category: Option<String>,
    pub stock: Option<i64>,
    pub image: Option<String>,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock.map(|s| s > 0).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id", default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sub_categories: Vec<String>,
}

/// What a product write addresses: the backend accepts either a record id
/// or the product's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductKey {
    Id(String),
    Name(String),
}

impl ProductKey {
    pub fn detect(identifier: &str) -> ProductKey {
        let identifier = identifier.trim();
        if crate::validation::is_object_id(identifier) {
            ProductKey::Id(identifier.to_string())
        } else {
            ProductKey::Name(identifier.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub product_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_product_with_mongo_id() {
        let product: Product = serde_json::from_str(
            r#"{"_id":"64f1a2b3c4d5e6f7a8b9c0d1","name":"Rice","price":50,"stock":0,"subCategory":"Grains"}"#,
        )
        .unwrap();
        assert_eq!(product.name, "Rice");
        assert_eq!(product.sub_category.as_deref(), Some("Grains"));
        assert!(!product.in_stock());
    }

    #[test]
    fn product_key_detects_ids() {
        assert_eq!(
            ProductKey::detect("64f1a2b3c4d5e6f7a8b9c0d1"),
            ProductKey::Id("64f1a2b3c4d5e6f7a8b9c0d1".to_string())
        );
        assert_eq!(
            ProductKey::detect(" Basmati Rice "),
            ProductKey::Name("Basmati Rice".to_string())
        );
    }
}
