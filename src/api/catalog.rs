use reqwest::{multipart, Method};
use serde_json::{json, Value};
use std::path::Path;

use crate::api::client::AdminClient;
use crate::api::orders::Ack;
use crate::api::wire::{decode_list, decode_one, raw_list};
use crate::domain::catalog::{Category, Product, ProductKey, WishlistEntry};
use crate::error::AdminResult;
use crate::validation::{validate_required, validate_stock};

fn keyed(key: &ProductKey, field: &str, value: Value) -> Value {
    let mut body = match key {
        ProductKey::Id(id) => json!({ "id": id }),
        ProductKey::Name(name) => json!({ "name": name }),
    };
    body[field] = value;
    body
}

impl AdminClient {
    pub async fn products(&self) -> AdminResult<Vec<Product>> {
        let body = self.get_json("/products/get-product").await?;
        decode_list(body, &["data", "products"])
    }

    /// Admin product listing exactly as sent, for exports.
    pub async fn admin_products_raw(&self) -> AdminResult<Vec<Value>> {
        let body = self.get_json("/admin/get-products").await?;
        raw_list(body, &["data", "products"])
    }

    pub async fn product_by_id(&self, product_id: &str) -> AdminResult<Product> {
        let body = self
            .get_json(&format!("/products/{}", encode_segment(product_id.trim())))
            .await?;
        decode_one(body, &["product", "data"])
    }

    pub async fn categories(&self) -> AdminResult<Vec<Category>> {
        let body = self.get_json("/products/get-all-categories").await?;
        decode_list(body, &["categories", "data"])
    }

    /// Sets the stock of one product, addressed by id or name.
    pub async fn set_product_stock(&self, key: &ProductKey, stock: i64) -> AdminResult<Ack> {
        validate_stock(stock)?;
        let mut body = json!({ "stock": stock });
        match key {
            ProductKey::Id(id) => body["productId"] = json!(id),
            ProductKey::Name(name) => body["productName"] = json!(name),
        }
        let body = self.send_json(Method::PUT, "/products/stock", &body).await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn reset_all_stock(&self) -> AdminResult<Ack> {
        let body = self.send_empty(Method::PUT, "/products/reset-stock").await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn set_stock_to_eight(&self) -> AdminResult<Ack> {
        let body = self
            .send_empty(Method::PUT, "/products/set-stock-to-eight")
            .await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn set_subcategory_stock(&self, sub_category: &str, stock: i64) -> AdminResult<Ack> {
        let sub_category = sub_category.trim();
        validate_required("sub_category", sub_category)?;
        validate_stock(stock)?;
        let path = format!("/products/set-stock/{}", encode_segment(sub_category));
        let body = self
            .send_json(Method::PUT, &path, &json!({ "stock": stock }))
            .await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn zero_subcategory_stock(&self, sub_category: &str) -> AdminResult<Ack> {
        let sub_category = sub_category.trim();
        validate_required("sub_category", sub_category)?;
        let path = format!("/products/zero-stock/{}", encode_segment(sub_category));
        let body = self.send_empty(Method::PUT, &path).await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn update_product_price(&self, key: &ProductKey, price: &str) -> AdminResult<Ack> {
        validate_required("price", price)?;
        let body = self
            .send_json(
                Method::PUT,
                "/products/update-price",
                &keyed(key, "price", json!(price.trim())),
            )
            .await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn update_product_description(
        &self,
        key: &ProductKey,
        description: &str,
    ) -> AdminResult<Ack> {
        validate_required("description", description)?;
        let body = self
            .send_json(
                Method::PUT,
                "/products/update-description",
                &keyed(key, "description", json!(description)),
            )
            .await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn update_product_image(&self, key: &ProductKey, image: &Path) -> AdminResult<Ack> {
        let form = match key {
            ProductKey::Id(id) => multipart::Form::new().text("id", id.clone()),
            ProductKey::Name(name) => multipart::Form::new().text("name", name.clone()),
        };
        let form = form.part("image", file_part(image).await?);
        let body = self
            .send_multipart(Method::PUT, "/products/update-image", form)
            .await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn delete_product(&self, product_id: &str) -> AdminResult<Ack> {
        validate_required("product_id", product_id)?;
        let body = self
            .send_json(
                Method::DELETE,
                "/product/delete-product",
                &json!({ "productId": product_id.trim() }),
            )
            .await?;
        Ok(Ack::from_body(&body))
    }

    /// Wishlist requests, most recent first.
    pub async fn wishlist(&self) -> AdminResult<Vec<WishlistEntry>> {
        let body = self.get_json("/wishList/get-wishlist").await?;
        let mut entries: Vec<WishlistEntry> = decode_list(body, &["data"])?;
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}

/// Percent-encodes a single path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

pub(crate) async fn file_part(path: &Path) -> AdminResult<multipart::Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(multipart::Part::bytes(bytes).file_name(file_name))
}
