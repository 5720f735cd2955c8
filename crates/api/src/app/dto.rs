use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::ProductId;
use catalog_products::{NewProduct, Product};

// -------------------------
// Request DTOs
// -------------------------

/// Inbound product payload.
///
/// Missing fields deserialize to their defaults so that an incomplete payload
/// reaches validation (and is echoed back) instead of failing JSON parsing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_description: Option<String>,
    #[serde(default, with = "price")]
    pub unit_price: Decimal,
}

/// Full-record replacement uses the same shape as creation.
pub type UpdateProductRequest = CreateProductRequest;

impl CreateProductRequest {
    pub fn to_new_product(&self) -> NewProduct {
        NewProduct {
            name: self.product_name.clone(),
            description: self.product_description.clone(),
            unit_price: self.unit_price,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: ProductId,
    pub product_name: String,
    pub product_description: Option<String>,
    #[serde(with = "price")]
    pub unit_price: Decimal,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id_typed(),
            product_name: p.name().to_string(),
            product_description: p.description().map(str::to_string),
            unit_price: p.unit_price(),
        }
    }
}

/// Prices travel as JSON numbers.
///
/// Outbound values go through their decimal text so the emitted number is the
/// closest `f64`, which prints back as the same digits for every price up to
/// `MAX_UNIT_PRICE` (15 significant digits). Larger values can lose digits.
mod price {
    use rust_decimal::Decimal;
    use serde::{Deserializer, Serializer, ser::Error};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let number: f64 = value.to_string().parse().map_err(S::Error::custom)?;
        serializer.serialize_f64(number)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer)
    }
}
