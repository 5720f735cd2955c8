use rust_decimal::Decimal;

use catalog_core::{DomainError, DomainResult, Entity, ProductId};

/// Catalog entity: Product.
///
/// Identity is fixed at construction; every other field is replaced wholesale
/// through [`Product::replace_details`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: Option<String>,
    unit_price: Decimal,
}

impl Product {
    /// Assemble a product from already-trusted parts (e.g. a database row).
    ///
    /// No validation happens here; inbound data goes through [`NewProduct::build`].
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        description: Option<String>,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description,
            unit_price,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Full-record replacement keeping the identifier.
    pub fn replace_details(&self, details: NewProduct) -> DomainResult<Product> {
        details.build(self.id)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Decimal places a stored price keeps (`NUMERIC(18, 2)` in Postgres).
pub const PRICE_SCALE: u32 = 2;

/// Largest accepted price, 9_999_999_999_999.99: 15 significant digits, so the
/// value also survives the trip through a JSON number unchanged.
// (lo, mid) words of the 96-bit mantissa 999_999_999_999_999.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, PRICE_SCALE);

/// Creation payload: everything a product has except its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
}

impl NewProduct {
    /// Check field rules without consuming the payload.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("productName", "cannot be empty"));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(DomainError::validation("unitPrice", "cannot be negative"));
        }
        if self.unit_price.normalize().scale() > PRICE_SCALE {
            return Err(DomainError::validation(
                "unitPrice",
                format!("cannot have more than {PRICE_SCALE} decimal places"),
            ));
        }
        if self.unit_price > MAX_UNIT_PRICE {
            return Err(DomainError::validation(
                "unitPrice",
                format!("cannot exceed {MAX_UNIT_PRICE}"),
            ));
        }
        Ok(())
    }

    /// Validate and attach an identifier.
    ///
    /// The name is trimmed and a blank description collapses to `None`.
    pub fn build(self, id: ProductId) -> DomainResult<Product> {
        if id.is_nil() {
            return Err(DomainError::invalid_id("the nil id is reserved"));
        }
        self.validate()?;

        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Product {
            id,
            name: self.name.trim().to_string(),
            description,
            unit_price: self.unit_price,
        })
    }
}
