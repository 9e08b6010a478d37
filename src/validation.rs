//! Input validation for products, discounts, orders and paging.
//!
//! Every rule lives here so that product construction and every later
//! mutation run the same checks before anything touches the store.

use crate::models::{ApplyDiscount, CreateOrderItem, CreateProduct, Paging};
use rust_decimal::Decimal;

/// Validation result type
pub type ValidationResult = Result<(), String>;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// What a discount update resolves to once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountChange {
    Set {
        percentage: Decimal,
        quantity_threshold: i32,
    },
    Clear,
}

/// Validate a product name: must contain something other than whitespace.
pub fn validate_product_name(name: &str) -> ValidationResult {
    if name.trim().is_empty() {
        return Err("Product name is required.".into());
    }

    Ok(())
}

/// Validate a price: strictly positive and no more than `MAX_PRICE`.
pub fn validate_price(price: Decimal) -> ValidationResult {
    if price <= Decimal::ZERO {
        return Err("Price must be greater than zero.".into());
    }
    if price > MAX_PRICE {
        return Err(format!("Price cannot exceed {}.", MAX_PRICE));
    }

    Ok(())
}

/// Validate a discount percentage: 0 to 100 inclusive.
pub fn validate_discount_percentage(percentage: Decimal) -> ValidationResult {
    if percentage < Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err("Discount percentage must be between 0 and 100.".into());
    }

    Ok(())
}

/// Validate a discount update.
///
/// `0%` with threshold `0` removes the discount. Otherwise the threshold
/// must be at least 1 and the percentage within range.
pub fn validate_discount(discount: &ApplyDiscount) -> Result<DiscountChange, String> {
    if discount.percentage.is_zero() && discount.quantity_threshold == 0 {
        return Ok(DiscountChange::Clear);
    }

    validate_discount_percentage(discount.percentage)?;

    if discount.quantity_threshold < 1 {
        return Err("Discount quantity threshold must be at least 1.".into());
    }

    Ok(DiscountChange::Set {
        percentage: discount.percentage,
        quantity_threshold: discount.quantity_threshold,
    })
}

/// Validate the optional discount fields supplied at product creation.
fn validate_initial_discount(
    percentage: Option<Decimal>,
    quantity_threshold: Option<i32>,
) -> ValidationResult {
    if let Some(percentage) = percentage {
        validate_discount_percentage(percentage)?;
    }

    match (percentage, quantity_threshold) {
        (_, Some(threshold)) if threshold < 0 => {
            Err("Discount quantity threshold cannot be negative.".into())
        }
        (Some(percentage), Some(threshold)) if !percentage.is_zero() && threshold < 1 => {
            Err("Discount quantity threshold must be at least 1.".into())
        }
        _ => Ok(()),
    }
}

/// Combined validation for a product state, run at creation and before a
/// discount update is written.
pub fn validate_product(product: &CreateProduct) -> ValidationResult {
    validate_product_name(&product.name)?;
    validate_price(product.price)?;
    validate_initial_discount(
        product.discount_percentage,
        product.discount_quantity_threshold,
    )?;

    Ok(())
}

/// Validated order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i32,
}

/// Validate the item list of a new order.
///
/// Rejects a missing or empty list, and any entry without a product id or
/// with a quantity below 1.
pub fn validate_order_items(items: Option<&[CreateOrderItem]>) -> Result<Vec<OrderLine>, String> {
    let items = match items {
        Some(items) if !items.is_empty() => items,
        _ => return Err("At least one item is required.".into()),
    };

    items
        .iter()
        .map(|item| {
            let product_id = match item.product_id {
                Some(id) if id > 0 => id,
                _ => return Err("ProductId is required and must be greater than 0.".to_string()),
            };
            let quantity = match item.quantity {
                Some(qty) if qty >= 1 => qty,
                _ => return Err("Quantity must be at least 1.".to_string()),
            };
            Ok(OrderLine {
                product_id,
                quantity,
            })
        })
        .collect()
}

/// Validate paging parameters, applying defaults for absent values.
pub fn validate_paging(page: Option<i64>, page_size: Option<i64>) -> Result<Paging, String> {
    let page = page.unwrap_or(DEFAULT_PAGE);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    if page < 1 {
        return Err("Page must be at least 1.".into());
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(format!("PageSize must be between 1 and {}.", MAX_PAGE_SIZE));
    }
    // the row offset has to fit in an i64
    if (page - 1).checked_mul(page_size).is_none() {
        return Err("Page is out of range.".into());
    }

    Ok(Paging { page, page_size })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            price: Decimal::from(price),
            discount_percentage: None,
            discount_quantity_threshold: None,
        }
    }

    fn discount(percentage: i64, quantity_threshold: i32) -> ApplyDiscount {
        ApplyDiscount {
            percentage: Decimal::from(percentage),
            quantity_threshold,
        }
    }

    #[test]
    fn rejects_blank_names_and_non_positive_prices() {
        assert!(validate_product(&product("", 10)).is_err());
        assert!(validate_product(&product("   ", 10)).is_err());
        assert!(validate_product(&product("Valid Name", 0)).is_err());
        assert!(validate_product(&product("Valid Name", -5)).is_err());
        assert!(validate_product(&product("Valid Name", 10)).is_ok());
    }

    #[test]
    fn price_is_capped() {
        let mut p = product("Expensive", 1);
        p.price = MAX_PRICE;
        assert!(validate_product(&p).is_ok());

        p.price = MAX_PRICE + Decimal::new(1, 2);
        assert!(validate_product(&p).is_err());

        p.price = Decimal::MAX;
        assert!(validate_product(&p).is_err());
    }

    #[test]
    fn creation_checks_discount_fields() {
        let mut p = product("Banana", 20);
        p.discount_percentage = Some(Decimal::from(25));
        p.discount_quantity_threshold = Some(2);
        assert!(validate_product(&p).is_ok());

        p.discount_percentage = Some(Decimal::from(101));
        assert!(validate_product(&p).is_err());

        p.discount_percentage = Some(Decimal::from(10));
        p.discount_quantity_threshold = Some(0);
        assert!(validate_product(&p).is_err());
    }

    #[test]
    fn discount_bounds() {
        assert!(validate_discount(&discount(-1, 10)).is_err());
        assert!(validate_discount(&discount(101, 10)).is_err());
        assert!(validate_discount(&discount(10, 0)).is_err());
        assert!(validate_discount(&discount(10, -5)).is_err());
        assert_eq!(
            validate_discount(&discount(100, 1)),
            Ok(DiscountChange::Set {
                percentage: Decimal::ONE_HUNDRED,
                quantity_threshold: 1
            })
        );
    }

    #[test]
    fn zero_percent_and_zero_threshold_clears() {
        assert_eq!(validate_discount(&discount(0, 0)), Ok(DiscountChange::Clear));
        // 0% with a real threshold is stored as-is
        assert!(matches!(
            validate_discount(&discount(0, 3)),
            Ok(DiscountChange::Set { .. })
        ));
    }

    #[test]
    fn order_items_required() {
        assert!(validate_order_items(None).is_err());
        assert!(validate_order_items(Some(&[][..])).is_err());
    }

    #[test]
    fn order_items_need_product_and_quantity() {
        let missing_product = [CreateOrderItem {
            product_id: None,
            quantity: Some(2),
        }];
        let missing_quantity = [CreateOrderItem {
            product_id: Some(1),
            quantity: None,
        }];
        let zero_quantity = [CreateOrderItem {
            product_id: Some(1),
            quantity: Some(0),
        }];
        let negative_quantity = [CreateOrderItem {
            product_id: Some(1),
            quantity: Some(-1),
        }];

        assert!(validate_order_items(Some(&missing_product[..])).is_err());
        assert!(validate_order_items(Some(&missing_quantity[..])).is_err());
        assert!(validate_order_items(Some(&zero_quantity[..])).is_err());
        assert!(validate_order_items(Some(&negative_quantity[..])).is_err());
        assert!(validate_order_items(Some(&[CreateOrderItem::default()][..])).is_err());
    }

    #[test]
    fn duplicate_products_stay_separate_lines() {
        let items = [
            CreateOrderItem {
                product_id: Some(7),
                quantity: Some(1),
            },
            CreateOrderItem {
                product_id: Some(7),
                quantity: Some(4),
            },
        ];

        let lines = validate_order_items(Some(&items[..])).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], OrderLine { product_id: 7, quantity: 1 });
        assert_eq!(lines[1], OrderLine { product_id: 7, quantity: 4 });
    }

    #[test]
    fn paging_defaults_and_bounds() {
        assert_eq!(
            validate_paging(None, None),
            Ok(Paging {
                page: DEFAULT_PAGE,
                page_size: DEFAULT_PAGE_SIZE
            })
        );
        assert!(validate_paging(Some(0), None).is_err());
        assert!(validate_paging(None, Some(0)).is_err());
        assert!(validate_paging(None, Some(101)).is_err());
        assert_eq!(validate_paging(Some(3), Some(100)).unwrap().offset(), 200);
    }

    #[test]
    fn huge_page_is_rejected() {
        assert!(validate_paging(Some(i64::MAX), Some(100)).is_err());
        assert!(validate_paging(Some(i64::MAX), Some(1)).is_ok());
        assert!(validate_paging(Some(i64::MAX / 100 + 2), Some(100)).is_err());
        assert!(validate_paging(Some(i64::MAX / 100), Some(100)).is_ok());
    }
}
