//! Invoice and discount report computations.
//!
//! Pure functions over order lines joined with the current product state.
//! All arithmetic is checked `Decimal`, so totals are exact sums of line
//! amounts and an unrepresentable amount is an error rather than a panic.

use crate::errors::{AppError, AppResult};
use crate::models::{DiscountedProductReportItem, Invoice, InvoiceLine, PricedLine};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A discount applies when the percentage is positive, a threshold is set,
/// and the line quantity meets it. An unset threshold never activates.
pub fn is_discount_active(
    percentage: Option<Decimal>,
    threshold: Option<i32>,
    quantity: i32,
) -> bool {
    match (percentage, threshold) {
        (Some(pct), Some(threshold)) => pct > Decimal::ZERO && quantity >= threshold,
        _ => false,
    }
}

/// Percentage applied to a line, zero when the discount is inactive.
pub fn line_discount_percent(line: &PricedLine) -> Decimal {
    if is_discount_active(
        line.discount_percentage,
        line.discount_quantity_threshold,
        line.quantity,
    ) {
        line.discount_percentage.unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

fn amount_out_of_range() -> AppError {
    AppError::Internal("amount is out of the representable decimal range".to_string())
}

/// `price * quantity * (1 - percent / 100)`
pub fn line_amount(
    price: Decimal,
    quantity: i32,
    discount_percent: Decimal,
) -> AppResult<Decimal> {
    let amount = || {
        let rate = Decimal::ONE.checked_sub(discount_percent.checked_div(Decimal::ONE_HUNDRED)?)?;
        price.checked_mul(Decimal::from(quantity))?.checked_mul(rate)
    };

    amount().ok_or_else(amount_out_of_range)
}

pub fn compute_invoice(lines: &[PricedLine]) -> AppResult<Invoice> {
    let mut products = Vec::with_capacity(lines.len());
    let mut total_amount = Decimal::ZERO;

    for line in lines {
        let discount_percent = line_discount_percent(line);
        let amount = line_amount(line.price, line.quantity, discount_percent)?;
        total_amount = total_amount
            .checked_add(amount)
            .ok_or_else(amount_out_of_range)?;

        products.push(InvoiceLine {
            product_name: line.product_name.clone(),
            quantity: line.quantity,
            discount_percent,
            amount,
        });
    }

    Ok(Invoice {
        products,
        total_amount,
    })
}

/// Aggregates every line whose discount is active, per product.
///
/// Each qualifying line counts as one order. Products that never qualified
/// are left out. Entries come back in product id order.
pub fn discounted_product_report(
    lines: &[PricedLine],
) -> AppResult<Vec<DiscountedProductReportItem>> {
    let mut by_product: BTreeMap<i64, DiscountedProductReportItem> = BTreeMap::new();

    for line in lines {
        if !is_discount_active(
            line.discount_percentage,
            line.discount_quantity_threshold,
            line.quantity,
        ) {
            continue;
        }

        let discount_percent = line.discount_percentage.unwrap_or(Decimal::ZERO);
        let amount = line_amount(line.price, line.quantity, discount_percent)?;

        let entry = by_product
            .entry(line.product_id)
            .or_insert_with(|| DiscountedProductReportItem {
                product_name: line.product_name.clone(),
                discount_percent,
                number_of_orders: 0,
                total_amount: Decimal::ZERO,
            });
        entry.number_of_orders += 1;
        entry.total_amount = entry
            .total_amount
            .checked_add(amount)
            .ok_or_else(amount_out_of_range)?;
    }

    Ok(by_product.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(
        product_id: i64,
        name: &str,
        price: &str,
        discount: Option<(&str, i32)>,
        quantity: i32,
    ) -> PricedLine {
        PricedLine {
            product_id,
            product_name: name.to_string(),
            price: dec(price),
            discount_percentage: discount.map(|(pct, _)| dec(pct)),
            discount_quantity_threshold: discount.map(|(_, threshold)| threshold),
            quantity,
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let pct = Some(dec("20"));
        assert!(!is_discount_active(pct, Some(2), 1));
        assert!(is_discount_active(pct, Some(2), 2));
        assert!(is_discount_active(pct, Some(2), 3));
    }

    #[test]
    fn unset_fields_or_zero_percent_never_activate() {
        assert!(!is_discount_active(None, Some(1), 10));
        assert!(!is_discount_active(Some(dec("10")), None, 10));
        assert!(!is_discount_active(Some(Decimal::ZERO), Some(1), 10));
        // a stored threshold of 0 compares normally
        assert!(is_discount_active(Some(dec("10")), Some(0), 1));
    }

    #[test]
    fn invoice_applies_discount_and_sums_exactly() {
        let lines = vec![
            line(1, "Apple", "10", None, 1),
            line(2, "Banana", "20", Some(("25", 2)), 3),
        ];

        let invoice = compute_invoice(&lines).unwrap();

        assert_eq!(invoice.products.len(), 2);
        assert_eq!(invoice.products[0].discount_percent, Decimal::ZERO);
        assert_eq!(invoice.products[0].amount, dec("10"));
        assert_eq!(invoice.products[1].discount_percent, dec("25"));
        assert_eq!(invoice.products[1].amount, dec("45.00"));
        assert_eq!(invoice.total_amount, dec("55"));
    }

    #[test]
    fn invoice_has_no_float_drift() {
        // 0.1 * 3 is exactly 0.3 with decimals
        let lines = vec![
            line(1, "Penny", "0.1", None, 3),
            line(2, "Widget", "10.99", Some(("10", 2)), 3),
        ];

        let invoice = compute_invoice(&lines).unwrap();

        assert_eq!(invoice.products[0].amount, dec("0.3"));
        assert_eq!(invoice.products[1].amount, dec("29.673"));
        assert_eq!(invoice.total_amount, dec("29.973"));
    }

    #[test]
    fn below_threshold_pays_full_price() {
        let invoice = compute_invoice(&[line(1, "Banana", "20", Some(("25", 2)), 1)]).unwrap();
        assert_eq!(invoice.products[0].discount_percent, Decimal::ZERO);
        assert_eq!(invoice.total_amount, dec("20"));
    }

    #[test]
    fn report_counts_each_qualifying_line() {
        // same product on two different orders
        let first = line(1, "A", "10", Some(("20", 2)), 2);
        let second = line(1, "A", "10", Some(("20", 2)), 3);

        let report = discounted_product_report(&[first, second]).unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].product_name, "A");
        assert_eq!(report[0].discount_percent, dec("20"));
        assert_eq!(report[0].number_of_orders, 2);
        // 10*2*0.8 + 10*3*0.8
        assert_eq!(report[0].total_amount, dec("40"));
    }

    #[test]
    fn report_excludes_products_that_never_qualified() {
        let lines = vec![
            line(1, "NoDiscount", "50", None, 2),
            line(2, "BelowThreshold", "5", Some(("10", 5)), 4),
            line(3, "Qualifies", "20", Some(("15", 1)), 2),
        ];

        let report = discounted_product_report(&lines).unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].product_name, "Qualifies");
        assert_eq!(report[0].number_of_orders, 1);
        assert_eq!(report[0].total_amount, dec("34"));
    }

    #[test]
    fn report_only_sums_qualifying_lines() {
        let lines = vec![
            line(1, "A", "10", Some(("10", 2)), 1),
            line(1, "A", "10", Some(("10", 2)), 2),
        ];

        let report = discounted_product_report(&lines).unwrap();

        assert_eq!(report[0].number_of_orders, 1);
        assert_eq!(report[0].total_amount, dec("18"));
    }

    #[test]
    fn overflowing_amounts_are_errors() {
        let huge = "10000000000000000000000000000";

        let invoice = compute_invoice(&[line(1, "Huge", huge, None, 1000)]);
        assert!(matches!(invoice, Err(AppError::Internal(_))));

        // each line fits, the total does not
        let total = compute_invoice(&[
            line(1, "Huge", huge, None, 7),
            line(2, "Huge", huge, None, 7),
        ]);
        assert!(matches!(total, Err(AppError::Internal(_))));

        let report = discounted_product_report(&[
            line(1, "Huge", huge, Some(("10", 1)), 7),
            line(1, "Huge", huge, Some(("10", 1)), 7),
        ]);
        assert!(matches!(report, Err(AppError::Internal(_))));
    }

    #[test]
    fn largest_valid_price_still_invoices() {
        let price = crate::validation::MAX_PRICE.to_string();
        let invoice = compute_invoice(&[line(1, "Max", &price, None, i32::MAX)]).unwrap();
        assert_eq!(
            invoice.total_amount,
            crate::validation::MAX_PRICE * Decimal::from(i32::MAX)
        );
    }
}
