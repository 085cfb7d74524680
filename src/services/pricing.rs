//! Price formatting and the copy-ready listing text.

use super::listing::ListingResult;

/// Format whole Rupiah with dot thousands separators: `Rp 150.000`.
#[must_use]
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if amount < 0 { format!("-Rp {grouped}") } else { format!("Rp {grouped}") }
}

/// Estimated profit over the seller's cost basis. `None` without a cost basis.
#[must_use]
pub fn profit(suggested_price: i64, modal_price: Option<i64>) -> Option<i64> {
    modal_price.map(|modal| suggested_price.saturating_sub(modal))
}

/// The full listing as one block of text, ready to paste into a marketplace.
#[must_use]
pub fn copy_text(result: &ListingResult) -> String {
    format!(
        "{}\n\n{}\n\nHarga: {}\n\n{}",
        result.title,
        result.description,
        format_rupiah(result.suggested_price),
        result.hashtags
    )
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
