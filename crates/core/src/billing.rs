use chrono::NaiveDate;
use rand::Rng;

use crate::models::{Room, SearchParams, StayQuote};

/// Fixed VAT rate applied to the room subtotal. The deposit is never taxed.
pub const TAX_RATE: f64 = 0.07;

pub const BILL_CODE_PREFIX: &str = "BK";

/// Number of nights for a stay. A missing date on either side, an identical
/// pair, or an inverted pair all fall back to a single night.
pub fn calculate_nights(check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> u32 {
    match (check_in, check_out) {
        (Some(start), Some(end)) => {
            let days = (end - start).num_days();
            if days > 0 {
                days as u32
            } else {
                1
            }
        }
        _ => 1,
    }
}

/// Human-readable bill reference: `BK-YYYYMMDD-####` with a uniform 4-digit
/// suffix. Cosmetic only; collisions are accepted since nothing is ever
/// looked up by this code.
pub fn generate_bill_code(today: NaiveDate, rng: &mut impl Rng) -> String {
    let suffix: u16 = rng.random_range(1000..=9999);
    format!("{}-{}-{}", BILL_CODE_PREFIX, today.format("%Y%m%d"), suffix)
}

/// Compute the full cost breakdown for a stay. Total on its own over every
/// input; the clock and random source are injected by the caller.
pub fn build_stay_quote(
    room: &Room,
    params: &SearchParams,
    today: NaiveDate,
    rng: &mut impl Rng,
) -> StayQuote {
    let nights = calculate_nights(params.check_in, params.check_out);
    let subtotal = room.price * i64::from(nights);
    let tax = subtotal as f64 * TAX_RATE;
    let total = subtotal as f64 + tax + room.deposit as f64;

    StayQuote {
        nights,
        room_rate: room.price,
        subtotal,
        tax,
        deposit: room.deposit,
        total,
        bill_code: generate_bill_code(today, rng),
    }
}

/// Thousands-grouped baht amount for display, e.g. `12000` -> `12,000`.
pub fn format_baht(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut grouped = String::new();
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Same grouping for fractional amounts, rendered with two decimals.
pub fn format_baht_exact(amount: f64) -> String {
    let whole = amount.trunc() as i64;
    let cents = (amount.fract().abs() * 100.0).round() as u32;
    format!("{}.{:02}", format_baht(whole), cents)
}
