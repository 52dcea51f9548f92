use crate::models::Intent;

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Ordered intent matchers, first match wins. Booking is checked before the
/// inquiry categories, so mixed input always resolves to booking.
pub const INTENT_MATCHERS: &[(Intent, &[&str])] = &[
    (
        Intent::Booking,
        &["ยืนยัน", "จอง", "สรุป", "book", "confirm", "summary"],
    ),
    (Intent::CheckIn, &["เช็คอิน", "check in", "check-in"]),
    (
        Intent::CheckOut,
        &["เช็คเอาท์", "check out", "check-out", "checkout"],
    ),
    (Intent::Breakfast, &["อาหารเช้า", "กิน", "breakfast"]),
    (
        Intent::Facilities,
        &[
            "มีอะไรบ้าง",
            "สระว่ายน้ำ",
            "ฟิตเนส",
            "facility",
            "facilities",
            "pool",
            "fitness",
        ],
    ),
];

pub fn classify_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();

    INTENT_MATCHERS
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Unknown)
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
