pub mod billing;
pub mod catalog;
pub mod intent;
pub mod models;
pub mod responder;

pub use billing::{build_stay_quote, calculate_nights, generate_bill_code, TAX_RATE};
pub use catalog::{filter_rooms, find_room, room_catalog};
pub use intent::{classify_intent, normalize_text};
pub use models::*;
pub use responder::{compose_reply, viewing_room_nudge, GREETING};
