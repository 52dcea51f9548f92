use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A bookable room. The catalog is fixed at process start; rooms are never
/// created or destroyed at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub name: String,
    /// Nightly rate in whole baht.
    pub price: i64,
    /// Refundable deposit in whole baht, zero for rooms without one.
    pub deposit: i64,
    pub max_adults: u8,
    pub max_children: u8,
    pub description: String,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
}

impl Room {
    pub fn capacity(&self) -> u32 {
        u32::from(self.max_adults) + u32::from(self.max_children)
    }
}

/// Stay search input owned by the display shell. Missing dates are legal and
/// default to a one-night stay at quote time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub adults: u8,
    pub children: u8,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            check_in: None,
            check_out: None,
            adults: 2,
            children: 0,
        }
    }
}

impl SearchParams {
    pub fn total_guests(&self) -> u32 {
        u32::from(self.adults) + u32::from(self.children)
    }
}

/// Cost breakdown for one stay. Derived on demand, never cached; every
/// booking confirmation recomputes it and draws a fresh bill code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayQuote {
    pub nights: u32,
    pub room_rate: i64,
    pub subtotal: i64,
    pub tax: f64,
    pub deposit: i64,
    pub total: f64,
    pub bill_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Booking,
    CheckIn,
    CheckOut,
    Breakfast,
    Facilities,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub at: DateTime<Utc>,
    pub role: MessageRole,
    pub text: String,
}

/// One chat session's append-only message log. Lives only as long as the
/// session store keeps it; `expires_at` is refreshed on every exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub session_id: Option<String>,
    pub text: String,
    /// The room the user is currently viewing, if any.
    pub room_id: Option<u32>,
    #[serde(default)]
    pub search: SearchParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    pub reply_text: String,
    pub intent: Intent,
    pub quote: Option<StayQuote>,
}

/// Fixed front-desk policy strings consumed by the responder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelPolicies {
    pub check_in_time: String,
    pub check_out_time: String,
    pub breakfast: String,
    pub parking: String,
    pub cancellation: String,
    pub wifi: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelInfo {
    pub policies: HotelPolicies,
    pub facilities: Vec<String>,
    pub location: String,
}

impl Default for HotelInfo {
    fn default() -> Self {
        Self {
            policies: HotelPolicies {
                check_in_time: "14:00 น.".to_string(),
                check_out_time: "12:00 น.".to_string(),
                breakfast: "รวมอาหารเช้าฟรีสำหรับทุกห้อง".to_string(),
                parking: "มีที่จอดรถฟรี".to_string(),
                cancellation: "ยกเลิกฟรี 48 ชั่วโมงก่อนเช็คอิน".to_string(),
                wifi: "ฟรี WiFi ความเร็วสูงทั่วบริเวณ".to_string(),
            },
            facilities: vec![
                "ฟิตเนส".to_string(),
                "สระว่ายน้ำ".to_string(),
                "ห้องอาหาร".to_string(),
                "บาร์".to_string(),
                "สปา".to_string(),
            ],
            location: "ใจกลางเมือง ใกล้แหล่งท่องเที่ยวสำคัญ".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown room id {0}")]
    UnknownRoom(u32),
}
