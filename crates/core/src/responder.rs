use chrono::NaiveDate;

use crate::billing::{format_baht, format_baht_exact};
use crate::models::{HotelInfo, Intent, Room, SearchParams, StayQuote};

/// Opening assistant message for every fresh chat session.
pub const GREETING: &str = "สวัสดีครับ! ผมเป็นผู้ช่วยส่วนตัวของคุณ มีอะไรให้ผมช่วยไหมครับ? (เช่น สอบถามราคา, เวลาเช็คอิน, หรือพิมพ์ 'ยืนยัน' เพื่อจองห้องที่ดูอยู่)";

pub const SELECT_ROOM_PROMPT: &str = "กรุณาเลือกห้องพักที่ต้องการก่อนทำการยืนยันการจองครับ";

pub const FALLBACK_REPLY: &str = "ผมยังไม่เข้าใจคำสั่งนั้นครับ ลองพิมพ์ 'ยืนยัน' เพื่อจองห้องที่เลือก หรือถามเกี่ยวกับเวลาเช็คอิน/สิ่งอำนวยความสะดวกได้ครับ";

/// Nudge appended when a session opens while the user is viewing a room.
pub fn viewing_room_nudge(room: &Room) -> String {
    format!(
        "คุณกำลังดูห้อง \"{}\" สนใจพิมพ์ \"ยืนยัน\" เพื่อรับใบเสนอราคาไหมครับ?",
        room.name
    )
}

/// Map a classified intent plus context to a single reply string. Pure: the
/// booking branch renders a quote computed by the caller and never draws one
/// itself, so a booking attempt without a selected room cannot bill.
pub fn compose_reply(
    intent: Intent,
    room: Option<&Room>,
    params: &SearchParams,
    info: &HotelInfo,
    quote: Option<&StayQuote>,
) -> String {
    match intent {
        Intent::Booking => match (room, quote) {
            (Some(room), Some(quote)) => booking_summary(room, params, quote),
            _ => SELECT_ROOM_PROMPT.to_string(),
        },
        Intent::CheckIn => format!(
            "เวลาเช็คอินเริ่ม {} หากต้องการเช็คอินก่อน กรุณาแจ้งล่วงหน้าครับ",
            info.policies.check_in_time
        ),
        Intent::CheckOut => format!(
            "เวลาเช็คเอาท์คือ {} หากต้องการขยายเวลาโปรดติดต่อเจ้าหน้าที่ครับ",
            info.policies.check_out_time
        ),
        Intent::Breakfast => info.policies.breakfast.clone(),
        Intent::Facilities => format!(
            "สิ่งอำนวยความสะดวกของเรามี: {} ครับ",
            info.facilities.join(", ")
        ),
        Intent::Unknown => FALLBACK_REPLY.to_string(),
    }
}

fn booking_summary(room: &Room, params: &SearchParams, quote: &StayQuote) -> String {
    let mut lines = Vec::new();
    lines.push("📌 **สรุปรายการการจอง**".to_string());
    lines.push(format!("ห้อง: {}", room.name));
    lines.push(format!(
        "วันที่: {} ถึง {}",
        display_date(params.check_in),
        display_date(params.check_out)
    ));
    lines.push(format!(
        "จำนวนผู้เข้าพัก: ผู้ใหญ่ {} คน, เด็ก {} คน (รวม {} คน)",
        params.adults,
        params.children,
        params.total_guests()
    ));
    lines.push(format!("จำนวนคืนที่พัก: {} คืน", quote.nights));
    lines.push(format!("ราคาต่อคืน: {} บาท", format_baht(quote.room_rate)));
    lines.push(format!(
        "ราคารวมห้องพัก: {} บาท",
        format_baht(quote.subtotal)
    ));
    if quote.deposit > 0 {
        lines.push(format!("ค่ามัดจำ: {} บาท", format_baht(quote.deposit)));
    }
    lines.push(format!("ภาษี (7%): {} บาท", format_baht_exact(quote.tax)));
    lines.push("------------------------------".to_string());
    lines.push(format!(
        "💰 **รวมทั้งสิ้นที่ต้องชำระ: {} บาท**",
        format_baht_exact(quote.total)
    ));
    lines.push(format!("🧾 รหัสบิล: {}", quote.bill_code));
    lines.push(String::new());
    lines.push(
        "กรุณานำรหัสบิลไปชำระที่เคาน์เตอร์ภายในเวลาที่กำหนด เจ้าหน้าที่จะออกใบเสร็จให้หลังชำระเรียบร้อยครับ 😊"
            .to_string(),
    );

    lines.join("\n")
}

fn display_date(date: Option<NaiveDate>) -> String {
    date.map(|value| value.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "ไม่ระบุ".to_string())
}
