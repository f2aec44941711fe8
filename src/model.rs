// Document shapes for hotels, rooms, users and bookings
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub type HotelId = String;
pub type RoomId = String;
pub type UserId = String;
pub type BookingId = String;

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: HotelId,
    pub name: String,
    pub address: String,
    pub contact: String,
    pub city: String,
    pub owner: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum RoomType {
    #[serde(rename = "Single Bed")]
    SingleBed,
    #[serde(rename = "Double Bed")]
    DoubleBed,
    #[serde(rename = "Luxury Room", alias = "Luxary Room")]
    LuxuryRoom,
    #[serde(rename = "Family Suite")]
    FamilySuite,
}

impl RoomType {
    pub const ALL: [RoomType; 4] = [
        RoomType::SingleBed,
        RoomType::DoubleBed,
        RoomType::LuxuryRoom,
        RoomType::FamilySuite,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RoomType::SingleBed => "Single Bed",
            RoomType::DoubleBed => "Double Bed",
            RoomType::LuxuryRoom => "Luxury Room",
            RoomType::FamilySuite => "Family Suite",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoomType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Single Bed" => Ok(RoomType::SingleBed),
            "Double Bed" => Ok(RoomType::DoubleBed),
            "Luxury Room" | "Luxary Room" => Ok(RoomType::LuxuryRoom),
            "Family Suite" => Ok(RoomType::FamilySuite),
            other => Err(ValidationError::InvalidFilter(format!(
                "unknown room type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub hotel: HotelId,
    pub room_type: RoomType,
    pub price_per_night: f64,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_available: bool,
    // Records coming back from older documents may lack a timestamp
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

// Unparseable timestamps are treated as missing rather than failing the whole record
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    // Any JSON shape is accepted here; only RFC 3339 strings yield a timestamp
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum UserRole {
    #[default]
    #[serde(rename = "user")]
    User,
    #[serde(rename = "hotelOwner")]
    HotelOwner,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub image: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub recent_searched_cities: Vec<String>,
}

impl User {
    pub fn is_hotel_owner(&self) -> bool {
        self.role == UserRole::HotelOwner
    }

    /// Moves `city` to the front of the recent list, dropping duplicates and
    /// anything past `limit`.
    pub fn record_searched_city(&mut self, city: &str, limit: usize) {
        self.recent_searched_cities.retain(|c| c != city);
        self.recent_searched_cities.insert(0, city.to_string());
        self.recent_searched_cities.truncate(limit);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub user: UserId,
    pub room: RoomId,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub guests: u32,
    pub nights: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}
