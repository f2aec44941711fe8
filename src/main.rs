// Walks one guest through search, booking and payment against an in-memory store

use anyhow::{Context, Result};
use futures::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hotel_booking::service::{CreateBookingRequest, NewHotel, NewRoom};
use hotel_booking::{
    AuthContext, CardDetails, DocumentStore, HotelBookingApi, HotelBookingService, InMemoryStore,
    PaymentMethod, RoomType, SearchQuery, ServiceConfig, SessionClaims,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hotel_booking=info")),
        )
        .init();

    let service = Arc::new(HotelBookingService::new(
        Arc::new(InMemoryStore::new()),
        ServiceConfig::from_env(),
    ));

    let owner = AuthContext::new("user_owner_01").with_claims(SessionClaims {
        email: Some("owner@seaside.example".to_string()),
        ..Default::default()
    });
    let hotel = service
        .create_hotel(
            &owner,
            NewHotel {
                name: "Seaside Inn".to_string(),
                address: "1 Beach Road".to_string(),
                contact: "+1 555 0100".to_string(),
                city: "Lisbon".to_string(),
            },
        )
        .await
        .context("registering hotel")?;

    let rooms = [
        (RoomType::SingleBed, 79.0),
        (RoomType::DoubleBed, 129.0),
        (RoomType::LuxuryRoom, 349.0),
        (RoomType::FamilySuite, 219.0),
    ];
    let created = join_all(rooms.iter().map(|(room_type, price)| {
        service.create_room(
            &owner,
            NewRoom {
                hotel: hotel.id.clone(),
                room_type: *room_type,
                price_per_night: *price,
                amenities: BTreeSet::from(["Free WiFi".to_string(), "Pool Access".to_string()]),
                images: vec![],
                is_available: true,
            },
        )
    }))
    .await;
    for room in created {
        room.context("adding room")?;
    }

    let guest = AuthContext::new("user_guest_42");
    service.add_recent_city(&guest, "Lisbon").await?;

    let query: SearchQuery = serde_json::from_str(
        r#"{"priceRanges": ["100 to 200", "200 to 300"], "sortBy": "Price Low to High"}"#,
    )?;
    let matches = service.search_rooms(&query.into_criteria()?).await?;
    for room in &matches {
        info!(room_type = %room.room_type, price = room.price_per_night, "search result");
    }
    let room = matches.first().context("no room matched the search")?;

    let booking = service
        .create_booking(
            &guest,
            CreateBookingRequest {
                room: room.id.clone(),
                check_in_date: "2025-07-01".to_string(),
                check_out_date: "2025-07-04".to_string(),
                guests: 2,
                special_requests: Some("Late check-in".to_string()),
            },
        )
        .await?;

    let receipt = service
        .pay_booking(
            &guest,
            &booking.id,
            PaymentMethod::DebitCard(CardDetails {
                card_number: "4111 1111 1111 1111".to_string(),
                expiry_date: "12/30".to_string(),
                cvv: "123".to_string(),
                cardholder_name: "Guest Example".to_string(),
            }),
        )
        .await?;
    info!(receipt = %serde_json::to_string(&receipt)?, "paid");

    let dashboard = service.owner_dashboard(&owner, &hotel.id).await?;
    info!(
        total_bookings = dashboard.total_bookings,
        total_revenue = dashboard.total_revenue,
        "owner dashboard"
    );
    info!(stats = ?service.stats(), store = ?service.store().stats(), "done");
    Ok(())
}
