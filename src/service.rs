// Booking service: the operations the REST surface exposes for hotels, rooms,
// bookings and user profiles, with ownership and role checks applied.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::{self, AuthContext, WebhookOutcome};
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::model::{
    new_id, Booking, BookingStatus, Hotel, PaymentStatus, Room, RoomType, User, UserRole,
};
use crate::payment::{self, PaymentMethod, PaymentReceipt};
use crate::pricing::{self, Stay};
use crate::search::{self, FilterCriteria};
use crate::store::DocumentStore;

// Request bodies. Unknown fields are rejected instead of being written through.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewHotel {
    pub name: String,
    pub address: String,
    pub contact: String,
    pub city: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HotelUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRoom {
    pub hotel: String,
    pub room_type: RoomType,
    pub price_per_night: f64,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomUpdate {
    pub room_type: Option<RoomType>,
    pub price_per_night: Option<f64>,
    pub amenities: Option<BTreeSet<String>>,
    pub images: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBookingRequest {
    pub room: String,
    pub check_in_date: String,
    pub check_out_date: String,
    pub guests: u32,
    #[serde(default)]
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub hotel: Hotel,
    pub total_bookings: usize,
    pub total_revenue: f64,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Default)]
pub struct ServiceStats {
    pub bookings_created: AtomicUsize,
    pub bookings_cancelled: AtomicUsize,
    pub payments_succeeded: AtomicUsize,
    pub payments_failed: AtomicUsize,
    pub searches: AtomicUsize,
    pub rejected_requests: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ServiceStatsReport {
    pub bookings_created: usize,
    pub bookings_cancelled: usize,
    pub payments_succeeded: usize,
    pub payments_failed: usize,
    pub searches: usize,
    pub rejected_requests: usize,
}

#[async_trait]
pub trait HotelBookingApi: Send + Sync + 'static {
    // Users
    async fn current_user(&self, ctx: &AuthContext) -> ServiceResult<User>;
    async fn update_profile(&self, ctx: &AuthContext, update: ProfileUpdate)
        -> ServiceResult<User>;
    async fn add_recent_city(&self, ctx: &AuthContext, city: &str) -> ServiceResult<Vec<String>>;
    async fn handle_webhook(&self, payload: &str) -> ServiceResult<WebhookOutcome>;

    // Hotels
    async fn create_hotel(&self, ctx: &AuthContext, hotel: NewHotel) -> ServiceResult<Hotel>;
    async fn list_hotels(&self, city: Option<&str>) -> Vec<Hotel>;
    async fn get_hotel(&self, id: &str) -> ServiceResult<Hotel>;
    async fn update_hotel(
        &self,
        ctx: &AuthContext,
        id: &str,
        update: HotelUpdate,
    ) -> ServiceResult<Hotel>;
    async fn delete_hotel(&self, ctx: &AuthContext, id: &str) -> ServiceResult<()>;
    async fn owner_hotels(&self, ctx: &AuthContext) -> ServiceResult<Vec<Hotel>>;

    // Rooms
    async fn create_room(&self, ctx: &AuthContext, room: NewRoom) -> ServiceResult<Room>;
    async fn list_rooms(&self, hotel: Option<&str>) -> Vec<Room>;
    async fn get_room(&self, id: &str) -> ServiceResult<Room>;
    async fn update_room(&self, ctx: &AuthContext, id: &str, update: RoomUpdate)
        -> ServiceResult<Room>;
    async fn delete_room(&self, ctx: &AuthContext, id: &str) -> ServiceResult<()>;
    async fn search_rooms(&self, criteria: &FilterCriteria) -> ServiceResult<Vec<Room>>;

    // Bookings
    async fn quote_stay(&self, room_id: &str, check_in: &str, check_out: &str)
        -> ServiceResult<Stay>;
    async fn create_booking(
        &self,
        ctx: &AuthContext,
        request: CreateBookingRequest,
    ) -> ServiceResult<Booking>;
    async fn my_bookings(&self, ctx: &AuthContext) -> ServiceResult<Vec<Booking>>;
    async fn get_booking(&self, ctx: &AuthContext, id: &str) -> ServiceResult<Booking>;
    async fn update_special_requests(
        &self,
        ctx: &AuthContext,
        id: &str,
        special_requests: Option<String>,
    ) -> ServiceResult<Booking>;
    async fn cancel_booking(&self, ctx: &AuthContext, id: &str) -> ServiceResult<Booking>;
    async fn pay_booking(
        &self,
        ctx: &AuthContext,
        id: &str,
        method: PaymentMethod,
    ) -> ServiceResult<PaymentReceipt>;
    async fn hotel_bookings(&self, ctx: &AuthContext, hotel_id: &str)
        -> ServiceResult<Vec<Booking>>;
    async fn owner_dashboard(&self, ctx: &AuthContext, hotel_id: &str)
        -> ServiceResult<DashboardSummary>;

    // Operations
    fn stats(&self) -> ServiceStatsReport;
    async fn update_config(&self, config: ServiceConfig) -> ServiceResult<()>;
}

pub struct HotelBookingService {
    store: Arc<dyn DocumentStore>,
    config: RwLock<ServiceConfig>,
    stats: ServiceStats,
}

impl HotelBookingService {
    pub fn new(store: Arc<dyn DocumentStore>, config: ServiceConfig) -> Self {
        Self {
            store,
            config: RwLock::new(config.sanitized()),
            stats: ServiceStats::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn config(&self) -> ServiceConfig {
        self.config.read().clone()
    }

    fn authenticate(&self, ctx: &AuthContext) -> ServiceResult<User> {
        let config = self.config.read().clone();
        auth::provision_user(self.store.as_ref(), &config, ctx).or_else(|e| self.reject(e))
    }

    fn required(&self, value: &str, field: &str) -> ServiceResult<String> {
        let value = value.trim();
        if value.is_empty() {
            return self.reject(ServiceError::MissingField(field.to_string()));
        }
        Ok(value.to_string())
    }

    fn existing_room(&self, id: &str) -> ServiceResult<Room> {
        match self.store.get_room(id) {
            Some(room) => Ok(room),
            None => self.reject(ServiceError::NotFound("Room".to_string())),
        }
    }

    fn reject<T>(&self, err: ServiceError) -> ServiceResult<T> {
        self.stats.rejected_requests.fetch_add(1, Ordering::SeqCst);
        debug!(error = %err, status = err.status_code(), "request rejected");
        Err(err)
    }

    fn require_owner(&self, user: &User, action: &str) -> ServiceResult<()> {
        if !user.is_hotel_owner() {
            return self.reject(ServiceError::Forbidden(format!(
                "Only hotel owners can {}",
                action
            )));
        }
        Ok(())
    }

    // Loads a hotel and checks that `user` owns it
    fn owned_hotel(&self, user: &User, hotel_id: &str, action: &str) -> ServiceResult<Hotel> {
        let Some(hotel) = self.store.get_hotel(hotel_id) else {
            return self.reject(ServiceError::NotFound("Hotel".to_string()));
        };
        if hotel.owner != user.id {
            return self.reject(ServiceError::Forbidden(format!(
                "You can only {} your own hotels",
                action
            )));
        }
        Ok(hotel)
    }

    fn owned_booking(&self, user: &User, booking_id: &str, action: &str) -> ServiceResult<Booking> {
        let Some(booking) = self.store.get_booking(booking_id) else {
            return self.reject(ServiceError::NotFound("Booking".to_string()));
        };
        if booking.user != user.id {
            return self.reject(ServiceError::Forbidden(format!(
                "You can only {} your own bookings",
                action
            )));
        }
        Ok(booking)
    }

    fn bookings_for_hotel(&self, hotel_id: &str) -> Vec<Booking> {
        let room_ids: HashSet<String> = self
            .store
            .find_rooms(&|room: &Room| room.hotel == hotel_id)
            .into_iter()
            .map(|room| room.id)
            .collect();
        self.store
            .find_bookings(&|booking: &Booking| room_ids.contains(&booking.room))
    }
}

// Lifecycle guards, evaluated again under the store's entry lock before writing
fn check_cancellable(booking: &Booking) -> Result<(), &'static str> {
    if booking.is_cancelled() {
        return Err("Booking is already cancelled");
    }
    Ok(())
}

fn check_payable(booking: &Booking) -> Result<(), &'static str> {
    if booking.is_cancelled() {
        return Err("Cannot pay for a cancelled booking");
    }
    if booking.payment_status != PaymentStatus::Pending {
        return Err("Booking has already been paid");
    }
    Ok(())
}

#[async_trait]
impl HotelBookingApi for HotelBookingService {
    async fn current_user(&self, ctx: &AuthContext) -> ServiceResult<User> {
        self.authenticate(ctx)
    }

    async fn update_profile(
        &self,
        ctx: &AuthContext,
        update: ProfileUpdate,
    ) -> ServiceResult<User> {
        let user = self.authenticate(ctx)?;
        let username = update
            .username
            .as_deref()
            .map(|name| self.required(name, "username"))
            .transpose()?;

        Ok(self.store.update_user(&user.id, &mut |u: &mut User| {
            if let Some(name) = &username {
                u.username = name.clone();
            }
            if let Some(image) = &update.image {
                u.image = image.clone();
            }
        })?)
    }

    async fn add_recent_city(&self, ctx: &AuthContext, city: &str) -> ServiceResult<Vec<String>> {
        let user = self.authenticate(ctx)?;
        let city = self.required(city, "city")?;
        let limit = self.config.read().recent_cities_limit;

        let user = self.store.update_user(&user.id, &mut |u: &mut User| {
            u.record_searched_city(&city, limit)
        })?;
        Ok(user.recent_searched_cities)
    }

    async fn handle_webhook(&self, payload: &str) -> ServiceResult<WebhookOutcome> {
        let config = self.config.read().clone();
        auth::apply_webhook(self.store.as_ref(), &config, payload)
    }

    async fn create_hotel(&self, ctx: &AuthContext, hotel: NewHotel) -> ServiceResult<Hotel> {
        let user = self.authenticate(ctx)?;
        if !user.is_hotel_owner() && !self.config.read().owner_self_registration {
            return self.reject(ServiceError::Forbidden(
                "Only hotel owners can create hotels".to_string(),
            ));
        }

        let hotel = Hotel {
            id: new_id(),
            name: self.required(&hotel.name, "name")?,
            address: self.required(&hotel.address, "address")?,
            contact: self.required(&hotel.contact, "contact")?,
            city: self.required(&hotel.city, "city")?,
            owner: user.id.clone(),
            created_at: Utc::now(),
        };
        self.store.insert_hotel(hotel.clone())?;

        // Registering a first hotel makes the user an owner
        if !user.is_hotel_owner() {
            self.store
                .update_user(&user.id, &mut |u: &mut User| u.role = UserRole::HotelOwner)?;
            info!(user_id = %user.id, "user promoted to hotel owner");
        }

        info!(hotel_id = %hotel.id, owner = %hotel.owner, city = %hotel.city, "hotel created");
        Ok(hotel)
    }

    async fn list_hotels(&self, city: Option<&str>) -> Vec<Hotel> {
        match city.map(str::trim).filter(|c| !c.is_empty()) {
            Some(city) => self.store.find_hotels(&|h: &Hotel| h.city == city),
            None => self.store.find_hotels(&|_: &Hotel| true),
        }
    }

    async fn get_hotel(&self, id: &str) -> ServiceResult<Hotel> {
        self.store
            .get_hotel(id)
            .ok_or_else(|| ServiceError::NotFound("Hotel".to_string()))
    }

    async fn update_hotel(
        &self,
        ctx: &AuthContext,
        id: &str,
        update: HotelUpdate,
    ) -> ServiceResult<Hotel> {
        let user = self.authenticate(ctx)?;
        self.owned_hotel(&user, id, "update")?;

        let check = |value: &Option<String>, field: &str| {
            value.as_deref().map(|v| self.required(v, field)).transpose()
        };
        let name = check(&update.name, "name")?;
        let address = check(&update.address, "address")?;
        let contact = check(&update.contact, "contact")?;
        let city = check(&update.city, "city")?;

        let hotel = self.store.update_hotel(id, &mut |h: &mut Hotel| {
            if let Some(v) = &name {
                h.name = v.clone();
            }
            if let Some(v) = &address {
                h.address = v.clone();
            }
            if let Some(v) = &contact {
                h.contact = v.clone();
            }
            if let Some(v) = &city {
                h.city = v.clone();
            }
        })?;
        info!(hotel_id = %hotel.id, "hotel updated");
        Ok(hotel)
    }

    async fn delete_hotel(&self, ctx: &AuthContext, id: &str) -> ServiceResult<()> {
        let user = self.authenticate(ctx)?;
        self.owned_hotel(&user, id, "delete")?;

        // Rooms belong to their hotel; bookings only reference rooms and stay
        let rooms = self.store.find_rooms(&|room: &Room| room.hotel == id);
        for room in &rooms {
            self.store.delete_room(&room.id);
        }
        self.store.delete_hotel(id);
        info!(hotel_id = id, rooms_removed = rooms.len(), "hotel deleted");
        Ok(())
    }

    async fn owner_hotels(&self, ctx: &AuthContext) -> ServiceResult<Vec<Hotel>> {
        let user = self.authenticate(ctx)?;
        Ok(self.store.find_hotels(&|h: &Hotel| h.owner == user.id))
    }

    async fn create_room(&self, ctx: &AuthContext, room: NewRoom) -> ServiceResult<Room> {
        let user = self.authenticate(ctx)?;
        self.require_owner(&user, "create rooms")?;
        let hotel_id = self.required(&room.hotel, "hotel")?;
        self.owned_hotel(&user, &hotel_id, "add rooms to")?;
        if let Err(e) = pricing::validate_price(room.price_per_night) {
            return self.reject(e.into());
        }

        let max_images = self.config.read().max_images_per_room;
        if room.images.len() > max_images {
            return self.reject(ServiceError::InvalidRequest(format!(
                "a room can have at most {} images",
                max_images
            )));
        }

        let room = Room {
            id: new_id(),
            hotel: hotel_id,
            room_type: room.room_type,
            price_per_night: room.price_per_night,
            amenities: room.amenities,
            images: room.images,
            is_available: room.is_available,
            created_at: Some(Utc::now()),
        };
        self.store.insert_room(room.clone())?;
        info!(room_id = %room.id, hotel_id = %room.hotel, room_type = %room.room_type, "room created");
        Ok(room)
    }

    async fn list_rooms(&self, hotel: Option<&str>) -> Vec<Room> {
        match hotel.map(str::trim).filter(|h| !h.is_empty()) {
            Some(hotel) => self.store.find_rooms(&|r: &Room| r.hotel == hotel),
            None => self.store.find_rooms(&|_: &Room| true),
        }
    }

    async fn get_room(&self, id: &str) -> ServiceResult<Room> {
        self.store
            .get_room(id)
            .ok_or_else(|| ServiceError::NotFound("Room".to_string()))
    }

    async fn update_room(
        &self,
        ctx: &AuthContext,
        id: &str,
        update: RoomUpdate,
    ) -> ServiceResult<Room> {
        let user = self.authenticate(ctx)?;
        self.require_owner(&user, "update rooms")?;
        let room = self.existing_room(id)?;
        self.owned_hotel(&user, &room.hotel, "update rooms of")?;

        if let Some(Err(e)) = update.price_per_night.map(pricing::validate_price) {
            return self.reject(e.into());
        }
        let max_images = self.config.read().max_images_per_room;
        if update.images.as_ref().map_or(false, |imgs| imgs.len() > max_images) {
            return self.reject(ServiceError::InvalidRequest(format!(
                "a room can have at most {} images",
                max_images
            )));
        }

        // Existing bookings keep the price they were created with
        let room = self.store.update_room(id, &mut |r: &mut Room| {
            if let Some(room_type) = update.room_type {
                r.room_type = room_type;
            }
            if let Some(price) = update.price_per_night {
                r.price_per_night = price;
            }
            if let Some(amenities) = &update.amenities {
                r.amenities = amenities.clone();
            }
            if let Some(images) = &update.images {
                r.images = images.clone();
            }
            if let Some(available) = update.is_available {
                r.is_available = available;
            }
        })?;
        info!(room_id = %room.id, "room updated");
        Ok(room)
    }

    async fn delete_room(&self, ctx: &AuthContext, id: &str) -> ServiceResult<()> {
        let user = self.authenticate(ctx)?;
        self.require_owner(&user, "delete rooms")?;
        let room = self.existing_room(id)?;
        self.owned_hotel(&user, &room.hotel, "delete rooms of")?;

        self.store.delete_room(id);
        info!(room_id = id, "room deleted");
        Ok(())
    }

    async fn search_rooms(&self, criteria: &FilterCriteria) -> ServiceResult<Vec<Room>> {
        self.stats.searches.fetch_add(1, Ordering::SeqCst);
        let rooms = self.store.find_rooms(&|_: &Room| true);
        let results = search::search(&rooms, criteria).or_else(|e| self.reject(e.into()))?;
        debug!(candidates = rooms.len(), matched = results.len(), "room search");
        Ok(results)
    }

    async fn quote_stay(
        &self,
        room_id: &str,
        check_in: &str,
        check_out: &str,
    ) -> ServiceResult<Stay> {
        let room = self.existing_room(room_id)?;
        pricing::compute_stay(room.price_per_night, check_in, check_out)
            .or_else(|e| self.reject(e.into()))
    }

    async fn create_booking(
        &self,
        ctx: &AuthContext,
        request: CreateBookingRequest,
    ) -> ServiceResult<Booking> {
        let user = self.authenticate(ctx)?;
        let room_id = self.required(&request.room, "room")?;
        let check_in = self.required(&request.check_in_date, "checkInDate")?;
        let check_out = self.required(&request.check_out_date, "checkOutDate")?;
        if request.guests == 0 {
            return self.reject(ServiceError::MissingField("guests".to_string()));
        }
        let max_guests = self.config.read().max_guests_per_booking;
        if request.guests > max_guests {
            return self.reject(ServiceError::InvalidRequest(format!(
                "at most {} guests per booking",
                max_guests
            )));
        }

        let room = self.existing_room(&room_id)?;
        if !room.is_available {
            return self.reject(ServiceError::InvalidState(
                "Room is not available for booking".to_string(),
            ));
        }

        let stay = match pricing::compute_stay(room.price_per_night, &check_in, &check_out) {
            Ok(stay) => stay,
            Err(e) => return self.reject(e.into()),
        };

        let now = Utc::now();
        let booking = Booking {
            id: new_id(),
            user: user.id.clone(),
            room: room.id.clone(),
            check_in_date: stay.check_in,
            check_out_date: stay.check_out,
            guests: request.guests,
            nights: stay.nights,
            total_price: stay.total_price,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            special_requests: request.special_requests.filter(|s| !s.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_booking(booking.clone())?;
        self.stats.bookings_created.fetch_add(1, Ordering::SeqCst);

        info!(
            booking_id = %booking.id,
            user_id = %booking.user,
            room_id = %booking.room,
            nights = booking.nights,
            total_price = booking.total_price,
            "booking created"
        );
        Ok(booking)
    }

    async fn my_bookings(&self, ctx: &AuthContext) -> ServiceResult<Vec<Booking>> {
        let user = self.authenticate(ctx)?;
        Ok(self.store.find_bookings(&|b: &Booking| b.user == user.id))
    }

    async fn get_booking(&self, ctx: &AuthContext, id: &str) -> ServiceResult<Booking> {
        let user = self.authenticate(ctx)?;
        self.owned_booking(&user, id, "view")
    }

    async fn update_special_requests(
        &self,
        ctx: &AuthContext,
        id: &str,
        special_requests: Option<String>,
    ) -> ServiceResult<Booking> {
        let user = self.authenticate(ctx)?;
        self.owned_booking(&user, id, "update")?;

        let special_requests = special_requests.filter(|s| !s.trim().is_empty());
        Ok(self.store.update_booking(id, &mut |b: &mut Booking| {
            b.special_requests = special_requests.clone();
            b.updated_at = Utc::now();
        })?)
    }

    async fn cancel_booking(&self, ctx: &AuthContext, id: &str) -> ServiceResult<Booking> {
        let user = self.authenticate(ctx)?;
        let booking = self.owned_booking(&user, id, "cancel")?;
        if let Err(reason) = check_cancellable(&booking) {
            return self.reject(ServiceError::InvalidState(reason.to_string()));
        }

        let mut refused = None;
        let booking = self.store.update_booking(id, &mut |b: &mut Booking| {
            if let Err(reason) = check_cancellable(b) {
                refused = Some(reason);
                return;
            }
            b.status = BookingStatus::Cancelled;
            if b.payment_status == PaymentStatus::Paid {
                b.payment_status = PaymentStatus::Refunded;
            }
            b.updated_at = Utc::now();
        })?;
        if let Some(reason) = refused {
            return self.reject(ServiceError::InvalidState(reason.to_string()));
        }
        self.stats.bookings_cancelled.fetch_add(1, Ordering::SeqCst);
        info!(booking_id = %booking.id, payment_status = ?booking.payment_status, "booking cancelled");
        Ok(booking)
    }

    async fn pay_booking(
        &self,
        ctx: &AuthContext,
        id: &str,
        method: PaymentMethod,
    ) -> ServiceResult<PaymentReceipt> {
        let user = self.authenticate(ctx)?;
        let booking = self.owned_booking(&user, id, "pay for")?;
        if let Err(reason) = check_payable(&booking) {
            return self.reject(ServiceError::InvalidState(reason.to_string()));
        }

        let currency = self.config.read().currency.clone();
        let receipt =
            match payment::simulate_payment(&method, booking.total_price, &currency, Utc::now()) {
                Ok(receipt) => receipt,
                Err(e) => {
                    self.stats.payments_failed.fetch_add(1, Ordering::SeqCst);
                    warn!(booking_id = id, error = %e, "payment rejected");
                    return self.reject(e.into());
                }
            };

        // A cancel or a second payment may have landed since the read above
        let mut refused = None;
        self.store.update_booking(id, &mut |b: &mut Booking| {
            if let Err(reason) = check_payable(b) {
                refused = Some(reason);
                return;
            }
            b.payment_status = PaymentStatus::Paid;
            b.status = BookingStatus::Confirmed;
            b.updated_at = receipt.paid_at;
        })?;
        if let Some(reason) = refused {
            warn!(booking_id = id, transaction_id = %receipt.transaction_id, reason, "payment voided");
            return self.reject(ServiceError::InvalidState(reason.to_string()));
        }
        self.stats.payments_succeeded.fetch_add(1, Ordering::SeqCst);
        info!(
            booking_id = id,
            transaction_id = %receipt.transaction_id,
            method = receipt.method,
            amount = receipt.amount,
            "payment accepted"
        );
        Ok(receipt)
    }

    async fn hotel_bookings(
        &self,
        ctx: &AuthContext,
        hotel_id: &str,
    ) -> ServiceResult<Vec<Booking>> {
        let user = self.authenticate(ctx)?;
        self.require_owner(&user, "view hotel bookings")?;
        self.owned_hotel(&user, hotel_id, "view bookings of")?;
        Ok(self.bookings_for_hotel(hotel_id))
    }

    async fn owner_dashboard(
        &self,
        ctx: &AuthContext,
        hotel_id: &str,
    ) -> ServiceResult<DashboardSummary> {
        let user = self.authenticate(ctx)?;
        self.require_owner(&user, "view dashboards")?;
        let hotel = self.owned_hotel(&user, hotel_id, "view the dashboard of")?;

        let bookings = self.bookings_for_hotel(hotel_id);
        let revenue: f64 = bookings
            .iter()
            .filter(|b| b.payment_status == PaymentStatus::Paid)
            .map(|b| b.total_price)
            .sum();

        Ok(DashboardSummary {
            hotel,
            total_bookings: bookings.len(),
            total_revenue: pricing::round_currency(revenue),
            bookings,
        })
    }

    fn stats(&self) -> ServiceStatsReport {
        ServiceStatsReport {
            bookings_created: self.stats.bookings_created.load(Ordering::SeqCst),
            bookings_cancelled: self.stats.bookings_cancelled.load(Ordering::SeqCst),
            payments_succeeded: self.stats.payments_succeeded.load(Ordering::SeqCst),
            payments_failed: self.stats.payments_failed.load(Ordering::SeqCst),
            searches: self.stats.searches.load(Ordering::SeqCst),
            rejected_requests: self.stats.rejected_requests.load(Ordering::SeqCst),
        }
    }

    async fn update_config(&self, config: ServiceConfig) -> ServiceResult<()> {
        if let Err(reason) = config.validate() {
            return self.reject(ServiceError::InvalidRequest(reason));
        }
        info!(?config, "service configuration updated");
        *self.config.write() = config;
        Ok(())
    }
}
