// Hotel booking core: room search, stay pricing and the booking service

pub mod auth;
pub mod config;
pub mod error;
pub mod model;
pub mod payment;
pub mod pricing;
pub mod search;
pub mod service;
pub mod store;

// Re-export key types for convenience
pub use auth::{AuthContext, SessionClaims, WebhookOutcome};
pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult, ValidationError};
pub use model::{Booking, BookingStatus, Hotel, PaymentStatus, Room, RoomType, User, UserRole};
pub use payment::{CardDetails, PaymentError, PaymentMethod, PaymentReceipt};
pub use pricing::{compute_stay, Stay};
pub use search::{search, FilterCriteria, PriceBand, SearchQuery, SortOption};
pub use service::{HotelBookingApi, HotelBookingService, ServiceStats, ServiceStatsReport};
pub use store::{DocumentStore, InMemoryStore, StoreError, StoreStatsReport};
