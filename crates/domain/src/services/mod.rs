//! Messaging services.
//!
//! Services hold the business rules and reach storage only through
//! [`MessageStore`], so the same logic runs against Postgres or memory.

pub mod audience;
pub mod fanout;
pub mod memory;
pub mod promotion;
pub mod store;
pub mod visibility;

pub use audience::{resolve_audience, select_accepted_attendees, ResolvedAudience};
pub use fanout::{BroadcastOutcome, BroadcastService};
pub use memory::InMemoryMessageStore;
pub use promotion::DeliveryPromotionService;
pub use store::{MessageFilter, MessageStore, StoreError};
pub use visibility::{MessagePage, MessageVisibilityService, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
