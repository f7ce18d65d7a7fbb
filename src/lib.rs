pub mod config;
pub mod database;
pub mod error;
pub mod models;

pub use config::EngineConfig;
pub use database::{MemoryStore, ReviewStore, StoreError};
pub use error::{Result, ReviewError};
pub use models::{
    Card, CardView, DailyBucket, PendingReview, Quality, ReviewOutcome, ReviewSession,
    ReviewStats, ScheduleState, ScheduleUpdate, SessionState, Transition,
};
