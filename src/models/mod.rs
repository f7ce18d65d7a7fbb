pub mod card;
pub mod due;
pub mod review_outcome;
pub mod review_session;
pub mod sm2;
pub mod stats;

pub use card::{Card, ScheduleState};
pub use review_outcome::ReviewOutcome;
pub use review_session::{CardView, PendingReview, ReviewSession, SessionState, Transition};
pub use sm2::{Quality, ScheduleUpdate};
pub use stats::{DailyBucket, ReviewStats};
