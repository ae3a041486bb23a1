//! Per-user records: profiles, daily product usage and recommendations.
//!
//! Users are owned by the identity system; records here reference them by
//! [`UserId`](sampleshop_core::UserId) only.

pub mod profile;
pub mod recommendation;
pub mod usage;

pub use profile::{Gender, Profile, ProfileId};
pub use recommendation::{ConsumptionSchedule, Recommendation, RecommendationId};
pub use usage::{UserProductUsage, UserProductUsageId};
