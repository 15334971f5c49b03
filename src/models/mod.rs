pub mod feedback;
pub mod profile;
pub mod trip;
pub mod user;

pub use feedback::{EvalKind, EvalRecord, RelevanceRecord};
pub use profile::PreferenceProfile;
pub use trip::{BatchOutcome, EdgeKind, NewTrip, Trip, TripEdge, TripSummary};
pub use user::{NewUser, PopulatedUser, User, UserStyle, UserWithRelations};
