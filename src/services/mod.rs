pub mod engagement;
pub mod export;
pub mod feedback;
pub mod profile;
pub mod recommender;
pub mod sampling;
pub mod social_graph;
pub mod test_users;

pub use export::FeedbackLog;
pub use recommender::{HttpRecommender, Recommender};
