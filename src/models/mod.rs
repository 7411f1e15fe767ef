pub mod change;
pub mod contact;
pub mod live;
pub mod redis;
pub mod restaurant;
pub mod review;
pub mod review_like;

pub use change::{ChangeEvent, ChangeKind};
pub use contact::ContactSubmission;
pub use live::{LikeClientMessage, LikeServerMessage};
pub use restaurant::{Restaurant, RestaurantCard};
pub use review::Review;
pub use review_like::{Endorser, NewReviewLike, ReviewLike};
