pub mod contact;
pub mod health;
pub mod like;
pub mod restaurant;

pub use contact::{
    contact_reply_handler, list_plans_handler, plan_contact_handler, submit_contact_handler,
};
pub use health::{alive_handler, new_identity_handler};
pub use like::{get_likes_handler, like_review_handler};
pub use restaurant::{explore_handler, restaurant_detail_handler};
