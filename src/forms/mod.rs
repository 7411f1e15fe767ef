pub mod contact;
pub mod partnership;
pub mod reply;

pub use contact::{ContactRequest, ValidContact, is_email_shaped};
pub use partnership::{PLANS, Plan, activation_message, find_plan};
pub use reply::{ContactReply, DEFAULT_REPLY_SUBJECT};
