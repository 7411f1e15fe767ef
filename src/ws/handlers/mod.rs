pub mod likes;

pub use likes::review_likes_ws_handler;
