pub mod conversation;
pub mod member;
pub mod message;
pub mod notification;
pub mod profile;
