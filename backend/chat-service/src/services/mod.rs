pub mod conversation_service;
pub mod invite_service;
pub mod member_service;
pub mod message_service;
pub mod notification_service;
pub mod share_service;
