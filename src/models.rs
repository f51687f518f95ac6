pub mod analytics;
pub mod notifications;
pub mod ratings;
pub mod rides;
pub mod server;
pub mod tokens;
pub mod users;
