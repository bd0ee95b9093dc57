pub mod reviews;
pub mod users;
