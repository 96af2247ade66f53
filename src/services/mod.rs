pub mod deck;
pub mod session;
pub mod users;
pub mod words;
