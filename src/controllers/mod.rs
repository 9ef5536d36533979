pub mod audiobook;
pub mod health;
