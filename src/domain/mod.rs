pub mod article;
pub mod audiobook;
pub mod speech;
