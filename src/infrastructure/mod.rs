pub mod config;
pub mod db;
pub mod http;
pub mod queue;
pub mod repositories;
pub mod storage;
pub mod workers;
