pub mod address_book;
pub mod config;
pub mod runner;
pub mod report;
