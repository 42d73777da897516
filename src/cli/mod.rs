pub mod clear;
pub mod export;
pub mod history;
pub mod price;
pub mod setup;
pub mod summary;
pub mod trade;
pub mod ui;
