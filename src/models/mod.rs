mod auth;
mod contract;
mod dashboard;
mod expense;
mod property;
mod rent;

pub use auth::*;
pub use contract::*;
pub use dashboard::*;
pub use expense::*;
pub use property::*;
pub use rent::*;
