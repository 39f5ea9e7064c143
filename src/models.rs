pub mod catalog;
pub mod orders;
pub mod payments;
pub mod promo;
pub mod scans;
pub mod subscriptions;
pub mod training;
pub mod users;
