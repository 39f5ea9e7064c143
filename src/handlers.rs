pub mod catalog;
pub mod health;
pub mod orders;
pub mod payments;
pub mod promo_codes;
pub mod registrations;
pub mod scans;
pub mod subscriptions;
pub mod users;
