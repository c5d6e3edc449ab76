pub mod admin;
pub mod booking;
pub mod contact;
pub mod eligibility;
pub mod identity;
pub mod repository;

pub(crate) mod http;
