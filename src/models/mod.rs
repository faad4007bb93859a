pub mod notification;
pub mod payment;
pub mod webhook;
