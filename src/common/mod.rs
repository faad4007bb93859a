pub mod retry;
pub mod sanitize;
