pub mod gateway;
pub mod signature;
pub mod split;
