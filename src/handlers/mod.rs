pub mod connection_handler;
