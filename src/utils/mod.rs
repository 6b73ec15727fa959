pub mod async_helper;
pub mod error_handling;
pub mod http;
pub mod oauth;
pub mod token_store;
