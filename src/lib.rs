pub mod config;
pub mod logger;
pub mod server;
mod comments;
mod page_cache;
mod pages;
mod store;
mod test_data;
mod view;
