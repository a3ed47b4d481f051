// Allow dead code for public API functions that may not be used internally
// but are part of the library's exposed interface
#![allow(dead_code)]

pub mod browser_pool;
pub mod cli;
pub mod config;
pub mod email_fetch;
pub mod export;
pub mod extract;
pub mod interrupt;
pub mod logger;
pub mod map_page;
pub mod name_filter;
pub mod proximity;
pub mod records;
pub mod site_matcher;

pub use records::{BusinessRecord, HarvestReport};
pub use site_matcher::WebsiteEmailPair;
