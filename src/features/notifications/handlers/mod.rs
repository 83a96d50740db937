pub mod mailing_list_handler;

pub use mailing_list_handler::*;
