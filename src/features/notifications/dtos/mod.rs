mod mailing_list_dto;

pub use mailing_list_dto::*;
