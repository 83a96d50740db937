mod mailer;
mod mailing_list_store;
mod notification_service;

pub use mailer::build_mailer;
pub use mailing_list_store::MailingListStore;
pub use notification_service::NotificationService;
