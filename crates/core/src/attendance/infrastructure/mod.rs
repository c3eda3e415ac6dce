pub mod http_catalog;
pub mod http_checkin_client;
