pub mod kermesse_service;
pub mod ledger_service;
pub mod payment_gateway;
pub mod policy;
pub mod user_service;
