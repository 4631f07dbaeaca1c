pub mod config;
pub mod flatten;
pub mod http_client;
pub mod match_ids;
pub mod pipeline;
pub mod riot_api;
pub mod schema;
pub mod table;
pub mod xlsx_export;
