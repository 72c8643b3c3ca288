pub mod api;
pub mod app;
pub mod bowlers;
pub mod config;
pub mod csv_parser;
pub mod dates;
pub mod fetch_error;
pub mod fetcher;
pub mod league_config;
pub mod roster;
pub mod sample_data;
pub mod scheduler;
pub mod services;
