// Library for tests to access modules

pub mod config;
pub mod downsample;
pub mod error;
pub mod lag_repo;
pub mod maintenance_worker;
pub mod models;
pub mod routes;
pub mod source;
pub mod time;
pub mod uptime;
pub mod validation;
