// Library for tests to access modules

pub mod assembler;
pub mod config;
pub mod counter_source;
pub mod models;
pub mod rate;
pub mod recorder;
pub mod registry;
pub mod retry;
pub mod routes;
pub mod session;
pub mod sysinfo_repo;
pub mod version;
pub mod viewer;
pub mod worker;
