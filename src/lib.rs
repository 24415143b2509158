// Library for tests to access modules

pub mod config;
pub mod models;
pub mod prefs_repo;
pub mod routes;
pub mod service;
pub mod support;
pub mod view_model;
