pub mod config;
pub mod credentials;
pub mod error;
pub mod form;
pub mod history;
pub mod logging;
pub mod output;
pub mod prompt;
pub mod report;
pub mod scoring;
pub mod sink;
pub mod submit;
