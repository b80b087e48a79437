//! ESG oracle: polls public climate, economic and regulatory data sources,
//! scores them into Environmental, Social and Governance composites, and
//! derives a fee from those scores.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod history;
pub mod oracle;
pub mod output;
pub mod providers;
pub mod publish;
pub mod scheduler;
pub mod scoring;
pub mod server;
