//! Domain models

pub mod book;
pub mod import;
pub mod loan;
pub mod member;
pub mod policy;
pub mod report;
