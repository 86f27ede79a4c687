pub mod dashboard;
pub mod records;
pub mod scan;
pub mod stats;
