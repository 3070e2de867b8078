// Business domains
pub mod insights;
