pub mod industry_insight;

pub use industry_insight::*;
