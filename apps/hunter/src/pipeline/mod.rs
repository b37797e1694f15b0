pub mod dispatch;
pub mod filter;
pub mod hunter;
pub mod normalizer;
pub mod ranking;
pub mod rules;
