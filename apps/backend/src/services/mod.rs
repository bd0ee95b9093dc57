pub mod algorithm;
pub mod review;
