pub mod blur;
pub mod filter;
