pub mod api;
pub mod error;
pub mod filter;
pub mod format;
pub mod logging;
pub mod sequence;
pub mod theme;

#[cfg(test)]
pub mod testing;
