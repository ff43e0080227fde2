pub mod advisory;
pub mod disease;
pub mod health;
pub mod market;
pub mod soil;
pub mod weather;
