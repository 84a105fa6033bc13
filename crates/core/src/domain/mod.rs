pub mod contract;
pub mod recommendation;
pub mod sentiment;
pub mod stock;
