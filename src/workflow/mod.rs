pub mod selection_flow;

pub use selection_flow::{Selection, SelectionFlow};
