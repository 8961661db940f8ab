pub mod item;
pub mod recommendation;
