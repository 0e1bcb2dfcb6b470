pub mod extract;
pub mod info;
pub mod merge;
pub mod rotate;
pub mod select;
pub mod text;
