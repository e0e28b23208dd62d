pub mod chars;
pub mod direction;
