pub mod boundary;
pub mod entity;
pub mod token;

pub use boundary::SentenceBoundary;
pub use entity::{EntityItem, UNRESOLVED};
pub use token::Token;
