pub mod cli;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod model;
pub mod parser;
pub mod shell;
pub mod testutil;
pub mod world;

pub use engine::Engine;
pub use error::{Error, Result};
pub use model::Model;
pub use world::{LocalWorld, World};
