pub mod message;

pub use message::{Folder, Message};
