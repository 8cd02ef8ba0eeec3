#![allow(dead_code)]

pub mod mock_collaborators;

pub use mock_collaborators::*;
