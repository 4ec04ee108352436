pub mod link;

pub use link::{Click, CreateLinkRequest, Link, LinkView, NewClick, NewLink};
