pub mod short_code;

pub use short_code::{SHORT_LINK_LENGTH, generate_short_link};
