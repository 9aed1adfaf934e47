mod no_payload;

pub use no_payload::*;
