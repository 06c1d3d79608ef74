//! Request validation and content negotiation stages.
//!
//! The three validation checks and the `Accept` negotiation are independent
//! functions, but the pipeline runs them in a fixed order (body existence,
//! body parse, Content-Type, Accept) because later checks assume earlier
//! ones passed.

pub mod accept;
pub mod body;
pub mod content_type;

pub use accept::negotiate_content_type;
pub use body::{parse_body, validate_body_existence};
pub use content_type::{JSON_API_MEDIA_TYPE, JSON_MEDIA_TYPE, validate_content_type};
