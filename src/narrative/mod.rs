//! Local narrative helpers: feature labels, value formatting and the templated
//! fallback explanation.

mod humanize;
mod template;

pub use humanize::{format_value, humanize_feature};
pub use template::render_fallback;
