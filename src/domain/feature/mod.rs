//! Feature domain - Payload values, defaults, and model-ready row assembly

mod template;
mod value;

pub use template::FeatureTemplate;
pub use value::{parse_payload, FeaturePayload, FeatureRow, FeatureValue};
