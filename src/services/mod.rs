// Session store services
// Services are stateless engines: literal encoding and parsing, privacy filtering, identity minting, settings.

pub mod identity_pool;
pub mod literal_encoder;
pub mod literal_parser;
pub mod privacy_filter;
pub mod settings_engine;
