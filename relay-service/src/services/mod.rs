pub mod gemini;
pub mod places;
pub mod upstream;

pub use gemini::GeminiClient;
pub use places::PlacesClient;
pub use upstream::{Upstream, UpstreamClient, UpstreamError, UpstreamResponse};
