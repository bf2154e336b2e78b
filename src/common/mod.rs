mod response;

pub use response::{Envelope, ErrorEnvelope};
