//! Service layer: the job dispatcher, the rate-limited source over the game API
//! endpoints, and the batch logic that job actions run on top of them.

pub mod batch;
pub mod dispatcher;
pub mod jobs;
pub mod source;
pub mod upstream;
