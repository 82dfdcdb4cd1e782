pub mod extract;
pub mod response;
pub mod wrapper;

pub use extract::{PathParams, RequestBody};
pub use response::{ApiResult, Envelope};
pub use wrapper::{envelope_bare_errors, fallback, panic_response};
