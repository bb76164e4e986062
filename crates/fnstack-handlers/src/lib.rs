//! Request logic shared by the fnstack Lambda binaries
//!
//! Nothing here depends on the Lambda runtime: handlers take already
//! decoded bodies and header values and return [`HttpResponseData`], which
//! the runtime adapter turns into the event-specific response type.

pub mod error;
pub mod fixed;
pub mod interaction;
pub mod response;
pub mod verify;

pub use error::{InteractionError, KeyError, VerifyError};
pub use fixed::fixed_success;
pub use interaction::{handle_interaction, InteractionRequest, InteractionType};
pub use response::HttpResponseData;
pub use verify::{SignatureVerifier, PUBLIC_KEY_ENV, SIGNATURE_HEADER, TIMESTAMP_HEADER};
