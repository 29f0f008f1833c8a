//! Domain services for the Change Analysis API.
//!
//! Each service translates one resource domain into HTTP calls on a shared
//! [`ApiClient`](crate::api_client::ApiClient). Services are obtained from a
//! [`ServiceFactory`] scope rather than constructed directly.

mod change_requests;
mod collection;
mod factory;
mod feedbacks;
mod projects;
mod systems;

pub use change_requests::*;
pub use collection::require_id;
pub use factory::*;
pub use feedbacks::*;
pub use projects::*;
pub use systems::*;
