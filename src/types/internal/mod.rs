pub mod audit;
pub mod auth;
pub mod context;
pub mod roles;
pub mod session;

pub use context::{RequestContext, RequestId, RequestSource};
pub use roles::{DisplayRole, StoredRole, UnknownRole};
pub use session::{AppUser, AuthMode, SessionDenial, SessionState};
