pub mod middleware;
pub mod password;
pub mod session;
pub mod users;

pub use middleware::AuthUser;
pub use session::SessionStore;
pub use users::{Profile, UserDirectory, UserRecord};
