mod observe;
mod rate_limit;

pub use observe::observe_requests;
pub use rate_limit::{RATE_LIMITED, RouteLimit, client_identifier, rate_limit, too_many_requests};
