// Domain model: the URI template engine and the route table built on it

pub mod location;
pub mod routes;
pub mod template;

pub use location::Location;
pub use routes::{Dispatch, Route, RouteTable};
