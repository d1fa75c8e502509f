pub mod covers;
pub mod handlers;
pub mod routes;

pub use routes::create_router;
