pub mod events;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod settings;

pub use routes::create_router;
