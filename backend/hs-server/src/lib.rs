pub mod embedded;
pub mod health;
pub mod routes;


pub use crate::embedded::{AxumEmbeddedServer, AxumServerFactory};
pub use crate::routes::{ServerInfo, build_router};
