mod app;
mod chat;
mod dom;
mod render;
pub mod session;
mod ws;

pub use app::run;
