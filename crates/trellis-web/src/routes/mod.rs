mod health;
mod screens;

pub use health::health_routes;
pub use screens::screen_routes;
