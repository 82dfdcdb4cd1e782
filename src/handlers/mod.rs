// handlers/mod.rs - HTTP surface
//
// users.rs  → /api/users, its nested child routers and the flat events route
// events.rs → GET /api/users/:userId/events
// system.rs → GET / and GET /health

pub mod events;
pub mod system;
pub mod users;
