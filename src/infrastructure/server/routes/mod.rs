pub mod analysis;
pub mod chat;
pub mod sessions;
pub mod system;
