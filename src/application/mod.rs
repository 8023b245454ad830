pub mod agent;
pub mod conversation;
pub mod playbook;
pub mod tooling;
pub mod tools;
