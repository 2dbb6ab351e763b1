//! Test doubles for the two external seams: the completion provider and the
//! database gateway. Both are cheap to clone and share their recorded state, so a
//! test can hand one copy to the code under test and inspect the other.

pub mod in_memory_gateway;
pub mod scripted_provider;

pub use in_memory_gateway::InMemoryGateway;
pub use scripted_provider::ScriptedProvider;
