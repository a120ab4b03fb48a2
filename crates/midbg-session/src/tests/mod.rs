//! Unit and behavioural tests for the session engine.

mod behaviour;
mod support;
