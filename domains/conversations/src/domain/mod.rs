//! Domain layer: entities, conversation service, reply orchestration

pub mod entities;
pub mod orchestrator;
pub mod service;
