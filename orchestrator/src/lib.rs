//! Query pipeline crate: planning (C6), evidence collection (C7), Cypher
//! generation (C8), synthesis (C9), and the top-level request orchestrator
//! (C11) that composes them. The query result cache (C10) and the Cypher
//! validator (C1) live in `orchestrator-core`, which this crate depends on
//! for every shared type, trait, and error.

pub mod citations;
pub mod collector;
pub mod cypher_gen;
pub mod graph_assembly;
pub mod pipeline;
pub mod planner;
pub mod synthesis;

pub use collector::DataCollector;
pub use cypher_gen::{CypherGenerator, CypherTarget};
pub use pipeline::Orchestrator;
pub use planner::Planner;
pub use synthesis::Synthesizer;
