use std::fmt;

/// The engine's lifecycle. Transitions are serialized through a single
/// lock; re-entering `start`/`stop` from an incompatible state logs a
/// warning and is a no-op rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Initializing,
    Running,
    Stopping,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Stopped => "stopped",
            EngineState::Initializing => "initializing",
            EngineState::Running => "running",
            EngineState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}
