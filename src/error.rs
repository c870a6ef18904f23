use crate::graph::{NodeId, PortName};
use std::fmt::{self, Display, Formatter};
use strum_macros::{Display as StrumDisplay, IntoStaticStr};
use thiserror::Error;

/// Identity of the node a fault was raised by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub node: NodeId,
    pub kind: &'static str,
    pub label: String,
    /// Host side id the node was created with.
    pub external_id: Option<String>,
    /// Name of the innermost named circuit the node was defined in.
    pub circuit: Option<String>,
}

impl Display for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}` ({})", self.kind, self.label, self.node)?;
        if let Some(circuit) = &self.circuit {
            write!(f, " in circuit `{}`", circuit)?;
        }
        Ok(())
    }
}

/// Stable code for every [SimError], sent to hosts along with faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, IntoStaticStr)]
pub enum ErrorCode {
    #[strum(serialize = "inputNotConnected")]
    InputNotConnected,
    #[strum(serialize = "bitWidthMismatch")]
    BitWidthMismatch,
    #[strum(serialize = "simulationTimeout")]
    SimulationTimeout,
    #[strum(serialize = "invalidPortConnection")]
    InvalidPortConnection,
    #[strum(serialize = "duplicatePortLabel")]
    DuplicatePortLabel,
    #[strum(serialize = "notAnInput")]
    NotAnInput,
}

fn circuit_name(circuit: &Option<String>) -> String {
    match circuit {
        Some(name) => format!("circuit `{}`", name),
        None => "circuit".to_owned(),
    }
}

/// Errors raised while building or simulating a circuit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("{component}: input `{port}` is not connected")]
    InputNotConnected { component: Component, port: PortName },

    #[error("{component}: input `{port}` expects {expected} bits but is fed {actual}")]
    BitWidthMismatch {
        component: Component,
        port: PortName,
        expected: u8,
        actual: u8,
    },

    #[error("{} did not stabilize within {iterations} iterations", circuit_name(.circuit))]
    SimulationTimeout {
        circuit: Option<String>,
        iterations: usize,
    },

    #[error("cannot connect {endpoint}: {reason}")]
    InvalidPortConnection { endpoint: String, reason: String },

    #[error("more than one {role} is labelled `{label}`")]
    DuplicatePortLabel { role: &'static str, label: String },

    #[error("{component} is not an input")]
    NotAnInput { component: Component },
}

impl SimError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SimError::InputNotConnected { .. } => ErrorCode::InputNotConnected,
            SimError::BitWidthMismatch { .. } => ErrorCode::BitWidthMismatch,
            SimError::SimulationTimeout { .. } => ErrorCode::SimulationTimeout,
            SimError::InvalidPortConnection { .. } => ErrorCode::InvalidPortConnection,
            SimError::DuplicatePortLabel { .. } => ErrorCode::DuplicatePortLabel,
            SimError::NotAnInput { .. } => ErrorCode::NotAnInput,
        }
    }

    /// The node that raised the fault, if a node did.
    pub fn component(&self) -> Option<&Component> {
        match self {
            SimError::InputNotConnected { component, .. }
            | SimError::BitWidthMismatch { component, .. }
            | SimError::NotAnInput { component } => Some(component),
            _ => None,
        }
    }

    /// The port the fault is about, if any.
    pub fn port(&self) -> Option<&PortName> {
        match self {
            SimError::InputNotConnected { port, .. } | SimError::BitWidthMismatch { port, .. } => {
                Some(port)
            }
            _ => None,
        }
    }

    /// Name of the circuit the fault happened in, if known.
    pub fn circuit(&self) -> Option<&str> {
        match self {
            SimError::SimulationTimeout { circuit, .. } => circuit.as_deref(),
            other => other.component().and_then(|c| c.circuit.as_deref()),
        }
    }

    /// Attaches `name` as the circuit the fault happened in, unless one is already set.
    pub fn with_circuit(mut self, name: &str) -> Self {
        let circuit = match &mut self {
            SimError::InputNotConnected { component, .. }
            | SimError::BitWidthMismatch { component, .. }
            | SimError::NotAnInput { component } => &mut component.circuit,
            SimError::SimulationTimeout { circuit, .. } => circuit,
            _ => return self,
        };
        if circuit.is_none() {
            *circuit = Some(name.to_owned());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::ArenaIndex;

    fn component() -> Component {
        Component {
            node: NodeId::from_slot(3),
            kind: "And",
            label: "carry".into(),
            external_id: Some("and-gate_1".into()),
            circuit: None,
        }
    }

    #[test]
    fn test_with_circuit_keeps_innermost_name() {
        let err = SimError::InputNotConnected {
            component: component(),
            port: "1".into(),
        };
        assert_eq!(err.circuit(), None);

        let err = err.with_circuit("add_1bit").with_circuit("add_4bit");
        assert_eq!(err.circuit(), Some("add_1bit"));
        assert_eq!(
            err.to_string(),
            "And `carry` (n3) in circuit `add_1bit`: input `1` is not connected"
        );
    }

    #[test]
    fn test_codes() {
        let err = SimError::SimulationTimeout {
            circuit: None,
            iterations: 100,
        };
        assert_eq!(err.code().to_string(), "simulationTimeout");
        assert_eq!(err.to_string(), "circuit did not stabilize within 100 iterations");
        assert_eq!(
            err.with_circuit("ring").to_string(),
            "circuit `ring` did not stabilize within 100 iterations"
        );

        let err = SimError::DuplicatePortLabel {
            role: "input",
            label: "a".into(),
        };
        assert_eq!(err.code(), ErrorCode::DuplicatePortLabel);
        assert!(err.component().is_none());
    }
}
