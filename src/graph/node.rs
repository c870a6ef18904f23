use super::handles::*;
use super::kinds::{NodeKind, Role};
use super::port::*;
use crate::bits::Value;
use crate::error::Component;
use std::sync::Arc;

/// A node of a [Circuit](super::Circuit): a kind plus the ports the kind declared.
#[derive(Debug, Clone)]
pub struct Node {
    pub(super) kind: NodeKind,
    pub(super) label: String,
    pub(super) external_id: Option<String>,
    /// The instance the node was cloned into, [None] for nodes added directly.
    pub(super) owner: Option<InstanceId>,
    /// Name of the template the node was defined in.
    pub(super) scope: Option<Arc<str>>,
    pub(super) inputs: InputPorts,
    pub(super) outputs: OutputPorts,
}

impl Node {
    pub(super) fn new(kind: NodeKind, label: String) -> Self {
        let (inputs, outputs) = kind.behavior().layout().into_ports();
        Self {
            kind,
            label,
            external_id: None,
            owner: None,
            scope: None,
            inputs,
            outputs,
        }
    }

    /// Copies the node into `instance`: same kind and state, fresh ports, label suffixed with the instance.
    ///
    /// `owner` differs from `instance` for nodes of nested instances.
    pub(super) fn clone_into(
        &self,
        owner: InstanceId,
        instance: InstanceId,
        scope: Option<Arc<str>>,
    ) -> Self {
        let label = if self.label.is_empty() {
            String::new()
        } else {
            format!("{}_{}", self.label, instance)
        };
        let mut node = Self::new(self.kind.clone(), label);
        node.owner = Some(owner);
        node.scope = self.scope.clone().or(scope);
        node
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    pub fn owner(&self) -> Option<InstanceId> {
        self.owner
    }

    pub fn role(&self) -> Role {
        self.kind.role()
    }

    pub fn bits(&self) -> u8 {
        self.kind.bits()
    }

    /// The node's observable state, see [Circuit::value](super::Circuit::value).
    pub fn value(&self) -> Option<Value> {
        self.kind.behavior().value()
    }

    pub fn inputs(&self) -> &InputPorts {
        &self.inputs
    }

    pub fn outputs(&self) -> &OutputPorts {
        &self.outputs
    }

    /// Identity reported with faults, scoped to the template the node came from.
    pub(super) fn component(&self, id: NodeId) -> Component {
        Component {
            node: id,
            kind: self.kind.name(),
            label: self.label.clone(),
            external_id: self.external_id.clone(),
            circuit: self.scope.as_deref().map(String::from),
        }
    }
}
