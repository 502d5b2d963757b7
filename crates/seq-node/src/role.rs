//! # Node Roles
//!
//! A node is either the Primary or a Replica for its whole lifetime. The
//! role selects exactly one pipeline strategy:
//!
//! | Role | Strategy | Pipeline |
//! |------|----------|----------|
//! | Primary | [`Publisher`] | finalize callback → `Transport::broadcast` |
//! | Replica | [`Subscriber`] | `Transport::subscribe` → queue → `Engine::apply` |

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::pipeline::{ingestion, publisher, Attachment, PipelineContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Sequences blocks and gossips them.
    Primary,
    /// Receives gossiped blocks and applies them.
    #[default]
    Replica,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Replica => "replica",
        }
    }

    pub fn strategy(&self) -> Box<dyn RoleStrategy> {
        match self {
            Role::Primary => Box::new(Publisher),
            Role::Replica => Box::new(Subscriber),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown role '{0}': expected 'primary' or 'replica'")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(Role::Primary),
            "replica" => Ok(Role::Replica),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// Wires the role's pipeline between engine and transport.
pub trait RoleStrategy: Send + Sync {
    fn role(&self) -> Role;

    /// Attach the pipeline. Must be called inside a Tokio runtime.
    fn attach(&self, ctx: &PipelineContext) -> Attachment;
}

/// Primary strategy: publishes every finalized block.
#[derive(Debug, Clone, Copy, Default)]
pub struct Publisher;

impl RoleStrategy for Publisher {
    fn role(&self) -> Role {
        Role::Primary
    }

    fn attach(&self, ctx: &PipelineContext) -> Attachment {
        publisher::attach(ctx)
    }
}

/// Replica strategy: ingests gossiped blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Subscriber;

impl RoleStrategy for Subscriber {
    fn role(&self) -> Role {
        Role::Replica
    }

    fn attach(&self, ctx: &PipelineContext) -> Attachment {
        ingestion::attach(ctx)
    }
}
