//! Operation traits
//!
//! Operations are structs whose fields ARE the parameters. Each one declares
//! its verb/noun metadata with the [`operation!`] macro and implements
//! [`Execute`] against a context.

use async_trait::async_trait;
use serde_json::Value;

/// Execute an operation against a context
#[async_trait]
pub trait Execute<C, E>: Send + Sync
where
    C: Send + Sync,
{
    async fn execute(&self, ctx: &C) -> Result<Value, E>;
}

/// Static metadata describing an operation
pub trait Operation {
    /// The action, e.g. "move"
    fn verb(&self) -> &'static str;

    /// The target, e.g. "task"
    fn noun(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Canonical op string ("move task")
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Implement [`Operation`] for a command struct
macro_rules! operation {
    ($ty:ident, verb = $verb:literal, noun = $noun:literal, description = $desc:literal) => {
        impl $crate::operation::Operation for $ty {
            fn verb(&self) -> &'static str {
                $verb
            }

            fn noun(&self) -> &'static str {
                $noun
            }

            fn description(&self) -> &'static str {
                $desc
            }
        }
    };
}

pub(crate) use operation;
