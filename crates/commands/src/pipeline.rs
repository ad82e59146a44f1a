//! Command chains.
//!
//! A [`Pipeline`] is either a bare [`Command`] or a decorator wrapping exactly
//! one inner pipeline. Chains are owned trees with fan-out one, so walking
//! inward always reaches the command.

use crate::command::{Command, Outcome};
use async_trait::async_trait;
use chatline_core::error::Result;

/// A cross-cutting behavior around one inner node.
///
/// Implementations either forward to [`Decorator::inner`], fail before
/// forwarding, or inspect and react to the inner result.
#[async_trait]
pub trait Decorator: Send + Sync {
    /// Short name used in logs (e.g., "logger").
    fn name(&self) -> &'static str;

    fn inner(&self) -> &Pipeline;

    async fn execute(&self) -> Result<Outcome>;
}

pub enum Pipeline {
    Command(Command),
    Decorated(Box<dyn Decorator>),
}

impl Pipeline {
    /// The innermost command, however deep the chain.
    #[doc(alias = "unwrap")]
    pub fn innermost(&self) -> &Command {
        match self {
            Self::Command(command) => command,
            Self::Decorated(decorator) => decorator.inner().innermost(),
        }
    }

    /// Number of decorators around the command.
    pub fn depth(&self) -> usize {
        match self {
            Self::Command(_) => 0,
            Self::Decorated(decorator) => 1 + decorator.inner().depth(),
        }
    }

    /// Decorator names, outermost first.
    pub fn layers(&self) -> Vec<&'static str> {
        let mut layers = Vec::new();
        let mut node = self;
        while let Self::Decorated(decorator) = node {
            layers.push(decorator.name());
            node = decorator.inner();
        }
        layers
    }

    /// Wrap this pipeline in another decorator.
    ///
    /// ```ignore
    /// let pipeline = Pipeline::from(Command::prompt(chat.clone(), "hi"))
    ///     .wrap(|p| QuotaGuard::new(p, chat, quota))
    ///     .wrap(|p| Logger::new(p));
    /// ```
    pub fn wrap<D, F>(self, decorate: F) -> Self
    where
        D: Decorator + 'static,
        F: FnOnce(Pipeline) -> D,
    {
        Self::Decorated(Box::new(decorate(self)))
    }

    pub async fn execute(&self) -> Result<Outcome> {
        match self {
            Self::Command(command) => command.execute().await,
            Self::Decorated(decorator) => decorator.execute().await,
        }
    }
}

impl From<Command> for Pipeline {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("layers", &self.layers())
            .field("command", self.innermost())
            .finish()
    }
}
