//! Delivery of newly unlocked achievements to the presentation layer.

use std::sync::{Arc, PoisonError, RwLock};

use steading_core::achievement::AchievementDefinition;
use tokio::sync::mpsc;

/// Receives each batch of newly unlocked achievements.
pub trait NotificationSink: Send + Sync {
  fn notify(&self, unlocked: &[&'static AchievementDefinition]);
}

impl<F> NotificationSink for F
where
  F: Fn(&[&'static AchievementDefinition]) + Send + Sync,
{
  fn notify(&self, unlocked: &[&'static AchievementDefinition]) { self(unlocked) }
}

// ─── Default presentation ────────────────────────────────────────────────────

/// A transient notification for one achievement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub icon:  &'static str,
  pub title: &'static str,
  pub body:  &'static str,
}

impl From<&AchievementDefinition> for Toast {
  fn from(def: &AchievementDefinition) -> Self {
    Self { icon: def.icon, title: def.name, body: def.description }
  }
}

/// Emits one toast per achievement on the `steading::toast` log target.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSink;

impl DefaultSink {
  /// One toast per achievement, in batch order.
  pub fn toasts(unlocked: &[&'static AchievementDefinition]) -> Vec<Toast> {
    unlocked.iter().map(|def| Toast::from(*def)).collect()
  }
}

impl NotificationSink for DefaultSink {
  fn notify(&self, unlocked: &[&'static AchievementDefinition]) {
    for toast in Self::toasts(unlocked) {
      tracing::info!(
        target: "steading::toast",
        icon  = toast.icon,
        title = toast.title,
        body  = toast.body,
        "achievement unlocked"
      );
    }
  }
}

// ─── Channel sink ────────────────────────────────────────────────────────────

/// Forwards each batch into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
  tx: mpsc::UnboundedSender<Vec<&'static AchievementDefinition>>,
}

impl ChannelSink {
  pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<&'static AchievementDefinition>>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }
}

impl NotificationSink for ChannelSink {
  fn notify(&self, unlocked: &[&'static AchievementDefinition]) {
    if self.tx.send(unlocked.to_vec()).is_err() {
      tracing::warn!(
        component = "notifier",
        count = unlocked.len(),
        "notification receiver dropped; unlocks not delivered"
      );
    }
  }
}

// ─── Notifier ────────────────────────────────────────────────────────────────

type SinkSlot = Arc<RwLock<Option<Arc<dyn NotificationSink>>>>;

/// Holds at most one registered sink. With none registered, batches go to
/// [`DefaultSink`].
///
/// Cloning shares the slot, so a sink set through any clone is seen by the
/// engine that owns the original.
#[derive(Clone, Default)]
pub struct Notifier {
  slot: SinkSlot,
}

impl Notifier {
  pub fn new() -> Self { Self::default() }

  pub fn with_sink(sink: Arc<dyn NotificationSink>) -> Self {
    let notifier = Self::new();
    notifier.set(Some(sink));
    notifier
  }

  /// Replace the registered sink; `None` restores the default presentation.
  pub fn set(&self, sink: Option<Arc<dyn NotificationSink>>) {
    *self.slot.write().unwrap_or_else(PoisonError::into_inner) = sink;
  }

  pub fn has_sink(&self) -> bool {
    self.slot.read().unwrap_or_else(PoisonError::into_inner).is_some()
  }

  /// Hand a batch to the registered sink. Empty batches are dropped.
  pub fn deliver(&self, unlocked: &[&'static AchievementDefinition]) {
    if unlocked.is_empty() {
      return;
    }
    // Release the lock before calling out so a sink may re-register itself.
    let sink = self.slot.read().unwrap_or_else(PoisonError::into_inner).clone();
    match sink {
      Some(sink) => sink.notify(unlocked),
      None => DefaultSink.notify(unlocked),
    }
  }
}

impl std::fmt::Debug for Notifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Notifier")
      .field("has_sink", &self.has_sink())
      .finish()
  }
}
