use crate::store::Writable;
use crate::theme::Theme;

use std::sync::Arc;
use vigil_context::{Context, ContextError};

/// The application's current theme. Starts as [`Theme::Dark`].
pub type ThemeStore = Writable<Theme>;

impl Writable<Theme> {
  /// The theme store of `ctx`, installing a default (`Dark`) store on first
  /// use. The store then lives as long as the context.
  pub fn from_context(ctx: &Context) -> Result<Arc<ThemeStore>, ContextError> {
    ctx.get_or_provide(ThemeStore::default)
  }

  /// Switches between light and dark, returning the new theme.
  pub fn toggle(&self) -> Theme {
    let mut theme = Theme::default();
    self.update(|current| {
      theme = current.toggled();
      theme
    });
    tracing::debug!(%theme, "theme toggled");
    theme
  }
}
