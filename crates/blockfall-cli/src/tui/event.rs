use crossterm::event::Event as CrosstermEvent;

/// Events produced by the host loop.
#[derive(Debug, Clone, derive_more::IsVariant, derive_more::From)]
pub(super) enum HostEvent {
    /// The gravity interval elapsed.
    Gravity,
    /// State changed since the last draw.
    Render,
    /// Terminal events such as key input and resize.
    Terminal(CrosstermEvent),
}
