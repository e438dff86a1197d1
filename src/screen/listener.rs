// Screen change listeners
//
// Observers registered on a `Screen` are told which area changed every time
// the driver loop flushes damage.

use super::{Area, Screen};

/// Error type listeners may fail with
///
/// A failing listener aborts the notification and the error is handed back
/// to whoever called `Screen::notify_listeners`.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Observer of screen changes
///
/// Any `FnMut(&Screen, Area) -> Result<(), ListenerError>` closure is a
/// listener as well.
pub trait ScreenChangeListener {
    /// Called with the screen and the area changed since the last notification
    ///
    /// `area` may be empty when nothing was reported in between.
    fn screen_changed(&mut self, screen: &Screen, area: Area) -> Result<(), ListenerError>;
}

impl<F> ScreenChangeListener for F
where
    F: FnMut(&Screen, Area) -> Result<(), ListenerError>,
{
    fn screen_changed(&mut self, screen: &Screen, area: Area) -> Result<(), ListenerError> {
        self(screen, area)
    }
}
