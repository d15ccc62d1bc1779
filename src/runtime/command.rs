use crate::terminal::KeyEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    /// Esc: close the notice or banner, or leave when neither is open.
    Cancel,
    NextFocus,
    PrevFocus,
    InputKey(KeyEvent),
    Tick,
}
