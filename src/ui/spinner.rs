use crate::ui::span::Span;
use crate::ui::style::Style;

const BRAILLE: &[char] = &['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

/// Busy indicator shown on the submit control while a registration is in flight.
#[derive(Debug, Clone, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % BRAILLE.len();
    }

    pub fn reset(&mut self) {
        self.frame = 0;
    }

    pub fn glyph(&self) -> char {
        BRAILLE[self.frame % BRAILLE.len()]
    }

    pub fn span(&self) -> Span {
        Span::styled(self.glyph().to_string(), Style::accent())
    }
}
