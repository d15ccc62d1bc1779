#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    DarkGrey,
    Red,
    Green,
    Cyan,
}

/// Span attributes. `None` colors leave the terminal default in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub color: Option<Color>,
    pub background: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    /// Course title, focus marker and the spinner.
    pub fn accent() -> Self {
        Self::new().color(Color::Cyan)
    }

    /// Placeholders and key hints.
    pub fn hint() -> Self {
        Self::new().color(Color::DarkGrey)
    }

    pub fn notice() -> Self {
        Self::new().color(Color::Red).bold()
    }

    pub fn success() -> Self {
        Self::new().color(Color::Green)
    }

    pub fn focused_button() -> Self {
        Self::new().color(Color::Black).background(Color::Cyan).bold()
    }
}
