use crate::terminal::{
    CursorPos, KeyCode, KeyEvent, KeyModifiers, TerminalEvent, TerminalSize,
};
use crate::ui::RenderFrame;
use crate::ui::span::SpanLine;
use crate::ui::style::Color;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode as CrosstermKeyCode, KeyEvent as CrosstermKeyEvent,
    KeyEventKind, KeyModifiers as CrosstermKeyModifiers,
};
use crossterm::style::{
    Attribute, Color as CrosstermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

/// Alternate-screen crossterm backend.
pub struct Terminal {
    stdout: Stdout,
    size: TerminalSize,
    entered: bool,
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self {
            stdout: io::stdout(),
            size: TerminalSize { width, height },
            entered: false,
        })
    }

    pub fn set_size(&mut self, size: TerminalSize) {
        self.size = size;
    }

    pub fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.stdout, EnterAlternateScreen, Hide)?;
        self.entered = true;
        Ok(())
    }

    pub fn exit(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        self.entered = false;
        terminal::disable_raw_mode()?;
        execute!(self.stdout, LeaveAlternateScreen, Show)?;
        self.stdout.flush()
    }

    pub fn poll_event(&mut self, timeout: Duration) -> io::Result<TerminalEvent> {
        if !event::poll(timeout)? {
            return Ok(TerminalEvent::Tick);
        }
        match event::read()? {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                Ok(TerminalEvent::Key(map_key_event(key)))
            }
            CrosstermEvent::Resize(width, height) => {
                Ok(TerminalEvent::Resize(TerminalSize { width, height }))
            }
            _ => Ok(TerminalEvent::Tick),
        }
    }

    pub fn render_frame(&mut self, frame: &RenderFrame) -> io::Result<()> {
        let height = self.size.height as usize;
        let width = self.size.width as usize;
        if height == 0 || width == 0 {
            return Ok(());
        }

        // Keep the cursor row on screen when the form is taller than the terminal.
        let scroll = match frame.cursor {
            Some(cursor) => (cursor.row as usize).saturating_sub(height.saturating_sub(1)),
            None => 0,
        };

        queue!(self.stdout, MoveTo(0, 0), Clear(ClearType::All))?;
        for (row, line) in frame.lines.iter().skip(scroll).take(height).enumerate() {
            queue!(self.stdout, MoveTo(0, row as u16))?;
            self.write_span_line(line, width)?;
        }

        match frame.cursor {
            Some(CursorPos { col, row }) => {
                let row = (row as usize).saturating_sub(scroll) as u16;
                let col = col.min(self.size.width.saturating_sub(1));
                queue!(self.stdout, MoveTo(col, row), Show)?;
            }
            None => queue!(self.stdout, Hide)?,
        }

        self.stdout.flush()
    }

    fn write_span_line(&mut self, line: &SpanLine, width: usize) -> io::Result<()> {
        let mut used = 0usize;
        for span in line {
            if used >= width {
                break;
            }
            let clipped = clip_to_width(&span.text, width - used);
            if clipped.is_empty() {
                continue;
            }
            if let Some(color) = span.style.color {
                queue!(self.stdout, SetForegroundColor(map_color(color)))?;
            }
            if let Some(background) = span.style.background {
                queue!(self.stdout, SetBackgroundColor(map_color(background)))?;
            }
            if span.style.bold {
                queue!(self.stdout, SetAttribute(Attribute::Bold))?;
            }
            if span.style.dim {
                queue!(self.stdout, SetAttribute(Attribute::Dim))?;
            }
            queue!(
                self.stdout,
                Print(clipped.as_str()),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
            used += unicode_width::UnicodeWidthStr::width(clipped.as_str());
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.entered {
            let _ = self.exit();
        }
    }
}

fn clip_to_width(text: &str, max: usize) -> String {
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

fn map_color(color: Color) -> CrosstermColor {
    match color {
        Color::Black => CrosstermColor::Black,
        Color::DarkGrey => CrosstermColor::DarkGrey,
        Color::Red => CrosstermColor::Red,
        Color::Green => CrosstermColor::Green,
        Color::Cyan => CrosstermColor::DarkCyan,
    }
}

fn map_key_event(key: CrosstermKeyEvent) -> KeyEvent {
    KeyEvent {
        code: map_key_code(key.code),
        modifiers: map_key_modifiers(key.modifiers),
    }
}

fn map_key_code(code: CrosstermKeyCode) -> KeyCode {
    match code {
        CrosstermKeyCode::Char(ch) => KeyCode::Char(ch),
        CrosstermKeyCode::Enter => KeyCode::Enter,
        CrosstermKeyCode::Tab => KeyCode::Tab,
        CrosstermKeyCode::BackTab => KeyCode::BackTab,
        CrosstermKeyCode::Esc => KeyCode::Esc,
        CrosstermKeyCode::Backspace => KeyCode::Backspace,
        CrosstermKeyCode::Delete => KeyCode::Delete,
        CrosstermKeyCode::Home => KeyCode::Home,
        CrosstermKeyCode::End => KeyCode::End,
        CrosstermKeyCode::Left => KeyCode::Left,
        CrosstermKeyCode::Right => KeyCode::Right,
        CrosstermKeyCode::Up => KeyCode::Up,
        CrosstermKeyCode::Down => KeyCode::Down,
        _ => KeyCode::Unknown,
    }
}

fn map_key_modifiers(modifiers: CrosstermKeyModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::NONE;
    if modifiers.contains(CrosstermKeyModifiers::SHIFT) {
        out = out.union(KeyModifiers::SHIFT);
    }
    if modifiers.contains(CrosstermKeyModifiers::CONTROL) {
        out = out.union(KeyModifiers::CONTROL);
    }
    if modifiers.contains(CrosstermKeyModifiers::ALT) {
        out = out.union(KeyModifiers::ALT);
    }
    out
}
