use crate::config::PageConfig;
use crate::core::registration::RegistrationForm;
use crate::core::{FieldId, FocusTarget};
use crate::terminal::CursorPos;
use crate::ui::span::{Span, SpanLine};
use crate::ui::spinner::Spinner;
use crate::ui::style::Style;

const FIELD_PREFIX_FOCUSED: &str = "› ";
const FIELD_PREFIX: &str = "  ";
const SUBMIT_LABEL: &str = "Register Your Interest";
const SUBMITTING_LABEL: &str = "Registering...";
const HINT: &str = "Tab/Shift+Tab move · Enter next/submit · Esc dismiss/exit · Ctrl+C quit";

#[derive(Debug, Default, Clone)]
pub struct RenderFrame {
    pub lines: Vec<SpanLine>,
    pub cursor: Option<CursorPos>,
}

impl RenderFrame {
    fn push(&mut self, line: SpanLine) {
        self.lines.push(line);
    }

    fn blank(&mut self) {
        self.lines.push(Vec::new());
    }

    fn row(&self) -> u16 {
        self.lines.len().min(u16::MAX as usize) as u16
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        form: &RegistrationForm,
        page: &PageConfig,
        spinner: &Spinner,
    ) -> RenderFrame {
        let mut frame = RenderFrame::default();

        frame.push(vec![Span::styled(
            page.title.clone(),
            Style::accent().bold(),
        )]);
        frame.push(vec![Span::styled(page.subtitle.clone(), Style::new().dim())]);
        frame.blank();

        if !page.benefits.is_empty() {
            frame.push(vec![Span::styled("What You'll Learn:", Style::new().bold())]);
            for benefit in &page.benefits {
                frame.push(vec![
                    Span::styled("  ✓ ", Style::success()),
                    Span::new(benefit.clone()),
                ]);
            }
            frame.blank();
        }

        for field in FieldId::ALL {
            self.render_field(&mut frame, form, field);
        }

        frame.push(self.submit_line(form, spinner));

        if let Some(notice) = form.notice() {
            frame.blank();
            frame.push(vec![
                Span::styled(format!("! {notice}"), Style::notice()),
                Span::styled("  (press any key)", Style::hint()),
            ]);
            frame.cursor = None;
        }

        if form.success_visible() {
            let banner = Style::success();
            frame.blank();
            frame.push(vec![Span::styled("Thank you for registering!", banner.bold())]);
            frame.push(vec![Span::styled(
                "We'll contact you soon with course details.",
                banner,
            )]);
        }

        frame.blank();
        frame.push(vec![Span::styled(
            format!("🔒 {}", page.security_note),
            Style::new().dim(),
        )]);
        frame.push(vec![Span::styled(HINT, Style::hint())]);

        frame
    }

    fn render_field(&self, frame: &mut RenderFrame, form: &RegistrationForm, field: FieldId) {
        let focused = form.focus() == Some(FocusTarget::Field(field));
        let label_style = if focused {
            Style::new().bold()
        } else {
            Style::new()
        };
        frame.push(vec![Span::styled(field.label(), label_style)]);

        let value = form.fields().get(field);
        let prefix = if focused {
            Span::styled(FIELD_PREFIX_FOCUSED, Style::accent())
        } else {
            Span::new(FIELD_PREFIX)
        };
        let content = if value.is_empty() {
            Span::styled(field.placeholder(), Style::hint())
        } else {
            Span::new(value)
        };

        if focused && form.notice().is_none() {
            let offset = form.input(field).cursor_offset(value);
            frame.cursor = Some(CursorPos {
                col: (prefix.width() + offset).min(u16::MAX as usize) as u16,
                row: frame.row(),
            });
        }
        frame.push(vec![prefix, content]);
        frame.blank();
    }

    fn submit_line(&self, form: &RegistrationForm, spinner: &Spinner) -> SpanLine {
        let focused = form.focus() == Some(FocusTarget::Submit);
        let prefix = if focused {
            Span::styled(FIELD_PREFIX_FOCUSED, Style::accent())
        } else {
            Span::new(FIELD_PREFIX)
        };

        if form.is_submitting() {
            return vec![
                prefix,
                Span::new("[ "),
                spinner.span(),
                Span::styled(format!(" {SUBMITTING_LABEL} ]"), Style::new().dim()),
            ];
        }

        let style = if !form.can_submit() {
            Style::new().dim()
        } else if focused {
            Style::focused_button()
        } else {
            Style::accent().bold()
        };
        vec![prefix, Span::styled(format!("[ {SUBMIT_LABEL} ]"), style)]
    }
}

#[cfg(test)]
mod tests {
    use super::Renderer;
    use crate::analytics::Tracker;
    use crate::config::PageConfig;
    use crate::core::FieldId;
    use crate::core::registration::{FormSettings, RegistrationForm};
    use crate::task::ManualOperation;
    use crate::ui::span::line_text;
    use crate::ui::spinner::Spinner;
    use std::time::Instant;

    fn render_text(form: &RegistrationForm) -> Vec<String> {
        Renderer::new()
            .render(form, &PageConfig::default(), &Spinner::new())
            .lines
            .iter()
            .map(line_text)
            .collect()
    }

    fn mounted(op: &ManualOperation) -> RegistrationForm {
        let mut form =
            RegistrationForm::new(FormSettings::default(), Tracker::disabled(), op.clone());
        form.mount();
        form
    }

    #[test]
    fn empty_form_shows_placeholders_and_cursor_on_name() {
        let op = ManualOperation::new();
        let form = mounted(&op);
        let frame = Renderer::new().render(&form, &PageConfig::default(), &Spinner::new());
        let text: Vec<String> = frame.lines.iter().map(line_text).collect();

        assert!(text.iter().any(|l| l == "› John Doe"));
        assert!(text.iter().any(|l| l == "  john@example.com"));
        assert!(text.iter().any(|l| l.contains("Register Your Interest")));
        assert!(!text.iter().any(|l| l.contains("Thank you for registering!")));

        let cursor = frame.cursor.expect("cursor on focused field");
        assert_eq!(text[cursor.row as usize], "› John Doe");
        assert_eq!(cursor.col, 2);
    }

    #[test]
    fn submitting_shows_busy_label() {
        let op = ManualOperation::new();
        let mut form = mounted(&op);
        form.set_field(FieldId::Name, "Jane Doe");
        form.set_field(FieldId::Email, "jane@x.com");
        form.set_field(FieldId::Phone, "555-1111");
        form.submit();

        let text = render_text(&form);
        assert!(text.iter().any(|l| l.contains("Registering...")));
        assert!(!text.iter().any(|l| l.contains("Register Your Interest")));
    }

    #[test]
    fn success_banner_and_notice_are_rendered() {
        let op = ManualOperation::new();
        let mut form = mounted(&op);
        form.submit();
        assert!(render_text(&form).iter().any(|l| l.contains("Please fill in all fields")));
        form.dismiss();

        form.set_field(FieldId::Name, "Jane Doe");
        form.set_field(FieldId::Email, "jane@x.com");
        form.set_field(FieldId::Phone, "555-1111");
        form.submit();
        op.resolve_next();
        form.poll(Instant::now());

        let text = render_text(&form);
        assert!(text.iter().any(|l| l == "Thank you for registering!"));
        assert!(text.iter().any(|l| l == "› John Doe"), "fields are back to placeholders");
    }
}
