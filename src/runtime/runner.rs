use crate::config::PageConfig;
use crate::core::registration::RegistrationForm;
use crate::runtime::command::Command;
use crate::runtime::key_bindings::KeyBindings;
use crate::terminal::{Terminal, TerminalEvent};
use crate::ui::Renderer;
use crate::ui::spinner::Spinner;
use std::io;
use std::time::{Duration, Instant};

const IDLE_POLL: Duration = Duration::from_millis(120);
const SPINNER_POLL: Duration = Duration::from_millis(80);

/// Everything the event loop mutates, minus the terminal itself.
pub struct Session {
    form: RegistrationForm,
    key_bindings: KeyBindings,
    spinner: Spinner,
    should_exit: bool,
}

impl Session {
    pub fn new(form: RegistrationForm) -> Self {
        Self::with_key_bindings(form, KeyBindings::new())
    }

    pub fn with_key_bindings(form: RegistrationForm, key_bindings: KeyBindings) -> Self {
        Self {
            form,
            key_bindings,
            spinner: Spinner::new(),
            should_exit: false,
        }
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn start(&mut self) {
        self.form.mount();
    }

    pub fn stop(&mut self) {
        self.form.unmount();
    }

    pub fn poll_timeout(&self, now: Instant) -> Duration {
        let default = if self.form.is_submitting() {
            SPINNER_POLL
        } else {
            IDLE_POLL
        };
        self.form.poll_timeout(now, default)
    }

    /// Returns whether a redraw is needed.
    pub fn handle_event(&mut self, event: TerminalEvent, now: Instant) -> bool {
        match event {
            TerminalEvent::Key(key) => {
                let command = self.key_bindings.resolve(key);
                // The notice blocks the form until acknowledged.
                if self.form.notice().is_some() && command != Command::Exit {
                    return self.form.dismiss();
                }
                self.process_command(command, now)
            }
            TerminalEvent::Resize(_) => true,
            TerminalEvent::Tick => self.process_command(Command::Tick, now),
        }
    }

    pub fn process_command(&mut self, command: Command, now: Instant) -> bool {
        match command {
            Command::Exit => {
                self.should_exit = true;
                false
            }
            Command::Cancel => {
                if self.form.dismiss() {
                    return true;
                }
                self.should_exit = true;
                false
            }
            Command::NextFocus => {
                self.form.focus_next();
                true
            }
            Command::PrevFocus => {
                self.form.focus_prev();
                true
            }
            Command::InputKey(key) => self.form.handle_key(key),
            Command::Tick => {
                let changed = self.form.poll(now);
                if self.form.is_submitting() {
                    self.spinner.tick();
                    true
                } else {
                    self.spinner.reset();
                    changed
                }
            }
        }
    }
}

pub struct Runtime {
    session: Session,
    page: PageConfig,
    terminal: Terminal,
    renderer: Renderer,
}

impl Runtime {
    pub fn new(session: Session, page: PageConfig, terminal: Terminal) -> Self {
        Self {
            session,
            page,
            terminal,
            renderer: Renderer::new(),
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.terminal.enter()?;
        self.session.start();

        let run_result = (|| -> io::Result<()> {
            self.render()?;

            while !self.session.should_exit() {
                let timeout = self.session.poll_timeout(Instant::now());
                let event = self.terminal.poll_event(timeout)?;
                if let TerminalEvent::Resize(size) = event {
                    self.terminal.set_size(size);
                }
                let mut dirty = self.session.handle_event(event, Instant::now());
                // Typing must not starve the submission and banner timers.
                if !matches!(event, TerminalEvent::Tick) {
                    dirty |= self.session.handle_event(TerminalEvent::Tick, Instant::now());
                }
                if dirty && !self.session.should_exit() {
                    self.render()?;
                }
            }

            Ok(())
        })();

        self.session.stop();
        let exit_result = self.terminal.exit();
        run_result.and(exit_result)
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self
            .renderer
            .render(self.session.form(), &self.page, self.session.spinner());
        self.terminal.render_frame(&frame)
    }
}
