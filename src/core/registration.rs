//! The registration form: field state, focus, and the submit flow.
//!
//! Lifecycle is `mount` → any number of `handle_key`/`set_field`/`submit`/`poll`
//! calls → `unmount`. Time only enters through the `now` passed to `poll`, so a
//! caller (the terminal runtime, or a test) decides when timers fire.

use crate::analytics::Tracker;
use crate::core::form::FormFields;
use crate::core::scheduler::{Scheduler, SchedulerCommand};
use crate::core::{FieldId, FocusTarget};
use crate::error::SubmitError;
use crate::input::{KeyResult, TextInput};
use crate::task::{PendingSubmission, RegistrationRequest, SubmitOperation};
use crate::terminal::{KeyCode, KeyEvent};
use chrono::{SecondsFormat, Utc};
use std::time::{Duration, Instant};

pub const MISSING_FIELDS_NOTICE: &str = "Please fill in all fields";
pub const DEFAULT_COURSE_ID: &str = "negotiation_mastery";
pub const DEFAULT_FORM_LOCATION: &str = "main_registration_page";
pub const DEFAULT_PAGE_TITLE: &str = "Negotiation Course Registration";
pub const DEFAULT_PAGE_TYPE: &str = "registration_form";
pub const DEFAULT_SUCCESS_DISPLAY: Duration = Duration::from_secs(5);

const SUCCESS_TIMER_KEY: &str = "success_banner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSettings {
    pub course_id: String,
    pub form_location: String,
    pub page_title: String,
    pub page_type: String,
    pub success_display: Duration,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            course_id: DEFAULT_COURSE_ID.to_string(),
            form_location: DEFAULT_FORM_LOCATION.to_string(),
            page_title: DEFAULT_PAGE_TITLE.to_string(),
            page_type: DEFAULT_PAGE_TYPE.to_string(),
            success_display: DEFAULT_SUCCESS_DISPLAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    /// Transient. Reverts to `Idle` once the display window elapses.
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAttempt {
    Started,
    /// A required field is empty; the missing-fields notice is shown.
    Rejected,
    /// A submission is already in flight.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormTimer {
    HideSuccess,
}

struct InFlight {
    pending: PendingSubmission,
    email: String,
}

pub struct RegistrationForm {
    settings: FormSettings,
    fields: FormFields,
    inputs: [TextInput; 3],
    state: SubmissionState,
    focus: Option<FocusTarget>,
    notice: Option<String>,
    tracker: Tracker,
    operation: Box<dyn SubmitOperation>,
    in_flight: Option<InFlight>,
    scheduler: Scheduler<FormTimer>,
    mounted: bool,
}

impl RegistrationForm {
    pub fn new(
        settings: FormSettings,
        tracker: Tracker,
        operation: impl SubmitOperation + 'static,
    ) -> Self {
        Self {
            settings,
            fields: FormFields::new(),
            inputs: Default::default(),
            state: SubmissionState::Idle,
            focus: None,
            notice: None,
            tracker,
            operation: Box::new(operation),
            in_flight: None,
            scheduler: Scheduler::new(),
            mounted: false,
        }
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn focus(&self) -> Option<FocusTarget> {
        self.focus
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn input(&self, field: FieldId) -> &TextInput {
        &self.inputs[field.index()]
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn success_visible(&self) -> bool {
        self.state == SubmissionState::Success
    }

    pub fn success_timer_pending(&self) -> bool {
        self.scheduler.is_pending(SUCCESS_TIMER_KEY)
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.fields.is_valid() && !self.is_submitting()
    }

    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        tracing::debug!("registration form mounted");

        self.tracker.emit(
            "$pageview",
            crate::properties! {
                "page_title" => &self.settings.page_title,
                "page_type" => &self.settings.page_type,
            },
        );
        self.set_focus(FocusTarget::Field(FieldId::Name));
    }

    /// Cancels the success timer and abandons any submission still running.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.scheduler.clear();
        if self.in_flight.take().is_some() {
            tracing::debug!("registration form unmounted with a submission in flight");
            self.state = SubmissionState::Idle;
        }
        self.focus = None;
        tracing::debug!("registration form unmounted");
    }

    pub fn set_focus(&mut self, target: FocusTarget) {
        if self.focus == Some(target) {
            return;
        }
        self.focus = Some(target);
        if let FocusTarget::Field(field) = target {
            self.tracker.emit(
                "form_field_focused",
                crate::properties! { "field_name" => field.as_str() },
            );
        }
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(-1);
    }

    pub fn set_field(&mut self, field: FieldId, value: impl Into<String>) {
        self.fields.set_field(field, value);
        let value = self.fields.get(field);
        self.inputs[field.index()].move_end(value);
    }

    /// Routes a key to the focused control. Returns whether anything changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.focus {
            Some(FocusTarget::Field(field)) => {
                let mut value = self.fields.get(field).to_string();
                let result =
                    self.inputs[field.index()].handle_key(&mut value, key.code, key.modifiers);
                if value != self.fields.get(field) {
                    self.fields.set_field(field, value);
                }
                match result {
                    KeyResult::Submit if field == FieldId::Phone => {
                        self.submit();
                        true
                    }
                    KeyResult::Submit => {
                        self.focus_next();
                        true
                    }
                    KeyResult::Handled => true,
                    KeyResult::NotHandled => false,
                }
            }
            Some(FocusTarget::Submit) => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.submit();
                    true
                }
                _ => false,
            },
            None => false,
        }
    }

    pub fn submit(&mut self) -> SubmitAttempt {
        if self.is_submitting() {
            tracing::debug!("submit ignored while a registration is in flight");
            return SubmitAttempt::Busy;
        }

        if !self.fields.is_valid() {
            tracing::debug!(missing = ?self.fields.missing(), "submit rejected");
            self.notice = Some(MISSING_FIELDS_NOTICE.to_string());
            return SubmitAttempt::Rejected;
        }

        // A banner left over from the previous registration goes away now.
        self.scheduler.cancel(SUCCESS_TIMER_KEY);
        self.state = SubmissionState::Submitting;
        self.notice = None;

        let name = self.fields.name.clone();
        let email = self.fields.email.clone();
        let phone = self.fields.phone.clone();
        let course = self.settings.course_id.clone();

        self.tracker.emit(
            "registration_button_clicked",
            crate::properties! {
                "user_name" => &name,
                "user_email" => &email,
                "user_phone" => &phone,
                "course_type" => &course,
                "registration_date" => now_iso8601(),
                "form_location" => &self.settings.form_location,
            },
        );
        self.tracker.identify(
            &email,
            crate::properties! {
                "name" => &name,
                "email" => &email,
                "phone" => &phone,
                "interested_course" => &course,
            },
        );

        let pending = self.operation.start(RegistrationRequest {
            name,
            email: email.clone(),
            phone,
            course_id: course,
        });
        self.in_flight = Some(InFlight { pending, email });
        tracing::debug!("registration submitted");
        SubmitAttempt::Started
    }

    /// Hides the notice, or failing that the success banner.
    pub fn dismiss(&mut self) -> bool {
        if self.notice.take().is_some() {
            return true;
        }
        if self.success_visible() {
            self.scheduler.cancel(SUCCESS_TIMER_KEY);
            self.state = SubmissionState::Idle;
            return true;
        }
        false
    }

    /// Collects a finished submission and fires due timers.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut changed = false;

        let outcome = self
            .in_flight
            .as_ref()
            .and_then(|flight| flight.pending.try_take());
        if let Some(outcome) = outcome {
            if let Some(flight) = self.in_flight.take() {
                match outcome {
                    Ok(()) => self.complete_success(flight.email, now),
                    Err(err) => self.complete_failure(err),
                }
                changed = true;
            }
        }

        for timer in self.scheduler.drain_ready(now) {
            match timer {
                FormTimer::HideSuccess => {
                    if self.success_visible() {
                        self.state = SubmissionState::Idle;
                        changed = true;
                    }
                }
            }
        }

        changed
    }

    pub fn poll_timeout(&self, now: Instant, default_timeout: Duration) -> Duration {
        self.scheduler.poll_timeout(now, default_timeout)
    }

    fn move_focus(&mut self, direction: isize) {
        let current = self.focus.unwrap_or(FocusTarget::Field(FieldId::Name));
        self.set_focus(current.step(direction));
    }

    fn complete_success(&mut self, email: String, now: Instant) {
        self.tracker.emit(
            "registration_completed",
            crate::properties! {
                "user_email" => email,
                "course_type" => &self.settings.course_id,
            },
        );

        self.state = SubmissionState::Success;
        self.fields.reset();
        for input in &mut self.inputs {
            input.reset();
        }
        self.scheduler.schedule(
            SchedulerCommand::Debounce {
                key: SUCCESS_TIMER_KEY.to_string(),
                delay: self.settings.success_display,
                event: FormTimer::HideSuccess,
            },
            now,
        );
        tracing::info!("registration completed");
    }

    fn complete_failure(&mut self, err: SubmitError) {
        tracing::error!(error = %err, "Registration failed");
        self.tracker.emit(
            "registration_error",
            crate::properties! { "error_message" => err.to_string() },
        );
        self.state = SubmissionState::Idle;
    }
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::{
        FormSettings, MISSING_FIELDS_NOTICE, RegistrationForm, SubmissionState, SubmitAttempt,
    };
    use crate::analytics::{Primitive, Recorded, RecordingClient, Tracker};
    use crate::core::{FieldId, FocusTarget};
    use crate::task::{ManualOperation, PendingSubmission, RegistrationRequest};
    use crate::terminal::{KeyCode, KeyEvent};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn form() -> (RegistrationForm, RecordingClient, ManualOperation) {
        let client = RecordingClient::new();
        let op = ManualOperation::new();
        let mut form = RegistrationForm::new(
            FormSettings::default(),
            Tracker::with_client(Arc::new(client.clone())),
            op.clone(),
        );
        form.mount();
        client.clear();
        (form, client, op)
    }

    fn fill(form: &mut RegistrationForm, name: &str, email: &str, phone: &str) {
        form.set_field(FieldId::Name, name);
        form.set_field(FieldId::Email, email);
        form.set_field(FieldId::Phone, phone);
    }

    fn text(client: &RecordingClient, event: &str, key: &str) -> Option<String> {
        client
            .last_event(event)
            .and_then(|e| e.property(key).and_then(Primitive::as_text).map(str::to_string))
    }

    #[test]
    fn mount_emits_pageview_then_focuses_first_field() {
        let client = RecordingClient::new();
        let mut form = RegistrationForm::new(
            FormSettings::default(),
            Tracker::with_client(Arc::new(client.clone())),
            ManualOperation::new(),
        );
        form.mount();
        form.mount();

        assert_eq!(client.event_names(), vec!["$pageview", "form_field_focused"]);
        let pageview = client.last_event("$pageview").expect("pageview");
        assert_eq!(
            pageview.property("page_title"),
            Some(&Primitive::from("Negotiation Course Registration"))
        );
        assert_eq!(
            pageview.property("page_type"),
            Some(&Primitive::from("registration_form"))
        );
        assert_eq!(form.focus(), Some(FocusTarget::Field(FieldId::Name)));
    }

    #[test]
    fn successful_registration_emits_sequence_and_clears_fields() {
        let (mut form, client, op) = form();
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        let t0 = Instant::now();

        assert_eq!(form.submit(), SubmitAttempt::Started);
        assert_eq!(form.state(), SubmissionState::Submitting);
        assert!(!form.can_submit());
        assert_eq!(
            client.sequence(),
            vec!["registration_button_clicked", "$identify"]
        );

        assert!(!form.poll(t0), "nothing resolves until the operation does");
        assert!(op.resolve_next());
        assert!(form.poll(t0));

        assert_eq!(
            client.sequence(),
            vec![
                "registration_button_clicked",
                "$identify",
                "registration_completed"
            ]
        );
        assert_eq!(form.state(), SubmissionState::Success);
        assert!(form.success_visible());
        assert_eq!(form.fields().name, "");
        assert_eq!(form.fields().email, "");
        assert_eq!(form.fields().phone, "");
        assert_eq!(
            text(&client, "registration_completed", "user_email").as_deref(),
            Some("jane@x.com")
        );
        assert_eq!(
            text(&client, "registration_completed", "course_type").as_deref(),
            Some("negotiation_mastery")
        );
    }

    #[test]
    fn clicked_payload_and_identify_traits() {
        let (mut form, client, op) = form();
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        form.submit();

        let clicked = client.last_event("registration_button_clicked").expect("clicked");
        let keys: Vec<&str> = clicked.properties.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "user_name",
                "user_email",
                "user_phone",
                "course_type",
                "registration_date",
                "form_location"
            ]
        );
        assert_eq!(clicked.property("user_name"), Some(&Primitive::from("Jane Doe")));
        assert_eq!(
            clicked.property("form_location"),
            Some(&Primitive::from("main_registration_page"))
        );
        let date = clicked
            .property("registration_date")
            .and_then(Primitive::as_text)
            .expect("date");
        assert!(chrono::DateTime::parse_from_rfc3339(date).is_ok());
        assert!(date.ends_with('Z'));

        let identify = client
            .calls()
            .into_iter()
            .find_map(|call| match call {
                Recorded::Identify { subject_id, traits } => Some((subject_id, traits)),
                Recorded::Capture(_) => None,
            })
            .expect("identify");
        assert_eq!(identify.0, "jane@x.com");
        let trait_keys: Vec<&str> = identify.1.keys().map(String::as_str).collect();
        assert_eq!(trait_keys, vec!["name", "email", "phone", "interested_course"]);
        assert_eq!(
            identify.1.get("interested_course"),
            Some(&Primitive::from("negotiation_mastery"))
        );

        assert_eq!(
            op.requests(),
            vec![RegistrationRequest {
                name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
                phone: "555-1111".to_string(),
                course_id: "negotiation_mastery".to_string(),
            }]
        );
    }

    #[test]
    fn any_empty_field_blocks_submission_without_events() {
        let values = [("Jane Doe", ""), ("jane@x.com", ""), ("555-1111", "")];
        for mask in 0u8..7 {
            let (mut form, client, op) = form();
            let pick = |i: usize| if mask & (1 << i) != 0 { values[i].0 } else { values[i].1 };
            fill(&mut form, pick(0), pick(1), pick(2));

            assert_eq!(form.submit(), SubmitAttempt::Rejected, "mask {mask}");
            assert_eq!(form.state(), SubmissionState::Idle);
            assert_eq!(form.notice(), Some(MISSING_FIELDS_NOTICE));
            assert!(client.calls().is_empty(), "mask {mask} emitted {:?}", client.sequence());
            assert!(op.requests().is_empty());
        }
    }

    #[test]
    fn empty_name_scenario_produces_no_events() {
        let (mut form, client, _op) = form();
        fill(&mut form, "", "a@b.com", "555");
        assert_eq!(form.submit(), SubmitAttempt::Rejected);
        assert!(client.calls().is_empty());
        assert_eq!(form.state(), SubmissionState::Idle);
        assert_eq!(form.fields().email, "a@b.com");
    }

    #[test]
    fn failure_reports_one_error_and_keeps_fields() {
        let (mut form, client, op) = form();
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        form.submit();

        assert!(op.fail_next("gateway timeout"));
        assert!(form.poll(Instant::now()));

        let errors: Vec<_> = client
            .events()
            .into_iter()
            .filter(|e| e.name == "registration_error")
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].property("error_message"),
            Some(&Primitive::from("gateway timeout"))
        );
        assert!(client.last_event("registration_completed").is_none());
        assert_eq!(form.state(), SubmissionState::Idle);
        assert_eq!(form.fields().name, "Jane Doe");
        assert_eq!(form.fields().phone, "555-1111");
        assert!(form.can_submit());
        assert!(!form.success_timer_pending());
    }

    #[test]
    fn abandoned_operation_is_reported_as_error() {
        let client = RecordingClient::new();
        let drop_it = |_request: RegistrationRequest| PendingSubmission::channel().1;
        let mut form = RegistrationForm::new(
            FormSettings::default(),
            Tracker::with_client(Arc::new(client.clone())),
            drop_it,
        );
        form.mount();
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        form.submit();
        form.poll(Instant::now());

        assert_eq!(
            text(&client, "registration_error", "error_message").as_deref(),
            Some("registration was abandoned before it completed")
        );
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn second_submit_while_in_flight_is_ignored() {
        let (mut form, client, op) = form();
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        assert_eq!(form.submit(), SubmitAttempt::Started);
        assert_eq!(form.submit(), SubmitAttempt::Busy);

        assert_eq!(op.requests().len(), 1);
        assert_eq!(op.in_flight(), 1);
        assert_eq!(client.event_names(), vec!["registration_button_clicked"]);
    }

    #[test]
    fn success_reverts_to_idle_after_display_window() {
        let (mut form, _client, op) = form();
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        form.submit();
        op.resolve_next();
        let t0 = Instant::now();
        form.poll(t0);
        assert!(form.success_timer_pending());

        assert!(!form.poll(t0 + Duration::from_millis(4_999)));
        assert_eq!(form.state(), SubmissionState::Success);
        assert!(form.poll(t0 + Duration::from_secs(5)));
        assert_eq!(form.state(), SubmissionState::Idle);

        fill(&mut form, "John Roe", "john@x.com", "555-2222");
        assert!(form.can_submit());
        assert_eq!(form.submit(), SubmitAttempt::Started);
    }

    #[test]
    fn resubmitting_during_success_cancels_old_banner_timer() {
        let (mut form, _client, op) = form();
        let t0 = Instant::now();
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        form.submit();
        op.resolve_next();
        form.poll(t0);

        fill(&mut form, "John Roe", "john@x.com", "555-2222");
        assert_eq!(form.submit(), SubmitAttempt::Started);
        assert!(!form.success_timer_pending());

        op.resolve_next();
        form.poll(t0 + Duration::from_secs(4));
        assert!(!form.poll(t0 + Duration::from_secs(6)), "old timer must not hide new banner");
        assert_eq!(form.state(), SubmissionState::Success);
        assert!(form.poll(t0 + Duration::from_secs(9)));
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn unmount_cancels_success_timer() {
        let (mut form, _client, op) = form();
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        form.submit();
        op.resolve_next();
        let t0 = Instant::now();
        form.poll(t0);

        form.unmount();
        assert!(!form.success_timer_pending());
        assert!(!form.poll(t0 + Duration::from_secs(10)));
        assert!(!form.is_mounted());
    }

    #[test]
    fn unmount_while_submitting_ignores_late_result() {
        let (mut form, client, op) = form();
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        form.submit();
        form.unmount();

        op.resolve_next();
        assert!(!form.poll(Instant::now()));
        assert!(client.last_event("registration_completed").is_none());
        assert!(client.last_event("registration_error").is_none());
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn flow_runs_without_analytics_client() {
        let op = ManualOperation::new();
        let mut form =
            RegistrationForm::new(FormSettings::default(), Tracker::disabled(), op.clone());
        form.mount();
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        assert_eq!(form.submit(), SubmitAttempt::Started);
        op.resolve_next();
        form.poll(Instant::now());
        assert!(form.success_visible());
    }

    #[test]
    fn dismiss_clears_notice_before_banner() {
        let (mut form, _client, op) = form();
        form.submit();
        assert!(form.notice().is_some());
        assert!(form.dismiss());
        assert!(form.notice().is_none());
        assert!(!form.dismiss());

        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        form.submit();
        op.resolve_next();
        form.poll(Instant::now());
        assert!(form.dismiss());
        assert_eq!(form.state(), SubmissionState::Idle);
        assert!(!form.success_timer_pending());
    }

    #[test]
    fn dismissing_banner_follows_caller_clock() {
        let (mut form, _client, op) = form();
        let later = Instant::now() + Duration::from_secs(3_600);
        fill(&mut form, "Jane Doe", "jane@x.com", "555-1111");
        form.submit();
        op.resolve_next();
        form.poll(later);
        assert!(form.success_timer_pending());

        assert!(form.dismiss());
        assert!(!form.success_timer_pending());
        let idle_poll = Duration::from_millis(120);
        assert_eq!(form.poll_timeout(later, idle_poll), idle_poll);
        assert!(!form.poll(later + Duration::from_secs(5)));
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn focus_events_fire_once_per_field_change() {
        let (mut form, client, _op) = form();
        form.set_focus(FocusTarget::Field(FieldId::Name));
        assert!(client.calls().is_empty());

        form.focus_next();
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focus(), Some(FocusTarget::Submit));

        let fields: Vec<String> = client
            .events()
            .iter()
            .filter_map(|e| e.property("field_name").map(|v| v.to_string()))
            .collect();
        assert_eq!(fields, vec!["email", "phone"]);
    }

    #[test]
    fn typing_and_enter_walk_the_form_then_submit() {
        let (mut form, client, op) = form();
        let type_str = |form: &mut RegistrationForm, text: &str| {
            for ch in text.chars() {
                form.handle_key(KeyEvent::plain(KeyCode::Char(ch)));
            }
            form.handle_key(KeyEvent::plain(KeyCode::Enter));
        };

        type_str(&mut form, "Jane Doe");
        assert_eq!(form.focus(), Some(FocusTarget::Field(FieldId::Email)));
        type_str(&mut form, "jane@x.com");
        type_str(&mut form, "555-1111");

        assert_eq!(form.state(), SubmissionState::Submitting);
        assert_eq!(op.requests().len(), 1);
        assert_eq!(op.requests()[0].email, "jane@x.com");
        assert!(client.last_event("registration_button_clicked").is_some());
    }
}
