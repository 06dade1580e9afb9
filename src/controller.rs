use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::analytics::AnalyticsClient;
use crate::configuration::Settings;
use crate::domain::{SignupRequest, SignupSource};
use crate::relay::RelayClient;

pub const SUBMITTING_LABEL: &str = "Joining...";
pub const SUCCESS_LABEL: &str = "You're in!";
pub const ERROR_LABEL: &str = "Error - Try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Submitting,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    Default,
    Success,
    Error,
}

/// Mirror of the submit button for the host to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub label: String,
    pub disabled: bool,
    pub variant: ButtonVariant,
}

#[derive(thiserror::Error, Debug)]
pub enum SignupError {
    #[error("{0}")]
    InvalidEmail(String),
    #[error("the form relay rejected the signup")]
    Relay(#[source] reqwest::Error),
}

struct FormState {
    input: String,
    button: ButtonState,
    phase: Phase,
    // Bumped on every transition into a new cycle stage; a scheduled revert only
    // fires if the generation it captured is still current.
    generation: u64,
}

impl FormState {
    fn new(button_label: &str) -> Self {
        Self {
            input: String::new(),
            button: ButtonState {
                label: button_label.to_string(),
                disabled: false,
                variant: ButtonVariant::Default,
            },
            phase: Phase::Idle,
            generation: 0,
        }
    }

    fn revert(&mut self, original_label: &str) {
        self.button.label = original_label.to_string();
        self.button.disabled = false;
        self.button.variant = ButtonVariant::Default;
        self.phase = Phase::Idle;
    }
}

struct Inner {
    form: Mutex<FormState>,
    relay: RelayClient,
    analytics: Option<AnalyticsClient>,
    source: SignupSource,
    original_label: String,
    success_dwell: Duration,
    error_dwell: Duration,
    analytics_task: Mutex<Option<JoinHandle<()>>>,
}

/// Owns the lifecycle of one bound waitlist form: validates the mirrored input,
/// drives the button through its visual states, delivers the signup to the form
/// relay and records the analytics event.
///
/// The host page keeps ownership of the DOM: it intercepts the native submit
/// event (preventing the default navigation), forwards input changes via
/// [`set_input`](Self::set_input), calls [`submit`](Self::submit), and renders
/// [`button`](Self::button) / [`input`](Self::input) back into the document.
#[derive(Clone)]
pub struct WaitlistController {
    inner: Arc<Inner>,
}

impl WaitlistController {
    /// Bind a controller to one form. The signup source is derived from the
    /// form id once, here; the button label is captured so reverts can restore it.
    pub fn bind(settings: &Settings, form_id: &str, button_label: &str) -> Self {
        let relay = RelayClient::from_settings(&settings.relay);
        let analytics = settings
            .analytics
            .as_ref()
            .map(AnalyticsClient::from_settings);
        let source = SignupSource::from_form_id(form_id);

        Self {
            inner: Arc::new(Inner {
                form: Mutex::new(FormState::new(button_label)),
                relay,
                analytics,
                source,
                original_label: button_label.to_string(),
                success_dwell: settings.form.success_dwell(),
                error_dwell: settings.form.error_dwell(),
                analytics_task: Mutex::new(None),
            }),
        }
    }

    pub fn source(&self) -> SignupSource {
        self.inner.source
    }

    pub fn set_input(&self, value: &str) {
        self.lock_form().input = value.to_string();
    }

    pub fn input(&self) -> String {
        self.lock_form().input.clone()
    }

    pub fn button(&self) -> ButtonState {
        self.lock_form().button.clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock_form().phase
    }

    /// Handle one submit activation.
    ///
    /// Activations while the trigger is disabled are ignored, and the trigger is
    /// disabled before the relay call starts, so two rapid activations cannot
    /// produce two in-flight requests. Every failure settles into the
    /// auto-reverting error state; the returned error only reports which stage
    /// failed.
    #[tracing::instrument(
        name = "Handling a waitlist submission",
        skip(self),
        fields(signup_source = %self.inner.source)
    )]
    pub async fn submit(&self) -> Result<(), SignupError> {
        let request = {
            let mut form = self.lock_form();
            if form.button.disabled {
                tracing::debug!("submit ignored, trigger is disabled");
                return Ok(());
            }

            form.phase = Phase::Validating;
            match SignupRequest::parse(&form.input, self.inner.source) {
                Ok(request) => {
                    // Disable before the first await so a second activation
                    // cannot slip in while the relay call is in flight.
                    form.generation += 1;
                    form.phase = Phase::Submitting;
                    form.button.label = SUBMITTING_LABEL.to_string();
                    form.button.disabled = true;
                    form.button.variant = ButtonVariant::Default;
                    request
                }
                Err(reason) => {
                    tracing::warn!(reason = %reason, "rejected signup input");
                    self.enter_error(&mut form);
                    return Err(SignupError::InvalidEmail(reason));
                }
            }
        };

        match self.inner.relay.send(&request).await {
            Ok(()) => {
                tracing::info!(email = %request.email, "signup delivered to the form relay");
                self.dispatch_analytics(&request);
                let mut form = self.lock_form();
                self.enter_success(&mut form);
                Ok(())
            }
            Err(error) => {
                tracing::error!(error = ?error, "form relay delivery failed");
                let mut form = self.lock_form();
                self.enter_error(&mut form);
                Err(SignupError::Relay(error))
            }
        }
    }

    /// Wait for the in-flight analytics dispatch, if any. Useful on page
    /// teardown; the visible state machine never waits on it.
    pub async fn flush_analytics(&self) {
        let task = self
            .inner
            .analytics_task
            .lock()
            .unwrap()
            .take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    fn enter_success(&self, form: &mut FormState) {
        form.generation += 1;
        form.phase = Phase::Success;
        form.button.label = SUCCESS_LABEL.to_string();
        form.button.disabled = true;
        form.button.variant = ButtonVariant::Success;
        form.input.clear();
        self.schedule_revert(form.generation, self.inner.success_dwell);
    }

    fn enter_error(&self, form: &mut FormState) {
        form.generation += 1;
        form.phase = Phase::Error;
        form.button.label = ERROR_LABEL.to_string();
        // Re-enabled immediately: the user may retry without waiting out the dwell.
        form.button.disabled = false;
        form.button.variant = ButtonVariant::Error;
        self.schedule_revert(form.generation, self.inner.error_dwell);
    }

    fn schedule_revert(&self, generation: u64, dwell: Duration) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            let mut form = inner.form.lock().unwrap();
            if form.generation == generation {
                form.revert(&inner.original_label);
            }
        });
    }

    fn dispatch_analytics(&self, request: &SignupRequest) {
        let client = match &self.inner.analytics {
            Some(client) => client.clone(),
            None => return,
        };
        let email = request.email.clone();
        let source = request.source;
        let joined_at = request.timestamp();

        let task = tokio::spawn(async move {
            if let Err(error) = client.identify(&email, &joined_at).await {
                tracing::warn!(error = ?error, "failed to identify the signup with analytics");
            }
            if let Err(error) = client.capture_signup(&email, source, &joined_at).await {
                tracing::warn!(error = ?error, "failed to capture the signup event");
            }
        });
        *self.inner.analytics_task.lock().unwrap() = Some(task);
    }

    fn lock_form(&self) -> std::sync::MutexGuard<'_, FormState> {
        self.inner.form.lock().unwrap()
    }
}
