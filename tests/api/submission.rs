use std::time::Duration;

use claims::{assert_err, assert_ok};
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

use waitlist_signup::controller::{
    ButtonVariant, Phase, SignupError, ERROR_LABEL, SUBMITTING_LABEL, SUCCESS_LABEL,
};

use crate::helpers::{spawn_form, TEST_BUTTON_LABEL};

#[tokio::test]
async fn a_valid_submission_walks_through_the_visible_sequence() {
    // Arrange
    let form = spawn_form().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&form.relay_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&form.analytics_server)
        .await;
    form.controller.set_input("test@example.com");

    // Act
    let controller = form.controller.clone();
    let in_flight = tokio::spawn(async move { controller.submit().await });

    // Assert: working indicator while the relay call is pending
    tokio::time::sleep(Duration::from_millis(30)).await;
    let button = form.controller.button();
    assert_eq!(button.label, SUBMITTING_LABEL);
    assert!(button.disabled);
    assert_eq!(form.controller.phase(), Phase::Submitting);

    // Assert: confirmation once the relay accepts
    let outcome = in_flight.await.expect("the submission task panicked");
    assert_ok!(outcome);
    let button = form.controller.button();
    assert_eq!(button.label, SUCCESS_LABEL);
    assert!(button.disabled);
    assert_eq!(button.variant, ButtonVariant::Success);
    assert_eq!(form.controller.phase(), Phase::Success);
    assert_eq!(form.controller.input(), "");
    form.controller.flush_analytics().await;
}

#[tokio::test]
async fn an_invalid_email_never_reaches_the_relay() {
    // Arrange
    let form = spawn_form().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&form.relay_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&form.analytics_server)
        .await;
    form.controller.set_input("not-an-email");

    // Act
    let outcome = form.controller.submit().await;

    // Assert
    assert!(matches!(outcome, Err(SignupError::InvalidEmail(_))));
    let button = form.controller.button();
    assert_eq!(button.label, ERROR_LABEL);
    assert!(!button.disabled);
    assert_eq!(button.variant, ButtonVariant::Error);
    assert_eq!(form.controller.phase(), Phase::Error);
    // The typed input is left in place for the retry
    assert_eq!(form.controller.input(), "not-an-email");
}

#[tokio::test]
async fn a_relay_rejection_shows_the_error_prompt() {
    // Arrange
    let form = spawn_form().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&form.relay_server)
        .await;
    form.controller.set_input("test@example.com");

    // Act
    let outcome = form.controller.submit().await;

    // Assert: error prompt, re-enabled immediately for a retry
    assert!(matches!(outcome, Err(SignupError::Relay(_))));
    let button = form.controller.button();
    assert_eq!(button.label, ERROR_LABEL);
    assert!(!button.disabled);
    assert_eq!(form.controller.phase(), Phase::Error);
}

#[tokio::test]
async fn a_network_failure_shows_the_error_prompt() {
    // Arrange: point the controller at a server that is no longer listening
    let form = spawn_form().await;
    drop(form.relay_server);
    form.controller.set_input("test@example.com");

    // Act
    let outcome = form.controller.submit().await;

    // Assert
    assert_err!(outcome);
    assert_eq!(form.controller.button().label, ERROR_LABEL);
    assert_eq!(form.controller.phase(), Phase::Error);
}

#[tokio::test]
async fn a_second_activation_while_in_flight_is_ignored() {
    // Arrange
    let form = spawn_form().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(150)))
        .expect(1)
        .mount(&form.relay_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&form.analytics_server)
        .await;
    form.controller.set_input("test@example.com");

    // Act: fire a second submit while the first is still in flight
    let controller = form.controller.clone();
    let first = tokio::spawn(async move { controller.submit().await });
    tokio::time::sleep(Duration::from_millis(30)).await;
    let second = form.controller.submit().await;

    // Assert: the duplicate is a no-op and only one relay request goes out
    assert_ok!(second);
    assert_eq!(form.controller.button().label, SUBMITTING_LABEL);
    let first = first.await.expect("the submission task panicked");
    assert_ok!(first);
    assert_eq!(form.controller.button().label, SUCCESS_LABEL);
    form.controller.flush_analytics().await;
}

#[tokio::test]
async fn retrying_after_an_error_succeeds() {
    // Arrange: first attempt rejected, second accepted
    let form = spawn_form().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&form.relay_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&form.relay_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .mount(&form.analytics_server)
        .await;
    form.controller.set_input("test@example.com");

    // Act
    let first = form.controller.submit().await;
    // The trigger is re-enabled right away; no need to wait out the dwell
    let second = form.controller.submit().await;

    // Assert
    assert_err!(first);
    assert_ok!(second);
    assert_eq!(form.controller.button().label, SUCCESS_LABEL);
    form.controller.flush_analytics().await;
}

#[tokio::test]
async fn a_freshly_bound_form_starts_idle() {
    // Arrange
    let form = spawn_form().await;

    // Assert: a freshly bound form is idle with the original label
    let button = form.controller.button();
    assert_eq!(button.label, TEST_BUTTON_LABEL);
    assert!(!button.disabled);
    assert_eq!(button.variant, ButtonVariant::Default);
    assert_eq!(form.controller.phase(), Phase::Idle);
}
