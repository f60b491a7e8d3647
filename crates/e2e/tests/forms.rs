//! Form Layouts helpers against the simulated dashboard

mod common;

use common::{Session, FORM_LAYOUTS};
use ngx_pilot_driver::sim::ngx::Submission;
use ngx_pilot_e2e::forms::{GridSubmission, InlineSubmission};
use ngx_pilot_e2e::E2eError;

#[tokio::test]
async fn test_grid_form_with_values() {
    let session = Session::at(FORM_LAYOUTS);

    let sent = session
        .pm
        .on_form_layouts_page()
        .submit_using_the_grid(Some("test@test.com"), Some("Welcome1"), Some("Option 2"))
        .await
        .unwrap();

    assert_eq!(
        sent,
        GridSubmission {
            email: "test@test.com".to_string(),
            password: "Welcome1".to_string(),
            option: "Option 2".to_string(),
        }
    );
    assert_eq!(
        session.sim.with_app(|a| a.submissions().to_vec()),
        vec![Submission::UsingTheGrid {
            email: "test@test.com".to_string(),
            password: "Welcome1".to_string(),
            option: Some("Option 2".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_grid_form_falls_back_on_blank_values() {
    let session = Session::at(FORM_LAYOUTS);

    let sent = session
        .pm
        .on_form_layouts_page()
        .submit_using_the_grid(Some("  "), None, Some(""))
        .await
        .unwrap();

    assert_eq!(sent.email, "qa@example.com");
    assert_eq!(sent.password, "Secret123!");
    assert_eq!(sent.option, "Option 1");
    assert_eq!(
        session.sim.with_app(|a| a.submissions().to_vec()),
        vec![Submission::UsingTheGrid {
            email: "qa@example.com".to_string(),
            password: "Secret123!".to_string(),
            option: Some("Option 1".to_string()),
        }]
    );
}

#[tokio::test]
async fn test_inline_form_checks_box_only_when_asked() {
    let session = Session::at(FORM_LAYOUTS);
    let forms = session.pm.on_form_layouts_page();

    forms.submit_inline(Some("John Smith"), Some("john@test.com"), false).await.unwrap();
    let sent = forms.submit_inline(None, Some(" "), true).await.unwrap();

    assert_eq!(
        sent,
        InlineSubmission {
            name: "Jane Doe".to_string(),
            email: "qa+inline@example.com".to_string(),
            remember_me: true,
        }
    );
    assert_eq!(
        session.sim.with_app(|a| a.submissions().to_vec()),
        vec![
            Submission::Inline {
                name: "John Smith".to_string(),
                email: "john@test.com".to_string(),
                remember_me: false,
            },
            Submission::Inline {
                name: "Jane Doe".to_string(),
                email: "qa+inline@example.com".to_string(),
                remember_me: true,
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_form_missing_from_page() {
    let session = Session::at("/pages/iot-dashboard");
    let err = session
        .pm
        .on_form_layouts_page()
        .submit_inline(None, None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::ElementNotFound { timeout_ms: 10_000, .. }));
}
