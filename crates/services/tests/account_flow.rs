use std::sync::Arc;

use care_core::model::{
    AppointmentDraft, AppointmentId, CheckupError, CheckupForm, Credentials, DoctorDetails,
    DoctorSignup, Gender, RiskAssessment, SessionContext, SessionError, StoryDraft, Symptom,
    UserId,
};
use care_core::time::fixed_clock;
use services::api::{Endpoint, InMemoryBackend, ScriptedAssistant};
use services::{
    AppServices, AppointmentServiceError, AuthError, CheckupServiceError, ServiceConfig,
    StoryServiceError,
};
use storage::repository::Storage;

fn build_services(
    backend: &InMemoryBackend,
    assistant: &ScriptedAssistant,
    storage: &Storage,
) -> AppServices {
    let config = ServiceConfig::from_lookup(|_| None).expect("default config");
    AppServices::with_backends(
        fixed_clock(),
        config,
        Arc::new(backend.clone()),
        Arc::new(assistant.clone()),
        storage,
    )
}

fn signup() -> DoctorSignup {
    DoctorSignup {
        credentials: Credentials::new("dr@clinic.test", "secret").expect("credentials"),
        details: DoctorDetails::new("Dr. Rao", "Gynecology", "12", Some(Gender::Female))
            .expect("details"),
    }
}

#[tokio::test]
async fn checkup_requires_consent_before_calling_model() {
    let backend = InMemoryBackend::new(fixed_clock());
    let assistant = ScriptedAssistant::new();
    assistant.set_assessment(RiskAssessment {
        prediction: 1,
        message: "High risk of PCOD".into(),
    });
    let app = build_services(&backend, &assistant, &Storage::in_memory());
    let checkup = app.checkup();

    let mut form = CheckupForm {
        height_cm: Some(160.0),
        weight_kg: Some(64.0),
        age: Some(24.0),
        ..CheckupForm::default()
    };
    form.toggle_symptom(Symptom::Pimples);

    let err = checkup.assess(&form).await.expect_err("no consent");
    assert!(matches!(
        err,
        CheckupServiceError::Validation(CheckupError::ConsentRequired)
    ));
    assert!(assistant.predictions_requested().is_empty());

    form.consent = true;
    let assessment = checkup.assess(&form).await.expect("assess");
    assert!(assessment.is_positive());

    let sent = assistant.predictions_requested();
    assert_eq!(sent.len(), 1);
    assert!((sent[0].bmi - 25.0).abs() < f64::EPSILON);
    assert_eq!(sent[0].acne, 1);
}

#[tokio::test]
async fn appointments_create_reschedule_cancel() {
    let backend = InMemoryBackend::new(fixed_clock());
    let app = build_services(&backend, &ScriptedAssistant::new(), &Storage::in_memory());
    let mut appointments = app.appointments(UserId::new("u1"));
    assert!(appointments.load().await.expect("load").is_empty());

    let mut draft = AppointmentDraft {
        title: "Follow-up".into(),
        doctor: "Dr. Rao".into(),
        date: String::new(),
        time: "10:00".into(),
    };
    let err = appointments.create(&mut draft).await.expect_err("date missing");
    assert!(matches!(err, AppointmentServiceError::Validation(_)));
    assert!(backend.calls().iter().all(|c| *c != Endpoint::CreateAppointment));

    draft.date = "2023-11-20".into();
    let id = appointments.create(&mut draft).await.expect("create").id.clone();
    assert_eq!(draft, AppointmentDraft::default());

    let updated = appointments
        .reschedule(&id, "2023-11-21", "11:30")
        .await
        .expect("reschedule");
    assert_eq!(updated.date, "2023-11-21");
    assert_eq!(appointments.appointments()[0].time, "11:30");

    let err = appointments
        .cancel(&AppointmentId::new("nope"))
        .await
        .expect_err("unknown id");
    assert!(matches!(err, AppointmentServiceError::NotFound(_)));

    backend.fail(Endpoint::CancelAppointment);
    appointments.cancel(&id).await.expect_err("backend down");
    assert_eq!(appointments.appointments().len(), 1);

    backend.recover(Endpoint::CancelAppointment);
    appointments.cancel(&id).await.expect("cancel");
    assert!(appointments.appointments().is_empty());
}

#[tokio::test]
async fn story_submit_clears_draft_and_refreshes_wall() {
    let backend = InMemoryBackend::new(fixed_clock());
    let app = build_services(&backend, &ScriptedAssistant::new(), &Storage::in_memory());
    let mut stories = app.stories();
    let session = SessionContext::for_user(UserId::new("u1"), "Asha");

    let mut draft = StoryDraft {
        title: "My journey".into(),
        content: String::new(),
        ..StoryDraft::default()
    };
    let err = stories.submit(&mut draft, &session).await.expect_err("no content");
    assert!(matches!(err, StoryServiceError::Validation(_)));

    draft.content = "Diet and yoga helped.".into();
    stories.submit(&mut draft, &session).await.expect("submit");
    assert!(draft.title.is_empty());
    assert!(draft.is_public);
    assert_eq!(stories.public_stories().len(), 1);
    assert_eq!(stories.public_stories()[0].user_name.as_deref(), Some("Asha"));

    draft.title = "Private note".into();
    draft.content = "Only for me.".into();
    draft.is_public = false;
    stories.submit(&mut draft, &session).await.expect("submit private");
    assert_eq!(stories.public_stories().len(), 1);

    stories.load(&session).await.expect("load");
    assert_eq!(stories.my_stories().len(), 2);
}

#[tokio::test]
async fn doctor_login_persists_across_restarts() {
    let backend = InMemoryBackend::new(fixed_clock());
    let storage = Storage::sqlite("sqlite:file:memdb_doctor_login?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let app = build_services(&backend, &ScriptedAssistant::new(), &storage);
    let doctors = app.doctors();
    let mut session = app.sessions().restore().await.expect("restore");
    assert_eq!(session, SessionContext::default());

    let wrong = Credentials::new("dr@clinic.test", "secret").expect("credentials");
    let err = doctors.login(&mut session, &wrong).await.expect_err("not registered");
    let AuthError::Api(api) = err else {
        panic!("expected an api error");
    };
    assert_eq!(api.server_message(), Some("Invalid credentials"));

    doctors.register(&signup()).await.expect("register");
    doctors
        .create_profile(&mut session, &signup())
        .await
        .expect("profile");
    assert!(session.is_doctor());

    let mut restored = app.sessions().restore().await.expect("restore");
    assert_eq!(restored, session);

    doctors.logout(&mut restored).await.expect("logout");
    assert_eq!(restored, SessionContext::default());
    assert_eq!(
        app.sessions().restore().await.expect("restore"),
        SessionContext::default()
    );

    let mut again = SessionContext::new();
    doctors
        .login(&mut again, &signup().credentials)
        .await
        .expect("login");
    assert!(again.is_doctor());
    assert_eq!(again.doctor_id(), session.doctor_id());
}

#[tokio::test]
async fn community_verification_is_persisted() {
    let storage = Storage::in_memory();
    let app = build_services(
        &InMemoryBackend::new(fixed_clock()),
        &ScriptedAssistant::new(),
        &storage,
    );
    let sessions = app.sessions();
    let mut session = SessionContext::for_user(UserId::new("u1"), "Asha");

    let err = sessions
        .verify_community_access(&mut session, false)
        .await
        .expect_err("denied");
    assert!(matches!(err, AuthError::Session(SessionError::AccessDenied)));
    assert_eq!(sessions.restore().await.expect("restore").gender(), Gender::Male);

    sessions
        .verify_community_access(&mut session, true)
        .await
        .expect("granted");
    assert_eq!(sessions.restore().await.expect("restore").gender(), Gender::Female);
}
