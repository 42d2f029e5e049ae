use std::sync::Arc;
use std::time::Duration;

use care_core::model::{Category, Gender, SessionContext, TRENDING_TAGS, UserId};
use care_core::time::fixed_clock;
use care_core::wizard::{WizardError, WizardStep};
use services::api::{Endpoint, InMemoryBackend};
use services::{
    CommunityFeed, FeedError, LocalBroadcast, PostBroadcast, SubmitError, SubmitOutcome,
    WizardFormController,
};

fn verified_session() -> SessionContext {
    let mut session = SessionContext::for_user(UserId::new("u1"), "Asha");
    session.verify_gender(true).expect("female verification");
    session
}

fn controller(backend: &InMemoryBackend) -> (WizardFormController, Arc<LocalBroadcast>) {
    let broadcast = Arc::new(LocalBroadcast::default());
    let controller = WizardFormController::new(Arc::new(backend.clone()), broadcast.clone());
    (controller, broadcast)
}

fn fill_to_tags_step(wizard: &WizardFormController) {
    wizard.set_category(Some(Category::Parenting));
    wizard.advance().expect("category chosen");
    wizard.set_content("hi");
    wizard.advance().expect("content written");
    wizard.add_tag("x");
    assert_eq!(wizard.step(), WizardStep::Tags);
}

#[tokio::test]
async fn advance_is_gated_but_back_is_not() {
    let backend = InMemoryBackend::new(fixed_clock());
    let (wizard, _) = controller(&backend);

    assert_eq!(wizard.advance(), Err(WizardError::MissingCategory));
    assert_eq!(wizard.step(), WizardStep::Category);

    wizard.set_category(Some(Category::Education));
    assert_eq!(wizard.advance(), Ok(WizardStep::Content));

    wizard.set_category(None);
    assert_eq!(wizard.back(), Ok(WizardStep::Category));

    assert!(wizard.add_tag("  Wellness  "));
    assert!(!wizard.add_tag("Wellness"));
    assert_eq!(wizard.draft().tags().len(), 1);
}

#[tokio::test]
async fn failed_submit_keeps_draft_on_tags_step() {
    let backend = InMemoryBackend::new(fixed_clock());
    backend.fail(Endpoint::CreatePost);
    let (wizard, _) = controller(&backend);
    fill_to_tags_step(&wizard);

    let err = wizard
        .submit(&verified_session())
        .await
        .expect_err("backend is down");
    assert!(matches!(err, SubmitError::Api(_)));
    assert_eq!(backend.call_count(Endpoint::CreatePost), 1);

    let draft = wizard.draft();
    assert_eq!(draft.step(), WizardStep::Tags);
    assert_eq!(draft.content(), "hi");
    assert_eq!(draft.category(), Some(Category::Parenting));
    assert!(!wizard.is_submitting());
}

#[tokio::test]
async fn successful_submit_resets_and_sends_identity() {
    let backend = InMemoryBackend::new(fixed_clock());
    let (wizard, _) = controller(&backend);
    fill_to_tags_step(&wizard);

    let outcome = wizard
        .submit(&verified_session())
        .await
        .expect("submit succeeds");
    let SubmitOutcome::Submitted(post) = outcome else {
        panic!("expected a created post");
    };
    assert_eq!(post.category, "Parenting");
    assert_eq!(post.tags, vec!["x".to_string()]);
    assert_eq!(post.author_name.as_deref(), Some("Asha"));

    assert_eq!(backend.call_count(Endpoint::CreatePost), 1);
    assert_eq!(backend.post_genders(), vec![Gender::Female]);

    let draft = wizard.draft();
    assert_eq!(draft.step(), WizardStep::Category);
    assert_eq!(draft.category(), None);
    assert!(draft.content().is_empty());
    assert!(draft.tags().is_empty());
}

#[tokio::test]
async fn submit_before_tags_step_sends_nothing() {
    let backend = InMemoryBackend::new(fixed_clock());
    let (wizard, _) = controller(&backend);
    wizard.set_category(Some(Category::Education));

    let err = wizard
        .submit(&verified_session())
        .await
        .expect_err("still on step 1");
    assert!(matches!(
        err,
        SubmitError::Validation(WizardError::NotOnTagsStep)
    ));
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_submit_while_pending_is_ignored() {
    let backend = InMemoryBackend::new(fixed_clock()).with_latency(Duration::from_millis(200));
    let (wizard, _) = controller(&backend);
    fill_to_tags_step(&wizard);
    let session = verified_session();

    let (first, second) = tokio::join!(wizard.submit(&session), wizard.submit(&session));

    assert!(matches!(first, Ok(SubmitOutcome::Submitted(_))));
    assert!(matches!(second, Ok(SubmitOutcome::AlreadyPending)));
    assert_eq!(backend.call_count(Endpoint::CreatePost), 1);
    assert!(!wizard.is_submitting());
}

#[tokio::test]
async fn unverified_author_is_rejected_by_backend() {
    let backend = InMemoryBackend::new(fixed_clock());
    let (wizard, _) = controller(&backend);
    fill_to_tags_step(&wizard);

    let err = wizard
        .submit(&SessionContext::new())
        .await
        .expect_err("gender not verified");
    let SubmitError::Api(api) = err else {
        panic!("expected an api error");
    };
    assert_eq!(api.server_message(), Some("Only verified female users can post"));
    assert_eq!(wizard.step(), WizardStep::Tags);
}

#[tokio::test]
async fn created_post_reaches_open_feeds_once() {
    let backend = InMemoryBackend::new(fixed_clock());
    let (wizard, broadcast) = controller(&backend);
    let session = verified_session();

    let mut feed = CommunityFeed::new(Arc::new(backend.clone()), broadcast.clone());
    assert_eq!(feed.open(&session).await.expect("open feed"), 0);

    fill_to_tags_step(&wizard);
    let SubmitOutcome::Submitted(post) = wizard.submit(&session).await.expect("submit") else {
        panic!("expected a created post");
    };

    assert_eq!(feed.drain_live(), 1);
    assert_eq!(feed.posts()[0].id, post.id);

    broadcast.publish(&post);
    assert_eq!(feed.drain_live(), 0);
    assert_eq!(feed.posts().len(), 1);
}

#[tokio::test]
async fn feed_requires_verified_gender() {
    let backend = InMemoryBackend::new(fixed_clock());
    let mut feed = CommunityFeed::new(
        Arc::new(backend.clone()),
        Arc::new(LocalBroadcast::default()),
    );

    let err = feed
        .open(&SessionContext::new())
        .await
        .expect_err("gender unknown");
    assert!(matches!(err, FeedError::Access(_)));
    assert!(!feed.is_open());
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_during_submit_keeps_new_draft() {
    let backend = InMemoryBackend::new(fixed_clock()).with_latency(Duration::from_millis(200));
    let (wizard, broadcast) = controller(&backend);
    let mut live = broadcast.subscribe();
    fill_to_tags_step(&wizard);
    let session = verified_session();

    let edit_after_cancel = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        wizard.cancel();
        wizard.set_category(Some(Category::Education));
        wizard.set_content("typed after cancel");
    };
    let (outcome, ()) = tokio::join!(wizard.submit(&session), edit_after_cancel);

    assert!(matches!(outcome, Ok(SubmitOutcome::Cancelled)));
    assert!(!wizard.is_submitting());
    assert!(live.try_recv().is_err());

    let draft = wizard.draft();
    assert_eq!(draft.step(), WizardStep::Category);
    assert_eq!(draft.category(), Some(Category::Education));
    assert_eq!(draft.content(), "typed after cancel");

    // A later submit on the same controller is not affected by the old cancel.
    wizard.advance().expect("category chosen");
    wizard.advance().expect("content written");
    let outcome = wizard.submit(&session).await.expect("submit");
    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    assert_eq!(live.try_recv().expect("announced").content, "typed after cancel");
}

#[tokio::test]
async fn trending_labels_become_search_tags() {
    let backend = InMemoryBackend::new(fixed_clock());
    let mut feed = CommunityFeed::new(
        Arc::new(backend.clone()),
        Arc::new(LocalBroadcast::default()),
    );

    assert!(feed.search_trending(TRENDING_TAGS[1]));
    assert!(!feed.search_trending("  #SelfCare "));
    assert!(!feed.search_trending("#"));
    assert_eq!(feed.search_tags().as_strings(), vec!["SelfCare".to_string()]);
}
