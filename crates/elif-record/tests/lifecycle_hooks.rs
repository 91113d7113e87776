use elif_record::{
    AfterSave, BeforeCreate, BeforeDelete, BeforeSave, BeforeValidate, HookOutcome, InMemoryStore,
    Model, ModelEvent, ModelLifecycle, Record, RecordContext, RecordError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Article model binding its own hooks at boot
struct Article;

impl Model for Article {
    fn table_name() -> &'static str {
        "articles"
    }

    fn boot(lifecycle: &mut ModelLifecycle<Self>) {
        lifecycle
            .bind_before_validate()
            .bind_before_save()
            .bind_before_create()
            .bind_before_delete();
    }
}

impl BeforeValidate for Article {
    fn before_validate(record: &mut Record<Self>) -> HookOutcome {
        let trimmed = record
            .get("title")
            .and_then(|v| v.as_str())
            .map(|title| title.trim().to_string());
        if let Some(title) = trimmed {
            record.set("title", title);
        }
        HookOutcome::Continue
    }
}

impl BeforeSave for Article {
    fn before_save(record: &mut Record<Self>) -> HookOutcome {
        let slug = record
            .get("title")
            .and_then(|v| v.as_str())
            .map(|title| title.to_lowercase().replace(' ', "-"));
        if let Some(slug) = slug {
            record.set("slug", slug);
        }
        HookOutcome::Continue
    }
}

impl BeforeCreate for Article {
    fn before_create(record: &mut Record<Self>) -> HookOutcome {
        HookOutcome::from(record.get("blocked").and_then(|v| v.as_bool()) != Some(true))
    }
}

impl BeforeDelete for Article {
    fn before_delete(record: &mut Record<Self>) -> HookOutcome {
        HookOutcome::from(record.get("locked").and_then(|v| v.as_bool()) != Some(true))
    }
}

static AUDITED_SAVES: AtomicUsize = AtomicUsize::new(0);

/// Model with only an "after" hook
struct Audited;

impl Model for Audited {
    fn table_name() -> &'static str {
        "audits"
    }

    fn boot(lifecycle: &mut ModelLifecycle<Self>) {
        lifecycle.bind_after_save();
    }
}

impl AfterSave for Audited {
    fn after_save(record: &Record<Self>) {
        if record.exists() {
            AUDITED_SAVES.fetch_add(1, Ordering::SeqCst);
        }
    }
}

type EventLog = Arc<Mutex<Vec<&'static str>>>;

fn traced_context(store: Arc<InMemoryStore>) -> (Arc<RecordContext<Article>>, EventLog) {
    let log: EventLog = Arc::new(Mutex::new(Vec::new()));
    let mut builder = RecordContext::<Article>::builder().in_memory_store(store);

    for event in ModelEvent::observable() {
        let log = log.clone();
        builder = builder.listen(event, move |_| {
            log.lock().unwrap().push(event.name());
            HookOutcome::Continue
        });
    }

    (builder.build().unwrap(), log)
}

fn take(log: &EventLog) -> Vec<&'static str> {
    std::mem::take(&mut *log.lock().unwrap())
}

#[test]
fn test_bound_hooks_shape_attributes() {
    let (context, _) = traced_context(Arc::new(InMemoryStore::new()));
    let mut record = Record::new(context);
    record.set("title", "  Hello World ");

    assert!(record.save().unwrap());
    assert_eq!(record.get("title").and_then(|v| v.as_str()), Some("Hello World"));
    assert_eq!(record.get("slug").and_then(|v| v.as_str()), Some("hello-world"));
}

#[test]
fn test_event_order_for_create_update_delete() {
    let (context, log) = traced_context(Arc::new(InMemoryStore::new()));
    let mut record = Record::new(context);
    record.set("title", "First");

    assert!(record.save().unwrap());
    assert_eq!(
        take(&log),
        vec!["validating", "validated", "saving", "creating", "created", "saved"]
    );

    record.set("title", "Second");
    assert!(record.save().unwrap());
    assert_eq!(
        take(&log),
        vec!["validating", "validated", "saving", "updating", "updated", "saved"]
    );

    assert!(record.delete().unwrap());
    assert_eq!(take(&log), vec!["deleting", "deleted"]);
}

#[test]
fn test_model_hooks_run_before_external_listeners() {
    let store = Arc::new(InMemoryStore::new());
    let context = RecordContext::<Article>::builder()
        .in_memory_store(store)
        .listen(ModelEvent::Saving, |record| {
            let has_slug = record.get("slug").is_some();
            record.set("slug_seen", has_slug);
            HookOutcome::Continue
        })
        .build()
        .unwrap();

    let mut record = Record::new(context);
    record.set("title", "Ordered");
    assert!(record.save().unwrap());
    assert_eq!(record.get("slug_seen").and_then(|v| v.as_bool()), Some(true));
}

#[test]
fn test_creating_abort_cancels_insert() {
    let store = Arc::new(InMemoryStore::new());
    let (context, log) = traced_context(store.clone());
    let mut record = Record::new(context);
    record.set("title", "Blocked").set("blocked", true);

    assert!(!record.save().unwrap());
    assert!(!record.exists());
    assert_eq!(store.row_count("articles"), 0);

    let events = take(&log);
    assert!(!events.contains(&"creating"));
    assert!(!events.contains(&"saved"));
}

#[test]
fn test_saving_listener_abort_stops_pipeline() {
    let store = Arc::new(InMemoryStore::new());
    let context = RecordContext::<Article>::builder()
        .in_memory_store(store.clone())
        .listen(ModelEvent::Saving, |_| HookOutcome::Abort)
        .build()
        .unwrap();

    let mut record = Record::new(context);
    record.set("title", "Never stored");
    assert!(!record.save().unwrap());
    assert!(!record.force_save().unwrap());
    assert_eq!(store.row_count("articles"), 0);
}

#[test]
fn test_deleting_abort_keeps_row() {
    let store = Arc::new(InMemoryStore::new());
    let (context, log) = traced_context(store.clone());
    let mut record = Record::new(context);
    record.set("title", "Pinned").set("locked", true);
    assert!(record.save().unwrap());
    take(&log);

    assert!(!record.delete().unwrap());
    assert!(record.exists());
    assert_eq!(store.row_count("articles"), 1);
    assert!(take(&log).is_empty());
}

#[test]
fn test_validating_abort_in_throw_mode() {
    let context = RecordContext::<Article>::builder()
        .in_memory_store(Arc::new(InMemoryStore::new()))
        .validating(|_| HookOutcome::Abort)
        .build()
        .unwrap();

    let mut record = Record::new(context);
    record.throw_on_validation(true).set("title", "Halted");

    let err = record.save().unwrap_err();
    assert!(matches!(err, RecordError::ValidationAborted(_)));
    assert!(!record.exists());
}

#[test]
fn test_after_hook_runs_once_per_save() {
    let context = RecordContext::<Audited>::builder()
        .in_memory_store(Arc::new(InMemoryStore::new()))
        .build()
        .unwrap();

    assert_eq!(context.lifecycle().listener_count(ModelEvent::Saved), 1);
    assert!(!context.lifecycle().has_listeners(ModelEvent::Saving));

    let before = AUDITED_SAVES.load(Ordering::SeqCst);
    let mut record = Record::new(context);
    record.set("action", "login");
    assert!(record.save().unwrap());
    record.set("action", "logout");
    assert!(record.save().unwrap());

    assert_eq!(AUDITED_SAVES.load(Ordering::SeqCst) - before, 2);
}
