use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use settings_store::{
    Action, DocumentStorage, JsonFileStorage, MemoryStorage, SettingsDocument, SettingsStore,
};

#[tokio::test]
async fn first_run_yields_defaults_without_warning() {
    let storage = Arc::new(MemoryStorage::new());
    let loaded = SettingsStore::load(storage.clone(), SettingsDocument::default()).await;
    assert!(loaded.warning.is_none());

    let doc = loaded.store.snapshot();
    assert_eq!(doc, SettingsDocument::default());
    // Loading alone never writes.
    assert_eq!(storage.writes(), 0);
}

#[tokio::test]
async fn unreadable_storage_yields_defaults_with_warning() {
    let storage = Arc::new(MemoryStorage::with_body("{ definitely not json"));
    let loaded = SettingsStore::load(storage, SettingsDocument::default()).await;
    assert!(loaded.warning.is_some());
    assert_eq!(loaded.store.snapshot(), SettingsDocument::default());

    let failing = Arc::new(MemoryStorage::new());
    failing.set_fail_read(true);
    let loaded = SettingsStore::load(failing, SettingsDocument::default()).await;
    assert!(loaded.warning.is_some());
}

#[tokio::test]
async fn update_persists_only_on_change() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SettingsStore::load(storage.clone(), SettingsDocument::default())
        .await
        .store;

    store.update(|d| d.auto_translate = true).await;
    assert_eq!(storage.writes(), 1);
    assert!(storage.stored().expect("stored").auto_translate);

    // Same value again: nothing changes, nothing is written.
    store.update(|d| d.auto_translate = true).await;
    assert_eq!(storage.writes(), 1);

    let combo = store
        .update(|d| {
            let b = d.binding_mut(Action::Clip).expect("clip binding");
            b.combo = "CTRL+SHIFT+C".into();
            b.combo.clone()
        })
        .await;
    assert_eq!(combo, "CTRL+SHIFT+C");
    assert_eq!(storage.writes(), 2);
    let stored = storage.stored().expect("stored");
    assert_eq!(
        stored.binding(Action::Clip).map(|b| b.combo.as_str()),
        Some("CTRL+SHIFT+C")
    );
}

#[tokio::test]
async fn failed_save_keeps_mutation_and_calls_hook() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SettingsStore::new(storage.clone(), SettingsDocument::default());
    let failures = Arc::new(AtomicUsize::new(0));
    let seen = failures.clone();
    store.set_save_error_hook(Arc::new(move |_e| {
        seen.fetch_add(1, Ordering::SeqCst);
    }));

    storage.set_fail_write(true);
    store.update(|d| d.selected_backend = "youdao".into()).await;
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert_eq!(store.snapshot().selected_backend, "youdao");
    assert!(storage.stored().is_none());

    storage.set_fail_write(false);
    store.flush().await.expect("flush");
    assert_eq!(
        storage.stored().map(|d| d.selected_backend),
        Some("youdao".to_string())
    );
}

#[tokio::test]
async fn file_backed_store_survives_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.json");

    let storage: Arc<dyn DocumentStorage> = Arc::new(JsonFileStorage::new(&path));
    let store = SettingsStore::load(storage.clone(), SettingsDocument::default())
        .await
        .store;
    store
        .update(|d| {
            d.selected_backend = "youdao".into();
            if let Some(b) = d.binding_mut(Action::Select) {
                b.enabled = true;
            }
        })
        .await;

    let reloaded = SettingsStore::load(storage, SettingsDocument::default())
        .await
        .store
        .snapshot();
    assert_eq!(reloaded.selected_backend, "youdao");
    assert!(reloaded.binding(Action::Select).expect("select").enabled);
    assert!(!reloaded.binding(Action::Clip).expect("clip").enabled);
}

#[tokio::test]
async fn legacy_file_is_migrated_on_load() {
    let body = r#"{"settings": {
        "defaultApi": "youdao",
        "hotKeyList": [{"use": "Clip", "isOpen": true, "desc": "c", "keys": "ALT+V"}],
        "autoTrans": false
    }}"#;
    let storage = Arc::new(MemoryStorage::with_body(body));
    let loaded = SettingsStore::load(storage, SettingsDocument::default()).await;
    assert!(loaded.warning.is_none());

    let doc = loaded.store.snapshot();
    assert_eq!(doc.selected_backend, "youdao");
    // The missing Select binding is filled from defaults.
    assert_eq!(doc.hotkeys.len(), 2);
    assert_eq!(doc.binding(Action::Clip).map(|b| b.combo.as_str()), Some("ALT+V"));
    assert_eq!(doc.binding(Action::Select).map(|b| b.combo.as_str()), Some("ALT+X"));
}

#[tokio::test]
async fn legacy_lowercase_combos_load_canonical() {
    let body = r#"{"settings": {
        "hotKeyList": [
            {"use": "Select", "isOpen": true, "desc": "s", "keys": "alt+x"},
            {"use": "Clip", "isOpen": true, "desc": "c", "keys": "alt++"}
        ]
    }}"#;
    let storage = Arc::new(MemoryStorage::with_body(body));
    let loaded = SettingsStore::load(storage, SettingsDocument::default()).await;
    assert!(loaded.warning.is_none());

    let doc = loaded.store.snapshot();
    let select = doc.binding(Action::Select).expect("select");
    assert_eq!((select.enabled, select.combo.as_str()), (true, "ALT+X"));
    // unparseable combos fall back to the default, disabled
    let clip = doc.binding(Action::Clip).expect("clip");
    assert_eq!((clip.enabled, clip.combo.as_str()), (false, "ALT+C"));
}
