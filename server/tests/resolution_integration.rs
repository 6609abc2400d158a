use claims::*;
use server::common::ThemeError;
use server::config::EngineConfig;
use server::engine::ThemeEngine;
use server::file_manager::{FileManagerCommand, FileManagerResponse};
use server::preview::Principal;
use server::registry::{InMemoryThemeRegistry, NewTheme, Theme};
use server::storage::{FileSystemStorage, MemoryStorage, StorageAdapter};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

mod helpers {
    use super::*;

    pub struct TestEngine {
        pub engine: ThemeEngine,
        pub registry: InMemoryThemeRegistry,
        pub storage: Arc<MemoryStorage>,
    }

    pub fn create_engine(config: EngineConfig) -> TestEngine {
        let registry = InMemoryThemeRegistry::new();
        let storage = Arc::new(MemoryStorage::new());
        let engine = ThemeEngine::new(&config, storage.clone(), Arc::new(registry.clone()));
        TestEngine {
            engine,
            registry,
            storage,
        }
    }

    pub async fn add_theme(
        test: &TestEngine,
        name: &str,
        order: i32,
        active: bool,
        template: Option<&str>,
    ) -> Theme {
        let theme = test
            .registry
            .insert(NewTheme::new(name, name).with_order(order).active(active))
            .await
            .unwrap();
        if let Some(body) = template {
            test.storage
                .save(&format!("{name}/templates/x.html"), body.as_bytes())
                .await
                .unwrap();
        }
        theme
    }

    pub async fn resolve_text(test: &TestEngine, principal: Option<&Principal>) -> String {
        let resolved = test
            .engine
            .resolve_template("x.html", principal)
            .await
            .unwrap();
        resolved.as_text().unwrap().to_string()
    }
}

use helpers::*;

#[tokio::test]
async fn test_preview_scenario_a_b() {
    let test = create_engine(EngineConfig::default());
    add_theme(&test, "a", 1, true, Some("A")).await;
    let b = add_theme(&test, "b", 2, false, Some("B")).await;
    let user = Principal::from("editor");

    assert_eq!(resolve_text(&test, Some(&user)).await, "A");

    test.engine.previews().add_preview(&user, b.id).await;
    assert_eq!(resolve_text(&test, Some(&user)).await, "B");

    // Other principals are unaffected by the preview.
    assert_eq!(resolve_text(&test, Some(&Principal::from("visitor"))).await, "A");

    test.engine.previews().stop_all(&user).await;
    assert_eq!(resolve_text(&test, Some(&user)).await, "A");
}

#[tokio::test]
async fn test_higher_order_wins_even_when_registered_later() {
    let test = create_engine(EngineConfig::default());
    add_theme(&test, "first", 1, true, Some("first")).await;
    add_theme(&test, "second", 10, true, Some("second")).await;
    add_theme(&test, "third", 5, true, None).await;

    assert_eq!(resolve_text(&test, None).await, "second");
}

#[tokio::test]
async fn test_equal_order_tie_break_is_registration_order() {
    let test = create_engine(EngineConfig::default());
    add_theme(&test, "early", 3, true, Some("early")).await;
    add_theme(&test, "late", 3, true, Some("late")).await;

    assert_eq!(resolve_text(&test, None).await, "early");

    let candidates = test.engine.candidates("x.html", None).await.unwrap();
    let names: Vec<_> = candidates.iter().map(|c| c.theme_name.as_str()).collect();
    assert_eq!(names, vec!["early", "late"]);
}

#[tokio::test]
async fn test_inactive_themes_are_skipped() {
    let test = create_engine(EngineConfig::default());
    add_theme(&test, "off", 9, false, Some("off")).await;

    assert_matches!(
        test.engine.resolve_template("x.html", None).await,
        Err(ThemeError::TemplateNotFound { .. })
    );
}

#[tokio::test]
async fn test_previewing_principal_always_sees_edits() {
    let test = create_engine(EngineConfig::default());
    let draft = add_theme(&test, "draft", 1, true, Some("v1")).await;
    let user = Principal::from("editor");
    test.engine
        .preview_themes(&user, HashSet::from([draft.id]))
        .await
        .unwrap();

    assert_eq!(resolve_text(&test, Some(&user)).await, "v1");
    test.storage
        .save("draft/templates/x.html", b"v2")
        .await
        .unwrap();
    assert_eq!(resolve_text(&test, Some(&user)).await, "v2");

    // Without a preview the first lookup is cached and may go stale.
    assert_eq!(resolve_text(&test, None).await, "v2");
    test.storage
        .save("draft/templates/x.html", b"v3")
        .await
        .unwrap();
    assert_eq!(resolve_text(&test, None).await, "v2");

    test.engine.reset_template_cache().await;
    assert_eq!(resolve_text(&test, None).await, "v3");
}

#[tokio::test]
async fn test_file_manager_write_under_templates_invalidates_cache() {
    let test = create_engine(EngineConfig::default());
    let theme = add_theme(&test, "a", 1, true, Some("old")).await;
    let user = Principal::from("editor");

    assert_eq!(resolve_text(&test, None).await, "old");
    assert!(!test.engine.resolver().cache().is_empty().await);

    let response = test
        .engine
        .file_manager()
        .execute_command(
            theme.id,
            &user,
            FileManagerCommand::SaveFile {
                path: "templates/x.html".to_string(),
                new_path: None,
                content: "new".to_string(),
            },
        )
        .await;
    assert_matches!(response, FileManagerResponse::Redirect { .. });

    assert_eq!(resolve_text(&test, None).await, "new");
}

#[tokio::test]
async fn test_file_manager_write_outside_templates_keeps_cache() {
    let test = create_engine(EngineConfig::default());
    let theme = add_theme(&test, "a", 1, true, Some("cached")).await;
    let user = Principal::from("editor");

    resolve_text(&test, None).await;
    let generation = test.engine.resolver().cache().generation();

    test.engine
        .file_manager()
        .execute_command(
            theme.id,
            &user,
            FileManagerCommand::CreateFile {
                path: "static/site.css".to_string(),
                content: "body {}".to_string(),
            },
        )
        .await;

    assert_eq!(test.engine.resolver().cache().generation(), generation);
    assert_eq!(test.engine.resolver().cache().len().await, 1);
}

#[tokio::test]
async fn test_traversal_in_template_name_is_rejected() {
    let test = create_engine(EngineConfig::default());
    add_theme(&test, "a", 1, true, Some("A")).await;

    assert_matches!(
        test.engine.resolve_template("../../etc/passwd", None).await,
        Err(ThemeError::InvalidPath { .. })
    );
    assert_matches!(
        test.engine.resolve_template("partials\\..\\x.html", None).await,
        Err(ThemeError::InvalidPath { .. })
    );
}

#[tokio::test]
async fn test_static_resolution_follows_theme_order() {
    let test = create_engine(EngineConfig::default());
    add_theme(&test, "base", 1, true, None).await;
    add_theme(&test, "brand", 2, true, None).await;
    test.storage.save("base/static/logo.svg", b"base").await.unwrap();
    test.storage.save("brand/static/logo.svg", b"brand").await.unwrap();

    let resolved = assert_ok!(test.engine.resolve_static("logo.svg", None).await);
    assert_eq!(resolved.origin.theme_name, "brand");
    assert_err!(test.engine.resolve_static("missing.svg", None).await);
}

#[tokio::test]
async fn test_preview_expires_and_falls_back_to_active() {
    let config = EngineConfig::default().with_preview_ttl(0);
    let test = create_engine(config);
    add_theme(&test, "a", 1, true, Some("A")).await;
    let b = add_theme(&test, "b", 2, false, Some("B")).await;
    let user = Principal::from("editor");

    test.engine.previews().add_preview(&user, b.id).await;
    sleep(Duration::from_millis(10)).await;

    assert_eq!(resolve_text(&test, Some(&user)).await, "A");
}

#[tokio::test]
async fn test_folder_in_higher_theme_does_not_shadow_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let backends: Vec<Arc<dyn StorageAdapter>> = vec![
        Arc::new(MemoryStorage::new()),
        Arc::new(FileSystemStorage::new(dir.path())),
    ];

    for storage in backends {
        let registry = InMemoryThemeRegistry::new();
        registry
            .insert(NewTheme::new("high", "high").with_order(10).active(true))
            .await
            .unwrap();
        registry
            .insert(NewTheme::new("low", "low").with_order(1).active(true))
            .await
            .unwrap();
        storage
            .save("high/templates/page/inner.html", b"HIGH")
            .await
            .unwrap();
        storage.save("low/templates/page", b"LOW").await.unwrap();

        let backend = storage.capabilities().backend;
        let engine = ThemeEngine::new(&EngineConfig::default(), storage, Arc::new(registry));
        let resolved = assert_ok!(engine.resolve_template("page", None).await, "{backend}");
        assert_eq!(resolved.as_text(), Some("LOW"), "{backend}");
        assert_eq!(resolved.origin.theme_name, "low");
    }
}
