use std::sync::Arc;
use std::time::Duration;

use auditscope_core::{AppError, CallerRole};
use auditscope_domain::PageWindowItem;

use crate::test_support::{FakeAuditLogBackend, page_size};
use crate::{AccessStatus, CachePolicy, ViewState};

use super::{AuditLogViewer, ViewerConfig};

fn viewer(backend: &Arc<FakeAuditLogBackend>) -> AuditLogViewer {
    AuditLogViewer::new(backend.clone(), ViewerConfig::default())
}

fn first_principal(view: &ViewState) -> Option<&str> {
    match view {
        ViewState::DataReady { entries, .. } => {
            entries.first().map(|entry| entry.principal.as_str())
        }
        _ => None,
    }
}

#[tokio::test]
async fn non_admin_callers_never_trigger_page_fetches() {
    for role in ["", "Admin", "guest", "auditor"] {
        let backend = FakeAuditLogBackend::with_role(role, 23);
        let viewer = viewer(&backend);

        let view = viewer.start().await;

        assert_eq!(
            view,
            ViewState::RoleDenied {
                role: CallerRole::new(role)
            }
        );
        assert!(matches!(
            viewer.load_current_page().await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(viewer.refetch().await, Err(AppError::Forbidden(_))));
        assert!(backend.page_calls().await.is_empty());
    }
}

#[tokio::test]
async fn role_check_failure_is_terminal() {
    let backend = FakeAuditLogBackend::failing_role("canister trapped");
    let viewer = viewer(&backend);

    let view = viewer.start().await;
    let again = viewer.start().await;

    assert!(matches!(view, ViewState::RoleError { .. }));
    assert!(!view.offers_retry());
    assert_eq!(view, again);
    assert_eq!(backend.role_calls(), 1);
    assert!(backend.page_calls().await.is_empty());
}

#[tokio::test]
async fn no_page_is_fetched_before_the_role_resolves() {
    let backend = FakeAuditLogBackend::admin(23);
    backend.hold_role().await;
    let viewer = viewer(&backend);

    let (view, ()) = tokio::join!(viewer.start(), async {
        assert_eq!(viewer.view(), ViewState::RoleLoading { skeleton_rows: 10 });
        assert!(matches!(
            viewer.load_current_page().await,
            Err(AppError::Forbidden(_))
        ));
        assert!(backend.page_calls().await.is_empty());
        backend.release_role().await;
    });

    assert!(matches!(view, ViewState::DataReady { .. }));
    assert_eq!(backend.page_calls().await, vec![0]);
}

#[tokio::test]
async fn browsing_twenty_three_entries_in_pages_of_ten() {
    let backend = FakeAuditLogBackend::admin(23);
    let viewer = viewer(&backend);

    let first = viewer.start().await;
    assert!(matches!(
        first,
        ViewState::DataReady {
            total: 23,
            total_pages: 3,
            current_page: 1,
            ..
        }
    ));
    assert_eq!(viewer.total_pages(), 3);

    assert!(matches!(viewer.go_to_page(4), Err(AppError::Validation(_))));
    assert!(matches!(viewer.go_to_page(0), Err(AppError::Validation(_))));
    assert_eq!(viewer.current_page(), 1);

    let last = viewer.navigate(3).await;
    assert!(last.is_ok());

    let view = viewer.view();
    let ViewState::DataReady {
        entries,
        current_page,
        pagination,
        ..
    } = &view
    else {
        unreachable!("expected ready view, got {view:?}");
    };
    assert_eq!(*current_page, 3);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].principal, "principal-20");
    let pagination = pagination.clone().unwrap_or_else(|| unreachable!());
    assert_eq!(pagination.window.last(), Some(&PageWindowItem::Page(3)));
    assert_eq!(
        view.summary().as_deref(),
        Some("23 total entries — Page 3 of 3")
    );
    assert_eq!(backend.page_calls().await, vec![0, 2]);
}

#[tokio::test]
async fn empty_log_shows_empty_state_without_pagination() {
    let backend = FakeAuditLogBackend::admin(0);
    let viewer = viewer(&backend);

    let view = viewer.start().await;

    assert!(matches!(view, ViewState::DataEmpty { total: 0, .. }));
    assert!(view.pagination().is_none());
    assert!(viewer.next_page().is_err());
}

#[tokio::test]
async fn late_response_for_previous_page_does_not_replace_current_page() {
    let backend = FakeAuditLogBackend::admin(50);
    let viewer = viewer(&backend);
    viewer.start().await;

    backend.hold_page(1).await;
    backend.hold_page(2).await;

    assert!(viewer.go_to_page(2).is_ok());
    let page_two = tokio::spawn({
        let viewer = viewer.clone();
        async move { viewer.load_current_page().await }
    });
    tokio::task::yield_now().await;

    assert!(viewer.go_to_page(3).is_ok());
    let (page_three, ()) = tokio::join!(viewer.load_current_page(), backend.release_page(2));
    assert!(page_three.is_ok());
    assert_eq!(first_principal(&viewer.view()), Some("principal-20"));

    backend.release_page(1).await;
    let page_two = page_two.await.unwrap_or_else(|_| unreachable!());
    assert!(page_two.is_ok());

    let view = viewer.view();
    assert_eq!(viewer.current_page(), 3);
    assert_eq!(first_principal(&view), Some("principal-20"));
}

#[tokio::test]
async fn rapid_refresh_clicks_issue_one_request() {
    let backend = FakeAuditLogBackend::admin(23);
    let viewer = viewer(&backend);
    viewer.start().await;

    backend.hold_page(0).await;
    let (first, second, third, ()) = tokio::join!(
        viewer.refetch(),
        viewer.refetch(),
        viewer.refetch(),
        async {
            let view = viewer.view();
            assert!(matches!(view, ViewState::DataReady { .. }));
            assert!(view.is_refreshing());
            backend.release_page(0).await;
        }
    );

    assert!(first.is_ok() && second.is_ok() && third.is_ok());
    assert!(!viewer.view().is_refreshing());
    assert_eq!(backend.page_calls().await, vec![0, 0]);
}

#[tokio::test]
async fn fetch_failure_is_recoverable_without_rechecking_access() {
    let backend = FakeAuditLogBackend::admin(23);
    backend.fail_page(0).await;
    let viewer = viewer(&backend);

    let view = viewer.start().await;
    assert!(view.offers_retry());
    assert_eq!(view.headline(), "Failed to load audit log");

    for _ in 0..3 {
        let retried = viewer.refetch().await;
        assert!(retried.is_ok());
        assert!(viewer.view().offers_retry());
    }

    backend.recover_page(0).await;
    let recovered = viewer.refetch().await;
    assert!(recovered.is_ok());
    assert!(matches!(viewer.view(), ViewState::DataReady { .. }));
    assert_eq!(backend.role_calls(), 1);
    assert!(viewer.access_status().is_confirmed());
}

#[tokio::test]
async fn previous_and_next_stop_at_the_bounds() {
    let backend = FakeAuditLogBackend::admin(23);
    let viewer = viewer(&backend);
    viewer.start().await;

    assert!(viewer.previous_page().is_err());
    assert!(viewer.next_page().is_ok());
    assert!(viewer.next_page().is_ok());
    assert!(viewer.next_page().is_err());
    assert_eq!(viewer.current_page(), 3);
    assert!(viewer.previous_page().is_ok());
    assert_eq!(viewer.current_page(), 2);
}

#[tokio::test]
async fn navigating_shows_loading_until_the_new_page_arrives() {
    let backend = FakeAuditLogBackend::admin(23);
    let viewer = viewer(&backend);
    viewer.start().await;

    assert!(viewer.go_to_page(2).is_ok());

    assert!(matches!(
        viewer.view(),
        ViewState::DataLoading {
            current_page: 2,
            ..
        }
    ));
}

#[tokio::test]
async fn reconfiguring_page_size_resets_to_first_page_and_keeps_access() {
    let backend = FakeAuditLogBackend::admin(23);
    let viewer = viewer(&backend);
    viewer.start().await;
    assert!(viewer.navigate(2).await.is_ok());

    let resized = viewer.reconfigure(page_size(5));
    assert_eq!(resized.current_page(), 1);
    assert_eq!(resized.page_size(), page_size(5));
    assert!(matches!(resized.view(), ViewState::DataLoading { .. }));

    let view = resized.start().await;

    assert!(matches!(
        view,
        ViewState::DataReady {
            total_pages: 5,
            ..
        }
    ));
    assert_eq!(backend.role_calls(), 1);
    assert_eq!(viewer.current_page(), 2);
}

#[tokio::test]
async fn strict_cache_policy_shows_loading_on_revisit() {
    let backend = FakeAuditLogBackend::admin(23);
    let viewer = AuditLogViewer::new(
        backend.clone(),
        ViewerConfig {
            page_size: page_size(10),
            cache_policy: CachePolicy {
                stale_after: Duration::ZERO,
                stale_while_revalidate: false,
            },
        },
    );
    viewer.start().await;
    assert!(viewer.navigate(2).await.is_ok());
    assert!(viewer.go_to_page(1).is_ok());

    backend.hold_page(0).await;
    let (revisited, ()) = tokio::join!(viewer.load_current_page(), async {
        assert!(matches!(viewer.view(), ViewState::DataLoading { .. }));
        backend.release_page(0).await;
    });

    assert!(revisited.is_ok());
    assert!(matches!(viewer.view(), ViewState::DataReady { .. }));
    assert_eq!(
        viewer.access_status(),
        AccessStatus::Confirmed {
            role: CallerRole::new("admin")
        }
    );
}

#[tokio::test]
async fn navigating_back_to_a_seen_page_shows_it_without_waiting() {
    let backend = FakeAuditLogBackend::admin(23);
    let viewer = viewer(&backend);
    viewer.start().await;
    assert!(viewer.navigate(2).await.is_ok());

    backend.hold_page(0).await;
    let revisited = tokio::time::timeout(Duration::from_secs(1), viewer.navigate(1))
        .await
        .unwrap_or_else(|_| unreachable!("seen page waited for the backend"));

    assert!(revisited.is_ok());
    let view = viewer.view();
    assert!(view.is_refreshing());
    assert_eq!(first_principal(&view), Some("principal-0"));

    let (settled, ()) = tokio::join!(viewer.refetch(), backend.release_page(0));
    assert!(settled.is_ok());
    assert!(!viewer.view().is_refreshing());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn view_pairs_entries_with_their_own_page_number() {
    let backend = FakeAuditLogBackend::admin(23);
    let viewer = viewer(&backend);
    viewer.start().await;
    assert!(viewer.navigate(2).await.is_ok());

    let navigator = tokio::spawn({
        let viewer = viewer.clone();
        async move {
            for round in 0..2_000_u64 {
                let _ = viewer.go_to_page(1 + round % 2);
                tokio::task::yield_now().await;
            }
        }
    });

    for _ in 0..2_000 {
        let view = viewer.view();
        let ViewState::DataReady {
            entries,
            current_page,
            ..
        } = &view
        else {
            unreachable!("both pages are cached, got {view:?}");
        };
        let expected = format!("principal-{}", (current_page - 1) * 10);
        assert_eq!(entries[0].principal, expected);
        tokio::task::yield_now().await;
    }

    navigator.await.unwrap_or_else(|_| unreachable!());
}
