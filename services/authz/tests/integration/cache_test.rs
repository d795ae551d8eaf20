use warden_authz::domain::repository::{
    PermissionRepository, RolePermissionRepository, RoleRepository, UserRoleRepository,
};
use warden_authz::error::AuthzError;
use warden_authz::infra::keys::KeyFamily;
use warden_authz::usecase::permission::{
    CreatePermissionInput, CreatePermissionUseCase, UpdatePermissionInput, UpdatePermissionUseCase,
};
use warden_authz::usecase::role::{DeleteRoleUseCase, UpdateRoleInput, UpdateRoleUseCase};
use warden_authz::usecase::user_role::{CreateOrUpdateUserRoleUseCase, DeleteUserRoleUseCase};
use warden_core::context::RequestContext;

use crate::helpers::{Harness, glob_match};

#[test]
fn should_match_family_patterns() {
    assert!(glob_match("test:role:find-by-id:*", "test:role:find-by-id:abc"));
    assert!(!glob_match("test:role:find-by-id:*", "test:role-permission:x"));
    assert!(glob_match("a*c*e", "abcde"));
    assert!(!glob_match("a*c", "abcd"));
}

#[tokio::test]
async fn should_serve_second_read_from_cache() {
    let h = Harness::new();
    let permission = h.store.seed_permission("report.read");
    let ctx = RequestContext::background();
    let repo = h.permissions();

    let first = repo.find_by_name(&ctx, "report.read").await.unwrap();
    let calls = h.store.calls();
    let second = repo.find_by_name(&ctx, "report.read").await.unwrap();

    assert_eq!(first, Some(permission.clone()));
    assert_eq!(second, Some(permission));
    assert_eq!(h.store.calls(), calls, "second read must not reach the store");
}

#[tokio::test]
async fn should_not_cache_absent_rows() {
    let h = Harness::new();
    let ctx = RequestContext::background();

    let found = h.permissions().find_by_name(&ctx, "ghost").await.unwrap();

    assert!(found.is_none());
    assert_eq!(h.cache.len(), 0);
}

#[tokio::test]
async fn should_fall_back_to_store_when_cache_read_fails() {
    let h = Harness::new();
    let role = h.store.seed_role("Viewer", &[]);
    h.cache.fail_reads(true);

    let found = h
        .roles()
        .find_by_id(&RequestContext::background(), role.id)
        .await
        .unwrap();

    assert_eq!(found.map(|r| r.id), Some(role.id));
}

#[tokio::test]
async fn should_reload_when_snapshot_is_unreadable() {
    let h = Harness::new();
    let user = h.store.seed_user("corrupt@example.com");
    let role = h.store.seed_role("Viewer", &[]);
    let binding = h.store.bind(user.id, role.id);
    let key = h.keys().user_role_by_user_id(0, user.id);
    h.cache.insert_raw(&key, b"{not json");

    let found = h
        .user_roles()
        .find_by_user_id(&RequestContext::background(), user.id)
        .await
        .unwrap();

    assert_eq!(found, Some(binding));
    assert!(h.store.calls() > 0);
}

#[tokio::test]
async fn should_cache_role_permission_pairs() {
    let h = Harness::new();
    let permission = h.store.seed_permission("report.read");
    let role = h.store.seed_role("Viewer", &[permission.clone()]);
    let ctx = RequestContext::background();

    let pair = h
        .role_permissions()
        .find_by_pair(&ctx, role.id, permission.id)
        .await
        .unwrap()
        .expect("pair should exist");

    assert_eq!(pair.role_id, role.id);
    assert!(
        h.cache
            .contains(&h.keys().role_permission_by_pair(0, role.id, permission.id))
    );
}

#[tokio::test]
async fn should_invalidate_role_families_on_role_mutations() {
    let h = Harness::new();
    let keys = h.keys();
    let permission = h.store.seed_permission("report.read");
    let role = h.store.seed_role("Viewer", &[]);
    let ctx = RequestContext::background();

    UpdateRoleUseCase {
        roles: h.roles(),
        permissions: h.permissions(),
    }
    .execute(
        &ctx,
        UpdateRoleInput {
            role_id: role.id,
            name: Some("Reader".to_owned()),
            permission_ids: Some(vec![permission.id]),
        },
    )
    .await
    .unwrap();
    assert_eq!(
        h.cache.take_removed(),
        vec![keys.pattern(KeyFamily::Role), keys.pattern(KeyFamily::RolePermission)]
    );

    DeleteRoleUseCase { roles: h.roles() }
        .execute(&ctx, role.id)
        .await
        .unwrap();
    assert_eq!(
        h.cache.take_removed(),
        vec![keys.pattern(KeyFamily::Role), keys.pattern(KeyFamily::RolePermission)]
    );
}

#[tokio::test]
async fn should_invalidate_permission_families_on_permission_mutations() {
    let h = Harness::new();
    let keys = h.keys();
    let ctx = RequestContext::background();

    let created = CreatePermissionUseCase {
        permissions: h.permissions(),
    }
    .execute(
        &ctx,
        CreatePermissionInput {
            name: "invoice.read".to_owned(),
            label: "Read invoices".to_owned(),
        },
    )
    .await
    .unwrap();
    assert_eq!(h.cache.take_removed(), vec![keys.pattern(KeyFamily::Permission)]);

    UpdatePermissionUseCase {
        permissions: h.permissions(),
    }
    .execute(
        &ctx,
        UpdatePermissionInput {
            permission_id: created.id,
            name: None,
            label: Some("View invoices".to_owned()),
        },
    )
    .await
    .unwrap();
    assert_eq!(
        h.cache.take_removed(),
        vec![keys.pattern(KeyFamily::Permission), keys.pattern(KeyFamily::Role)]
    );
}

#[tokio::test]
async fn should_invalidate_user_role_family_on_every_binding_path() {
    let h = Harness::new();
    let keys = h.keys();
    let first = h.store.seed_role("First", &[]);
    let second = h.store.seed_role("Second", &[]);
    let user = h.store.seed_user("bound@example.com");
    let ctx = RequestContext::background();
    let assign = CreateOrUpdateUserRoleUseCase {
        user_roles: h.user_roles(),
        roles: h.roles(),
    };

    assign.execute(&ctx, user.id, first.id).await.unwrap();
    let removed = h.cache.take_removed();
    assert!(removed.contains(&keys.pattern(KeyFamily::UserRole)), "create path: {removed:?}");

    assign.execute(&ctx, user.id, second.id).await.unwrap();
    let removed = h.cache.take_removed();
    assert!(removed.contains(&keys.pattern(KeyFamily::UserRole)), "update path: {removed:?}");

    DeleteUserRoleUseCase {
        user_roles: h.user_roles(),
    }
    .execute(&ctx, user.id)
    .await
    .unwrap();
    assert_eq!(h.cache.take_removed(), vec![keys.pattern(KeyFamily::UserRole)]);
}

#[tokio::test]
async fn should_refresh_embedded_permission_after_rename() {
    let h = Harness::new();
    let permission = h.store.seed_permission("doc.read");
    let role = h.store.seed_role("Reader", &[permission.clone()]);
    let ctx = RequestContext::background();

    let cached = h.roles().find_by_id(&ctx, role.id).await.unwrap().unwrap();
    assert_eq!(cached.permissions[0].permission.name, "doc.read");

    UpdatePermissionUseCase {
        permissions: h.permissions(),
    }
    .execute(
        &ctx,
        UpdatePermissionInput {
            permission_id: permission.id,
            name: Some("document.read".to_owned()),
            label: None,
        },
    )
    .await
    .unwrap();

    let fresh = h.roles().find_by_id(&ctx, role.id).await.unwrap().unwrap();
    assert_eq!(fresh.permissions[0].permission.name, "document.read");
}

#[tokio::test]
async fn should_fail_write_when_invalidation_fails() {
    let h = Harness::new();
    let role = h.store.seed_role("Viewer", &[]);
    let ctx = RequestContext::background();
    h.cache.fail_removes(true);

    let mut current = h.roles().find_by_id(&ctx, role.id).await.unwrap().unwrap();
    let patch = warden_authz::domain::change::RolePatch {
        name: Some("Renamed".to_owned()),
        permission_ids: None,
    };
    let result = h.roles().update(&ctx, &mut current, &patch).await;

    assert!(
        matches!(result, Err(AuthzError::Internal(_))),
        "expected Internal, got {result:?}"
    );
    // The store committed before invalidation was attempted.
    assert_eq!(h.store.stored_role(role.id).unwrap().name, "Renamed");
}

#[tokio::test]
async fn should_not_restore_snapshot_loaded_before_a_concurrent_write() {
    let h = Harness::new();
    let keys = h.keys();
    let p1 = h.store.seed_permission("article.read");
    let p3 = h.store.seed_permission("article.publish");
    let role = h.store.seed_role("Editor", &[p1.clone()]);
    let ctx = RequestContext::background();

    // The reader misses and loads the old set; a writer replaces it and
    // invalidates before the reader gets to populate.
    let (harness, writer_ctx, role_id, p3_id) = (&h, &ctx, role.id, p3.id);
    let loaded = h
        .layer()
        .read_through(
            &ctx,
            KeyFamily::Role,
            |g| keys.role_by_id(g, role_id),
            move || async move {
                let stale = harness.store.stored_role(role_id);
                UpdateRoleUseCase {
                    roles: harness.roles(),
                    permissions: harness.permissions(),
                }
                .execute(
                    writer_ctx,
                    UpdateRoleInput {
                        role_id,
                        name: None,
                        permission_ids: Some(vec![p3_id]),
                    },
                )
                .await?;
                Ok::<_, AuthzError>(stale)
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.permissions[0].permission.id, p1.id);
    // The late fill landed under the retired generation.
    assert!(h.cache.contains(&keys.role_by_id(0, role.id)));

    let fresh = h.roles().find_by_id(&ctx, role.id).await.unwrap().unwrap();
    let ids: Vec<_> = fresh.permissions.iter().map(|g| g.permission.id).collect();
    assert_eq!(ids, vec![p3.id]);
}

#[tokio::test]
async fn should_bypass_cache_when_generation_is_unreadable() {
    let h = Harness::new();
    let keys = h.keys();
    let role = h.store.seed_role("Viewer", &[]);
    h.cache
        .insert_raw(&keys.generation(KeyFamily::Role), b"not-a-number");
    let ctx = RequestContext::background();

    let found = h.roles().find_by_id(&ctx, role.id).await.unwrap();

    assert_eq!(found.map(|r| r.id), Some(role.id));
    assert_eq!(h.cache.len(), 1, "nothing but the counter is stored");
}
