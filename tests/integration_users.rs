mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    authed_json_request, authed_request, body_json, create_test_user, get_auth_token,
    setup_test_app, unique_username,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "./migrations")]
async fn test_get_profile(pool: PgPool) {
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users/profile", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Profile retrieved successfully");
    assert_eq!(body["data"]["email"], user.email);
    assert!(body["data"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_requires_token(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/users/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Access token required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_rejects_garbage_token(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users/profile", "not-a-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_profile_partial_touches_only_sent_fields(pool: PgPool) {
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/profile",
            &token,
            json!({ "full_name": "New Name" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["data"]["full_name"], "New Name");
    // Untouched fields survive.
    assert_eq!(body["data"]["username"], user.username);
    assert_eq!(body["data"]["email"], user.email);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_profile_empty_body_rejected(pool: PgPool) {
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/profile",
            &token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "No fields to update");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_profile_duplicate_username_conflicts(pool: PgPool) {
    let user = create_test_user(&pool, "user", "active").await;
    let other = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/profile",
            &token,
            json!({ "username": other.username }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Username or email already exists");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_profile_empty_phone_clears_it(pool: PgPool) {
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/profile",
            &token,
            json!({ "phone": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["data"]["phone"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_change_password_flow(pool: PgPool) {
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/change-password",
            &token,
            json!({
                "currentPassword": user.password,
                "newPassword": "newpass123",
                "confirmPassword": "newpass123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Password changed successfully");

    // Old password no longer works, new one does.
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(common::json_request(
            "POST",
            "/api/users/login",
            json!({ "email": user.email, "password": user.password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    get_auth_token(setup_test_app(pool.clone()), &user.email, "newpass123").await;
}

#[sqlx::test(migrations = "./migrations")]
async fn test_change_password_wrong_current(pool: PgPool) {
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/change-password",
            &token,
            json!({
                "currentPassword": "wrong-password",
                "newPassword": "newpass123",
                "confirmPassword": "newpass123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Current password is incorrect");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_change_password_mismatched_confirmation(pool: PgPool) {
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/change-password",
            &token,
            json!({
                "currentPassword": user.password,
                "newPassword": "newpass123",
                "confirmPassword": "different123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_requires_admin(pool: PgPool) {
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Admin access required");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_pagination_envelope(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    for _ in 0..14 {
        create_test_user(&pool, "user", "active").await;
    }
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users?page=2&limit=5", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Users retrieved successfully");
    assert_eq!(body["data"]["data"].as_array().unwrap().len(), 5);

    let meta = &body["data"]["pagination"];
    assert_eq!(meta["currentPage"], 2);
    assert_eq!(meta["itemsPerPage"], 5);
    assert_eq!(meta["totalItems"], 15);
    assert_eq!(meta["totalPages"], 3);
    assert_eq!(meta["hasNextPage"], true);
    assert_eq!(meta["hasPrevPage"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_search(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let needle = create_test_user(&pool, "user", "active").await;
    create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request(
            "GET",
            &format!("/api/users?q={}", needle.username),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let rows = body["data"]["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["username"], needle.username);
    assert_eq!(body["data"]["search"], needle.username);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_filter_by_status(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    create_test_user(&pool, "user", "inactive").await;
    create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users?status=inactive", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let rows = body["data"]["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "inactive");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_unknown_filter_value_is_dropped(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    // "superuser" is not an allowed role value; the filter is ignored.
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users?role=superuser", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["totalItems"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_invalid_sort_rejected(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users?sort=password", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Invalid sort field"));
    assert!(message.contains("created_at"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_limit_is_clamped(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users?limit=500", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["itemsPerPage"], 50);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_zero_page_rejected(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users?page=0", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Page must be greater than 0");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_extreme_page_rejected(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request(
            "GET",
            "/api/users?page=9223372036854775807",
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Page is out of range");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_users_non_numeric_page_falls_back_to_default(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users?page=abc&limit=ten", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["currentPage"], 1);
    assert_eq!(body["data"]["pagination"]["itemsPerPage"], 10);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_get_user(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request(
            "GET",
            &format!("/api/users/{}", user.id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "User retrieved successfully");
    assert_eq!(body["data"]["id"], user.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_get_missing_user_404(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users/999999", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["message"], "User not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_promotes_user(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            &format!("/api/users/{}", user.id),
            &token,
            json!({ "role": "admin" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "User updated successfully");
    assert_eq!(body["data"]["role"], "admin");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_deactivation_locks_out_on_next_request(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let user = create_test_user(&pool, "user", "active").await;

    let user_token =
        get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;
    let admin_token =
        get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            &format!("/api/users/{}", user.id),
            &admin_token,
            json!({ "status": "inactive" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The user's still-valid token stops working immediately.
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("GET", "/api/users/profile", &user_token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["message"], "User account is inactive");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_update_missing_user_404(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/999999",
            &token,
            json!({ "full_name": "Ghost" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_is_logical(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/users/{}", user.id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["message"], "User deleted successfully");

    // Row survives with status flipped.
    let status: String = sqlx::query_scalar("SELECT status::text FROM users WHERE id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "inactive");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_cannot_delete_self(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/users/{}", admin.id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Cannot delete your own account");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_missing_user_404(pool: PgPool) {
    let admin = create_test_user(&pool, "admin", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &admin.email, &admin.password).await;

    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_request("DELETE", "/api/users/999999", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_route_is_enveloped_404(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_profile_changes_username(pool: PgPool) {
    let user = create_test_user(&pool, "user", "active").await;
    let token = get_auth_token(setup_test_app(pool.clone()), &user.email, &user.password).await;

    let new_name = unique_username();
    let app = setup_test_app(pool.clone());
    let response = app
        .oneshot(authed_json_request(
            "PUT",
            "/api/users/profile",
            &token,
            json!({ "username": new_name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], new_name);
}
