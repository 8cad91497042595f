//! Members management: create, rename, delete and session revocation.
//!
//! These tests require a running Plooma server with admin sign-up enabled.
//!
//! Run with: cargo test -p plooma-integration-tests -- --ignored

use plooma_integration_tests::{
    base_url, client, first_id_after, get_page, location, sign_in, sign_up, unique_email,
};
use reqwest::{Client, StatusCode};

/// Id of the user whose card matches `email` on the given role tab.
async fn member_id(admin: &Client, role: &str, email: &str) -> i32 {
    let (status, body) = get_page(admin, &format!("/dashboard/members?role={role}&q={email}")).await;
    assert_eq!(status, StatusCode::OK);
    first_id_after(&body, "action=\"/dashboard/members/").expect("member card")
}

#[tokio::test]
#[ignore = "Requires running Plooma server"]
async fn test_create_rename_and_delete_member() {
    let admin = client();
    sign_up(&admin, "Directory Admin", "admin").await;
    let base = base_url();
    let email = unique_email("created");

    // Missing password is rejected
    let resp = admin
        .post(format!("{base}/dashboard/members"))
        .form(&[
            ("email", email.as_str()),
            ("password", ""),
            ("full_name", "Created Member"),
            ("role", "member"),
        ])
        .send()
        .await
        .expect("Failed to post member");
    assert_eq!(
        location(&resp).as_deref(),
        Some("/dashboard/members?role=member&error=missing_fields")
    );

    let resp = admin
        .post(format!("{base}/dashboard/members"))
        .form(&[
            ("email", email.as_str()),
            ("password", "secret123"),
            ("full_name", "Created Member"),
            ("role", "member"),
        ])
        .send()
        .await
        .expect("Failed to create member");
    assert_eq!(
        location(&resp).as_deref(),
        Some("/dashboard/members?role=member&success=user_created")
    );

    let (_, body) = get_page(&admin, &format!("/dashboard/members?role=member&q={email}")).await;
    assert!(body.contains("Created Member"));
    let id = member_id(&admin, "member", &email).await;

    // Rename
    let resp = admin
        .post(format!("{base}/dashboard/members/{id}"))
        .form(&[("full_name", "Renamed Member"), ("role", "member")])
        .send()
        .await
        .expect("Failed to rename member");
    assert_eq!(
        location(&resp).as_deref(),
        Some("/dashboard/members?role=member&success=user_updated")
    );
    let (_, body) = get_page(&admin, &format!("/dashboard/members?role=member&q={email}")).await;
    assert!(body.contains("Renamed Member"));

    // Blank names are rejected
    let resp = admin
        .post(format!("{base}/dashboard/members/{id}"))
        .form(&[("full_name", "   "), ("role", "member")])
        .send()
        .await
        .expect("Failed to post rename");
    assert!(location(&resp).is_some_and(|l| l.contains("error=missing_fields")));

    // Delete
    let resp = admin
        .post(format!("{base}/dashboard/members/{id}/delete"))
        .form(&[("role", "member")])
        .send()
        .await
        .expect("Failed to delete member");
    assert_eq!(
        location(&resp).as_deref(),
        Some("/dashboard/members?role=member&success=user_deleted")
    );
    let (_, body) = get_page(&admin, &format!("/dashboard/members?role=member&q={email}")).await;
    assert!(!body.contains("Renamed Member"));
}

#[tokio::test]
#[ignore = "Requires running Plooma server"]
async fn test_admin_rename_self_updates_header() {
    let admin = client();
    let email = sign_up(&admin, "Self Rename Admin", "admin").await;
    let id = member_id(&admin, "admin", &email).await;

    let resp = admin
        .post(format!("{}/dashboard/members/{id}", base_url()))
        .form(&[("full_name", "Freshly Renamed Admin"), ("role", "admin")])
        .send()
        .await
        .expect("Failed to rename self");
    assert!(location(&resp).is_some_and(|l| l.contains("success=user_updated")));

    let (status, body) = get_page(&admin, "/dashboard/admin").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Freshly Renamed Admin"));
}

#[tokio::test]
#[ignore = "Requires running Plooma server"]
async fn test_admin_cannot_delete_self() {
    let admin = client();
    let email = sign_up(&admin, "Careful Admin", "admin").await;
    let id = member_id(&admin, "admin", &email).await;

    let resp = admin
        .post(format!("{}/dashboard/members/{id}/delete", base_url()))
        .form(&[("role", "admin")])
        .send()
        .await
        .expect("Failed to post delete");
    let target = location(&resp).expect("redirect");
    assert_eq!(target, "/dashboard/members?role=admin&error=self_delete");

    let (_, body) = get_page(&admin, &target).await;
    assert!(body.contains("You cannot delete your own account."));
    assert!(body.contains("Careful Admin"));
}

#[tokio::test]
#[ignore = "Requires running Plooma server"]
async fn test_deleted_admin_loses_access_immediately() {
    let admin = client();
    sign_up(&admin, "Deleting Admin", "admin").await;
    let doomed = client();
    let doomed_email = sign_up(&doomed, "Doomed Admin", "admin").await;

    let (status, _) = get_page(&doomed, "/dashboard/admin").await;
    assert_eq!(status, StatusCode::OK);

    let id = member_id(&admin, "admin", &doomed_email).await;
    let resp = admin
        .post(format!("{}/dashboard/members/{id}/delete", base_url()))
        .form(&[("role", "admin")])
        .send()
        .await
        .expect("Failed to delete admin");
    assert!(location(&resp).is_some_and(|l| l.contains("success=user_deleted")));

    // The old session no longer grants anything
    let resp = doomed
        .get(format!("{}/dashboard/admin", base_url()))
        .send()
        .await
        .expect("Failed to fetch page");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&resp).as_deref(),
        Some("/signin?next=%2Fdashboard%2Fadmin")
    );

    let resp = doomed
        .post(format!("{}/dashboard/projects", base_url()))
        .form(&[("name", "Ghost project"), ("description", "")])
        .send()
        .await
        .expect("Failed to post project");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).is_some_and(|l| l.starts_with("/signin")));
}

#[tokio::test]
#[ignore = "Requires running Plooma server"]
async fn test_created_member_can_sign_in() {
    let admin = client();
    sign_up(&admin, "Inviting Admin", "admin").await;
    let email = unique_email("invited");

    let resp = admin
        .post(format!("{}/dashboard/members", base_url()))
        .form(&[
            ("email", email.as_str()),
            ("password", "secret123"),
            ("full_name", "Invited Member"),
            ("role", "member"),
        ])
        .send()
        .await
        .expect("Failed to create member");
    assert!(location(&resp).is_some_and(|l| l.contains("success=user_created")));

    let invited = client();
    sign_in(&invited, &email).await;
    let (status, body) = get_page(&invited, "/dashboard/member").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Invited Member"));
}
