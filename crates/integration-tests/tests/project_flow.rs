//! Project, task, status, comment, assignee and delete flow.
//!
//! These tests require a running Plooma server with admin sign-up enabled.
//!
//! Run with: cargo test -p plooma-integration-tests -- --ignored

use plooma_core::TaskStatus;
use plooma_integration_tests::{base_url, client, first_id_after, get_page, location, sign_up};
use reqwest::StatusCode;
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running Plooma server"]
async fn test_project_task_lifecycle() {
    let admin = client();
    sign_up(&admin, "Flow Admin", "admin").await;
    let base = base_url();
    let token = Uuid::new_v4().simple().to_string();
    let name = format!("Flow {token}");

    // Create project
    let resp = admin
        .post(format!("{base}/dashboard/projects"))
        .form(&[
            ("name", name.as_str()),
            ("description", "Created by integration tests"),
            ("due_date", "2030-01-31"),
        ])
        .send()
        .await
        .expect("Failed to create project");
    assert_eq!(
        location(&resp).as_deref(),
        Some("/dashboard/projects?success=project_created")
    );

    let (status, body) = get_page(&admin, &format!("/dashboard/projects?q={token}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&name));
    let project_id =
        first_id_after(&body, "href=\"/dashboard/projects/").expect("project link on card");

    // Blank task titles are rejected
    let resp = admin
        .post(format!("{base}/dashboard/projects/{project_id}/tasks"))
        .form(&[("title", "  ")])
        .send()
        .await
        .expect("Failed to post task");
    assert!(location(&resp).is_some_and(|l| l.contains("error=task_title")));

    // Create task
    let resp = admin
        .post(format!("{base}/dashboard/projects/{project_id}/tasks"))
        .form(&[
            ("title", "Write integration test"),
            ("description", "Exercise the board"),
            ("priority", "high"),
            ("category", "QA"),
        ])
        .send()
        .await
        .expect("Failed to create task");
    assert!(location(&resp).is_some_and(|l| l.contains("success=task_created")));

    let board = format!("/dashboard/projects/{project_id}");
    let (status, body) = get_page(&admin, &board).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Write integration test"));
    assert!(body.contains("0 / 1 Completed"));
    let task_id = first_id_after(&body, "action=\"/dashboard/tasks/").expect("task form");

    // Move it to done
    let resp = admin
        .post(format!("{base}/dashboard/tasks/{task_id}/status"))
        .form(&[("status", TaskStatus::Done.as_str())])
        .send()
        .await
        .expect("Failed to update status");
    assert_eq!(
        location(&resp),
        Some(format!("{board}?success=status_updated"))
    );

    // Comment on it
    let resp = admin
        .post(format!("{base}/dashboard/tasks/{task_id}/comments"))
        .form(&[("content", "Looks good to me")])
        .send()
        .await
        .expect("Failed to add comment");
    assert_eq!(
        location(&resp),
        Some(format!("{board}?success=comment_added"))
    );

    let (_, body) = get_page(&admin, &format!("{board}?tab=Completed")).await;
    assert!(body.contains("1 / 1 Completed"));
    assert!(body.contains("Looks good to me"));

    // Reassign it to a member
    let member = client();
    let member_email = sign_up(&member, "Flow Member", "member").await;
    let (_, body) = get_page(
        &admin,
        &format!("/dashboard/members?role=member&q={member_email}"),
    )
    .await;
    let member_id = first_id_after(&body, "action=\"/dashboard/members/").expect("member card");
    let member_id = member_id.to_string();

    let resp = admin
        .post(format!("{base}/dashboard/tasks/{task_id}/assignee"))
        .form(&[("assigned_to", member_id.as_str()), ("next", board.as_str())])
        .send()
        .await
        .expect("Failed to reassign task");
    assert_eq!(
        location(&resp),
        Some(format!("{board}?success=assignee_updated"))
    );

    let (status, body) = get_page(&member, "/dashboard/member").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Write integration test"));

    // Members may not reassign or delete
    let resp = member
        .post(format!("{base}/dashboard/tasks/{task_id}/assignee"))
        .form(&[("assigned_to", ""), ("next", board.as_str())])
        .send()
        .await
        .expect("Failed to post assignee");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = member
        .post(format!("{base}/dashboard/tasks/{task_id}/delete"))
        .form(&[("next", board.as_str())])
        .send()
        .await
        .expect("Failed to post task delete");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Delete the task
    let resp = admin
        .post(format!("{base}/dashboard/tasks/{task_id}/delete"))
        .form(&[("next", board.as_str())])
        .send()
        .await
        .expect("Failed to delete task");
    assert_eq!(
        location(&resp),
        Some(format!("{board}?success=task_deleted"))
    );

    let (_, body) = get_page(&admin, &format!("{board}?success=task_deleted")).await;
    assert!(!body.contains("Write integration test"));
    assert!(body.contains("Task deleted successfully."));

    // Delete the project, cascading to its task
    let resp = admin
        .post(format!("{base}/dashboard/projects/{project_id}/delete"))
        .send()
        .await
        .expect("Failed to delete project");
    assert_eq!(
        location(&resp).as_deref(),
        Some("/dashboard/projects?success=project_deleted")
    );

    let (status, _) = get_page(&admin, &board).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
