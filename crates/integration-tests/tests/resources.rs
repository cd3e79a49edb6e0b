//! Resource services against the fake API.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use secrecy::SecretString;
use taskboard_client::{
    AlertService, ClientError, ProjectService, SessionStore, TaskService, UserService,
};
use taskboard_core::{
    AlertId, Email, NewAlert, NewTask, NewUser, ProjectId, ProjectInput, ProjectTasks, Role,
    TaskId, TaskStatus, TaskUpdate, UserId, UserUpdate,
};
use taskboard_integration_tests::{ADMIN, ANA, FakeApi, MIGRATION_PROJECT, SeedUser};

async fn logged_in(api: &FakeApi, seed: SeedUser) -> SessionStore {
    let session = api.session();
    session
        .login(seed.username, &SecretString::from(seed.password.to_string()))
        .await
        .unwrap();
    session
}

// =============================================================================
// Tasks
// =============================================================================

#[tokio::test]
async fn test_created_task_appears_in_listing() {
    let api = FakeApi::start().await.unwrap();
    let admin = logged_in(&api, ADMIN).await;
    let tasks = TaskService::new(admin.api());

    let created = tasks
        .create(&NewTask {
            name: "T1".to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            project: ProjectId::new(MIGRATION_PROJECT),
            assignee: UserId::new(ANA.id),
        })
        .await
        .unwrap();

    let listed = ProjectTasks::flatten(&tasks.list().await.unwrap());
    let found = listed.iter().find(|t| t.id == created.id).unwrap();
    assert_eq!(found.name, "T1");
    assert_eq!(found.project, ProjectId::new(MIGRATION_PROJECT));
    assert_eq!(found.assignee, UserId::new(ANA.id));
    assert_eq!(found.status, TaskStatus::Pending);
    assert_eq!(found, &created);
}

#[tokio::test]
async fn test_non_admin_sees_only_assigned_tasks() {
    let api = FakeApi::start().await.unwrap();
    let ana = logged_in(&api, ANA).await;

    let groups = TaskService::new(ana.api()).list().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, ProjectId::new(MIGRATION_PROJECT));
    assert!(
        ProjectTasks::flatten(&groups)
            .iter()
            .all(|t| t.assignee == UserId::new(ANA.id))
    );
}

#[tokio::test]
async fn test_filter_by_project() {
    let api = FakeApi::start().await.unwrap();
    let admin = logged_in(&api, ADMIN).await;

    let tasks = TaskService::new(admin.api())
        .list_for_project(ProjectId::new(17))
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, TaskId::new(8));
    assert_eq!(tasks[0].project, ProjectId::new(17));
}

#[tokio::test]
async fn test_assignee_changes_status() {
    let api = FakeApi::start().await.unwrap();
    let ana = logged_in(&api, ANA).await;
    let tasks = TaskService::new(ana.api());

    let updated = tasks
        .set_status(TaskId::new(7), TaskStatus::Completed)
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(tasks.get(TaskId::new(7)).await.unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_non_admin_cannot_edit_task_fields() {
    let api = FakeApi::start().await.unwrap();
    let ana = logged_in(&api, ANA).await;

    let err = TaskService::new(ana.api())
        .update(
            TaskId::new(7),
            &TaskUpdate {
                name: Some("Renamed".to_string()),
                ..TaskUpdate::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
}

#[tokio::test]
async fn test_task_update_and_delete() {
    let api = FakeApi::start().await.unwrap();
    let admin = logged_in(&api, ADMIN).await;
    let tasks = TaskService::new(admin.api());

    let updated = tasks
        .update(
            TaskId::new(8),
            &TaskUpdate {
                description: Some("Revisar contratos".to_string()),
                status: Some(TaskStatus::InProgress),
                ..TaskUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Revisión");
    assert_eq!(updated.description, "Revisar contratos");
    assert_eq!(updated.status, TaskStatus::InProgress);

    tasks.delete(TaskId::new(8)).await.unwrap();
    let err = tasks.get(TaskId::new(8)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_invalid_task_reference_surfaces_server_message() {
    let api = FakeApi::start().await.unwrap();
    let admin = logged_in(&api, ADMIN).await;

    let err = TaskService::new(admin.api())
        .create(&NewTask {
            name: "T2".to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            project: ProjectId::new(999),
            assignee: UserId::new(ANA.id),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err.user_message(),
        "proyecto: Invalid pk \"999\" - object does not exist."
    );
    assert_eq!(err.status(), Some(400));
}

// =============================================================================
// Projects
// =============================================================================

#[tokio::test]
async fn test_project_lifecycle() {
    let api = FakeApi::start().await.unwrap();
    let admin = logged_in(&api, ADMIN).await;
    let projects = ProjectService::new(admin.api());

    let mut input = ProjectInput {
        name: "Auditoría".to_string(),
        description: "Q1".to_string(),
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        owner: UserId::new(ADMIN.id),
    };
    let created = projects.create(&input).await.unwrap();
    assert_eq!(ProjectInput::from(&created), input);

    input.end_date = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
    let updated = projects.update(created.id, &input).await.unwrap();
    assert_eq!(updated.end_date, input.end_date);
    assert!(projects.list().await.unwrap().iter().any(|p| p.id == created.id));

    projects.delete(created.id).await.unwrap();
    assert!(projects.list().await.unwrap().iter().all(|p| p.id != created.id));
}

#[tokio::test]
async fn test_project_dates_are_validated_by_the_server() {
    let api = FakeApi::start().await.unwrap();
    let admin = logged_in(&api, ADMIN).await;

    let err = ProjectService::new(admin.api())
        .create(&ProjectInput {
            name: "Backwards".to_string(),
            description: String::new(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            owner: UserId::new(ADMIN.id),
        })
        .await
        .unwrap_err();

    let ClientError::Validation { status, message } = err else {
        panic!("expected a validation error, got {err:?}");
    };
    assert_eq!(status, 400);
    assert_eq!(message, "End date must not be before start date.");
}

#[tokio::test]
async fn test_non_admin_cannot_create_project() {
    let api = FakeApi::start().await.unwrap();
    let ana = logged_in(&api, ANA).await;

    let err = ProjectService::new(ana.api())
        .create(&ProjectInput {
            name: "Mine".to_string(),
            description: String::new(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            owner: UserId::new(ANA.id),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_admin_manages_users() {
    let api = FakeApi::start().await.unwrap();
    let admin = logged_in(&api, ADMIN).await;
    let users = UserService::new(admin.api());

    let created = users
        .create(&NewUser {
            username: "marta".to_string(),
            email: Email::parse("marta@example.com").unwrap(),
            password: "m4rta".to_string(),
            name: Some("Marta".to_string()),
            role: Some(Role::Admin),
        })
        .await
        .unwrap();
    assert!(created.is_admin());
    assert_eq!(created.display_name(), "Marta");

    // Creating a user does not replace the admin's own session.
    assert_eq!(admin.current_user().unwrap().username, ADMIN.username);

    let mut update = UserUpdate::from_user(&created);
    update.name = Some("Marta Gil".to_string());
    let updated = users.update(created.id, &update).await.unwrap();
    assert_eq!(updated.name.as_deref(), Some("Marta Gil"));
    assert_eq!(users.get(created.id).await.unwrap(), updated);

    users.delete(created.id).await.unwrap();
    assert!(!api.has_user("marta"));
}

#[tokio::test]
async fn test_me_reports_server_record() {
    let api = FakeApi::start().await.unwrap();
    let ana = logged_in(&api, ANA).await;

    let me = UserService::new(ana.api()).me().await.unwrap();
    assert_eq!(me.id, UserId::new(ANA.id));
    assert_eq!(me.display_name(), "Ana Pérez");
    assert!(!me.is_admin());
}

#[tokio::test]
async fn test_non_admin_cannot_list_users() {
    let api = FakeApi::start().await.unwrap();
    let ana = logged_in(&api, ANA).await;

    let err = UserService::new(ana.api()).list().await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
    assert_eq!(err.status(), Some(403));
}

// =============================================================================
// Alerts
// =============================================================================

#[tokio::test]
async fn test_hide_is_idempotent() {
    let api = FakeApi::start().await.unwrap();
    let ana = logged_in(&api, ANA).await;
    let alerts = AlertService::new(ana.api());
    let ids = [AlertId::new(1), AlertId::new(2)];

    alerts.hide(&ids).await.unwrap();
    alerts.hide(&ids).await.unwrap();

    assert_eq!(api.alert_visible(1), Some(false));
    assert_eq!(api.alert_visible(2), Some(false));
    assert!(alerts.list().await.unwrap().iter().all(|a| !a.visible));
}

#[tokio::test]
async fn test_admin_sends_alert() {
    let api = FakeApi::start().await.unwrap();
    let admin = logged_in(&api, ADMIN).await;

    let sent = AlertService::new(admin.api())
        .create(&NewAlert {
            user: UserId::new(ANA.id),
            message: "Reunión a las 10".to_string(),
        })
        .await
        .unwrap();
    assert!(sent.visible);

    let ana = logged_in(&api, ANA).await;
    let inbox = AlertService::new(ana.api()).list().await.unwrap();
    assert!(inbox.iter().any(|a| a.id == sent.id && a.message == "Reunión a las 10"));
}
