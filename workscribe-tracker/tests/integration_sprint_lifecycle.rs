//! Integration tests for the sprint lifecycle and task redistribution

use tempfile::TempDir;
use workscribe_tracker::{
    project::AddProject,
    sprint::{AddSprint, CompleteSprint, DeleteSprint, ListSprints, StartSprint},
    task::{AddTask, ListTasks, MoveTask},
    Disposition, Execute, TrackerContext, TrackerError,
};

struct Fixture {
    _temp: TempDir,
    ctx: TrackerContext,
    project_id: String,
    done: String,
}

async fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let ctx = TrackerContext::open_at(temp.path().join("tracker.db")).unwrap();
    let project = AddProject::new("acme", "WS", "Workscribe")
        .execute(&ctx)
        .await
        .unwrap();
    Fixture {
        project_id: project["id"].as_str().unwrap().to_string(),
        done: project["statuses"][2]["id"].as_str().unwrap().to_string(),
        _temp: temp,
        ctx,
    }
}

impl Fixture {
    async fn sprint(&self, name: &str) -> String {
        let sprint = AddSprint::new("acme", "pm", self.project_id.as_str(), name)
            .execute(&self.ctx)
            .await
            .unwrap();
        sprint["id"].as_str().unwrap().to_string()
    }

    async fn task(&self, title: &str, sprint: &str) -> String {
        let task = AddTask::new("acme", "pm", self.project_id.as_str(), title)
            .in_sprint(sprint)
            .execute(&self.ctx)
            .await
            .unwrap();
        task["id"].as_str().unwrap().to_string()
    }

    async fn in_sprint(&self, sprint: &str) -> Vec<String> {
        let tasks = ListTasks::new("acme", self.project_id.as_str())
            .with_sprint(sprint)
            .execute(&self.ctx)
            .await
            .unwrap();
        tasks["tasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap().to_string())
            .collect()
    }
}

#[tokio::test]
async fn test_full_cycle_carries_unfinished_work_forward() {
    let f = fixture().await;
    let s1 = f.sprint("Sprint 1").await;
    let s2 = f.sprint("Sprint 2").await;

    let _login = f.task("Login", &s1).await;
    let signup = f.task("Signup", &s1).await;
    let _reset = f.task("Reset password", &s1).await;

    StartSprint::new("acme", "pm", s1.as_str()).execute(&f.ctx).await.unwrap();
    MoveTask::new("acme", "dev", signup.as_str(), 0)
        .to_status(f.done.as_str())
        .execute(&f.ctx)
        .await
        .unwrap();

    let completion = CompleteSprint::new("acme", "pm", s1.as_str(), Disposition::to_sprint(s2.as_str()))
        .execute(&f.ctx)
        .await
        .unwrap();
    assert_eq!(completion["moved_tasks"].as_array().unwrap().len(), 2);

    assert_eq!(f.in_sprint(&s1).await, vec!["Signup"]);
    let mut carried = f.in_sprint(&s2).await;
    carried.sort();
    assert_eq!(carried, vec!["Login", "Reset password"]);

    // The next sprint can start now that the first is completed
    StartSprint::new("acme", "pm", s2.as_str()).execute(&f.ctx).await.unwrap();

    let sprints = ListSprints::new("acme", f.project_id.as_str())
        .execute(&f.ctx)
        .await
        .unwrap();
    assert_eq!(sprints["sprints"][0]["status"], "completed");
    assert_eq!(sprints["sprints"][0]["task_count"], 1);
    assert_eq!(sprints["sprints"][0]["completed_task_count"], 1);
    assert_eq!(sprints["sprints"][1]["status"], "active");
    assert_eq!(sprints["sprints"][1]["task_count"], 2);
}

#[tokio::test]
async fn test_at_most_one_active_sprint() {
    let f = fixture().await;
    let s1 = f.sprint("Sprint 1").await;
    let s2 = f.sprint("Sprint 2").await;

    StartSprint::new("acme", "pm", s1.as_str()).execute(&f.ctx).await.unwrap();
    let second = StartSprint::new("acme", "pm", s2.as_str()).execute(&f.ctx).await;
    assert!(matches!(second, Err(TrackerError::Conflict { .. })));

    let sprints = ListSprints::new("acme", f.project_id.as_str())
        .execute(&f.ctx)
        .await
        .unwrap();
    let active = sprints["sprints"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["status"] == "active")
        .count();
    assert_eq!(active, 1);
}

#[tokio::test]
async fn test_backlog_disposition_clears_sprint_from_unfinished_tasks() {
    let f = fixture().await;
    let s1 = f.sprint("Sprint 1").await;
    f.task("A", &s1).await;
    f.task("B", &s1).await;
    StartSprint::new("acme", "pm", s1.as_str()).execute(&f.ctx).await.unwrap();

    CompleteSprint::new("acme", "pm", s1.as_str(), Disposition::Backlog)
        .execute(&f.ctx)
        .await
        .unwrap();

    assert!(f.in_sprint(&s1).await.is_empty());
    let backlog = ListTasks::new("acme", f.project_id.as_str())
        .backlog()
        .execute(&f.ctx)
        .await
        .unwrap();
    assert_eq!(backlog["count"], 2);
}

#[tokio::test]
async fn test_delete_rules() {
    let f = fixture().await;
    let planned = f.sprint("Planned").await;
    let running = f.sprint("Running").await;
    StartSprint::new("acme", "pm", running.as_str()).execute(&f.ctx).await.unwrap();

    let active = DeleteSprint::new("acme", "pm", running.as_str()).execute(&f.ctx).await;
    assert!(matches!(active, Err(TrackerError::Conflict { .. })));

    CompleteSprint::new("acme", "pm", running.as_str(), Disposition::Backlog)
        .execute(&f.ctx)
        .await
        .unwrap();
    let completed = DeleteSprint::new("acme", "pm", running.as_str()).execute(&f.ctx).await;
    assert!(matches!(completed, Err(TrackerError::Conflict { .. })));

    DeleteSprint::new("acme", "pm", planned.as_str())
        .execute(&f.ctx)
        .await
        .unwrap();
    let sprints = ListSprints::new("acme", f.project_id.as_str())
        .execute(&f.ctx)
        .await
        .unwrap();
    assert_eq!(sprints["count"], 1);
}
