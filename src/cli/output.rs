use serde::Serialize;

use crate::model::forest::{Forest, ProjectRef, TaskRef};
use crate::model::project::Project;
use crate::model::task::{Due, DueKind};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

/// A project with everything attached to it, as projected by the forest
#[derive(Serialize)]
pub struct ProjectJson {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ProjectJson>,
}

#[derive(Serialize)]
pub struct ProjectListJson {
    pub projects: Vec<ProjectJson>,
}

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub priority: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

#[derive(Serialize)]
pub struct SectionJson {
    pub id: String,
    pub name: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ProjectTasksJson {
    pub path: String,
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    pub tasks: Vec<TaskJson>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionJson>,
}

/// A freshly created resource, for `add --json`
#[derive(Serialize)]
pub struct CreatedJson<'a> {
    pub id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<&'a str>,
}

impl<'a> From<&'a Project> for CreatedJson<'a> {
    fn from(p: &'a Project) -> Self {
        CreatedJson {
            id: &p.id,
            name: &p.name,
            parent_id: p.parent_id.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion functions
// ---------------------------------------------------------------------------

pub fn project_to_json(forest: &Forest<'_>, r: ProjectRef) -> ProjectJson {
    let node = forest.project(r);
    ProjectJson {
        id: node.project.id.clone(),
        name: node.project.name.clone(),
        color: node.project.color.clone(),
        comments: project_comments(forest, r),
        tasks: open_tasks_json(forest, &node.tasks),
        sections: sections_json(forest, r),
        children: node
            .children
            .iter()
            .map(|&c| project_to_json(forest, c))
            .collect(),
    }
}

pub fn task_to_json(forest: &Forest<'_>, r: TaskRef) -> TaskJson {
    let node = forest.task(r);
    let task = node.task;
    TaskJson {
        id: task.id.clone(),
        content: task.content.clone(),
        description: task.description.clone(),
        priority: task.priority,
        labels: node
            .labels
            .iter()
            .map(|&l| forest.label(l).name.clone())
            .collect(),
        due: task.due.as_ref().map(due_text),
        comments: node
            .comments
            .iter()
            .map(|&c| forest.comment(c).content.clone())
            .collect(),
    }
}

fn project_comments(forest: &Forest<'_>, r: ProjectRef) -> Vec<String> {
    forest
        .project(r)
        .comments
        .iter()
        .map(|&c| forest.comment(c).content.clone())
        .collect()
}

fn open_tasks_json(forest: &Forest<'_>, refs: &[TaskRef]) -> Vec<TaskJson> {
    refs.iter()
        .filter(|&&t| !forest.task(t).task.is_completed())
        .map(|&t| task_to_json(forest, t))
        .collect()
}

fn sections_json(forest: &Forest<'_>, r: ProjectRef) -> Vec<SectionJson> {
    forest
        .project(r)
        .sections
        .iter()
        .map(|&s| {
            let section = forest.section(s);
            SectionJson {
                id: section.section.id.clone(),
                name: section.section.name.clone(),
                tasks: open_tasks_json(forest, &section.tasks),
            }
        })
        .collect()
}

pub fn project_tasks_to_json(
    forest: &Forest<'_>,
    path: &str,
    r: ProjectRef,
) -> ProjectTasksJson {
    let node = forest.project(r);
    ProjectTasksJson {
        path: path.to_string(),
        id: node.project.id.clone(),
        comments: project_comments(forest, r),
        tasks: open_tasks_json(forest, &node.tasks),
        sections: sections_json(forest, r),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// A due date for display: the schedule for recurring dues, date and time
/// for timed ones, the date otherwise.
fn due_text(due: &Due) -> String {
    match due.kind() {
        DueKind::Recurring if !due.string.is_empty() => due.string.clone(),
        DueKind::DateTime => due
            .naive_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| due.date.clone()),
        _ => due
            .naive_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| due.date.clone()),
    }
}

/// Format projects as an indented tree of `# name` headings, two spaces per
/// level starting at `indent`. `entries` come from [`Forest::walk`] or
/// [`Forest::walk_subtree`].
pub fn format_project_tree(
    forest: &Forest<'_>,
    entries: &[(usize, ProjectRef)],
    indent: usize,
) -> Vec<String> {
    entries
        .iter()
        .map(|&(depth, r)| {
            format!(
                "{}# {}",
                "  ".repeat(indent + depth),
                forest.project(r).project.name
            )
        })
        .collect()
}

/// Format one task as `  - content`, with labels and due date appended and
/// the description underneath.
pub fn format_task(forest: &Forest<'_>, r: TaskRef) -> Vec<String> {
    let node = forest.task(r);
    let task = node.task;

    let mut line = format!("  - {}", task.content);
    for &l in &node.labels {
        line.push_str(&format!(" @{}", forest.label(l).name));
    }
    if let Some(due) = &task.due {
        line.push_str(&format!(" (due: {})", due_text(due)));
    }

    let mut lines = vec![line];
    for d in task.description.lines() {
        lines.push(format!("    {}", d));
    }
    lines
}

/// Format a project's open tasks: a `# path` heading, the tasks outside any
/// section, then each section as `/name` followed by its tasks.
pub fn format_project_tasks(
    forest: &Forest<'_>,
    path: &str,
    r: ProjectRef,
) -> Vec<String> {
    let node = forest.project(r);
    let open = |refs: &[TaskRef]| -> Vec<TaskRef> {
        refs.iter()
            .copied()
            .filter(|&t| !forest.task(t).task.is_completed())
            .collect()
    };

    let mut lines = vec![String::new(), format!("# {}", path), String::new()];
    for t in open(&node.tasks) {
        lines.extend(format_task(forest, t));
    }
    for &s in &node.sections {
        let section = forest.section(s);
        lines.push(String::new());
        lines.push(format!("  /{}", section.section.name));
        lines.push(String::new());
        for t in open(&section.tasks) {
            lines.extend(format_task(forest, t));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::comment::Comment;
    use crate::model::label::Label;
    use crate::model::project::Section;
    use crate::model::snapshot::Snapshot;
    use crate::model::task::Task;
    use crate::ops::hierarchy::build_forest;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn snapshot() -> Snapshot {
        let mut write = Task::new("t2", "p1", "Write draft").in_section("s1");
        write.description = "Outline first\nthen prose".into();
        let mut pay = Task::new("t3", "p3", "Pay rent").with_labels(&["home"]);
        pay.due = Some(Due::on("2026-11-01"));
        Snapshot {
            projects: vec![
                Project::new("p1", "Work"),
                Project::new("p2", "Reports").with_parent("p1"),
                Project::new("p4", "Q3").with_parent("p2"),
                Project::new("p3", "Home"),
            ],
            sections: vec![Section::new("s1", "p1", "Writing")],
            tasks: vec![
                Task::new("t1", "p1", "Email Bob"),
                write,
                Task::new("t4", "p1", "Old thing").completed("2026-10-01T09:00:00Z"),
                pay,
            ],
            labels: vec![Label::new("l1", "home")],
            comments: vec![
                Comment::on_task("c1", "t3", "bank transfer"),
                Comment::on_project("c2", "p1", "weekly sync on monday"),
            ],
        }
    }

    #[test]
    fn project_tree_renders_all_roots() {
        let snap = snapshot();
        let forest = build_forest(&snap);
        let mut lines = vec!["# Projects".to_string()];
        lines.extend(format_project_tree(&forest, &forest.walk(), 1));
        let output = lines.join("\n");
        assert_snapshot!(output, @r"
# Projects
  # Work
    # Reports
      # Q3
  # Home
");
    }

    #[test]
    fn subtree_starts_flush_left() {
        let snap = snapshot();
        let forest = build_forest(&snap);
        let reports = forest.walk()[1].1;
        let lines = format_project_tree(&forest, &forest.walk_subtree(reports), 0);
        assert_eq!(lines, vec!["# Reports", "  # Q3"]);
    }

    #[test]
    fn project_tasks_with_sections() {
        let snap = snapshot();
        let forest = build_forest(&snap);
        let work = forest.roots()[0];
        let lines = format_project_tasks(&forest, "Work", work);
        assert_eq!(
            lines,
            vec![
                "",
                "# Work",
                "",
                "  - Email Bob",
                "",
                "  /Writing",
                "",
                "  - Write draft",
                "    Outline first",
                "    then prose",
            ]
        );
    }

    #[test]
    fn task_line_shows_labels_and_due() {
        let snap = snapshot();
        let forest = build_forest(&snap);
        let home = forest.roots()[1];
        let lines = format_project_tasks(&forest, "Home", home);
        assert_eq!(lines[3], "  - Pay rent @home (due: 2026-11-01)");
    }

    #[test]
    fn due_rendering_by_kind() {
        let timed = Due {
            datetime: Some("2026-11-01T09:30:00Z".into()),
            ..Due::on("2026-11-01")
        };
        let recurring = Due {
            is_recurring: true,
            string: "every friday".into(),
            ..Due::on("2026-11-06")
        };
        let phrased = Due {
            string: "Nov 1".into(),
            ..Due::on("2026-11-01")
        };
        assert_eq!(due_text(&Due::on("2026-11-01")), "2026-11-01");
        assert_eq!(due_text(&timed), "2026-11-01 09:30");
        assert_eq!(due_text(&recurring), "every friday");
        assert_eq!(due_text(&phrased), "2026-11-01");
    }

    #[test]
    fn json_tree_carries_full_projection() {
        let snap = snapshot();
        let forest = build_forest(&snap);
        let work = serde_json::to_value(project_to_json(&forest, forest.roots()[0])).unwrap();
        assert_eq!(work["comments"][0], "weekly sync on monday");
        assert_eq!(work["tasks"].as_array().unwrap().len(), 1);
        assert_eq!(work["tasks"][0]["content"], "Email Bob");
        assert_eq!(work["sections"][0]["name"], "Writing");
        assert_eq!(work["sections"][0]["tasks"][0]["content"], "Write draft");

        let home = serde_json::to_value(project_to_json(&forest, forest.roots()[1])).unwrap();
        assert_eq!(home["tasks"][0]["labels"][0], "home");
        assert_eq!(home["tasks"][0]["comments"][0], "bank transfer");
        assert!(home.get("sections").is_none());
    }

    #[test]
    fn json_tree_nests_children() {
        let snap = snapshot();
        let forest = build_forest(&snap);
        let list = ProjectListJson {
            projects: forest
                .roots()
                .iter()
                .map(|&r| project_to_json(&forest, r))
                .collect(),
        };
        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(value["projects"][0]["name"], "Work");
        assert_eq!(value["projects"][0]["children"][0]["name"], "Reports");
        assert_eq!(
            value["projects"][0]["children"][0]["children"][0]["id"],
            "p4"
        );
        assert!(value["projects"][1].get("children").is_none());
    }

    #[test]
    fn json_tasks_skip_completed_and_carry_comments() {
        let snap = snapshot();
        let forest = build_forest(&snap);
        let work = project_tasks_to_json(&forest, "Work", forest.roots()[0]);
        assert_eq!(work.tasks.len(), 1);
        assert_eq!(work.sections[0].tasks[0].content, "Write draft");
        assert_eq!(work.comments, vec!["weekly sync on monday".to_string()]);

        let home = project_tasks_to_json(&forest, "Home", forest.roots()[1]);
        assert_eq!(home.tasks[0].comments, vec!["bank transfer".to_string()]);
        assert_eq!(home.tasks[0].labels, vec!["home".to_string()]);
    }
}
