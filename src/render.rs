//! Plain-text rendering of the board for the terminal.

use crate::models::*;
use crate::views::{self, CardView, EpicFilter, ProjectStats};

const TODO: char = '○';
const IN_PROGRESS: char = '▶';
const DONE: char = '●';
const BLOCKED: char = '✗';

/// Get the status symbol for a story status.
fn status_symbol(status: StoryStatus) -> char {
    match status {
        StoryStatus::Todo => TODO,
        StoryStatus::InProgress => IN_PROGRESS,
        StoryStatus::Done => DONE,
        StoryStatus::Blocked => BLOCKED,
    }
}

/// Header line plus per-status counts and the progress bar.
///
/// ```text
/// Story Points 13/40   Stories Done 3/9
/// To Do 4 · In Progress 1 · Completed 3 · Blocked 1
/// [██████░░░░░░░░░░░░░░] 33%
/// ```
pub fn render_stats(stats: &ProjectStats) -> String {
    let percent = stats.progress_percent();
    let filled = (percent as usize * 20) / 100;
    format!(
        "Story Points {}/{}   Stories Done {}/{}\n\
         To Do {} · In Progress {} · Completed {} · Blocked {}\n\
         [{}{}] {}%\n",
        stats.completed_points,
        stats.total_points,
        stats.done,
        stats.total,
        stats.todo,
        stats.in_progress,
        stats.done,
        stats.blocked,
        "█".repeat(filled),
        "░".repeat(20 - filled),
        percent,
    )
}

/// One line per epic with its derived point total.
pub fn render_epics(snapshot: &ProjectSnapshot) -> String {
    let mut output = String::new();
    for epic in views::epic_totals(snapshot) {
        output.push_str(&format!("{:<16} {:>4} SP  ({})\n", epic.name, epic.total, epic.id));
    }
    output
}

/// Sprint tabs, marking the active sprint.
pub fn render_sprints(snapshot: &ProjectSnapshot) -> String {
    let mut output = String::new();
    for sprint in snapshot.sprints() {
        let marker = if sprint.is_active() { '*' } else { ' ' };
        output.push_str(&format!(
            "{} {:<12} {:<24} {:<9} {:>3} stories  {}\n",
            marker,
            sprint.id,
            sprint.name,
            sprint.status.map(|s| s.as_str()).unwrap_or("-"),
            sprint.stories.len(),
            sprint.date_range
        ));
    }
    output
}

fn render_card(output: &mut String, card: &CardView<'_>) {
    let story = card.story;
    output.push_str(&format!(
        "  {} {:<8} {} [{} SP, {}]",
        status_symbol(story.status),
        story.id,
        story.title,
        story.story_points,
        story.epic_name
    ));
    if let Some(assignee) = &story.assignee {
        output.push_str(&format!(" @{}", assignee));
    }
    if card.blocked {
        output.push_str(" BLOCKED");
    }
    output.push('\n');
}

/// A sprint as three Kanban columns, filtered by epic.
pub fn render_board(sprint: &Sprint, filter: &EpicFilter) -> String {
    let mut output = format!("{} - User Stories", sprint.name);
    if !sprint.date_range.is_empty() {
        output.push_str(&format!(" ({})", sprint.date_range));
    }
    output.push('\n');

    if views::filter_stories(sprint, filter).is_empty() {
        output.push_str("  No stories in this sprint\n");
        return output;
    }

    for view in views::board_columns(sprint, filter) {
        output.push_str(&format!("\n{} ({})\n", view.column.title(), view.cards.len()));
        for card in &view.cards {
            render_card(&mut output, card);
        }
    }
    output
}
