use crate::session::AlignmentCoordinator;

/// One line per available structure, marking the reference `[R]` and
/// targets `[T]`.
pub fn render_available(coordinator: &AlignmentCoordinator) -> String {
    let available = coordinator.available();
    if available.is_empty() {
        return "No structures available.".to_string();
    }
    let selection = coordinator.selection();
    available
        .iter()
        .map(|s| {
            let mark = if selection.reference_id == Some(s.id) {
                "[R]"
            } else if selection.target_ids.contains(&s.id) {
                "[T]"
            } else {
                "   "
            };
            format!("{mark} {:>6}  {}", s.id, s.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_status(coordinator: &AlignmentCoordinator) -> String {
    let selection = coordinator.selection();
    let name_of = |id| {
        coordinator
            .display_name(id)
            .map_or_else(|| id.to_string(), |name| format!("{name} ({id})"))
    };

    let reference = selection
        .reference_id
        .map_or_else(|| "(none)".to_string(), name_of);
    let targets = if selection.target_ids.is_empty() {
        "(none)".to_string()
    } else {
        selection
            .target_ids
            .iter()
            .map(|id| name_of(*id))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut lines = vec![
        format!("◆ aligntool {}", env!("CARGO_PKG_VERSION")),
        String::new(),
        format!("  Submission  {}", coordinator.submission_state()),
        format!("  Reference   {reference}"),
        format!("  Targets     {targets}"),
    ];

    match coordinator.last_alignment() {
        Some(record) => {
            lines.push(format!("  Undo        {}", record.summary.label));
            lines.push(format!(
                "  Aligned at  {}",
                record.recorded_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        None => lines.push("  Undo        (nothing to undo)".to_string()),
    }

    lines.join("\n")
}
