use idea_core::generate::GeneratedDesign;
use idea_core::sync::SyncReport;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// Human rendering of a generated design: name, document, then the backlog
/// in creation order.
pub fn print_design(design: &GeneratedDesign) {
    println!("\n--- Project Name ---\n{}", design.project_name);
    println!("\n--- DESIGN.md ---\n");
    println!("{}", design.design_markdown);
    println!("\n--- GitHub Issues ---\n");
    for issue in design.design().ordered_issues() {
        println!("#{} [{}] {}", issue.order, issue.priority, issue.title);
        println!("{}", issue.body);
        println!("Labels: {}\n", issue.labels.join(", "));
    }
}

pub fn print_sync_report(report: &SyncReport, outcome: &str) {
    println!(
        "Repository: {} ({})",
        report.repo,
        match report.resolution {
            idea_core::sync::RepoResolution::Created => "created",
            idea_core::sync::RepoResolution::Found => "existing",
        }
    );
    println!(
        "Closed {} existing issue(s), {} close failure(s)",
        report.closed.len(),
        report.close_failures.len()
    );
    for failure in &report.close_failures {
        println!("  close failed: {failure}");
    }

    if !report.created.is_empty() {
        let rows = report
            .created
            .iter()
            .map(|c| vec![c.order.to_string(), format!("#{}", c.number), c.title.clone()])
            .collect();
        print_table(&["ORDER", "ISSUE", "TITLE"], rows);
    }
    for failure in &report.failures {
        println!("  create failed: {failure}");
    }
    for item in &report.skipped {
        println!("  skipped: {item}");
    }

    println!(
        "Created {} issue(s), {} failed, {} skipped",
        report.created.len(),
        report.failures.len(),
        report.skipped.len()
    );
    println!("Outcome: {outcome}");
}
