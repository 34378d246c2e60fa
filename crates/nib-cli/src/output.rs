use nib_core::domain::inventory::RemoteIndex;
use nib_core::domain::plan::{PhaseOutcome, TransferOutcome};
use nib_sync::engine::{PhaseStatus, PreparedSync, SyncReport};

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);

    /// Inventory counts and the plan, shown before any confirmation
    fn plan(&self, prepared: &PreparedSync);
    /// Outcome of a finished run
    fn report(&self, report: &SyncReport);
    /// Remote listing for `nib list`
    fn listing(&self, index: &RemoteIndex);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl HumanFormatter {
    fn phase(&self, label: &str, status: &PhaseStatus, done: &str, failed: &str) {
        match status {
            PhaseStatus::Skipped => {}
            PhaseStatus::Declined => self.info(&format!("{label} cancelled")),
            PhaseStatus::Executed(outcome) => self.outcomes(outcome, done, failed),
        }
    }

    fn outcomes(&self, outcome: &PhaseOutcome, done: &str, failed: &str) {
        for item in &outcome.items {
            match (&item.outcome, item.size) {
                (TransferOutcome::Succeeded, Some(size)) => {
                    self.success(&format!("{done}: {} ({size} bytes)", item.name))
                }
                (TransferOutcome::Succeeded, None) => {
                    self.success(&format!("{done}: {}", item.name))
                }
                (TransferOutcome::Failed { reason }, _) => {
                    self.error(&format!("{failed} {}: {reason}", item.name))
                }
            }
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }

    fn plan(&self, prepared: &PreparedSync) {
        println!("Inventory:");
        self.info(&format!("Remote images: {}", prepared.remote.index.len()));
        self.info(&format!("Local images:  {}", prepared.local_count));
        println!("Plan:");
        self.info(&format!(
            "To download: {} ({} bytes)",
            prepared.plan.to_download.len(),
            prepared.plan.download_bytes()
        ));
        self.info(&format!("To delete:   {}", prepared.plan.to_delete.len()));
    }

    fn report(&self, report: &SyncReport) {
        if report.already_in_sync() {
            self.success("Local directory is already in sync, nothing to do");
            return;
        }

        if report.dry_run {
            for item in &report.plan.to_delete {
                self.info(&format!("- {}", item.relative));
            }
            for item in &report.plan.to_download {
                self.info(&format!("+ {} ({} bytes)", item.filename, item.size));
            }
            self.success("Dry run, no changes made");
            return;
        }

        self.phase("Deletion", &report.deletions, "Deleted", "Failed to delete");
        self.phase("Download", &report.downloads, "Downloaded", "Failed to download");

        if report.any_executed() {
            let failed = report.failed();
            if failed > 0 {
                self.warn(&format!("{failed} item(s) failed"));
            }
            self.success(&format!("Sync complete in {} ms", report.duration_ms));
        } else {
            self.info("No operation executed");
        }
    }

    fn listing(&self, index: &RemoteIndex) {
        println!("Remote images ({}):", index.len());
        for (position, item) in index.iter().enumerate() {
            println!("{:3}. {} ({} bytes)", position + 1, item.filename, item.size);
        }
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }

    fn plan(&self, _prepared: &PreparedSync) {}

    fn report(&self, report: &SyncReport) {
        match serde_json::to_value(report) {
            Ok(value) => self.print_json(&value),
            Err(err) => self.error(&format!("Failed to serialize report: {err}")),
        }
    }

    fn listing(&self, index: &RemoteIndex) {
        let items: Vec<_> = index.iter().collect();
        match serde_json::to_value(&items) {
            Ok(value) => self.print_json(&serde_json::json!({
                "count": items.len(),
                "total_size": index.total_size(),
                "images": value,
            })),
            Err(err) => self.error(&format!("Failed to serialize listing: {err}")),
        }
    }
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}
